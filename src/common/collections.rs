pub use std::collections::BTreeMap;

pub type HashSet<T> = rustc_hash::FxHashSet<T>;
