pub mod collection;
pub mod geometry;
pub mod window;
pub mod workspace;

pub use collection::{CollectionError, ExportedWindow, WindowsCollection};
pub use geometry::{Band, Point, Rect, Size};
pub use window::{Changes, ModelField, Wid, WindowModel};
pub use workspace::{WorkspaceInfo, WorkspaceKey};
