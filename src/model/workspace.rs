use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of workspace slots reserved per screen in a [`WorkspaceKey`].
pub const WORKSPACES_PER_SCREEN: i64 = 1000;

/// Opaque identifier for a virtual desktop, as handed out by the window
/// provider.
///
/// Providers encode it as `screen * 1000 + workspace_index`; only
/// [`WorkspaceKey::humanized`] and the accessors below look inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceKey(i64);

impl WorkspaceKey {
    pub const fn new(raw: i64) -> Self { Self(raw) }

    pub const fn from_parts(screen: i64, index: i64) -> Self {
        Self(screen * WORKSPACES_PER_SCREEN + index)
    }

    pub const fn raw(self) -> i64 { self.0 }

    pub const fn screen(self) -> i64 { self.0.div_euclid(WORKSPACES_PER_SCREEN) }

    pub const fn index(self) -> i64 { self.0.rem_euclid(WORKSPACES_PER_SCREEN) }

    /// One-based number shown to the user.
    pub const fn humanized(self) -> i64 { self.index() + 1 }
}

impl fmt::Display for WorkspaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.humanized()) }
}

/// A workspace the provider reports as available, with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    pub key: WorkspaceKey,
    pub name: String,
}

impl WorkspaceInfo {
    pub fn new(key: WorkspaceKey, name: impl Into<String>) -> Self {
        Self { key, name: name.into() }
    }
}
