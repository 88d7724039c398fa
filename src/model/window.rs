use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use super::workspace::WorkspaceKey;
use crate::ui::capture::Bitmap;

/// Window identifier handed out by the window provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wid(pub u64);

impl fmt::Display for Wid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:#x}", self.0) }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Changes: u8 {
        const GEOMETRY = 1 << 0;
        const WORKSPACE = 1 << 1;
    }
}

/// One window waiting to be placed.
#[derive(Debug, Clone)]
pub struct WindowModel {
    pub wid: Wid,
    rect: Rect,
    pub resizable: bool,
    pub restored: bool,
    pub title: String,
    pub name: String,
    pub icon: Option<Arc<Bitmap>>,
    pub workspace: WorkspaceKey,
    changed_rect: Option<Rect>,
    changed_workspace: Option<WorkspaceKey>,
}

/// A single attribute update, applied through [`WindowModel::set`].
#[derive(Debug, Clone, PartialEq)]
pub enum ModelField {
    Rect([i32; 4]),
    ChangedRect(Option<[i32; 4]>),
    Workspace(WorkspaceKey),
    ChangedWorkspace(Option<WorkspaceKey>),
    Resizable(bool),
    Restored(bool),
    Title(String),
    Name(String),
}

impl WindowModel {
    pub fn new(wid: Wid, rect: Rect, workspace: WorkspaceKey) -> Self {
        Self {
            wid,
            rect,
            resizable: true,
            restored: false,
            title: String::new(),
            name: String::new(),
            icon: None,
            workspace,
            changed_rect: None,
            changed_workspace: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>, name: impl Into<String>) -> Self {
        self.title = title.into();
        self.name = name.into();
        self
    }

    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    pub fn rect(&self) -> Rect { self.rect }

    pub fn changed_rect(&self) -> Option<Rect> { self.changed_rect }

    pub fn changed_workspace(&self) -> Option<WorkspaceKey> { self.changed_workspace }

    /// Geometry the window will end up with: the user's choice if any.
    pub fn current_rect(&self) -> Rect { self.changed_rect.unwrap_or(self.rect) }

    pub fn current_workspace(&self) -> WorkspaceKey {
        self.changed_workspace.unwrap_or(self.workspace)
    }

    /// Applies `field`; returns false and leaves the model untouched when the
    /// value is not a valid rectangle.
    pub fn set(&mut self, field: ModelField) -> bool {
        match field {
            ModelField::Rect(raw) => match Rect::try_from(raw) {
                Ok(rect) => self.rect = rect,
                Err(_) => return false,
            },
            ModelField::ChangedRect(None) => self.changed_rect = None,
            ModelField::ChangedRect(Some(raw)) => match Rect::try_from(raw) {
                Ok(rect) => self.changed_rect = Some(rect),
                Err(_) => return false,
            },
            ModelField::Workspace(ws) => self.workspace = ws,
            ModelField::ChangedWorkspace(ws) => self.changed_workspace = ws,
            ModelField::Resizable(v) => self.resizable = v,
            ModelField::Restored(v) => self.restored = v,
            ModelField::Title(v) => self.title = v,
            ModelField::Name(v) => self.name = v,
        }
        true
    }

    pub fn set_changed_rect(&mut self, rect: Rect) { self.changed_rect = Some(rect); }

    pub fn set_changed_workspace(&mut self, ws: WorkspaceKey) { self.changed_workspace = Some(ws); }

    pub fn has_geometry_changes(&self) -> bool {
        self.changed_rect.is_some_and(|r| r != self.rect)
    }

    pub fn has_workspace_changes(&self) -> bool {
        self.changed_workspace.is_some_and(|ws| ws != self.workspace)
    }

    pub fn changes(&self) -> Changes {
        let mut changes = Changes::empty();
        changes.set(Changes::GEOMETRY, self.has_geometry_changes());
        changes.set(Changes::WORKSPACE, self.has_workspace_changes());
        changes
    }

    pub fn clear_changed(&mut self) {
        self.changed_rect = None;
        self.changed_workspace = None;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn model() -> WindowModel {
        WindowModel::new(Wid(7), Rect::new(10, 20, 300, 200).unwrap(), WorkspaceKey::new(0))
    }

    #[test]
    fn setter_rejects_invalid_rects() {
        let mut m = model();
        assert!(!m.set(ModelField::Rect([0, 0, -5, 10])));
        assert_eq!(m.rect(), Rect::new(10, 20, 300, 200).unwrap());

        assert!(m.set(ModelField::ChangedRect(Some([1, 2, 3, 4]))));
        assert!(!m.set(ModelField::ChangedRect(Some([1, 2, 3, -4]))));
        assert_eq!(m.changed_rect(), Rect::new(1, 2, 3, 4));

        assert!(m.set(ModelField::ChangedRect(None)));
        assert_eq!(m.changed_rect(), None);
    }

    #[test]
    fn dirty_only_when_different() {
        let mut m = model();
        assert_eq!(m.changes(), Changes::empty());

        m.set_changed_rect(m.rect());
        m.set_changed_workspace(m.workspace);
        assert_eq!(m.changes(), Changes::empty());

        m.set_changed_rect(m.rect().translate(1, 0));
        assert_eq!(m.changes(), Changes::GEOMETRY);

        m.set_changed_workspace(WorkspaceKey::new(1));
        assert_eq!(m.changes(), Changes::GEOMETRY | Changes::WORKSPACE);

        m.clear_changed();
        assert_eq!(m.changes(), Changes::empty());
        assert_eq!(m.current_rect(), m.rect());
        assert_eq!(m.current_workspace(), WorkspaceKey::new(0));
    }
}
