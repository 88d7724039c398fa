//! Platform window access consumed by the session.

use thiserror::Error;

use crate::model::{Rect, Size, Wid, WindowModel, WorkspaceInfo, WorkspaceKey};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("window {0} no longer exists")]
    UnknownWindow(Wid),
    #[error("window {wid} rejected the request: {reason}")]
    Rejected { wid: Wid, reason: String },
    #[error("window provider failed: {0}")]
    Backend(String),
}

/// Enumerates windows and applies the geometry the user picked.
///
/// The apply methods read the model's changed fields and must be idempotent:
/// the session may call them again for a window that is still dirty.
pub trait WindowProvider {
    fn enumerate(&mut self) -> Result<Vec<WindowModel>, ProviderError>;
    fn move_window(&mut self, model: &WindowModel) -> Result<(), ProviderError>;
    fn move_and_resize(&mut self, model: &WindowModel) -> Result<(), ProviderError>;
    fn move_to_workspace(&mut self, wid: Wid, workspace: WorkspaceKey) -> Result<(), ProviderError>;
    fn activate(&mut self, wid: Wid) -> Result<(), ProviderError>;
    fn monitors(&self) -> Vec<Rect>;
    /// Available workspaces in display order.
    fn workspaces(&self) -> Vec<WorkspaceInfo>;

    fn smallest_monitor(&self) -> Option<Size> {
        self.monitors().into_iter().map(|m| m.size()).min_by_key(|s| s.w as i64 * s.h as i64)
    }
}

impl<P: WindowProvider + ?Sized> WindowProvider for Box<P> {
    fn enumerate(&mut self) -> Result<Vec<WindowModel>, ProviderError> { (**self).enumerate() }

    fn move_window(&mut self, model: &WindowModel) -> Result<(), ProviderError> {
        (**self).move_window(model)
    }

    fn move_and_resize(&mut self, model: &WindowModel) -> Result<(), ProviderError> {
        (**self).move_and_resize(model)
    }

    fn move_to_workspace(&mut self, wid: Wid, workspace: WorkspaceKey) -> Result<(), ProviderError> {
        (**self).move_to_workspace(wid, workspace)
    }

    fn activate(&mut self, wid: Wid) -> Result<(), ProviderError> { (**self).activate(wid) }

    fn monitors(&self) -> Vec<Rect> { (**self).monitors() }

    fn workspaces(&self) -> Vec<WorkspaceInfo> { (**self).workspaces() }
}
