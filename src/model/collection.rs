//! Ordered queue of windows the session walks through.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::geometry::Rect;
use super::window::{Wid, WindowModel};
use super::workspace::WorkspaceKey;
use crate::common::collections::HashSet;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CollectionError {
    #[error("window {0} is listed more than once")]
    DuplicateWid(Wid),
    #[error("window {0} is not in the collection")]
    UnknownWid(Wid),
    #[error("window {wid} is on workspace {workspace:?} which the provider does not report")]
    MissingWorkspace { wid: Wid, workspace: WorkspaceKey },
}

/// Serialized form of a [`WindowModel`], one entry per window in `default.json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ExportedWindow {
    pub wid: Wid,
    pub rect: Rect,
    pub resizable: bool,
    pub restored: bool,
    pub title: String,
    pub name: String,
    pub workspace: WorkspaceKey,
    pub changed_rect: Option<Rect>,
    pub changed_workspace: Option<WorkspaceKey>,
}

impl From<&WindowModel> for ExportedWindow {
    fn from(m: &WindowModel) -> Self {
        Self {
            wid: m.wid,
            rect: m.rect(),
            resizable: m.resizable,
            restored: m.restored,
            title: m.title.clone(),
            name: m.name.clone(),
            workspace: m.workspace,
            changed_rect: m.changed_rect(),
            changed_workspace: m.changed_workspace(),
        }
    }
}

impl From<ExportedWindow> for WindowModel {
    fn from(e: ExportedWindow) -> Self {
        let mut model = WindowModel::new(e.wid, e.rect, e.workspace)
            .with_title(e.title, e.name)
            .with_resizable(e.resizable);
        model.restored = e.restored;
        if let Some(rect) = e.changed_rect {
            model.set_changed_rect(rect);
        }
        if let Some(ws) = e.changed_workspace {
            model.set_changed_workspace(ws);
        }
        model
    }
}

#[derive(Debug, Default, Clone)]
pub struct WindowsCollection {
    windows: Vec<WindowModel>,
}

impl WindowsCollection {
    pub fn new() -> Self { Self::default() }

    /// Builds a collection, rejecting duplicate window ids.
    pub fn from_models(
        models: impl IntoIterator<Item = WindowModel>,
    ) -> Result<Self, CollectionError> {
        let mut this = Self::new();
        for model in models {
            this.push(model)?;
        }
        Ok(this)
    }

    pub fn push(&mut self, model: WindowModel) -> Result<(), CollectionError> {
        if self.contains(model.wid) {
            return Err(CollectionError::DuplicateWid(model.wid));
        }
        self.windows.push(model);
        Ok(())
    }

    pub fn len(&self) -> usize { self.windows.len() }

    pub fn is_empty(&self) -> bool { self.windows.is_empty() }

    pub fn contains(&self, wid: Wid) -> bool { self.windows.iter().any(|m| m.wid == wid) }

    pub fn position(&self, wid: Wid) -> Option<usize> {
        self.windows.iter().position(|m| m.wid == wid)
    }

    pub fn get(&self, wid: Wid) -> Option<&WindowModel> { self.windows.iter().find(|m| m.wid == wid) }

    pub fn get_mut(&mut self, wid: Wid) -> Option<&mut WindowModel> {
        self.windows.iter_mut().find(|m| m.wid == wid)
    }

    pub fn at(&self, index: usize) -> Option<&WindowModel> { self.windows.get(index) }

    pub fn at_mut(&mut self, index: usize) -> Option<&mut WindowModel> {
        self.windows.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WindowModel> + '_ { self.windows.iter() }

    pub fn wids(&self) -> Vec<Wid> { self.windows.iter().map(|m| m.wid).collect() }

    /// Checks every window sits on a workspace from `available`.
    pub fn validate_workspaces(&self, available: &[WorkspaceKey]) -> Result<(), CollectionError> {
        let available: HashSet<WorkspaceKey> = available.iter().copied().collect();
        match self.windows.iter().find(|m| !available.contains(&m.workspace)) {
            Some(m) => Err(CollectionError::MissingWorkspace {
                wid: m.wid,
                workspace: m.workspace,
            }),
            None => Ok(()),
        }
    }

    /// Stable sort by workspace, rotated so the first window's workspace stays
    /// in front and the rest follow in ascending cyclic order.
    pub fn sort(&mut self) {
        let Some(anchor) = self.windows.first().map(|m| m.workspace) else {
            return;
        };
        self.windows.sort_by_key(|m| (m.workspace < anchor, m.workspace));
    }

    /// Jumps back to `target` while `pivot` is being placed.
    ///
    /// Windows queued before `pivot` are dropped (they are done), except
    /// `target` itself, which is rotated to the front. Re-selecting the pivot
    /// leaves the queue untouched.
    pub fn repopulate_for_wid(&mut self, target: Wid, pivot: Wid) -> Result<(), CollectionError> {
        let target_idx = self.position(target).ok_or(CollectionError::UnknownWid(target))?;
        let pivot_idx = self.position(pivot).ok_or(CollectionError::UnknownWid(pivot))?;
        if target_idx == pivot_idx {
            return Ok(());
        }

        let mut kept: Vec<WindowModel> = std::mem::take(&mut self.windows)
            .into_iter()
            .enumerate()
            .filter(|&(i, _)| i >= pivot_idx || i == target_idx)
            .map(|(_, m)| m)
            .collect();
        let front = kept.iter().position(|m| m.wid == target).unwrap_or_default();
        kept.rotate_left(front);
        self.windows = kept;

        debug!(?target, ?pivot, order = ?self.wids(), "repopulated collection");
        Ok(())
    }

    pub fn export(&self) -> Vec<ExportedWindow> {
        self.windows.iter().map(ExportedWindow::from).collect()
    }

    pub fn from_export(
        exported: impl IntoIterator<Item = ExportedWindow>,
    ) -> Result<Self, CollectionError> {
        Self::from_models(exported.into_iter().map(WindowModel::from))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.export())
    }

    pub fn from_json(buf: &str) -> anyhow::Result<Self> {
        let exported: Vec<ExportedWindow> = serde_json::from_str(buf)?;
        Ok(Self::from_export(exported)?)
    }
}
