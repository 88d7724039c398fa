use tracing::trace;

use super::bands::{Bands, bands_for_rect};
use crate::common::collections::BTreeMap;
use crate::model::{Rect, Wid, WindowsCollection, WorkspaceKey};

/// Snap targets per workspace: monitor edges first, then every other window
/// at its best-known position.
#[derive(Debug, Default, Clone)]
pub struct SnapIndex {
    map: BTreeMap<WorkspaceKey, Vec<Bands>>,
}

impl SnapIndex {
    pub fn build(
        workspaces: &[WorkspaceKey],
        monitors: &[Rect],
        windows: &WindowsCollection,
        placing: Option<Wid>,
        snap: i32,
        include_self: bool,
    ) -> SnapIndex {
        let mut map: BTreeMap<WorkspaceKey, Vec<Bands>> = workspaces
            .iter()
            .map(|&ws| (ws, monitors.iter().map(|&m| bands_for_rect(m, snap)).collect()))
            .collect();

        for model in windows.iter() {
            if !include_self && Some(model.wid) == placing {
                continue;
            }
            map.entry(model.current_workspace())
                .or_default()
                .push(bands_for_rect(model.current_rect(), snap));
        }

        trace!(
            workspaces = map.len(),
            targets = map.values().map(Vec::len).sum::<usize>(),
            "built snap index"
        );
        SnapIndex { map }
    }

    pub fn targets(&self, workspace: WorkspaceKey) -> &[Bands] {
        self.map.get(&workspace).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::WindowModel;

    fn rect(x: i32, y: i32, w: i32, h: i32) -> Rect { Rect::new(x, y, w, h).unwrap() }

    fn windows() -> WindowsCollection {
        let mut moved = WindowModel::new(Wid(2), rect(0, 0, 10, 10), WorkspaceKey::new(0));
        moved.set_changed_rect(rect(50, 50, 20, 20));
        moved.set_changed_workspace(WorkspaceKey::new(1));
        WindowsCollection::from_models([
            WindowModel::new(Wid(1), rect(100, 100, 400, 300), WorkspaceKey::new(0)),
            moved,
            WindowModel::new(Wid(3), rect(0, 0, 640, 480), WorkspaceKey::new(0)),
        ])
        .unwrap()
    }

    #[test]
    fn seeds_every_workspace_with_monitors() {
        let monitors = [rect(0, 0, 1920, 1080), rect(1920, 0, 1280, 1024)];
        let ws = [WorkspaceKey::new(0), WorkspaceKey::new(1), WorkspaceKey::new(2)];
        let index = SnapIndex::build(&ws, &monitors, &WindowsCollection::new(), None, 10, false);
        for w in ws {
            assert_eq!(index.targets(w).len(), 2);
            assert_eq!(index.targets(w)[1], bands_for_rect(monitors[1], 10));
        }
        assert!(index.targets(WorkspaceKey::new(9)).is_empty());
    }

    #[test]
    fn uses_best_known_geometry_and_skips_current() {
        let monitors = [rect(0, 0, 1920, 1080)];
        let ws = [WorkspaceKey::new(0), WorkspaceKey::new(1)];
        let index = SnapIndex::build(&ws, &monitors, &windows(), Some(Wid(1)), 5, false);

        assert_eq!(index.targets(WorkspaceKey::new(0)), &[
            bands_for_rect(monitors[0], 5),
            bands_for_rect(rect(0, 0, 640, 480), 5),
        ]);
        assert_eq!(index.targets(WorkspaceKey::new(1)), &[
            bands_for_rect(monitors[0], 5),
            bands_for_rect(rect(50, 50, 20, 20), 5),
        ]);
    }

    #[test]
    fn include_self_keeps_current_window() {
        let ws = [WorkspaceKey::new(0)];
        let index = SnapIndex::build(&ws, &[], &windows(), Some(Wid(1)), 5, true);
        assert_eq!(index.targets(WorkspaceKey::new(0)).len(), 2);
        assert!(index.targets(WorkspaceKey::new(9)).is_empty());
    }
}
