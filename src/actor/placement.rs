//! The per-window placement state machine.
//!
//! Each window goes through `Locate` (the overlay follows the cursor with one
//! corner pinned under it) and, if resizable, `Resize` (the opposite corner is
//! dragged while the located one stays put). `Released` hands the mouse back
//! to the user until something recaptures it.

use tracing::{debug, instrument, trace, warn};

use super::mouse::Pointer;
use crate::common::config::Settings;
use crate::model::{Point, Rect, Size, Wid, WindowModel, WindowsCollection, WorkspaceInfo, WorkspaceKey};
use crate::snapping::{Corner, SnapIndex, check_intersections, offset_for_intersections, sources_for_rect};
use crate::sys::provider::WindowProvider;
use crate::ui::capture::{Bitmap, ScreenCapture};
use crate::ui::overlay::Presenter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Positioning; the corner is the one under the cursor.
    Locate(Corner),
    /// Resizing; the corner is the one being dragged.
    Resize(Corner),
    /// Mouse released, nothing tracks the cursor.
    Released,
}

impl Phase {
    pub fn corner(self) -> Option<Corner> {
        match self {
            Phase::Locate(c) | Phase::Resize(c) => Some(c),
            Phase::Released => None,
        }
    }
}

/// What the session should do after a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Stay,
    Advance,
}

/// Collaborators the state machine drives, borrowed for one event.
pub struct Env<'a> {
    pub provider: &'a mut dyn WindowProvider,
    pub presenter: &'a mut dyn Presenter,
    pub pointer: &'a mut dyn Pointer,
    pub capture: &'a mut dyn ScreenCapture,
    pub settings: &'a Settings,
}

impl Env<'_> {
    fn shift(&self) -> i32 { self.settings.shift_cursor }

    fn min_size(&self) -> Size { Size::new(self.settings.min_width, self.settings.min_height) }
}

/// Places a rect of `size` so that the corner opposite `dragged` sits on
/// `anchor`.
fn rect_from_anchor(anchor: Point, dragged: Corner, size: Size) -> Rect {
    Rect {
        x: if dragged.is_right() { anchor.x } else { anchor.x - size.w },
        y: if dragged.is_bottom() { anchor.y } else { anchor.y - size.h },
        w: size.w,
        h: size.h,
    }
}

/// Overlay rect with `corner` under the cursor at `at`, cursor `shift`
/// pixels inside.
fn locate_rect(at: Point, corner: Corner, size: Size, shift: i32) -> Rect {
    Rect {
        x: if corner.is_right() { at.x - size.w + shift } else { at.x - shift },
        y: if corner.is_bottom() { at.y - size.h + shift } else { at.y - shift },
        w: size.w,
        h: size.h,
    }
}

/// Inverse of [`locate_rect`].
fn locate_cursor(rect: Rect, corner: Corner, shift: i32) -> Point {
    Point::new(
        if corner.is_right() { rect.right() - shift } else { rect.x + shift },
        if corner.is_bottom() { rect.bottom() - shift } else { rect.y + shift },
    )
}

/// Cursor position that drags `corner` of `rect` while resizing; the cursor
/// rides `shift` pixels outside the edge.
fn resize_cursor(rect: Rect, corner: Corner, shift: i32) -> Point {
    Point::new(
        if corner.is_right() { rect.right() + shift } else { rect.x - shift },
        if corner.is_bottom() { rect.bottom() + shift } else { rect.y - shift },
    )
}

pub struct Placement {
    phase: Phase,
    /// Fixed corner while resizing.
    anchor: Point,
    /// Last position the cursor was seen at or sent to.
    cursor: Point,
    /// Workspace the overlay is shown on.
    workspace: Option<WorkspaceKey>,
    default_size: Size,
    index: SnapIndex,
}

impl Default for Placement {
    fn default() -> Self { Self::new() }
}

impl Placement {
    pub fn new() -> Self {
        Self {
            phase: Phase::Released,
            anchor: Point::default(),
            cursor: Point::default(),
            workspace: None,
            default_size: Size::new(640, 360),
            index: SnapIndex::default(),
        }
    }

    pub fn phase(&self) -> Phase { self.phase }

    pub fn cursor(&self) -> Point { self.cursor }

    pub fn workspace(&self) -> Option<WorkspaceKey> { self.workspace }

    pub fn default_size(&self) -> Size { self.default_size }

    fn set_phase(&mut self, env: &mut Env, phase: Phase) {
        debug!(from = ?self.phase, to = ?phase, "phase");
        self.phase = phase;
        env.presenter.set_corner_marker(phase.corner());
        env.presenter.set_cursor_shape(phase.corner());
    }

    fn warp(&mut self, env: &mut Env, to: Point) {
        self.cursor = to;
        env.pointer.move_cursor(to);
    }

    fn targets_workspace(&self, model: &WindowModel) -> WorkspaceKey {
        self.workspace.unwrap_or_else(|| model.current_workspace())
    }

    #[instrument(level = "debug", skip_all, fields(wid = %wid))]
    pub fn on_new_model(&mut self, env: &mut Env, windows: &WindowsCollection, wid: Wid) {
        let Some(model) = windows.get(wid) else {
            warn!("asked to place a window that is not queued");
            return;
        };
        let settings = env.settings;
        let workspaces = env.provider.workspaces();
        let keys: Vec<WorkspaceKey> = workspaces.iter().map(|w| w.key).collect();
        self.index = SnapIndex::build(
            &keys,
            &env.provider.monitors(),
            windows,
            Some(wid),
            settings.snap_pixels,
            settings.snap_include_self,
        );
        self.default_size =
            env.provider.smallest_monitor().unwrap_or_else(|| env.presenter.screen_size()).quarter_16_9();

        let ws = model.current_workspace();
        if self.workspace != Some(ws) {
            if let Err(e) = env.provider.move_to_workspace(env.presenter.own_window_id(), ws) {
                warn!("could not move overlay to workspace {ws}: {e}");
            }
            self.workspace = Some(ws);
        }
        let info = workspaces
            .into_iter()
            .find(|w| w.key == ws)
            .unwrap_or_else(|| WorkspaceInfo::new(ws, ws.to_string()));

        let origin = model.rect().origin();
        let overlay = Rect::from_parts(origin, self.default_size).unwrap_or(model.rect());
        env.presenter.set_geometry(overlay);
        env.presenter.show_model(model, &info);
        Self::set_backdrop(env, model, overlay.size());
        env.presenter.show();
        if let Err(e) = env.provider.activate(env.presenter.own_window_id()) {
            debug!("could not activate overlay: {e}");
        }

        self.set_phase(env, Phase::Locate(Corner::TopLeft));
        let shift = env.shift();
        self.warp(env, origin.offset(shift, shift));
    }

    fn set_backdrop(env: &mut Env, model: &WindowModel, overlay: Size) {
        let shift = env.shift();
        let (bitmap, offset) = match env.capture.grab(model) {
            Ok(capture) => (capture.bitmap.blurred(env.settings.screenshot_blur_pixels), capture.offset),
            Err(e) => {
                warn!("using blank backdrop: {e}");
                (Bitmap::blank(overlay), Point::default())
            }
        };
        env.presenter.set_backdrop(&bitmap, offset.offset(shift, shift));
    }

    #[instrument(level = "trace", skip(self, env))]
    pub fn on_mouse_move(&mut self, env: &mut Env, at: Point) {
        self.cursor = at;
        match self.phase {
            Phase::Locate(corner) => {
                let size = env.presenter.geometry().size();
                let proposed = locate_rect(at, corner, size, env.shift());
                if !self.snap_locate(env, proposed, corner) {
                    env.presenter.set_geometry(proposed);
                }
            }
            Phase::Resize(corner) => self.track_resize(env, at, corner),
            Phase::Released => {}
        }
    }

    /// Snap offset for `rect` against the active workspace's targets, using
    /// the two bands that meet at `corner`.
    fn snap_offset(&self, env: &Env, rect: Rect, corner: Corner) -> Option<(i32, i32)> {
        let s = env.settings.snap_pixels;
        let ws = self.workspace?;
        if s <= 0 {
            return None;
        }
        let sources = sources_for_rect(rect, s, Some(corner));
        let hits = check_intersections(&sources, self.index.targets(ws));
        let offset = offset_for_intersections(&hits, s);
        (offset != (0, 0)).then_some(offset)
    }

    fn snap_locate(&mut self, env: &mut Env, proposed: Rect, corner: Corner) -> bool {
        let Some((dx, dy)) = self.snap_offset(env, proposed, corner) else {
            return false;
        };
        trace!(dx, dy, "snapped while locating");
        env.presenter.set_geometry(proposed.translate(dx, dy));
        let to = self.cursor.offset(dx, dy);
        self.warp(env, to);
        true
    }

    /// Size spanned between the anchor and the cursor, unclamped.
    fn dragged_size(&self, at: Point, corner: Corner, shift: i32) -> Size {
        let x = if corner.is_right() { at.x - shift } else { at.x + shift };
        let y = if corner.is_bottom() { at.y - shift } else { at.y + shift };
        Size::new(
            if corner.is_right() { x - self.anchor.x } else { self.anchor.x - x },
            if corner.is_bottom() { y - self.anchor.y } else { self.anchor.y - y },
        )
    }

    fn clamp_size(size: Size, min: Size) -> Size {
        Size::new(size.w.max(min.w), size.h.max(min.h))
    }

    fn track_resize(&mut self, env: &mut Env, at: Point, corner: Corner) {
        let shift = env.shift();
        let min = env.min_size();
        let raw = self.dragged_size(at, corner, shift);
        let clamped = Self::clamp_size(raw, min);
        if clamped != raw {
            let rect = rect_from_anchor(self.anchor, corner, clamped);
            trace!(?rect, "held at minimum size");
            env.presenter.set_geometry(rect);
            self.warp(env, resize_cursor(rect, corner, shift));
            return;
        }

        let rect = rect_from_anchor(self.anchor, corner, raw);
        let Some((dx, dy)) = self.snap_offset(env, rect, corner) else {
            env.presenter.set_geometry(rect);
            return;
        };
        let snapped = Size::new(
            if corner.is_right() { raw.w + dx } else { raw.w - dx },
            if corner.is_bottom() { raw.h + dy } else { raw.h - dy },
        );
        let rect = rect_from_anchor(self.anchor, corner, Self::clamp_size(snapped, min));
        trace!(dx, dy, ?rect, "snapped while resizing");
        env.presenter.set_geometry(rect);
        self.warp(env, resize_cursor(rect, corner, shift));
    }

    #[instrument(level = "debug", skip(self, env))]
    pub fn on_mouse_scroll(&mut self, env: &mut Env, up: bool) {
        let Phase::Locate(corner) = self.phase else {
            return;
        };
        let corner = if up { corner.next() } else { corner.prev() };
        self.set_phase(env, Phase::Locate(corner));
        let to = locate_cursor(env.presenter.geometry(), corner, env.shift());
        self.warp(env, to);
    }

    #[instrument(level = "debug", skip(self, env, model), fields(wid = %model.wid))]
    pub fn on_primary_click(&mut self, env: &mut Env, model: &mut WindowModel, at: Point) -> Outcome {
        self.cursor = at;
        let shift = env.shift();
        match self.phase {
            Phase::Locate(corner) => {
                let overlay = locate_rect(at, corner, env.presenter.geometry().size(), shift);
                let anchor = corner.of(overlay);
                let dragged = corner.opposite();
                let placed = rect_from_anchor(anchor, dragged, model.rect().size());
                let ws = self.targets_workspace(model);
                model.set_changed_rect(placed);
                model.set_changed_workspace(ws);

                if !model.resizable {
                    Self::apply(env, model, false);
                    return Outcome::Advance;
                }

                self.anchor = anchor;
                env.presenter.set_geometry(placed);
                self.set_phase(env, Phase::Resize(dragged));
                self.warp(env, resize_cursor(placed, dragged, shift));
                Outcome::Stay
            }
            Phase::Resize(corner) => {
                let size = Self::clamp_size(self.dragged_size(at, corner, shift), env.min_size());
                let rect = rect_from_anchor(self.anchor, corner, size);
                env.presenter.set_geometry(rect);
                let ws = self.targets_workspace(model);
                model.set_changed_rect(rect);
                model.set_changed_workspace(ws);
                Self::apply(env, model, true);
                Outcome::Advance
            }
            Phase::Released => Outcome::Stay,
        }
    }

    /// Pushes the model's committed changes to the provider. Failures leave
    /// the model dirty so a later run can retry.
    fn apply(env: &mut Env, model: &WindowModel, resize: bool) {
        if model.has_workspace_changes() {
            if let Some(ws) = model.changed_workspace() {
                if let Err(e) = env.provider.move_to_workspace(model.wid, ws) {
                    warn!(wid = %model.wid, "workspace change rejected: {e}");
                }
            }
        }
        if !model.has_geometry_changes() {
            debug!(wid = %model.wid, "geometry unchanged");
            return;
        }
        let result = if resize {
            env.provider.move_and_resize(model)
        } else {
            env.provider.move_window(model)
        };
        if let Err(e) = result {
            warn!(wid = %model.wid, "placement rejected: {e}");
        }
    }

    #[instrument(level = "debug", skip_all)]
    pub fn on_middle_click(&mut self, env: &mut Env) {
        self.set_phase(env, Phase::Released);
        env.pointer.stop();
    }

    pub fn on_secondary_click(&mut self, model: &mut WindowModel) -> Outcome {
        debug!(wid = %model.wid, "skipped");
        model.clear_changed();
        Outcome::Advance
    }

    #[instrument(level = "debug", skip(self, env, model), fields(wid = %model.wid))]
    pub fn on_workspace_activated(&mut self, env: &mut Env, model: &mut WindowModel, ws: WorkspaceKey) {
        if let Err(e) = env.provider.move_to_workspace(env.presenter.own_window_id(), ws) {
            warn!("could not move overlay to workspace {ws}: {e}");
        }
        model.set_changed_workspace(ws);
        self.workspace = Some(ws);
        if self.phase == Phase::Released {
            self.recapture(env);
        }
    }

    pub fn toggle_resizable(&mut self, env: &mut Env, model: &mut WindowModel) {
        model.resizable = !model.resizable;
        debug!(wid = %model.wid, resizable = model.resizable, "toggled resizable");
        self.recapture(env);
    }

    /// Takes the mouse back: locating from the top-left corner with the
    /// overlay reset to its default size where it stands.
    pub fn recapture(&mut self, env: &mut Env) {
        env.pointer.start();
        let origin = env.presenter.geometry().origin();
        if let Some(rect) = Rect::from_parts(origin, self.default_size) {
            env.presenter.set_geometry(rect);
        }
        self.set_phase(env, Phase::Locate(Corner::TopLeft));
        let shift = env.shift();
        self.warp(env, origin.offset(shift, shift));
    }
}
