//! What the placement engine needs from whatever draws the overlay.
//!
//! The engine never talks to a UI toolkit directly. A presenter owns the
//! floating placeholder window, its chrome (labels, workspace tiles, window
//! list) and forwards clicks and key presses back to the session.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Point, Rect, Size, Wid, WindowModel, WorkspaceInfo};
use crate::snapping::Corner;
use crate::ui::capture::Bitmap;

/// Row of the window list shown next to the overlay (`F1`..`F16`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub ordinal: usize,
    pub wid: Wid,
    pub title: String,
}

/// Click or key press the toolkit delivered to the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    /// Left button, in screen coordinates.
    Primary(Point),
    Middle,
    Secondary,
    Key(Key),
}

pub trait Presenter {
    fn set_geometry(&mut self, rect: Rect);
    fn geometry(&self) -> Rect;
    fn show(&mut self);
    fn hide(&mut self);
    /// `None` restores the regular arrow cursor.
    fn set_cursor_shape(&mut self, corner: Option<Corner>);
    /// `None` hides the corner marker.
    fn set_corner_marker(&mut self, corner: Option<Corner>);
    fn screen_size(&self) -> Size;
    /// Window id of the overlay's top-level window, as the provider knows it.
    fn own_window_id(&self) -> Wid;
    fn set_opacity(&mut self, alpha: f64);
    fn set_backdrop(&mut self, bitmap: &Bitmap, at: Point);
    fn show_model(&mut self, model: &WindowModel, active: &WorkspaceInfo);
    fn show_window_list(&mut self, entries: &[ListEntry]);
    fn shutdown(&mut self);
    /// Next queued click or key press, `None` when there is none. Never
    /// blocks.
    fn poll_event(&mut self) -> Option<UiEvent>;
}

impl<T: Presenter + ?Sized> Presenter for Box<T> {
    fn set_geometry(&mut self, rect: Rect) { (**self).set_geometry(rect) }

    fn geometry(&self) -> Rect { (**self).geometry() }

    fn show(&mut self) { (**self).show() }

    fn hide(&mut self) { (**self).hide() }

    fn set_cursor_shape(&mut self, corner: Option<Corner>) { (**self).set_cursor_shape(corner) }

    fn set_corner_marker(&mut self, corner: Option<Corner>) { (**self).set_corner_marker(corner) }

    fn screen_size(&self) -> Size { (**self).screen_size() }

    fn own_window_id(&self) -> Wid { (**self).own_window_id() }

    fn set_opacity(&mut self, alpha: f64) { (**self).set_opacity(alpha) }

    fn set_backdrop(&mut self, bitmap: &Bitmap, at: Point) { (**self).set_backdrop(bitmap, at) }

    fn show_model(&mut self, model: &WindowModel, active: &WorkspaceInfo) {
        (**self).show_model(model, active)
    }

    fn show_window_list(&mut self, entries: &[ListEntry]) { (**self).show_window_list(entries) }

    fn shutdown(&mut self) { (**self).shutdown() }

    fn poll_event(&mut self) -> Option<UiEvent> { (**self).poll_event() }
}

/// Keys the session reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Space,
    Tab,
    R,
    Alt,
    Shift,
    Ctrl,
    /// Workspace ordinal, `1..=9`.
    Digit(u8),
    /// Window list ordinal, `1..=16`.
    Function(u8),
}

static DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:KP_|KP)?([1-9])$").unwrap());
static FUNCTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^F([1-9]|1[0-6])$").unwrap());

impl Key {
    /// Maps toolkit key names (X11 keysym style) to engine keys.
    pub fn from_name(name: &str) -> Option<Key> {
        let key = match name {
            "Escape" | "Esc" => Key::Escape,
            "Return" | "Enter" | "KP_Enter" => Key::Enter,
            "space" | "Space" => Key::Space,
            "Tab" | "ISO_Left_Tab" => Key::Tab,
            "r" | "R" => Key::R,
            "Alt" | "Alt_L" | "Alt_R" | "Meta_L" | "Meta_R" => Key::Alt,
            "Shift" | "Shift_L" | "Shift_R" => Key::Shift,
            "Control" | "Ctrl" | "Control_L" | "Control_R" => Key::Ctrl,
            _ => {
                if let Some(c) = DIGIT.captures(name) {
                    Key::Digit(c[1].parse().ok()?)
                } else if let Some(c) = FUNCTION.captures(name) {
                    Key::Function(c[1].parse().ok()?)
                } else {
                    return None;
                }
            }
        };
        Some(key)
    }
}
