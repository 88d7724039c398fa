//! In-memory collaborators for driving the placement engine in tests.

use std::collections::VecDeque;

use super::mouse::{MouseEvent, Pointer};
use super::placement::Env;
use crate::common::config::Settings;
use crate::model::{Point, Rect, Size, Wid, WindowModel, WorkspaceInfo, WorkspaceKey};
use crate::snapping::Corner;
use crate::sys::provider::{ProviderError, WindowProvider};
use crate::ui::capture::{Bitmap, Capture, CaptureError, ScreenCapture};
use crate::ui::overlay::{ListEntry, Presenter, UiEvent};

pub fn rect(x: i32, y: i32, w: i32, h: i32) -> Rect { Rect::new(x, y, w, h).unwrap() }

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Move(Wid, Rect),
    MoveAndResize(Wid, Rect),
    MoveToWorkspace(Wid, WorkspaceKey),
    Activate(Wid),
}

pub struct FakeProvider {
    pub windows: Vec<WindowModel>,
    pub monitors: Vec<Rect>,
    pub workspaces: Vec<WorkspaceInfo>,
    pub calls: Vec<Call>,
    pub fail_enumerate: bool,
    pub fail_moves: bool,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self {
            windows: Vec::new(),
            monitors: vec![rect(0, 0, 1920, 1080)],
            workspaces: vec![
                WorkspaceInfo::new(WorkspaceKey::new(0), "main"),
                WorkspaceInfo::new(WorkspaceKey::new(1), "web"),
            ],
            calls: Vec::new(),
            fail_enumerate: false,
            fail_moves: false,
        }
    }
}

impl FakeProvider {
    fn record(&mut self, call: Call, wid: Wid) -> Result<(), ProviderError> {
        self.calls.push(call);
        if self.fail_moves {
            return Err(ProviderError::Rejected { wid, reason: "scripted failure".into() });
        }
        Ok(())
    }
}

impl WindowProvider for FakeProvider {
    fn enumerate(&mut self) -> Result<Vec<WindowModel>, ProviderError> {
        if self.fail_enumerate {
            return Err(ProviderError::Backend("scripted failure".into()));
        }
        Ok(self.windows.clone())
    }

    fn move_window(&mut self, model: &WindowModel) -> Result<(), ProviderError> {
        self.record(Call::Move(model.wid, model.current_rect()), model.wid)
    }

    fn move_and_resize(&mut self, model: &WindowModel) -> Result<(), ProviderError> {
        self.record(Call::MoveAndResize(model.wid, model.current_rect()), model.wid)
    }

    fn move_to_workspace(&mut self, wid: Wid, workspace: WorkspaceKey) -> Result<(), ProviderError> {
        self.record(Call::MoveToWorkspace(wid, workspace), wid)
    }

    fn activate(&mut self, wid: Wid) -> Result<(), ProviderError> {
        self.calls.push(Call::Activate(wid));
        Ok(())
    }

    fn monitors(&self) -> Vec<Rect> { self.monitors.clone() }

    fn workspaces(&self) -> Vec<WorkspaceInfo> { self.workspaces.clone() }
}

pub struct FakePresenter {
    pub wid: Wid,
    pub geometry: Rect,
    pub visible: bool,
    pub cursor_shape: Option<Corner>,
    pub marker: Option<Corner>,
    pub opacity: Option<f64>,
    pub backdrop: Option<(Bitmap, Point)>,
    pub shown: Vec<(Wid, WorkspaceKey)>,
    pub list: Vec<ListEntry>,
    pub shut_down: bool,
    pub events: VecDeque<UiEvent>,
}

impl Default for FakePresenter {
    fn default() -> Self {
        Self {
            wid: Wid(0xffff),
            geometry: rect(0, 0, 640, 360),
            visible: false,
            cursor_shape: None,
            marker: None,
            opacity: None,
            backdrop: None,
            shown: Vec::new(),
            list: Vec::new(),
            shut_down: false,
            events: VecDeque::new(),
        }
    }
}

impl Presenter for FakePresenter {
    fn set_geometry(&mut self, rect: Rect) { self.geometry = rect; }

    fn geometry(&self) -> Rect { self.geometry }

    fn show(&mut self) { self.visible = true; }

    fn hide(&mut self) { self.visible = false; }

    fn set_cursor_shape(&mut self, corner: Option<Corner>) { self.cursor_shape = corner; }

    fn set_corner_marker(&mut self, corner: Option<Corner>) { self.marker = corner; }

    fn screen_size(&self) -> Size { Size::new(1920, 1080) }

    fn own_window_id(&self) -> Wid { self.wid }

    fn set_opacity(&mut self, alpha: f64) { self.opacity = Some(alpha); }

    fn set_backdrop(&mut self, bitmap: &Bitmap, at: Point) { self.backdrop = Some((bitmap.clone(), at)); }

    fn show_model(&mut self, model: &WindowModel, active: &WorkspaceInfo) {
        self.shown.push((model.wid, active.key));
    }

    fn show_window_list(&mut self, entries: &[ListEntry]) { self.list = entries.to_vec(); }

    fn shutdown(&mut self) {
        self.visible = false;
        self.shut_down = true;
    }

    fn poll_event(&mut self) -> Option<UiEvent> { self.events.pop_front() }
}

/// Scripted mouse. With `echo_warps` every warp queues the motion event the
/// OS would report for it.
#[derive(Default)]
pub struct FakePointer {
    pub queue: VecDeque<MouseEvent>,
    pub warps: Vec<Point>,
    pub listening: bool,
    pub echo_warps: bool,
    pub stops: usize,
}

impl FakePointer {
    pub fn push(&mut self, ev: MouseEvent) { self.queue.push_back(ev); }
}

impl Pointer for FakePointer {
    fn start(&mut self) { self.listening = true; }

    fn stop(&mut self) {
        self.listening = false;
        self.stops += 1;
    }

    fn is_listening(&self) -> bool { self.listening }

    fn get_item(&mut self) -> Option<MouseEvent> { self.queue.pop_front() }

    fn move_cursor(&mut self, to: Point) {
        self.warps.push(to);
        if self.echo_warps {
            self.queue.push_back(MouseEvent::Move(to));
        }
    }
}

/// Fails unless `offset` is set, then returns a small opaque bitmap.
#[derive(Default)]
pub struct FakeCapture {
    pub offset: Option<Point>,
}

impl ScreenCapture for FakeCapture {
    fn grab(&mut self, model: &WindowModel) -> Result<Capture, CaptureError> {
        let Some(offset) = self.offset else {
            return Err(CaptureError::Failed(model.wid, "scripted failure".into()));
        };
        Ok(Capture {
            bitmap: Bitmap::from_rgba(4, 4, vec![255; 64]).unwrap(),
            offset,
        })
    }
}

#[derive(Default)]
pub struct Rig {
    pub provider: FakeProvider,
    pub presenter: FakePresenter,
    pub pointer: FakePointer,
    pub capture: FakeCapture,
    pub settings: Settings,
}

impl Rig {
    pub fn new() -> Self { Self::default() }

    pub fn env(&mut self) -> Env<'_> {
        Env {
            provider: &mut self.provider,
            presenter: &mut self.presenter,
            pointer: &mut self.pointer,
            capture: &mut self.capture,
            settings: &self.settings,
        }
    }
}
