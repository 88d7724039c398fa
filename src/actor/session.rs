//! Drives one placement run: walks the window queue, routes user input to the
//! state machine and writes the resulting plan.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, instrument, warn};

use super::mouse::{MouseEvent, Pointer};
use super::placement::{Env, Outcome, Phase, Placement};
use crate::common::config::Settings;
use crate::model::{CollectionError, Point, WindowModel, WindowsCollection, WorkspaceKey};
use crate::sys::provider::{ProviderError, WindowProvider};
use crate::ui::capture::ScreenCapture;
use crate::ui::overlay::{Key, ListEntry, Presenter, UiEvent};

/// Function keys available for the window list.
const LIST_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Collection(#[from] CollectionError),
    #[error("could not write plan: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode plan: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    /// Every window was visited and the plan saved.
    Finished,
    /// Aborted by the user; nothing saved.
    Quit,
}

pub struct Session<P, V, M, C> {
    provider: P,
    presenter: V,
    pointer: M,
    capture: C,
    settings: Settings,
    windows: WindowsCollection,
    position: usize,
    placement: Placement,
    plan_file: PathBuf,
    state: SessionState,
}

impl<P, V, M, C> Session<P, V, M, C>
where
    P: WindowProvider,
    V: Presenter,
    M: Pointer,
    C: ScreenCapture,
{
    /// Enumerates windows and starts placing the first one.
    ///
    /// On error the pointer and presenter are shut down before returning.
    #[instrument(name = "session::open", skip_all, fields(plan = %plan_file.display()))]
    pub fn open(
        mut provider: P,
        mut presenter: V,
        mut pointer: M,
        capture: C,
        mut settings: Settings,
        plan_file: PathBuf,
    ) -> Result<Self, SessionError> {
        let fixes = settings.auto_fix_values();
        if fixes > 0 {
            warn!(fixes, "reset out of range settings to defaults");
        }
        let windows = match Self::collect(&mut provider) {
            Ok(windows) => windows,
            Err(e) => {
                error!("could not start placing: {e}");
                pointer.stop();
                presenter.shutdown();
                return Err(e);
            }
        };
        presenter.set_opacity(settings.root_alpha);

        let mut this = Self {
            provider,
            presenter,
            pointer,
            capture,
            settings,
            windows,
            position: 0,
            placement: Placement::new(),
            plan_file,
            state: SessionState::Running,
        };
        info!(windows = this.windows.len(), "session opened");
        if this.windows.is_empty() {
            this.shutdown(SessionState::Finished);
        } else {
            this.enter_model();
        }
        Ok(this)
    }

    fn collect(provider: &mut P) -> Result<WindowsCollection, SessionError> {
        let mut windows = WindowsCollection::from_models(provider.enumerate()?)?;
        let available: Vec<WorkspaceKey> = provider.workspaces().iter().map(|w| w.key).collect();
        windows.validate_workspaces(&available)?;
        windows.sort();
        Ok(windows)
    }

    pub fn state(&self) -> SessionState { self.state }

    pub fn is_running(&self) -> bool { self.state == SessionState::Running }

    pub fn windows(&self) -> &WindowsCollection { &self.windows }

    pub fn position(&self) -> usize { self.position }

    pub fn current(&self) -> Option<&WindowModel> {
        self.is_running().then(|| self.windows.at(self.position)).flatten()
    }

    pub fn phase(&self) -> Phase { self.placement.phase() }

    fn split(&mut self) -> (Env<'_>, &mut Placement, &mut WindowsCollection) {
        let env = Env {
            provider: &mut self.provider,
            presenter: &mut self.presenter,
            pointer: &mut self.pointer,
            capture: &mut self.capture,
            settings: &self.settings,
        };
        (env, &mut self.placement, &mut self.windows)
    }

    fn with_current<R>(
        &mut self,
        f: impl FnOnce(&mut Placement, &mut Env<'_>, &mut WindowModel) -> R,
    ) -> Option<R> {
        if !self.is_running() {
            return None;
        }
        let position = self.position;
        let (mut env, placement, windows) = self.split();
        let model = windows.at_mut(position)?;
        Some(f(placement, &mut env, model))
    }

    fn list_entries(&self) -> Vec<ListEntry> {
        self.windows
            .iter()
            .take(LIST_LEN)
            .enumerate()
            .map(|(i, m)| ListEntry {
                ordinal: i + 1,
                wid: m.wid,
                title: m.title.clone(),
            })
            .collect()
    }

    fn enter_model(&mut self) {
        let Some(wid) = self.windows.at(self.position).map(|m| m.wid) else {
            return;
        };
        if !self.pointer.is_listening() {
            self.pointer.start();
        }
        let entries = self.list_entries();
        self.presenter.show_window_list(&entries);
        let (mut env, placement, windows) = self.split();
        placement.on_new_model(&mut env, windows, wid);
    }

    fn advance(&mut self) {
        self.position += 1;
        if self.position >= self.windows.len() {
            self.finish();
        } else {
            debug!(position = self.position, "next window");
            self.enter_model();
        }
    }

    fn finish(&mut self) {
        info!("all windows visited");
        if let Err(e) = self.save_default() {
            warn!("{e}");
        }
        self.shutdown(SessionState::Finished);
    }

    fn shutdown(&mut self, state: SessionState) {
        self.pointer.stop();
        self.presenter.shutdown();
        self.state = state;
    }

    /// Ends the run without saving anything.
    pub fn quit(&mut self) {
        if !self.is_running() {
            return;
        }
        info!("placement aborted");
        self.shutdown(SessionState::Quit);
    }

    pub fn save_default(&self) -> Result<(), SessionError> { self.save_plan(&self.plan_file) }

    pub fn save_plan(&self, path: &Path) -> Result<(), SessionError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, self.windows.to_json()?)?;
        info!(path = %path.display(), "saved plan");
        Ok(())
    }

    /// Drains every queued mouse and UI event; returns how many were
    /// handled. Pending motion is applied before each click or key so the
    /// cursor position they act on is current.
    pub fn tick(&mut self) -> usize {
        let mut handled = 0;
        while self.is_running() {
            if let Some(ev) = self.pointer.get_item() {
                self.on_mouse_event(ev);
            } else if let Some(ev) = self.presenter.poll_event() {
                self.on_ui_event(ev);
            } else {
                break;
            }
            handled += 1;
        }
        handled
    }

    /// Polls the input queues until the session ends.
    pub async fn run(&mut self) {
        let mut timer = interval(self.settings.mouse_check_interval());
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        while self.is_running() {
            timer.tick().await;
            self.tick();
        }
    }

    pub fn on_mouse_event(&mut self, ev: MouseEvent) {
        if !self.is_running() {
            return;
        }
        let (mut env, placement, _) = self.split();
        match ev {
            MouseEvent::Move(at) => placement.on_mouse_move(&mut env, at),
            MouseEvent::Scroll { up } => placement.on_mouse_scroll(&mut env, up),
        }
    }

    pub fn on_ui_event(&mut self, ev: UiEvent) {
        match ev {
            UiEvent::Primary(at) => self.on_primary_click(at),
            UiEvent::Middle => self.on_middle_click(),
            UiEvent::Secondary => self.on_secondary_click(),
            UiEvent::Key(key) => self.on_key(key),
        }
    }

    pub fn on_primary_click(&mut self, at: Point) {
        if self.with_current(|p, env, m| p.on_primary_click(env, m, at)) == Some(Outcome::Advance) {
            self.advance();
        }
    }

    pub fn on_middle_click(&mut self) { self.with_current(|p, env, _| p.on_middle_click(env)); }

    pub fn on_secondary_click(&mut self) {
        if self.with_current(|p, _, m| p.on_secondary_click(m)) == Some(Outcome::Advance) {
            self.advance();
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn on_key(&mut self, key: Key) {
        match key {
            Key::Escape => self.quit(),
            Key::Enter => {
                let at = self.placement.cursor();
                self.on_primary_click(at);
            }
            Key::Space | Key::Tab => self.on_secondary_click(),
            Key::R => {
                self.with_current(|p, env, m| p.toggle_resizable(env, m));
            }
            Key::Alt | Key::Shift => self.on_middle_click(),
            Key::Ctrl => self.on_mouse_event(MouseEvent::Scroll { up: true }),
            Key::Digit(n) => self.on_workspace_activated(usize::from(n)),
            Key::Function(n) => self.on_listed_window_activated(usize::from(n)),
        }
    }

    /// Switches the target workspace to the `ordinal`-th available one
    /// (one-based).
    pub fn on_workspace_activated(&mut self, ordinal: usize) {
        let workspaces = self.provider.workspaces();
        let Some(info) = ordinal.checked_sub(1).and_then(|i| workspaces.get(i)) else {
            debug!(ordinal, "no such workspace");
            return;
        };
        let ws = info.key;
        self.with_current(|p, env, m| p.on_workspace_activated(env, m, ws));
    }

    /// Goes back to the `ordinal`-th window of the list (one-based). Windows
    /// before the current one are dropped from the queue.
    pub fn on_listed_window_activated(&mut self, ordinal: usize) {
        let Some(current) = self.current().map(|m| m.wid) else {
            return;
        };
        let Some(target) = ordinal.checked_sub(1).and_then(|i| self.windows.at(i)).map(|m| m.wid)
        else {
            debug!(ordinal, "no such listed window");
            return;
        };
        if target == current {
            return;
        }
        if let Err(e) = self.windows.repopulate_for_wid(target, current) {
            warn!("{e}");
            return;
        }
        self.position = 0;
        self.enter_model();
    }
}
