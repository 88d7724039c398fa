//! Background mouse listener feeding the UI thread through a FIFO queue.
//!
//! The listener thread only enqueues. Everything that touches engine or UI
//! state happens on the thread that drains the queue with [`Pointer::get_item`].

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use thiserror::Error;
use tracing::{debug, error, trace, warn};

use crate::model::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEvent {
    /// Absolute cursor position.
    Move(Point),
    /// Wheel notch; `up` is true for a positive vertical delta.
    Scroll { up: bool },
}

#[derive(Debug, Error)]
pub enum MouseError {
    #[error("mouse listener failed: {0}")]
    Listen(String),
    #[error("could not move the cursor to {0:?}")]
    Warp(Point),
}

/// OS hook behind a [`MouseChannel`].
pub trait PointerBackend: Send + Sync + 'static {
    /// Forwards events into `tx` until `stop` receives or disconnects.
    fn listen(&self, tx: Sender<MouseEvent>, stop: Receiver<()>) -> Result<(), MouseError>;

    fn warp(&self, to: Point) -> Result<(), MouseError>;
}

/// Mouse access as seen by the session and state machine.
pub trait Pointer {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_listening(&self) -> bool;
    /// Next queued event, `None` when the queue is empty. Never blocks.
    fn get_item(&mut self) -> Option<MouseEvent>;
    fn move_cursor(&mut self, to: Point);
}

pub struct MouseChannel<B: PointerBackend> {
    backend: Arc<B>,
    tx: Sender<MouseEvent>,
    rx: Receiver<MouseEvent>,
    listener: Option<(Sender<()>, JoinHandle<()>)>,
}

impl<B: PointerBackend> MouseChannel<B> {
    pub fn new(backend: B) -> Self {
        let (tx, rx) = unbounded();
        Self {
            backend: Arc::new(backend),
            tx,
            rx,
            listener: None,
        }
    }

    pub fn backend(&self) -> &B { &self.backend }
}

impl<B: PointerBackend> Pointer for MouseChannel<B> {
    fn start(&mut self) {
        if self.listener.is_some() {
            return;
        }
        // Events from a previous capture no longer describe the cursor.
        let stale = self.rx.try_iter().count();
        if stale > 0 {
            trace!(stale, "dropped queued mouse events");
        }

        let (stop_tx, stop_rx) = bounded(1);
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        let spawned = thread::Builder::new().name("mouse-listener".into()).spawn(move || {
            if let Err(e) = backend.listen(tx, stop_rx) {
                error!("{e}");
            }
        });
        match spawned {
            Ok(handle) => {
                debug!("mouse listener started");
                self.listener = Some((stop_tx, handle));
            }
            Err(e) => error!("could not spawn mouse listener: {e}"),
        }
    }

    fn stop(&mut self) {
        let Some((stop_tx, handle)) = self.listener.take() else {
            return;
        };
        _ = stop_tx.send(());
        drop(stop_tx);
        if handle.join().is_err() {
            warn!("mouse listener panicked");
        }
        debug!("mouse listener stopped");
    }

    fn is_listening(&self) -> bool { self.listener.is_some() }

    fn get_item(&mut self) -> Option<MouseEvent> { self.rx.try_recv().ok() }

    fn move_cursor(&mut self, to: Point) {
        if let Err(e) = self.backend.warp(to) {
            warn!("{e}");
        }
    }
}

impl<B: PointerBackend> Drop for MouseChannel<B> {
    fn drop(&mut self) { self.stop(); }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    #[derive(Default)]
    struct Scripted {
        script: Vec<MouseEvent>,
        warps: Mutex<Vec<Point>>,
        fail: bool,
    }

    impl PointerBackend for Scripted {
        fn listen(&self, tx: Sender<MouseEvent>, stop: Receiver<()>) -> Result<(), MouseError> {
            if self.fail {
                return Err(MouseError::Listen("no hook".into()));
            }
            for ev in &self.script {
                _ = tx.send(*ev);
            }
            _ = stop.recv();
            Ok(())
        }

        fn warp(&self, to: Point) -> Result<(), MouseError> {
            self.warps.lock().push(to);
            Ok(())
        }
    }

    fn drain(channel: &mut MouseChannel<Scripted>, want: usize) -> Vec<MouseEvent> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut got = Vec::new();
        while got.len() < want && Instant::now() < deadline {
            match channel.get_item() {
                Some(ev) => got.push(ev),
                None => thread::sleep(Duration::from_millis(1)),
            }
        }
        got
    }

    #[test]
    fn delivers_events_in_order_and_stops() {
        let script = vec![
            MouseEvent::Move(Point::new(1, 2)),
            MouseEvent::Scroll { up: true },
            MouseEvent::Move(Point::new(3, 4)),
            MouseEvent::Scroll { up: false },
        ];
        let mut channel = MouseChannel::new(Scripted {
            script: script.clone(),
            ..Default::default()
        });
        assert_eq!(channel.get_item(), None);

        channel.start();
        assert!(channel.is_listening());
        assert_eq!(drain(&mut channel, 4), script);
        assert_eq!(channel.get_item(), None);

        channel.stop();
        assert!(!channel.is_listening());
        channel.stop();
    }

    #[test]
    fn restart_drops_stale_events() {
        let mut channel = MouseChannel::new(Scripted {
            script: vec![MouseEvent::Move(Point::new(9, 9))],
            ..Default::default()
        });
        channel.start();
        channel.stop();
        // The scripted move is queued but never drained.
        channel.start();
        let got = drain(&mut channel, 1);
        assert_eq!(got, vec![MouseEvent::Move(Point::new(9, 9))]);
        assert_eq!(channel.get_item(), None);
    }

    #[test]
    fn move_cursor_goes_to_backend() {
        let mut channel = MouseChannel::new(Scripted::default());
        channel.move_cursor(Point::new(10, 20));
        assert_eq!(*channel.backend().warps.lock(), vec![Point::new(10, 20)]);
    }

    #[test]
    fn failed_listener_is_logged_not_fatal() {
        let mut channel = MouseChannel::new(Scripted {
            fail: true,
            ..Default::default()
        });
        channel.start();
        channel.stop();
        assert_eq!(channel.get_item(), None);
    }
}
