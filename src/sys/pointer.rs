//! Global mouse hook backed by `rdev`.
//!
//! `rdev::listen` installs a process-wide hook that can never be removed, so
//! it runs once on its own thread and forwards into whichever listener is
//! currently subscribed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rdev::{Event, EventType};
use tracing::{error, trace};

use crate::actor::mouse::{MouseError, MouseEvent, PointerBackend};
use crate::model::Point;

static HOOK_STARTED: AtomicBool = AtomicBool::new(false);
static HOOK_ERROR: Lazy<Mutex<Option<String>>> = Lazy::new(|| Mutex::new(None));
static SUBSCRIBER: Lazy<Mutex<Option<Sender<MouseEvent>>>> = Lazy::new(|| Mutex::new(None));

fn translate(event: &Event) -> Option<MouseEvent> {
    match event.event_type {
        EventType::MouseMove { x, y } => {
            Some(MouseEvent::Move(Point::new(x.round() as i32, y.round() as i32)))
        }
        EventType::Wheel { delta_y, .. } if delta_y != 0 => {
            Some(MouseEvent::Scroll { up: delta_y > 0 })
        }
        _ => None,
    }
}

fn forward(event: Event) {
    let Some(ev) = translate(&event) else {
        return;
    };
    if let Some(tx) = SUBSCRIBER.lock().as_ref() {
        _ = tx.send(ev);
    }
}

fn ensure_hook() -> Result<(), MouseError> {
    if HOOK_STARTED.swap(true, Ordering::SeqCst) {
        return match HOOK_ERROR.lock().clone() {
            Some(e) => Err(MouseError::Listen(e)),
            None => Ok(()),
        };
    }
    thread::Builder::new()
        .name("rdev-hook".into())
        .spawn(|| {
            if let Err(e) = rdev::listen(forward) {
                let msg = format!("{e:?}");
                error!("global mouse hook failed: {msg}");
                *HOOK_ERROR.lock() = Some(msg);
            }
        })
        .map(|_| ())
        .map_err(|e| {
            HOOK_STARTED.store(false, Ordering::SeqCst);
            MouseError::Listen(e.to_string())
        })
}

/// Real cursor: reads the global hook, warps with synthesized motion.
#[derive(Debug, Default)]
pub struct RdevPointer;

impl PointerBackend for RdevPointer {
    fn listen(&self, tx: Sender<MouseEvent>, stop: Receiver<()>) -> Result<(), MouseError> {
        ensure_hook()?;
        *SUBSCRIBER.lock() = Some(tx);
        trace!("subscribed to global mouse hook");
        _ = stop.recv();
        SUBSCRIBER.lock().take();
        Ok(())
    }

    fn warp(&self, to: Point) -> Result<(), MouseError> {
        rdev::simulate(&EventType::MouseMove {
            x: f64::from(to.x),
            y: f64::from(to.y),
        })
        .map_err(|_| MouseError::Warp(to))
    }
}
