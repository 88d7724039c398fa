//! Stateful pieces of a placement run: the mouse feed, the per-window state
//! machine and the session that ties them to the window queue.

pub mod mouse;
pub mod placement;
pub mod session;

#[cfg(test)]
mod testing;
