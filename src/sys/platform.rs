//! Host platform detection for the binary.

use thiserror::Error;

use super::provider::WindowProvider;
use crate::ui::capture::ScreenCapture;
use crate::ui::overlay::Presenter;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error(
        "platform not supported: no window provider is available for {os}. \
         Window placement needs a provider for the host windowing system."
    )]
    Unsupported { os: &'static str },
}

/// Host services a session needs besides the mouse.
pub struct Host {
    pub provider: Box<dyn WindowProvider>,
    pub presenter: Box<dyn Presenter>,
    pub capture: Box<dyn ScreenCapture>,
}

/// Returns the backends for the running host.
///
/// Backends live outside this crate and are linked in by embedders; a plain
/// build knows none, so every host reports itself unsupported.
pub fn host() -> Result<Host, PlatformError> {
    Err(PlatformError::Unsupported { os: std::env::consts::OS })
}
