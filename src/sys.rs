//! Access to the host: windows, the real cursor, platform detection.

pub mod platform;
pub mod pointer;
pub mod provider;
