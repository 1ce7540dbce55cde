//! Platform-specific interception, injection, and timing.
//!
//! macOS is the fully wired platform; everywhere else interception reports
//! a platform error (the engine and its tests remain platform-independent).

pub mod timer;
pub mod traits;

#[cfg(target_os = "macos")]
pub mod macos;

pub use traits::{ForegroundResolver, FrameDriver, NoForegroundApp, WheelEventHandler};

use crate::engine::ScrollEmitter;
use std::sync::Arc;

#[cfg(target_os = "macos")]
pub use macos::tap::ScrollTap as Interceptor;

#[cfg(target_os = "macos")]
pub fn ensure_authorized() -> bool {
    macos::ensure_authorized()
}

#[cfg(target_os = "macos")]
pub fn frame_driver(callback: Arc<dyn Fn() + Send + Sync>) -> Arc<dyn FrameDriver> {
    macos::frame_driver(callback)
}

#[cfg(target_os = "macos")]
pub fn scroll_emitter() -> Box<dyn ScrollEmitter> {
    Box::new(macos::CgScrollEmitter)
}

#[cfg(target_os = "macos")]
pub fn foreground_resolver() -> Box<dyn ForegroundResolver> {
    Box::new(macos::WorkspaceResolver)
}

#[cfg(not(target_os = "macos"))]
mod unsupported {
    use super::*;
    use crate::engine::SyntheticScroll;
    use crate::error::{GlideError, GlideResult};

    /// Interception stub for platforms without a wired backend.
    pub struct Interceptor;

    impl Interceptor {
        pub fn start(_handler: Arc<dyn WheelEventHandler>) -> GlideResult<Self> {
            Err(GlideError::Platform(
                "scroll interception not implemented on this platform".to_string(),
            ))
        }

        pub fn stop(&mut self) {}

        pub fn is_running(&self) -> bool {
            false
        }
    }

    /// Logs frames instead of posting them.
    pub struct NullEmitter;

    impl ScrollEmitter for NullEmitter {
        fn emit(&self, scroll: &SyntheticScroll) {
            tracing::trace!(dy = scroll.point_y, dx = scroll.point_x, "dropping frame (no backend)");
        }
    }
}

#[cfg(not(target_os = "macos"))]
pub use unsupported::Interceptor;

/// No permission gate exists off macOS; the platform stub fails later with a
/// clearer error.
#[cfg(not(target_os = "macos"))]
pub fn ensure_authorized() -> bool {
    true
}

#[cfg(not(target_os = "macos"))]
pub fn frame_driver(callback: Arc<dyn Fn() + Send + Sync>) -> Arc<dyn FrameDriver> {
    Arc::new(timer::ThreadFrameDriver::new(callback))
}

#[cfg(not(target_os = "macos"))]
pub fn scroll_emitter() -> Box<dyn ScrollEmitter> {
    Box::new(unsupported::NullEmitter)
}

#[cfg(not(target_os = "macos"))]
pub fn foreground_resolver() -> Box<dyn ForegroundResolver> {
    Box::new(NoForegroundApp)
}
