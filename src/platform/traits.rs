//! Platform abstraction seams.
//!
//! The engine drives these traits; each platform (and the test suite)
//! supplies implementations.

use crate::engine::{Disposition, RawScroll};

/// A periodic callback synchronized to display refresh where the platform
/// can provide one, or a high-resolution timer thread otherwise.
///
/// `start` is idempotent and lazily creates the underlying timer resource
/// once; `stop` is idempotent and disarms without destroying it.
pub trait FrameDriver: Send + Sync {
    fn start(&self);
    fn stop(&self);
    fn is_running(&self) -> bool;
}

/// Synchronous per-event notification with veto power: the interceptor calls
/// this for every matching OS event and either delivers or suppresses the
/// original based on the answer. Implementations must be non-blocking and
/// allocation-light — this call gates every scroll event in the session.
pub trait WheelEventHandler: Send + Sync {
    fn on_wheel(&self, raw: &RawScroll) -> Disposition;
}

/// Resolves the identifier of the frontmost application, for the exclusion
/// filter. Returning `None` means "unknown", which never excludes.
pub trait ForegroundResolver: Send + Sync {
    fn frontmost_app_id(&self) -> Option<String>;
}

/// A resolver for platforms without a foreground-application notion.
pub struct NoForegroundApp;

impl ForegroundResolver for NoForegroundApp {
    fn frontmost_app_id(&self) -> Option<String> {
        None
    }
}
