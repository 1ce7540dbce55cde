//! CVDisplayLink-backed frame driver.
//!
//! The animation advances on the display's own refresh callback rather than
//! a software timer, so emitted frames land once per vsync and visible
//! stutter stays minimal. Creation can fail (headless sessions, virtual
//! displays); callers fall back to the thread timer.

use crate::error::{GlideError, GlideResult};
use crate::platform::traits::FrameDriver;
use std::ffi::c_void;
use std::ptr;
use std::sync::Arc;

type CVDisplayLinkRef = *mut c_void;
type CVReturn = i32;

const KCV_RETURN_SUCCESS: CVReturn = 0;

type CVDisplayLinkOutputCallback = extern "C" fn(
    display_link: CVDisplayLinkRef,
    in_now: *const c_void,
    in_output_time: *const c_void,
    flags_in: u64,
    flags_out: *mut u64,
    user_info: *mut c_void,
) -> CVReturn;

#[link(name = "CoreVideo", kind = "framework")]
extern "C" {
    fn CVDisplayLinkCreateWithActiveCGDisplays(display_link_out: *mut CVDisplayLinkRef) -> CVReturn;
    fn CVDisplayLinkSetOutputCallback(
        display_link: CVDisplayLinkRef,
        callback: CVDisplayLinkOutputCallback,
        user_info: *mut c_void,
    ) -> CVReturn;
    fn CVDisplayLinkStart(display_link: CVDisplayLinkRef) -> CVReturn;
    fn CVDisplayLinkStop(display_link: CVDisplayLinkRef) -> CVReturn;
    fn CVDisplayLinkIsRunning(display_link: CVDisplayLinkRef) -> u8;
    fn CVDisplayLinkRelease(display_link: CVDisplayLinkRef);
}

/// Context handed to the display-link callback through `user_info`. Freed in
/// `Drop` after the link has been stopped and released.
struct FrameContext {
    callback: Arc<dyn Fn() + Send + Sync>,
}

pub struct DisplayLinkDriver {
    link: CVDisplayLinkRef,
    context: *mut FrameContext,
}

// The display link is an internally synchronized CF object, and the context
// pointer is only dereferenced by the callback while the link is alive.
unsafe impl Send for DisplayLinkDriver {}
unsafe impl Sync for DisplayLinkDriver {}

impl DisplayLinkDriver {
    /// Create the link bound to the active displays, disarmed.
    pub fn new(callback: Arc<dyn Fn() + Send + Sync>) -> GlideResult<Self> {
        let mut link: CVDisplayLinkRef = ptr::null_mut();
        let rv = unsafe { CVDisplayLinkCreateWithActiveCGDisplays(&mut link) };
        if rv != KCV_RETURN_SUCCESS || link.is_null() {
            return Err(GlideError::Platform(format!(
                "CVDisplayLinkCreateWithActiveCGDisplays failed ({rv})"
            )));
        }

        let context = Box::into_raw(Box::new(FrameContext { callback }));
        let rv =
            unsafe { CVDisplayLinkSetOutputCallback(link, display_link_callback, context as *mut c_void) };
        if rv != KCV_RETURN_SUCCESS {
            unsafe {
                CVDisplayLinkRelease(link);
                drop(Box::from_raw(context));
            }
            return Err(GlideError::Platform(format!(
                "CVDisplayLinkSetOutputCallback failed ({rv})"
            )));
        }

        Ok(Self { link, context })
    }
}

impl FrameDriver for DisplayLinkDriver {
    fn start(&self) {
        unsafe {
            if CVDisplayLinkIsRunning(self.link) == 0 {
                CVDisplayLinkStart(self.link);
            }
        }
    }

    fn stop(&self) {
        unsafe {
            if CVDisplayLinkIsRunning(self.link) != 0 {
                CVDisplayLinkStop(self.link);
            }
        }
    }

    fn is_running(&self) -> bool {
        unsafe { CVDisplayLinkIsRunning(self.link) != 0 }
    }
}

impl Drop for DisplayLinkDriver {
    fn drop(&mut self) {
        unsafe {
            // CVDisplayLinkStop waits for an in-flight callback, so freeing
            // the context afterwards is safe.
            if CVDisplayLinkIsRunning(self.link) != 0 {
                CVDisplayLinkStop(self.link);
            }
            CVDisplayLinkRelease(self.link);
            drop(Box::from_raw(self.context));
        }
    }
}

extern "C" fn display_link_callback(
    _display_link: CVDisplayLinkRef,
    _in_now: *const c_void,
    _in_output_time: *const c_void,
    _flags_in: u64,
    _flags_out: *mut u64,
    user_info: *mut c_void,
) -> CVReturn {
    if !user_info.is_null() {
        let context = unsafe { &*(user_info as *const FrameContext) };
        (context.callback)();
    }
    KCV_RETURN_SUCCESS
}
