//! Quartz event tap for scroll-wheel interception.
//!
//! Owns the single system-wide CGEventTap registration. The tap lives on a
//! dedicated CFRunLoop thread; its callback reads the wheel deltas out of the
//! event, asks the handler for a verdict, and either delivers the original
//! event or suppresses it so the engine can re-emit smoothed frames.
//!
//! # Permissions
//!
//! Requires Accessibility access under System Settings > Privacy & Security.

use crate::engine::Disposition;
use crate::error::{GlideError, GlideResult};
use crate::platform::traits::WheelEventHandler;
use core_foundation::base::{CFRelease, CFTypeRef};
use core_foundation::runloop::kCFRunLoopCommonModes;
use std::ffi::c_void;
use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicPtr, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

type CGEventRef = CFTypeRef;
type CGEventTapProxy = *const c_void;
type CGEventMask = u64;

// CGEventTap location
#[repr(u32)]
#[derive(Copy, Clone)]
#[allow(dead_code, clippy::enum_variant_names)]
enum CGEventTapLocation {
    HIDEventTap = 0,
    SessionEventTap = 1,
    AnnotatedSessionEventTap = 2,
}

// CGEventTap placement
#[repr(u32)]
#[derive(Copy, Clone)]
#[allow(dead_code, clippy::enum_variant_names)]
enum CGEventTapPlacement {
    HeadInsertEventTap = 0,
    TailAppendEventTap = 1,
}

// CGEventTap options; DefaultTap may modify or suppress events.
#[repr(u32)]
#[derive(Copy, Clone)]
#[allow(dead_code)]
enum CGEventTapOptions {
    DefaultTap = 0,
    ListenOnly = 1,
}

// CGEventType values
const CG_EVENT_SCROLL_WHEEL: u32 = 22;
const CG_EVENT_TAP_DISABLED_BY_TIMEOUT: u32 = 0xFFFF_FFFE;
const CG_EVENT_TAP_DISABLED_BY_USER_INPUT: u32 = 0xFFFF_FFFF;

// CGEventField values for scroll-wheel events; the injector writes the same
// fields it reads.
const CG_SCROLL_WHEEL_EVENT_DELTA_AXIS_1: u32 = 11;
const CG_SCROLL_WHEEL_EVENT_DELTA_AXIS_2: u32 = 12;
pub(super) const CG_SCROLL_WHEEL_EVENT_FIXED_PT_DELTA_AXIS_1: u32 = 93;
pub(super) const CG_SCROLL_WHEEL_EVENT_FIXED_PT_DELTA_AXIS_2: u32 = 94;
pub(super) const CG_SCROLL_WHEEL_EVENT_POINT_DELTA_AXIS_1: u32 = 96;
pub(super) const CG_SCROLL_WHEEL_EVENT_POINT_DELTA_AXIS_2: u32 = 97;
const CG_SCROLL_WHEEL_EVENT_SCROLL_PHASE: u32 = 99;
const CG_SCROLL_WHEEL_EVENT_MOMENTUM_PHASE: u32 = 123;
pub(super) const CG_EVENT_SOURCE_USER_DATA: u32 = 42;

// FFI declarations for Core Graphics
#[link(name = "CoreGraphics", kind = "framework")]
extern "C" {
    fn CGEventTapCreate(
        tap: CGEventTapLocation,
        place: CGEventTapPlacement,
        options: CGEventTapOptions,
        events_of_interest: CGEventMask,
        callback: extern "C" fn(CGEventTapProxy, u32, CGEventRef, *mut c_void) -> CGEventRef,
        user_info: *mut c_void,
    ) -> CFTypeRef;

    fn CGEventTapEnable(tap: CFTypeRef, enable: bool);

    fn CGEventGetIntegerValueField(event: CGEventRef, field: u32) -> i64;
    fn CGEventGetDoubleValueField(event: CGEventRef, field: u32) -> f64;
    fn CGEventGetFlags(event: CGEventRef) -> u64;
}

// FFI declarations for Core Foundation
#[link(name = "CoreFoundation", kind = "framework")]
extern "C" {
    fn CFMachPortCreateRunLoopSource(
        allocator: CFTypeRef,
        port: CFTypeRef,
        order: i64,
    ) -> CFTypeRef;

    fn CFRunLoopGetCurrent() -> CFTypeRef;
    fn CFRunLoopAddSource(rl: CFTypeRef, source: CFTypeRef, mode: CFTypeRef);
    fn CFRunLoopRun();
    fn CFRunLoopStop(rl: CFTypeRef);
}

/// Context handed to the tap callback through `user_info`.
///
/// The tap port is filled in after creation so the callback can re-enable a
/// tap the OS turned off. Owned by the tap thread; freed after the run loop
/// exits and the tap is released, when no further callback can fire.
struct TapContext {
    handler: Arc<dyn WheelEventHandler>,
    tap_port: AtomicPtr<c_void>,
}

/// The scroll-wheel event tap, armed for as long as the value lives.
///
/// `stop()` (and `Drop`) disables the tap, stops its run loop, and joins the
/// thread, so after either returns no callback can fire.
pub struct ScrollTap {
    thread: Option<JoinHandle<()>>,
    run_loop: Arc<AtomicPtr<c_void>>,
    running: Arc<AtomicBool>,
}

impl ScrollTap {
    /// Create and arm the tap. Returns only after the tap thread has either
    /// enabled the tap or failed to set it up.
    pub fn start(handler: Arc<dyn WheelEventHandler>) -> GlideResult<Self> {
        let run_loop = Arc::new(AtomicPtr::new(ptr::null_mut()));
        let running = Arc::new(AtomicBool::new(true));

        let context = Box::into_raw(Box::new(TapContext {
            handler,
            tap_port: AtomicPtr::new(ptr::null_mut()),
        }));
        // Raw pointers aren't Send; carry the address across the spawn.
        let context_addr = context as usize;

        let (ready_tx, ready_rx) = mpsc::channel::<GlideResult<()>>();
        let thread_run_loop = Arc::clone(&run_loop);

        let thread = thread::Builder::new()
            .name("scroll-tap".into())
            .spawn(move || {
                run_tap_loop(context_addr as *mut TapContext, thread_run_loop, ready_tx);
            })
            .map_err(|e| {
                // The thread never ran; reclaim the context here.
                unsafe { drop(Box::from_raw(context)) };
                GlideError::TapRegistrationFailed(format!("failed to spawn tap thread: {e}"))
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                info!("scroll event tap armed");
                Ok(Self { thread: Some(thread), run_loop, running })
            }
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => {
                let _ = thread.join();
                Err(GlideError::TapRegistrationFailed(
                    "tap thread terminated during setup".into(),
                ))
            }
        }
    }

    /// Disarm the tap and wait until no further callback can fire.
    /// Idempotent.
    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        let rl = self.run_loop.swap(ptr::null_mut(), Ordering::SeqCst);
        if !rl.is_null() {
            unsafe { CFRunLoopStop(rl as CFTypeRef) };
        }

        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
        info!("scroll event tap stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for ScrollTap {
    fn drop(&mut self) {
        self.stop();
    }
}

/// RAII guard for a CGEventTap port: disables and releases on drop.
struct TapPortGuard(CFTypeRef);

impl Drop for TapPortGuard {
    fn drop(&mut self) {
        unsafe {
            CGEventTapEnable(self.0, false);
            CFRelease(self.0);
        }
    }
}

/// RAII guard for a CFRunLoopSource.
struct RunLoopSourceGuard(CFTypeRef);

impl Drop for RunLoopSourceGuard {
    fn drop(&mut self) {
        unsafe { CFRelease(self.0) };
    }
}

/// RAII guard clearing the published run-loop pointer.
struct RunLoopPtrGuard(Arc<AtomicPtr<c_void>>);

impl Drop for RunLoopPtrGuard {
    fn drop(&mut self) {
        self.0.store(ptr::null_mut(), Ordering::SeqCst);
    }
}

/// Body of the tap thread: create the tap, attach it to this thread's run
/// loop, report readiness, and run until stopped. The context box is always
/// reclaimed here, on every exit path, after the tap can no longer fire.
fn run_tap_loop(
    context: *mut TapContext,
    run_loop_out: Arc<AtomicPtr<c_void>>,
    ready_tx: mpsc::Sender<GlideResult<()>>,
) {
    // Reclaims the context when this frame unwinds, after the guards.
    struct ContextGuard(*mut TapContext);
    impl Drop for ContextGuard {
        fn drop(&mut self) {
            unsafe { drop(Box::from_raw(self.0)) };
        }
    }
    let _context_guard = ContextGuard(context);

    let mask: CGEventMask = 1 << CG_EVENT_SCROLL_WHEEL;

    let tap = unsafe {
        CGEventTapCreate(
            CGEventTapLocation::SessionEventTap,
            CGEventTapPlacement::TailAppendEventTap,
            CGEventTapOptions::DefaultTap,
            mask,
            tap_callback,
            context as *mut c_void,
        )
    };

    if tap.is_null() {
        let _ = ready_tx.send(Err(GlideError::TapCreationFailed(
            "CGEventTapCreate returned null; check Accessibility authorization".into(),
        )));
        return;
    }
    let _tap_guard = TapPortGuard(tap);
    unsafe { (*context).tap_port.store(tap as *mut c_void, Ordering::SeqCst) };

    let source = unsafe { CFMachPortCreateRunLoopSource(ptr::null(), tap, 0) };
    if source.is_null() {
        let _ = ready_tx.send(Err(GlideError::TapRegistrationFailed(
            "CFMachPortCreateRunLoopSource returned null".into(),
        )));
        return;
    }
    let _source_guard = RunLoopSourceGuard(source);

    let run_loop = unsafe { CFRunLoopGetCurrent() };
    run_loop_out.store(run_loop as *mut c_void, Ordering::SeqCst);
    let _ptr_guard = RunLoopPtrGuard(run_loop_out);

    unsafe {
        CFRunLoopAddSource(run_loop, source, kCFRunLoopCommonModes as CFTypeRef);
        CGEventTapEnable(tap, true);
    }

    let _ = ready_tx.send(Ok(()));

    // Returns when stop() calls CFRunLoopStop; guards then tear down.
    unsafe { CFRunLoopRun() };
}

/// The tap callback: runs on the tap thread for every scroll-wheel event in
/// the session. Returning the event delivers it; returning null suppresses.
extern "C" fn tap_callback(
    _proxy: CGEventTapProxy,
    event_type: u32,
    event: CGEventRef,
    user_info: *mut c_void,
) -> CGEventRef {
    if user_info.is_null() {
        return event;
    }
    let context = unsafe { &*(user_info as *const TapContext) };

    // The OS disables a tap whose callback overruns its budget; re-arm.
    if event_type == CG_EVENT_TAP_DISABLED_BY_TIMEOUT
        || event_type == CG_EVENT_TAP_DISABLED_BY_USER_INPUT
    {
        let tap = context.tap_port.load(Ordering::SeqCst);
        if !tap.is_null() {
            unsafe { CGEventTapEnable(tap as CFTypeRef, true) };
            warn!("event tap disabled by the OS, re-enabled");
        }
        return event;
    }

    if event_type != CG_EVENT_SCROLL_WHEEL {
        return event;
    }

    let raw = unsafe { read_raw_scroll(event) };
    match context.handler.on_wheel(&raw) {
        Disposition::PassThrough => event,
        Disposition::Suppress => ptr::null(),
    }
}

/// Read every field the classifier cares about out of the CGEvent.
///
/// # Safety
/// `event` must be a valid scroll-wheel CGEvent for the duration of the call.
unsafe fn read_raw_scroll(event: CGEventRef) -> crate::engine::RawScroll {
    crate::engine::RawScroll {
        point_y: CGEventGetDoubleValueField(event, CG_SCROLL_WHEEL_EVENT_POINT_DELTA_AXIS_1),
        point_x: CGEventGetDoubleValueField(event, CG_SCROLL_WHEEL_EVENT_POINT_DELTA_AXIS_2),
        fixed_y: CGEventGetDoubleValueField(event, CG_SCROLL_WHEEL_EVENT_FIXED_PT_DELTA_AXIS_1),
        fixed_x: CGEventGetDoubleValueField(event, CG_SCROLL_WHEEL_EVENT_FIXED_PT_DELTA_AXIS_2),
        line_y: CGEventGetIntegerValueField(event, CG_SCROLL_WHEEL_EVENT_DELTA_AXIS_1),
        line_x: CGEventGetIntegerValueField(event, CG_SCROLL_WHEEL_EVENT_DELTA_AXIS_2),
        scroll_phase: CGEventGetIntegerValueField(event, CG_SCROLL_WHEEL_EVENT_SCROLL_PHASE),
        momentum_phase: CGEventGetIntegerValueField(event, CG_SCROLL_WHEEL_EVENT_MOMENTUM_PHASE),
        flags: CGEventGetFlags(event),
        user_data: CGEventGetIntegerValueField(event, CG_EVENT_SOURCE_USER_DATA),
    }
}
