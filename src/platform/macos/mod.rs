//! macOS platform bindings: permission gate, foreground-application lookup,
//! synthetic event posting, and the display-refresh frame driver.

pub mod display_link;
pub mod tap;

use crate::engine::{ScrollEmitter, SyntheticScroll};
use crate::platform::traits::{ForegroundResolver, FrameDriver};
use core_foundation::base::{CFRelease, CFTypeRef, TCFType};
use core_foundation::boolean::CFBoolean;
use core_foundation::dictionary::CFDictionary;
use core_foundation::string::CFString;
use objc2_app_kit::NSWorkspace;
use std::ptr;
use std::sync::Arc;

use tap::{
    CG_EVENT_SOURCE_USER_DATA, CG_SCROLL_WHEEL_EVENT_FIXED_PT_DELTA_AXIS_1,
    CG_SCROLL_WHEEL_EVENT_FIXED_PT_DELTA_AXIS_2, CG_SCROLL_WHEEL_EVENT_POINT_DELTA_AXIS_1,
    CG_SCROLL_WHEEL_EVENT_POINT_DELTA_AXIS_2,
};

// Scroll event unit: lines give the broadest application compatibility; the
// precision fields are set on top.
const KCG_SCROLL_EVENT_UNIT_LINE: u32 = 1;
// Post at the HID tap so the event is indistinguishable from hardware input
// to everything downstream of the driver layer.
const KCG_HID_EVENT_TAP: u32 = 0;

// FFI declarations for Accessibility
#[link(name = "ApplicationServices", kind = "framework")]
extern "C" {
    fn AXIsProcessTrustedWithOptions(options: CFTypeRef) -> bool;
}

// FFI declarations for Core Graphics event creation/posting
#[link(name = "CoreGraphics", kind = "framework")]
extern "C" {
    fn CGEventCreateScrollWheelEvent2(
        source: CFTypeRef,
        units: u32,
        wheel_count: u32,
        wheel1: i32,
        wheel2: i32,
        wheel3: i32,
    ) -> CFTypeRef;

    fn CGEventSetIntegerValueField(event: CFTypeRef, field: u32, value: i64);
    fn CGEventSetDoubleValueField(event: CFTypeRef, field: u32, value: f64);
    fn CGEventPost(tap: u32, event: CFTypeRef);
}

/// Check (and prompt for) Accessibility trust. The system shows its own
/// grant dialog on the first refusal; we never retry on our side.
pub fn ensure_authorized() -> bool {
    let key = CFString::new("AXTrustedCheckOptionPrompt");
    let value = CFBoolean::true_value();
    let options = CFDictionary::from_CFType_pairs(&[(key.as_CFType(), value.as_CFType())]);

    unsafe { AXIsProcessTrustedWithOptions(options.as_concrete_TypeRef() as CFTypeRef) }
}

/// Posts synthetic wheel events through Core Graphics at the HID tap.
pub struct CgScrollEmitter;

impl ScrollEmitter for CgScrollEmitter {
    fn emit(&self, scroll: &SyntheticScroll) {
        unsafe {
            let event = CGEventCreateScrollWheelEvent2(
                ptr::null(),
                KCG_SCROLL_EVENT_UNIT_LINE,
                2,
                scroll.line_y,
                scroll.line_x,
                0,
            );
            if event.is_null() {
                tracing::warn!("CGEventCreateScrollWheelEvent2 returned null, dropping frame");
                return;
            }

            // Precision representations for consumers that scroll by points.
            CGEventSetDoubleValueField(
                event,
                CG_SCROLL_WHEEL_EVENT_POINT_DELTA_AXIS_1,
                scroll.point_y,
            );
            CGEventSetDoubleValueField(
                event,
                CG_SCROLL_WHEEL_EVENT_POINT_DELTA_AXIS_2,
                scroll.point_x,
            );
            CGEventSetDoubleValueField(
                event,
                CG_SCROLL_WHEEL_EVENT_FIXED_PT_DELTA_AXIS_1,
                scroll.fixed_y,
            );
            CGEventSetDoubleValueField(
                event,
                CG_SCROLL_WHEEL_EVENT_FIXED_PT_DELTA_AXIS_2,
                scroll.fixed_x,
            );

            // The sentinel that keeps the tap from re-processing our output.
            CGEventSetIntegerValueField(event, CG_EVENT_SOURCE_USER_DATA, scroll.tag);

            CGEventPost(KCG_HID_EVENT_TAP, event);
            CFRelease(event);
        }
    }
}

/// Resolves the frontmost application's bundle identifier via NSWorkspace.
pub struct WorkspaceResolver;

impl ForegroundResolver for WorkspaceResolver {
    fn frontmost_app_id(&self) -> Option<String> {
        unsafe {
            let workspace = NSWorkspace::sharedWorkspace();
            let app = workspace.frontmostApplication()?;
            let id = app.bundleIdentifier()?;
            Some(id.to_string())
        }
    }
}

/// Display-link frame driver, or the thread timer when the link cannot be
/// created (headless or virtual display setups).
pub fn frame_driver(callback: Arc<dyn Fn() + Send + Sync>) -> Arc<dyn FrameDriver> {
    match display_link::DisplayLinkDriver::new(Arc::clone(&callback)) {
        Ok(driver) => Arc::new(driver),
        Err(e) => {
            tracing::warn!("display link unavailable ({e}), using timer-thread frame driver");
            Arc::new(crate::platform::timer::ThreadFrameDriver::new(callback))
        }
    }
}
