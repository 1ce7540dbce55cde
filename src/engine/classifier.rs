//! Wheel event classification.
//!
//! A scroll event reports each axis in up to three unit representations. The
//! classifier picks the best available one per axis and decides whether the
//! source device already scrolls smoothly (trackpads, Magic Mouse), in which
//! case the whole pipeline steps aside.

/// Modifier-flag bit for the Option/Alt key in the event flags word.
pub const FLAG_MASK_ALTERNATE: u64 = 0x0008_0000;

/// Platform-neutral snapshot of one scroll-wheel event, as read out of the
/// intercepted OS event. Axis 1 is vertical, axis 2 horizontal.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawScroll {
    /// High-precision point deltas.
    pub point_y: f64,
    pub point_x: f64,
    /// Fixed-point deltas.
    pub fixed_y: f64,
    pub fixed_x: f64,
    /// Integer line-count deltas.
    pub line_y: i64,
    pub line_x: i64,
    /// Gesture phase indicator; nonzero while a finger is on the surface.
    pub scroll_phase: i64,
    /// Momentum (fling) phase indicator.
    pub momentum_phase: i64,
    /// Modifier-flag bits at event time.
    pub flags: u64,
    /// Source user-data field; synthetic events carry the sentinel tag here.
    pub user_data: i64,
}

/// The resolved delta for one axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisSample {
    pub valid: bool,
    pub value: f64,
    /// True when the value came from the integer line-count fallback, which
    /// the motion model scales by the full speed multiplier.
    pub from_lines: bool,
}

impl AxisSample {
    /// Resolve an axis from its three representations. First nonzero wins,
    /// in precision order: point, fixed-point, line count.
    pub fn resolve(point: f64, fixed: f64, lines: i64) -> Self {
        if point != 0.0 {
            Self { valid: true, value: point, from_lines: false }
        } else if fixed != 0.0 {
            Self { valid: true, value: fixed, from_lines: false }
        } else if lines != 0 {
            Self { valid: true, value: lines as f64, from_lines: true }
        } else {
            Self::default()
        }
    }
}

impl RawScroll {
    /// Resolved vertical axis delta.
    pub fn axis_y(&self) -> AxisSample {
        AxisSample::resolve(self.point_y, self.fixed_y, self.line_y)
    }

    /// Resolved horizontal axis delta.
    pub fn axis_x(&self) -> AxisSample {
        AxisSample::resolve(self.point_x, self.fixed_x, self.line_x)
    }

    /// True when the source device reports gesture or momentum phases, i.e.
    /// the system is already delivering continuous motion for it.
    pub fn is_native_smooth(&self) -> bool {
        self.scroll_phase != 0 || self.momentum_phase != 0
    }

    /// True while the user holds the bypass modifier (Option/Alt).
    pub fn has_bypass_modifier(&self) -> bool {
        self.flags & FLAG_MASK_ALTERNATE != 0
    }
}
