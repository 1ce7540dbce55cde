//! Synthetic scroll event construction.
//!
//! Each animation frame's deltas become one synthetic wheel event carrying
//! all three unit representations, so every downstream consumer finds the
//! granularity it expects. The sentinel tag in the source-user-data field is
//! how the interceptor recognizes (and releases) our own output.

/// Value stamped into the source-user-data field of every synthetic event.
/// The interceptor passes tagged events through before any other processing;
/// without this the pipeline would amplify its own output.
pub const SYNTHETIC_EVENT_TAG: i64 = 42;

/// Divisor from point units down to line units.
const POINTS_PER_LINE: f64 = 10.0;

/// A fully specified synthetic wheel event, ready for the platform layer to
/// post. Axis 1 is vertical, axis 2 horizontal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticScroll {
    pub point_y: f64,
    pub point_x: f64,
    pub fixed_y: f64,
    pub fixed_x: f64,
    pub line_y: i32,
    pub line_x: i32,
    pub tag: i64,
}

impl SyntheticScroll {
    /// Build the event for one frame's `(dx, dy)`, applying natural-scroll
    /// inversion to both axes when enabled.
    pub fn from_frame(dx: f64, dy: f64, natural_scroll: bool) -> Self {
        let (dx, dy) = if natural_scroll { (-dx, -dy) } else { (dx, dy) };
        Self {
            point_y: dy,
            point_x: dx,
            fixed_y: dy / POINTS_PER_LINE,
            fixed_x: dx / POINTS_PER_LINE,
            line_y: (dy / POINTS_PER_LINE).round() as i32,
            line_x: (dx / POINTS_PER_LINE).round() as i32,
            tag: SYNTHETIC_EVENT_TAG,
        }
    }
}

/// Posts synthetic events back into the system. The platform layer provides
/// the real implementation; tests record what would have been posted.
pub trait ScrollEmitter: Send + Sync {
    fn emit(&self, scroll: &SyntheticScroll);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_three_representations_are_populated() {
        let scroll = SyntheticScroll::from_frame(30.0, -25.0, false);
        assert_eq!(scroll.point_x, 30.0);
        assert_eq!(scroll.point_y, -25.0);
        assert_eq!(scroll.fixed_x, 3.0);
        assert_eq!(scroll.fixed_y, -2.5);
        assert_eq!(scroll.line_x, 3);
        assert_eq!(scroll.line_y, -3); // round(-2.5) away from zero
    }

    #[test]
    fn test_natural_scroll_inverts_both_axes() {
        let scroll = SyntheticScroll::from_frame(30.0, -25.0, true);
        assert_eq!(scroll.point_x, -30.0);
        assert_eq!(scroll.point_y, 25.0);
        assert_eq!(scroll.fixed_x, -3.0);
        assert_eq!(scroll.line_y, 3);
    }

    #[test]
    fn test_sentinel_tag_is_always_stamped() {
        assert_eq!(SyntheticScroll::from_frame(1.0, 1.0, false).tag, SYNTHETIC_EVENT_TAG);
        assert_eq!(SyntheticScroll::from_frame(0.0, 0.0, true).tag, SYNTHETIC_EVENT_TAG);
    }

    #[test]
    fn test_small_deltas_round_to_zero_lines() {
        let scroll = SyntheticScroll::from_frame(0.4, -0.4, false);
        assert_eq!(scroll.line_x, 0);
        assert_eq!(scroll.line_y, 0);
        // Precision representations still carry the motion.
        assert_eq!(scroll.point_x, 0.4);
        assert_eq!(scroll.fixed_y, -0.04);
    }
}
