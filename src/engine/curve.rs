//! Acceleration response curves and interpolation.
//!
//! A curve maps a normalized wheel-event-frequency value in `[0, 1]` (0 =
//! leisurely notching, 1 = spinning as fast as events arrive) to an intensity
//! fraction in `[0, 1]`. All curves are fixed at the endpoints and monotone,
//! so faster spinning never scrolls slower.

use serde::{Deserialize, Serialize};

/// Linear interpolation between `src` and `dest`.
#[inline]
pub fn lerp(src: f64, dest: f64, trans: f64) -> f64 {
    src + (dest - src) * trans
}

/// Shape of the wheel acceleration response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum AccelCurve {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    Exponential,
}

impl AccelCurve {
    pub const ALL: [AccelCurve; 5] = [
        AccelCurve::Linear,
        AccelCurve::EaseIn,
        AccelCurve::EaseOut,
        AccelCurve::EaseInOut,
        AccelCurve::Exponential,
    ];

    /// Human-readable name, for logs and the CLI.
    pub fn name(&self) -> &'static str {
        match self {
            AccelCurve::Linear => "Linear",
            AccelCurve::EaseIn => "Ease In",
            AccelCurve::EaseOut => "Ease Out",
            AccelCurve::EaseInOut => "Ease In-Out",
            AccelCurve::Exponential => "Exponential",
        }
    }

    /// Apply the curve to a normalized velocity fraction.
    pub fn apply(&self, t: f64) -> f64 {
        match self {
            AccelCurve::Linear => t,
            AccelCurve::EaseIn => t * t,
            AccelCurve::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            AccelCurve::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            AccelCurve::Exponential => t * t * t,
        }
    }
}
