//! Runtime-tunable scroll smoothing configuration.
//!
//! Every field is read on each processed wheel event, so changes take effect
//! on the next scroll without re-arming the tap.

use crate::engine::curve::AccelCurve;
use serde::{Deserialize, Serialize};

/// Reference speed multiplier. Precision deltas are scaled by
/// `speed_multi / SPEED_REFERENCE` so the default leaves them untouched.
pub const SPEED_REFERENCE: f64 = 80.0;

/// The five user-facing tunables of the smoothing model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrollConfig {
    /// How far one wheel notch travels, in points. Line-unit deltas are
    /// multiplied by this directly.
    pub speed_multi: f64,

    /// Per-frame interpolation fraction toward the target. Lower values
    /// glide longer.
    pub friction: f64,

    /// Scales how much rapid wheel spinning speeds scrolling up. Zero
    /// disables acceleration entirely.
    pub accel_factor: f64,

    /// Invert both axes to match touch-drag direction semantics.
    pub natural_scroll: bool,

    /// Shape of the acceleration response.
    pub accel_curve: AccelCurve,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            speed_multi: SPEED_REFERENCE,
            friction: 0.08,
            accel_factor: 1.0,
            natural_scroll: false,
            accel_curve: AccelCurve::Linear,
        }
    }
}

impl ScrollConfig {
    /// Clamp every field into its supported range. Applied after loading
    /// persisted settings and in every setter, so out-of-range values can
    /// never reach the motion model.
    pub fn sanitized(mut self) -> Self {
        self.speed_multi = self.speed_multi.clamp(Self::SPEED_RANGE.0, Self::SPEED_RANGE.1);
        self.friction = self.friction.clamp(Self::FRICTION_RANGE.0, Self::FRICTION_RANGE.1);
        self.accel_factor = self
            .accel_factor
            .clamp(Self::ACCEL_RANGE.0, Self::ACCEL_RANGE.1);
        self
    }

    pub const SPEED_RANGE: (f64, f64) = (20.0, 200.0);
    pub const FRICTION_RANGE: (f64, f64) = (0.02, 0.3);
    pub const ACCEL_RANGE: (f64, f64) = (0.0, 3.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScrollConfig::default();
        assert_eq!(config.speed_multi, 80.0);
        assert_eq!(config.friction, 0.08);
        assert_eq!(config.accel_factor, 1.0);
        assert!(!config.natural_scroll);
        assert_eq!(config.accel_curve, AccelCurve::Linear);
    }

    #[test]
    fn test_sanitize_clamps_out_of_range_values() {
        let config = ScrollConfig {
            speed_multi: 0.0,
            friction: 2.0,
            accel_factor: -1.0,
            ..Default::default()
        }
        .sanitized();

        assert_eq!(config.speed_multi, 20.0);
        assert_eq!(config.friction, 0.3);
        assert_eq!(config.accel_factor, 0.0);
    }

    #[test]
    fn test_sanitize_keeps_in_range_values() {
        let config = ScrollConfig {
            speed_multi: 120.0,
            friction: 0.05,
            accel_factor: 2.5,
            ..Default::default()
        };
        assert_eq!(config.clone().sanitized(), config);
    }

    #[test]
    fn test_serde_round_trip() {
        let config = ScrollConfig {
            speed_multi: 100.0,
            natural_scroll: true,
            accel_curve: AccelCurve::EaseOut,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: ScrollConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: ScrollConfig = serde_json::from_str(r#"{"speedMulti": 50.0}"#).unwrap();
        assert_eq!(config.speed_multi, 50.0);
        assert_eq!(config.friction, 0.08);
    }
}
