//! Glidewheel - system-wide smooth scrolling for stepped mouse wheels.
//!
//! Intercepts raw scroll-wheel events, feeds them through a speed/friction/
//! acceleration motion model, and re-injects synthetic scroll events once per
//! display frame, so applications see one continuous glide instead of chunky
//! wheel notches. Devices that already scroll smoothly (trackpads, Magic
//! Mouse) are recognized and left alone.

pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod platform;
pub mod settings;

pub use config::ScrollConfig;
pub use controller::Controller;
pub use engine::{AccelCurve, Disposition, RawScroll, ScrollEngine};
pub use error::{GlideError, GlideResult};
pub use settings::SettingsStore;
