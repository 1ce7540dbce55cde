//! The smoothing engine: classification, motion, and re-injection.
//!
//! `ScrollEngine` is the piece both timing domains meet in. The interceptor
//! calls [`ScrollEngine::process`] synchronously for every wheel event; the
//! frame driver calls [`ScrollEngine::on_frame`] once per display refresh.
//! Both paths take short mutex-guarded critical sections over the shared
//! state and never block on anything else.

pub mod classifier;
pub mod curve;
pub mod exclusion;
pub mod injector;
pub mod motion;

pub use classifier::{AxisSample, RawScroll};
pub use curve::AccelCurve;
pub use exclusion::ExclusionSet;
pub use injector::{ScrollEmitter, SyntheticScroll, SYNTHETIC_EVENT_TAG};
pub use motion::{MotionState, StepOutcome};

use crate::config::ScrollConfig;
use crate::platform::traits::{ForegroundResolver, FrameDriver, WheelEventHandler};
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

/// What the interceptor should do with the event it just delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Deliver the original event unmodified.
    PassThrough,
    /// Swallow the original; the engine will re-emit smoothed frames.
    Suppress,
}

/// Elapsed time assumed for the first event after idle: leisurely, so no
/// acceleration applies.
const IDLE_ELAPSED_SECS: f64 = 1.0;

pub struct ScrollEngine {
    motion: Mutex<MotionState>,
    config: Mutex<ScrollConfig>,
    exclusions: Mutex<ExclusionSet>,
    last_input: Mutex<Option<Instant>>,
    emitter: Box<dyn ScrollEmitter>,
    foreground: Box<dyn ForegroundResolver>,
    /// Wired by the controller after construction; the driver's callback
    /// closes over this engine.
    driver: OnceLock<Arc<dyn FrameDriver>>,
}

impl ScrollEngine {
    pub fn new(
        config: ScrollConfig,
        exclusions: ExclusionSet,
        emitter: Box<dyn ScrollEmitter>,
        foreground: Box<dyn ForegroundResolver>,
    ) -> Self {
        Self {
            motion: Mutex::new(MotionState::new()),
            config: Mutex::new(config),
            exclusions: Mutex::new(exclusions),
            last_input: Mutex::new(None),
            emitter,
            foreground,
            driver: OnceLock::new(),
        }
    }

    /// Attach the frame driver. Must be called exactly once, before the
    /// interceptor is armed.
    pub fn set_frame_driver(&self, driver: Arc<dyn FrameDriver>) {
        if self.driver.set(driver).is_err() {
            tracing::warn!("frame driver already attached, ignoring");
        }
    }

    fn driver(&self) -> Option<&Arc<dyn FrameDriver>> {
        self.driver.get()
    }

    /// Classify one intercepted wheel event and decide its fate.
    ///
    /// Runs on the tap thread, synchronously gating delivery of every scroll
    /// event in the session, so each short-circuit is ordered cheapest-first
    /// and the sentinel check comes before everything.
    pub fn process(&self, raw: &RawScroll) -> Disposition {
        // Our own synthetic output. Releasing it untouched is what keeps the
        // pipeline from feeding on itself.
        if raw.user_data == SYNTHETIC_EVENT_TAG {
            return Disposition::PassThrough;
        }

        // Devices that already scroll smoothly keep their native feel.
        if raw.is_native_smooth() {
            return Disposition::PassThrough;
        }

        if let Some(id) = self.foreground.frontmost_app_id() {
            if self.exclusions.lock().contains(&id) {
                tracing::trace!(app = %id, "excluded application, passing through");
                return Disposition::PassThrough;
            }
        }

        if raw.has_bypass_modifier() {
            return Disposition::PassThrough;
        }

        let x = raw.axis_x();
        let y = raw.axis_y();
        if !x.valid && !y.valid {
            // Nothing to smooth; don't eat the event.
            return Disposition::PassThrough;
        }

        let elapsed = {
            let mut last = self.last_input.lock();
            let now = Instant::now();
            let elapsed = last
                .map(|t| now.duration_since(t).as_secs_f64())
                .unwrap_or(IDLE_ELAPSED_SECS);
            *last = Some(now);
            elapsed
        };

        {
            let config = self.config.lock().clone();
            self.motion.lock().update(x, y, elapsed, &config);
        }

        if let Some(driver) = self.driver() {
            driver.start();
        }

        Disposition::Suppress
    }

    /// Advance the animation one frame; called by the frame driver.
    pub fn on_frame(&self) {
        let (friction, natural_scroll) = {
            let config = self.config.lock();
            (config.friction, config.natural_scroll)
        };

        let outcome = self.motion.lock().step(friction);
        match outcome {
            StepOutcome::Emit { dx, dy } => {
                let scroll = SyntheticScroll::from_frame(dx, dy, natural_scroll);
                self.emitter.emit(&scroll);
            }
            StepOutcome::Settled => {
                if let Some(driver) = self.driver() {
                    driver.stop();
                }
            }
            StepOutcome::Quiet => {}
        }
    }

    // Config accessors: each field is read on the next processed input, so a
    // plain locked swap is all "live reconfiguration" takes.

    pub fn config(&self) -> ScrollConfig {
        self.config.lock().clone()
    }

    pub fn update_config(&self, f: impl FnOnce(&mut ScrollConfig)) -> ScrollConfig {
        let mut config = self.config.lock();
        f(&mut config);
        *config = config.clone().sanitized();
        config.clone()
    }

    /// Disarm the frame driver and clear any in-flight glide. Used on
    /// teardown so a stopped pipeline emits nothing.
    pub fn halt(&self) {
        if let Some(driver) = self.driver() {
            driver.stop();
        }
        *self.motion.lock() = MotionState::new();
        *self.last_input.lock() = None;
    }

    pub fn toggle_exclusion(&self, id: &str) -> bool {
        self.exclusions.lock().toggle(id)
    }

    pub fn excluded_apps(&self) -> Vec<String> {
        self.exclusions.lock().ids()
    }

    /// Test/diagnostic snapshot of the motion state.
    pub fn motion_snapshot(&self) -> MotionState {
        *self.motion.lock()
    }
}

impl WheelEventHandler for ScrollEngine {
    fn on_wheel(&self, raw: &RawScroll) -> Disposition {
        self.process(raw)
    }
}
