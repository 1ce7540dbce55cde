//! The public facade tying the pieces together.
//!
//! A `Controller` owns the engine, the settings store, and at most one armed
//! interceptor. Excluded collaborators (menu UI, CLI) drive everything
//! through it: lifecycle, per-field configuration, and the exclusion list.
//! Every configuration change takes effect on the next processed wheel event
//! and is persisted best-effort.

use crate::config::ScrollConfig;
use crate::engine::{AccelCurve, ExclusionSet, ScrollEngine};
use crate::error::{GlideError, GlideResult};
use crate::platform::{self, Interceptor};
use crate::settings::SettingsStore;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

pub struct Controller {
    engine: Arc<ScrollEngine>,
    tap: Mutex<Option<Interceptor>>,
    store: SettingsStore,
}

impl Controller {
    /// Load settings and assemble the pipeline, disarmed.
    pub fn new(store: SettingsStore) -> Self {
        let settings = store.load();
        let engine = Arc::new(ScrollEngine::new(
            settings.config,
            ExclusionSet::from_ids(settings.excluded_apps),
            platform::scroll_emitter(),
            platform::foreground_resolver(),
        ));

        // The driver callback holds only a weak reference; dropping the
        // controller tears the whole pipeline down.
        let weak = Arc::downgrade(&engine);
        let driver = platform::frame_driver(Arc::new(move || {
            if let Some(engine) = weak.upgrade() {
                engine.on_frame();
            }
        }));
        engine.set_frame_driver(driver);

        Self { engine, tap: Mutex::new(None), store }
    }

    /// Arm the interceptor. Calling while already armed is a no-op success.
    ///
    /// Fails with [`GlideError::PermissionDenied`] when the accessibility
    /// gate refuses, and with a tap error when the OS does; neither leaves
    /// anything half-armed, so `start` is safe to call again after the user
    /// remediates.
    pub fn start(&self) -> GlideResult<()> {
        let mut tap = self.tap.lock();
        if tap.is_some() {
            tracing::debug!("already running, ignoring start");
            return Ok(());
        }

        if !platform::ensure_authorized() {
            return Err(GlideError::PermissionDenied);
        }

        let handler: Arc<ScrollEngine> = Arc::clone(&self.engine);
        *tap = Some(Interceptor::start(handler)?);
        info!("scroll smoothing started");
        Ok(())
    }

    /// Disarm the interceptor and cancel any in-flight glide. Idempotent;
    /// blocks until no further event callback can fire.
    pub fn stop(&self) {
        let mut tap = self.tap.lock();
        if let Some(mut active) = tap.take() {
            active.stop();
            self.engine.halt();
            info!("scroll smoothing stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.tap.lock().is_some()
    }

    /// Flip exclusion for an application identifier, returning the new
    /// membership state.
    pub fn toggle_exclusion(&self, id: &str) -> bool {
        let excluded = self.engine.toggle_exclusion(id);
        info!(app = id, excluded, "exclusion toggled");
        self.persist();
        excluded
    }

    pub fn excluded_apps(&self) -> Vec<String> {
        self.engine.excluded_apps()
    }

    pub fn config(&self) -> ScrollConfig {
        self.engine.config()
    }

    pub fn speed_multi(&self) -> f64 {
        self.engine.config().speed_multi
    }

    pub fn set_speed_multi(&self, value: f64) {
        self.engine.update_config(|c| c.speed_multi = value);
        self.persist();
    }

    pub fn friction(&self) -> f64 {
        self.engine.config().friction
    }

    pub fn set_friction(&self, value: f64) {
        self.engine.update_config(|c| c.friction = value);
        self.persist();
    }

    pub fn accel_factor(&self) -> f64 {
        self.engine.config().accel_factor
    }

    pub fn set_accel_factor(&self, value: f64) {
        self.engine.update_config(|c| c.accel_factor = value);
        self.persist();
    }

    pub fn natural_scroll(&self) -> bool {
        self.engine.config().natural_scroll
    }

    pub fn set_natural_scroll(&self, value: bool) {
        self.engine.update_config(|c| c.natural_scroll = value);
        self.persist();
    }

    pub fn accel_curve(&self) -> AccelCurve {
        self.engine.config().accel_curve
    }

    pub fn set_accel_curve(&self, value: AccelCurve) {
        self.engine.update_config(|c| c.accel_curve = value);
        self.persist();
    }

    fn persist(&self) {
        self.store
            .persist(&self.engine.config(), self.engine.excluded_apps());
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller_in(dir: &tempfile::TempDir) -> Controller {
        Controller::new(SettingsStore::new(dir.path().join("settings.json")))
    }

    #[test]
    fn test_new_controller_is_not_running() {
        let dir = tempfile::tempdir().unwrap();
        let controller = controller_in(&dir);
        assert!(!controller.is_running());
    }

    #[test]
    fn test_setters_sanitize_and_persist() {
        let dir = tempfile::tempdir().unwrap();
        let controller = controller_in(&dir);

        controller.set_friction(5.0);
        assert_eq!(controller.friction(), ScrollConfig::FRICTION_RANGE.1);

        controller.set_speed_multi(150.0);
        controller.set_natural_scroll(true);
        controller.set_accel_curve(AccelCurve::Exponential);

        // A fresh controller over the same store sees the persisted values.
        let reloaded = controller_in(&dir);
        assert_eq!(reloaded.speed_multi(), 150.0);
        assert_eq!(reloaded.friction(), ScrollConfig::FRICTION_RANGE.1);
        assert!(reloaded.natural_scroll());
        assert_eq!(reloaded.accel_curve(), AccelCurve::Exponential);
    }

    #[test]
    fn test_exclusions_toggle_and_persist() {
        let dir = tempfile::tempdir().unwrap();
        let controller = controller_in(&dir);

        assert!(controller.toggle_exclusion("com.example.vm"));
        assert_eq!(controller.excluded_apps(), vec!["com.example.vm".to_string()]);

        let reloaded = controller_in(&dir);
        assert_eq!(reloaded.excluded_apps(), vec!["com.example.vm".to_string()]);
        assert!(!reloaded.toggle_exclusion("com.example.vm"));
        assert!(reloaded.excluded_apps().is_empty());
    }

    #[test]
    fn test_stop_without_start_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let controller = controller_in(&dir);
        controller.stop();
        controller.stop();
        assert!(!controller.is_running());
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn test_start_without_backend_fails_cleanly_and_stays_recallable() {
        let dir = tempfile::tempdir().unwrap();
        let controller = controller_in(&dir);

        for _ in 0..2 {
            match controller.start() {
                Err(GlideError::Platform(_)) => {}
                other => panic!("expected platform error, got {other:?}"),
            }
            assert!(!controller.is_running());
        }
    }
}
