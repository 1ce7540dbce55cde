//! Thread-based frame driver.
//!
//! Fallback for platforms (and failure paths) without a display-synchronized
//! timer: a dedicated worker thread ticking at ~120 Hz while armed, parked on
//! a condvar while disarmed. The worker is spawned lazily on first `start`
//! and only torn down on drop.

use crate::platform::traits::FrameDriver;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// ~120 Hz, comfortably above common display refresh rates.
const FRAME_INTERVAL: Duration = Duration::from_micros(8_333);

#[derive(Default)]
struct DriverState {
    armed: bool,
    shutdown: bool,
}

#[derive(Default)]
struct Shared {
    state: Mutex<DriverState>,
    wake: Condvar,
}

pub struct ThreadFrameDriver {
    shared: Arc<Shared>,
    callback: Arc<dyn Fn() + Send + Sync>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ThreadFrameDriver {
    pub fn new(callback: Arc<dyn Fn() + Send + Sync>) -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            callback,
            worker: Mutex::new(None),
        }
    }

    fn spawn_worker(&self) -> JoinHandle<()> {
        let shared = Arc::clone(&self.shared);
        let callback = Arc::clone(&self.callback);
        std::thread::Builder::new()
            .name("frame-driver".into())
            .spawn(move || loop {
                {
                    let mut state = shared.state.lock();
                    while !state.armed && !state.shutdown {
                        shared.wake.wait(&mut state);
                    }
                    if state.shutdown {
                        break;
                    }
                }

                callback();

                // Pace the next tick; stop() and drop wake us early.
                let mut state = shared.state.lock();
                if state.armed && !state.shutdown {
                    let _ = shared.wake.wait_for(&mut state, FRAME_INTERVAL);
                }
            })
            .expect("failed to spawn frame-driver thread")
    }
}

impl FrameDriver for ThreadFrameDriver {
    fn start(&self) {
        let mut worker = self.worker.lock();
        if worker.is_none() {
            *worker = Some(self.spawn_worker());
            tracing::debug!("frame-driver thread started");
        }
        let mut state = self.shared.state.lock();
        if !state.armed {
            state.armed = true;
            self.shared.wake.notify_all();
        }
    }

    fn stop(&self) {
        let mut state = self.shared.state.lock();
        if state.armed {
            state.armed = false;
            self.shared.wake.notify_all();
        }
    }

    fn is_running(&self) -> bool {
        self.shared.state.lock().armed
    }
}

impl Drop for ThreadFrameDriver {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock();
            state.armed = false;
            state.shutdown = true;
            self.shared.wake.notify_all();
        }
        if let Some(handle) = self.worker.lock().take() {
            let _ = handle.join();
        }
    }
}
