//! Debounced poll loop.
//!
//! Every tick re-applies the current presets (cheap, and it undoes anything
//! else that touched the taskbar); every `threshold` ticks the windows are
//! scanned and the presets recomputed first.

use std::{
    io,
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crate::{engine::Engine, error, info, shell::Shell};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickKind {
    Idle,
    Recompute,
}

#[derive(Debug)]
pub struct DebounceScheduler {
    counter: u32,
    threshold: u32,
}

impl DebounceScheduler {
    /// The first tick always recomputes.
    pub fn new(threshold: u32) -> Self {
        let threshold = threshold.max(1);
        Self {
            counter: threshold,
            threshold,
        }
    }

    pub fn tick<S: Shell>(&mut self, engine: &Engine<S>) -> TickKind {
        let kind = if self.counter >= self.threshold {
            engine.recompute();
            self.counter = 0;
            TickKind::Recompute
        } else {
            self.counter += 1;
            TickKind::Idle
        };

        engine.reapply();
        kind
    }
}

/// Background thread driving a [`DebounceScheduler`].
pub struct Worker {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    pub fn spawn<S>(engine: Arc<Engine<S>>, interval: Duration, threshold: u32) -> io::Result<Self>
    where
        S: Shell + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name("taskbar-worker".to_string())
            .spawn(move || {
                engine.shell().prepare_thread();
                info!(
                    "[WORKER] Started: tick every {}ms, recompute every {} tick(s)",
                    interval.as_millis(),
                    threshold
                );

                let mut scheduler = DebounceScheduler::new(threshold);
                while flag.load(Ordering::Relaxed) {
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| scheduler.tick(&engine)));
                    if let Err(payload) = outcome {
                        error!("[WORKER] Tick panicked: {}", panic_message(payload.as_ref()));
                    }
                    thread::sleep(interval);
                }

                info!("[WORKER] Stopped");
            })?;

        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Signals the loop and waits for it to exit. The loop notices within
    /// one interval.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("[WORKER] Worker thread panicked outside a tick");
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
