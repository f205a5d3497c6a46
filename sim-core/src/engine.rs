//! Periodic loop driver shared by the integrator and the collision engine.
//!
//! Each engine runs on its own named thread:
//! 1. sleep for [`POLL_INTERVAL`] to bound CPU usage,
//! 2. measure wall-clock time since the last tick,
//! 3. once it reaches the engine's interval, run one tick with the elapsed
//!    whole milliseconds converted to seconds, then restart the stopwatch.
//!
//! The stop signal is polled once per iteration, so a tick is always
//! either fully applied or not started.

use crate::{
    error::{Error, Result},
    stop::StopSignal,
};
use log::{debug, warn};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Sleep between two polls of an engine loop.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Runs `tick` every `interval` until `stop` is signalled.
///
/// ### Parameters
/// - `interval` - Minimum wall-clock time between two ticks.
/// - `poll` - Sleep per loop iteration.
/// - `stop` - Checked once per iteration, at the top of the loop.
/// - `tick` - Receives the elapsed time since the previous tick, in seconds.
///
/// ### Returns
/// The number of ticks executed.
pub fn run_periodic<F>(interval: Duration, poll: Duration, stop: &StopSignal, mut tick: F) -> u64
where
    F: FnMut(f64),
{
    let mut ticks = 0;
    let mut last_update = Instant::now();

    while !stop.stop_requested() {
        thread::sleep(poll);

        let elapsed = last_update.elapsed();
        if elapsed >= interval {
            tick(elapsed.as_millis() as f64 / 1000.0);
            ticks += 1;
            last_update = Instant::now();
        }
    }
    ticks
}

/// Owning handle to a running engine thread.
///
/// Dropping the handle stops the engine and waits for its thread.
#[derive(Debug)]
pub struct EngineHandle {
    name: &'static str,
    stop: StopSignal,
    thread: Option<JoinHandle<()>>,
}

impl EngineHandle {
    /// Starts `tick` on a new thread named `name`, driven by [`run_periodic`].
    ///
    /// ### Errors
    /// [`Error::Spawn`] if the thread cannot be created.
    pub fn spawn_periodic<F>(name: &'static str, interval: Duration, tick: F) -> Result<Self>
    where
        F: FnMut(f64) + Send + 'static,
    {
        let stop = StopSignal::new();
        let signal = stop.clone();
        let thread = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                debug!("{name}: started, interval {interval:?}");
                let ticks = run_periodic(interval, POLL_INTERVAL, &signal, tick);
                debug!("{name}: stopped after {ticks} ticks");
            })?;

        Ok(Self {
            name,
            stop,
            thread: Some(thread),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Requests the loop to exit at its next iteration boundary.
    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.stop_requested()
    }

    /// `true` once the engine thread has returned.
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Waits for the engine thread to exit. Does not request the stop.
    ///
    /// ### Errors
    /// [`Error::EnginePanicked`] if the thread panicked.
    pub fn join(mut self) -> Result<()> {
        self.join_thread()
    }

    /// Requests the stop, then waits for the thread.
    pub fn stop_and_join(self) -> Result<()> {
        self.stop();
        self.join()
    }

    fn join_thread(&mut self) -> Result<()> {
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| {
                warn!("{}: engine thread panicked", self.name);
                Error::EnginePanicked(self.name)
            }),
            None => Ok(()),
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.stop.stop();
            let _ = self.join_thread();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[test]
    fn run_periodic_returns_immediately_when_already_stopped() {
        let stop = StopSignal::new();
        stop.stop();
        let mut called = false;
        let ticks = run_periodic(Duration::ZERO, POLL_INTERVAL, &stop, |_| called = true);
        assert_eq!(ticks, 0);
        assert!(!called);
    }

    #[test]
    fn run_periodic_passes_elapsed_seconds_of_at_least_the_interval() {
        let stop = StopSignal::new();
        let mut durations = Vec::new();
        run_periodic(Duration::from_millis(5), POLL_INTERVAL, &stop, |dt| {
            durations.push(dt);
            if durations.len() == 3 {
                stop.stop();
            }
        });
        assert_eq!(durations.len(), 3);
        assert!(durations.iter().all(|&dt| dt >= 0.005), "{durations:?}");
    }

    #[test]
    fn spawned_engine_ticks_and_stops() {
        let ticks = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&ticks);
        let handle = EngineHandle::spawn_periodic("test-engine", Duration::from_millis(1), move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();
        assert_eq!(handle.name(), "test-engine");

        while ticks.load(Ordering::Relaxed) < 3 {
            thread::sleep(Duration::from_millis(1));
        }
        handle.stop_and_join().unwrap();

        let after = ticks.load(Ordering::Relaxed);
        thread::sleep(Duration::from_millis(10));
        assert_eq!(ticks.load(Ordering::Relaxed), after);
    }

    #[test]
    fn panicking_engine_is_reported_at_join() {
        let handle = EngineHandle::spawn_periodic("doomed", Duration::ZERO, |_| {
            panic!("tick failed");
        })
        .unwrap();
        while !handle.is_finished() {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(matches!(handle.join(), Err(Error::EnginePanicked("doomed"))));
    }

    #[test]
    fn dropping_the_handle_stops_the_engine() {
        let ticks = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&ticks);
        let handle = EngineHandle::spawn_periodic("dropped", Duration::ZERO, move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();
        drop(handle);

        let after = ticks.load(Ordering::Relaxed);
        thread::sleep(Duration::from_millis(10));
        assert_eq!(ticks.load(Ordering::Relaxed), after);
    }
}
