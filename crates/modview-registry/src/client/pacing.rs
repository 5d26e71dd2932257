//! Delays between and around registry requests
//!
//! Waiting goes through [`Sleeper`] so callers can swap real timers for a
//! recorder that returns immediately. The recorder is only built for tests
//! and with the `test-util` feature.

#[cfg(any(test, feature = "test-util"))]
use parking_lot::Mutex;
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;
#[cfg(any(test, feature = "test-util"))]
use std::sync::Arc;
use std::time::Duration;

/// Boxed future returned by [`Sleeper::sleep`]
pub type SleepFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Source of delays for rate limiting and request spacing
pub trait Sleeper: Debug + Send + Sync {
    /// Suspend for `duration`
    fn sleep(&self, duration: Duration) -> SleepFuture;
}

/// Sleeper backed by the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> SleepFuture {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Sleeper that records every requested delay and returns immediately
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Default, Clone)]
pub struct RecordingSleeper {
    slept: Arc<Mutex<Vec<Duration>>>,
}

#[cfg(any(test, feature = "test-util"))]
impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays requested so far, in order
    pub fn recorded(&self) -> Vec<Duration> {
        self.slept.lock().clone()
    }

    /// Sum of all requested delays
    pub fn total(&self) -> Duration {
        self.slept.lock().iter().sum()
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) -> SleepFuture {
        self.slept.lock().push(duration);
        Box::pin(std::future::ready(()))
    }
}
