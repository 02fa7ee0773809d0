// src/utils/clock.rs
//! Time source collaborator.
//!
//! The registry never trusts caller-supplied timestamps; `dateIssued` and the
//! validity check both read a [`Clock`] owned by the host.

use crate::error::ClockError;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Nanosecond clock readable at any time.
pub trait Clock: Send + Sync {
    /// Current time in nanoseconds.
    fn now_nanos(&self) -> Result<u64, ClockError>;
}

/// Wall clock: nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_nanos(&self) -> Result<u64, ClockError> {
        let nanos = Utc::now()
            .timestamp_nanos_opt()
            .ok_or(ClockError::OutOfRange)?;
        u64::try_from(nanos).map_err(|_| ClockError::OutOfRange)
    }
}

/// Clock driven by the host.
///
/// Clones share the same reading, so a handle kept outside the registry can
/// move time forward for a registry that owns another clone.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_nanos: u64) -> Self {
        ManualClock {
            nanos: Arc::new(AtomicU64::new(start_nanos)),
        }
    }

    pub fn set(&self, nanos: u64) {
        self.nanos.store(nanos, Ordering::SeqCst);
    }

    /// Moves the clock forward by `delta` nanoseconds, saturating at `u64::MAX`.
    pub fn advance(&self, delta: u64) {
        let _ = self
            .nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.saturating_add(delta))
            });
    }
}

impl Clock for ManualClock {
    fn now_nanos(&self) -> Result<u64, ClockError> {
        Ok(self.nanos.load(Ordering::SeqCst))
    }
}
