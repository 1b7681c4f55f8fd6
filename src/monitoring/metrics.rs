/*!
 * Trap Metrics
 * Lock-free counters updated on every trap
 */

use crate::syscalls::TrapDisposition;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Trap counters
///
/// # Performance
/// - Cache-line aligned; every trapping thread bumps these
#[repr(C, align(64))]
#[derive(Debug, Default)]
pub struct TrapMetrics {
    traps: AtomicU64,
    dispatched: AtomicU64,
    unimplemented: AtomicU64,
    resumed: AtomicU64,
    suspended: AtomicU64,
    signal_diverted: AtomicU64,
    terminated: AtomicU64,
    syscall_micros: AtomicU64,
}

/// Point-in-time copy of `TrapMetrics`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrapMetricsSnapshot {
    pub traps: u64,
    pub dispatched: u64,
    pub unimplemented: u64,
    pub resumed: u64,
    pub suspended: u64,
    pub signal_diverted: u64,
    pub terminated: u64,
    pub syscall_micros: u64,
}

impl TrapMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_trap(&self) {
        self.traps.fetch_add(1, Ordering::Relaxed);
    }

    /// A handler ran for `micros`
    #[inline]
    pub fn record_dispatch(&self, micros: u64) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
        self.syscall_micros.fetch_add(micros, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_unimplemented(&self) {
        self.unimplemented.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_disposition(&self, disposition: TrapDisposition) {
        let counter = match disposition {
            TrapDisposition::Resumed => &self.resumed,
            TrapDisposition::Suspended => &self.suspended,
            TrapDisposition::SignalDiverted => &self.signal_diverted,
            TrapDisposition::ThreadTerminating => &self.terminated,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TrapMetricsSnapshot {
        TrapMetricsSnapshot {
            traps: self.traps.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            unimplemented: self.unimplemented.load(Ordering::Relaxed),
            resumed: self.resumed.load(Ordering::Relaxed),
            suspended: self.suspended.load(Ordering::Relaxed),
            signal_diverted: self.signal_diverted.load(Ordering::Relaxed),
            terminated: self.terminated.load(Ordering::Relaxed),
            syscall_micros: self.syscall_micros.load(Ordering::Relaxed),
        }
    }
}
