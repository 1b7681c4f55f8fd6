/*!
 * Guest Thread
 *
 * A guest thread's register file and the flags other host threads set on
 * it. Termination and signal state are atomics behind an `Arc` so the
 * process table can flag a thread while it runs; the trap handler checks
 * them on every entry.
 */

use super::types::{CpuState, ThreadState};
use crate::core::types::{Pid, Tid};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Cross-thread flags of one guest thread
#[derive(Debug, Default)]
pub struct ThreadSignals {
    terminating: AtomicBool,
    pending: AtomicU64,
    start_signal: AtomicBool,
}

impl ThreadSignals {
    #[inline]
    pub fn is_terminating(&self) -> bool {
        self.terminating.load(Ordering::Acquire)
    }

    /// Request cooperative termination at the next trap
    #[inline]
    pub fn request_termination(&self) {
        self.terminating.store(true, Ordering::Release);
    }

    /// Pending signal mask, bit `n - 1` for signal `n`
    #[inline]
    pub fn pending(&self) -> u64 {
        self.pending.load(Ordering::Acquire)
    }

    #[inline]
    pub fn has_pending(&self) -> bool {
        self.pending() != 0
    }

    #[inline]
    pub fn raise(&self, signal: u32) {
        if (1..=64).contains(&signal) {
            self.pending.fetch_or(1 << (signal - 1), Ordering::AcqRel);
        }
    }

    /// Clear `signal` from the pending mask; returns whether it was pending
    #[inline]
    pub fn take(&self, signal: u32) -> bool {
        if !(1..=64).contains(&signal) {
            return false;
        }
        let bit = 1 << (signal - 1);
        self.pending.fetch_and(!bit, Ordering::AcqRel) & bit != 0
    }

    /// Latched when a signal must start on this thread before it resumes
    #[inline]
    pub fn start_signal(&self) -> bool {
        self.start_signal.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set_start_signal(&self, latched: bool) {
        self.start_signal.store(latched, Ordering::Release);
    }
}

/// One guest thread
#[derive(Debug)]
pub struct GuestThread {
    pub tid: Tid,
    pub pid: Pid,
    pub cpu: CpuState,
    pub state: ThreadState,
    signals: Arc<ThreadSignals>,
}

impl GuestThread {
    pub fn new(pid: Pid, tid: Tid, cpu: CpuState) -> Self {
        Self {
            tid,
            pid,
            cpu,
            state: ThreadState::Runnable,
            signals: Arc::new(ThreadSignals::default()),
        }
    }

    #[inline]
    pub fn signals(&self) -> &ThreadSignals {
        &self.signals
    }

    /// Handle other host threads use to flag this thread
    pub fn signal_handle(&self) -> Arc<ThreadSignals> {
        Arc::clone(&self.signals)
    }
}
