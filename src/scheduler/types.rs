/*!
 * Scheduler Types
 * Quantum results and scheduler counters
 */

use crate::memory::AccessKind;
use serde::{Deserialize, Serialize};

/// Why a quantum stopped executing guest code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceExit {
    /// The thread executed a syscall trap of this length
    Trap { instruction_len: u32 },
    /// The instruction budget ran out
    QuantumExpired,
    /// The thread left guest code for good
    Halted,
}

/// Host protection fault raised while running guest code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostFault {
    pub host_addr: usize,
    pub access: AccessKind,
}

/// What the scheduler did with one quantum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantumOutcome {
    /// Back on the run queue
    Requeued,
    /// Parked until woken
    Blocked,
    /// Removed from the scheduler
    Exited,
}

/// Why `run` returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerExit {
    /// No threads remain
    AllExited,
    /// Every remaining thread is blocked with nothing scheduled to wake it
    AllBlocked,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    pub quanta: u64,
    pub traps: u64,
    pub faults_resolved: u64,
    pub faults_forwarded: u64,
    pub wakeups: u64,
    pub exited: u64,
}
