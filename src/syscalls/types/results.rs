/*!
 * Syscall Result Types
 * Handler outcomes and how the trap handler left the thread
 */

use super::errno::Errno;
use serde::{Deserialize, Serialize};

/// What a handler asks the trap handler to do with the guest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum SyscallOutcome {
    /// Store in EAX and advance EIP past the trap (negative errno on failure)
    Return(i32),
    /// The handler positioned EIP itself; leave the registers alone
    ContinueNoAdvance,
    /// The thread must wait; EIP stays on the trap so it re-fires on wake
    BlockedRetry,
}

impl SyscallOutcome {
    #[inline]
    #[must_use]
    pub const fn ok(value: i32) -> Self {
        Self::Return(value)
    }

    #[inline]
    #[must_use]
    pub const fn success() -> Self {
        Self::Return(0)
    }

    #[inline]
    #[must_use]
    pub const fn err(errno: Errno) -> Self {
        Self::Return(errno.negated())
    }

    /// `Ok(value)` on success, `-errno` otherwise
    #[inline]
    #[must_use]
    pub fn from_result(result: Result<i32, Errno>) -> Self {
        match result {
            Ok(value) => Self::Return(value),
            Err(errno) => Self::err(errno),
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_sentinel(&self) -> bool {
        !matches!(self, Self::Return(_))
    }

    /// Return value when this is a concrete result
    #[inline]
    #[must_use]
    pub const fn value(&self) -> Option<i32> {
        match self {
            Self::Return(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<Errno> for SyscallOutcome {
    fn from(errno: Errno) -> Self {
        Self::err(errno)
    }
}

/// How one trap left the thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrapDisposition {
    /// Result committed (or EIP already positioned); keep running
    Resumed,
    /// Blocked; re-run the same trap when the thread is woken
    Suspended,
    /// A signal handler must run first; the syscall did not execute
    SignalDiverted,
    /// The thread was terminating; torn down without dispatch
    ThreadTerminating,
}
