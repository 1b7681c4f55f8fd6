/*!
 * Syscall Handlers
 *
 * Thin shims between the dispatch table and the kernel collaborators. Each
 * one reads its decoded arguments, calls one collaborator method, and
 * returns the collaborator's outcome. Local logic is limited to argument
 * reshaping (64-bit offsets, socketcall and ipc demultiplexing, old-style mmap).
 */

pub(crate) mod files;
pub(crate) mod futex;
pub(crate) mod memory;
pub(crate) mod network;
pub(crate) mod process;
pub(crate) mod signal;
pub(crate) mod time;

use super::types::{Errno, SyscallOutcome, TrapError};
use crate::memory::AccessError;

pub type HandlerResult = Result<SyscallOutcome, TrapError>;

/// Guest faults become EFAULT; host failures stay fatal
pub(crate) fn guest_access<T>(result: Result<T, AccessError>) -> Result<Result<T, Errno>, TrapError> {
    match result {
        Ok(value) => Ok(Ok(value)),
        Err(AccessError::Fault(_)) => Ok(Err(Errno::EFAULT)),
        Err(AccessError::Host(err)) => Err(err.into()),
    }
}

/// Combine a split 64-bit value passed in two registers
#[inline]
pub(crate) fn join_u64(low: u32, high: u32) -> u64 {
    (u64::from(high) << 32) | u64::from(low)
}
