/*!
 * Trap Error Types
 * Internal invariant violations raised while dispatching a guest trap
 */

use crate::core::types::Tid;
use crate::memory::MemoryError;
use crate::syscalls::decode::ArgSpec;
use miette::Diagnostic;
use thiserror::Error;

/// Host-fatal trap errors. Guest-caused failures never surface here; they
/// become negative errno returns instead.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[non_exhaustive]
pub enum TrapError {
    /// A signal was latched to start but the syscall ran to completion
    #[error("Syscall {syscall} was not interrupted correctly by signal (thread {tid})")]
    #[diagnostic(
        code(trap::signal_not_interrupted),
        help("The signal collaborator must divert the trap before dispatch when it latches a start request.")
    )]
    SignalNotInterrupted { tid: Tid, syscall: u32 },

    /// Two registrations claimed the same slot
    #[error("Syscall {number} registered twice ({existing} and {name})")]
    #[diagnostic(code(trap::duplicate_syscall))]
    DuplicateSyscall {
        number: u32,
        existing: &'static str,
        name: &'static str,
    },

    /// Registration outside the ABI range
    #[error("Syscall {name} has number {number} beyond the dispatch table")]
    #[diagnostic(code(trap::syscall_out_of_range))]
    SyscallOutOfRange { number: u32, name: &'static str },

    /// A handler read an argument its registration does not declare
    #[error("Syscall {syscall} read argument {index} as {expected:?}, which its registration does not declare")]
    #[diagnostic(code(trap::argument_spec))]
    ArgumentSpec {
        syscall: &'static str,
        index: usize,
        expected: ArgSpec,
    },

    /// Protocol-level impossibility detected by a handler
    #[error("Invariant violated in {syscall}: {detail}")]
    #[diagnostic(code(trap::invariant))]
    Invariant { syscall: &'static str, detail: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Memory(#[from] MemoryError),
}

impl TrapError {
    #[inline]
    pub fn invariant(syscall: &'static str, detail: impl Into<String>) -> Self {
        Self::Invariant {
            syscall,
            detail: detail.into(),
        }
    }
}
