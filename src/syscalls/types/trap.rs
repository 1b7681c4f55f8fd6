/*!
 * Syscall Trap
 * One trapped syscall as read from the guest register file
 */

use crate::process::CpuState;
use serde::{Deserialize, Serialize};

/// Syscall number, six argument registers, and trap instruction length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyscallTrap {
    /// EAX
    pub number: u32,
    /// EBX, ECX, EDX, ESI, EDI, EBP
    pub args: [u32; 6],
    /// Bytes EIP advances by when the syscall returns a value
    pub instruction_len: u32,
}

impl SyscallTrap {
    #[inline]
    pub fn from_cpu(cpu: &CpuState, instruction_len: u32) -> Self {
        Self {
            number: cpu.eax,
            args: cpu.syscall_args(),
            instruction_len,
        }
    }
}
