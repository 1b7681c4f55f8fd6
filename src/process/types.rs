/*!
 * Process Types
 * Guest register file and thread state
 */

use serde::{Deserialize, Serialize};

/// Guest thread state as seen by the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadState {
    /// Ready to run a quantum
    Runnable,
    /// Parked on a blocked syscall until woken
    Blocked,
    /// Torn down; never runs again
    Terminated,
}

/// Opaque handle to the CPU core's cached next execution block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockHandle(pub u64);

/// 32-bit x86 general register file plus the execution bookkeeping the trap
/// engine touches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuState {
    pub eax: u32,
    pub ebx: u32,
    pub ecx: u32,
    pub edx: u32,
    pub esi: u32,
    pub edi: u32,
    pub ebp: u32,
    pub esp: u32,
    pub eip: u32,

    /// Block the core will run next; cleared whenever control flow may
    /// have changed underneath it
    pub next_block: Option<BlockHandle>,

    /// Instructions charged against the current quantum
    pub block_instruction_count: u64,
}

impl CpuState {
    #[inline]
    pub fn clear_next_block(&mut self) {
        self.next_block = None;
    }

    /// Syscall argument registers in ABI order
    #[inline]
    pub fn syscall_args(&self) -> [u32; 6] {
        [self.ebx, self.ecx, self.edx, self.esi, self.edi, self.ebp]
    }
}
