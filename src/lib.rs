/*!
 * Guest Kernel Library
 *
 * Address space substrate and syscall trap engine for running 32-bit x86
 * guests over an emulated Linux kernel layer.
 */

#[cfg(not(target_pointer_width = "64"))]
compile_error!("the guest address space reservation needs a 64-bit host");

pub mod core;
pub mod memory;
pub mod monitoring;
pub mod process;
pub mod scheduler;
pub mod syscalls;

// Re-exports
pub use core::{
    ConfigError, GuestAddr, GuestPage, KernelError, KernelResult, Pid, SchedulingModel,
    SubstrateConfig, Tid,
};
pub use memory::{
    AccessError, AccessKind, CooperativeFaultInterposer, FaultInterposer, FaultResolution,
    GuestAddressSpace, GuestFault, MemoryError, NativeHostMemory, NoTranslationCache, PageFlags,
    TranslationCache,
};
pub use monitoring::{init_tracing, TrapMetricsSnapshot};
pub use process::{CpuState, GuestThread, ThreadState};
pub use scheduler::{CooperativeScheduler, QuantumRunner};
pub use syscalls::{
    default_table, Errno, KernelServices, SyscallOutcome, SyscallTable, SyscallTrapHandler,
    TrapDisposition, TrapError,
};
