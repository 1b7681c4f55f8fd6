/*!
 * Syscalls Module
 * Linux i386 syscall dispatch for guest threads
 */

pub mod decode;
pub mod handlers;
pub mod numbers;
pub mod registry;
pub mod table;
pub mod traits;
pub mod trap;
pub mod types;

// Re-export public API
pub use decode::{ArgSpec, ArgValue, DecodedArgs};
pub use handlers::network::decode_socket_call;
pub use registry::default_table;
pub use table::{
    SyscallCategory, SyscallContext, SyscallEntry, SyscallHandlerFn, SyscallLookup, SyscallTable,
    SyscallTableBuilder,
};
pub use traits::{
    FileOps, FileTarget, FutexOps, KernelServices, MemoryMapOps, ProcessId, ProcessOps, ShmCall, SignalOps,
    SocketCall, SocketOps, TimeOps, TimeLayout, TimesLayout, UnsupportedKernel,
};
pub use trap::SyscallTrapHandler;
pub use types::{Errno, SyscallOutcome, SyscallTrap, TrapDisposition, TrapError};
