/*!
 * Syscall Types Module
 * Trap records, handler outcomes, guest errno, and trap errors
 */

mod errno;
mod errors;
mod results;
mod trap;

// Re-export all public types
pub use errno::Errno;
pub use errors::TrapError;
pub use results::{SyscallOutcome, TrapDisposition};
pub use trap::SyscallTrap;
