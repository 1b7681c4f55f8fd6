/*!
 * Process Module
 * Guest threads and their register state
 */

pub mod thread;
pub mod types;

// Re-export for convenience
pub use thread::{GuestThread, ThreadSignals};
pub use types::{BlockHandle, CpuState, ThreadState};
