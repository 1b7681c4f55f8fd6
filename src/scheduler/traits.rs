/*!
 * Scheduler Traits
 * The CPU core as seen by the cooperative scheduler
 */

use super::types::{HostFault, SliceExit};
use crate::memory::GuestAddressSpace;
use crate::process::GuestThread;

/// Runs translated guest code for one thread
pub trait QuantumRunner {
    /// Execute `thread` until it traps, its instruction budget runs out, or
    /// it halts. A host protection fault stops execution at the faulting
    /// instruction and is returned as `Err`.
    fn run_quantum(&mut self, thread: &mut GuestThread, memory: &GuestAddressSpace) -> Result<SliceExit, HostFault>;
}
