/*!
 * Scheduler Module
 * Cooperative time-slicing of guest threads on one host thread
 */

pub mod cooperative;
pub mod traits;
pub mod types;

// Re-export public API
pub use cooperative::CooperativeScheduler;
pub use traits::QuantumRunner;
pub use types::{HostFault, QuantumOutcome, SchedulerExit, SchedulerStats, SliceExit};
