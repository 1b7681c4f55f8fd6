/*!
 * Core Module
 * Shared types, limits, errors, and configuration
 */

pub mod config;
pub mod errors;
pub mod limits;
pub mod types;

pub use config::{SchedulingModel, SubstrateConfig};
pub use errors::{ConfigError, KernelError, KernelResult};
pub use types::{GuestAddr, GuestPage, Pid, Tid};
