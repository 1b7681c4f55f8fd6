/*!
 * Error Types
 * Host-fatal error handling with thiserror and miette
 */

use miette::Diagnostic;
use thiserror::Error;

pub use crate::memory::{GuestFault, MemoryError};
pub use crate::syscalls::TrapError;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ConfigError {
    #[error("Invalid allocation granularity: {0} bytes")]
    #[diagnostic(
        code(config::granularity),
        help("The granularity must be a non-zero multiple of the 4 KiB guest page size.")
    )]
    InvalidGranularity(usize),

    #[error("Invalid code rewrite threshold: {0}")]
    #[diagnostic(
        code(config::rewrite_threshold),
        help("The threshold must be between 1 and 254.")
    )]
    InvalidRewriteThreshold(u8),

    #[error("Reservation probe count must be non-zero")]
    #[diagnostic(code(config::probes))]
    NoReservationProbes,

    #[error("Invalid value for {key}: {value}")]
    #[diagnostic(code(config::env))]
    InvalidEnvValue { key: &'static str, value: String },

    #[error("Failed to read config file: {0}")]
    #[diagnostic(code(config::io))]
    Io(String),

    #[error("Failed to parse config file: {0}")]
    #[diagnostic(code(config::parse))]
    Parse(String),
}

/// Top-level error for an emulator session. Every variant is fatal to the
/// session that produced it.
#[derive(Error, Debug, Diagnostic)]
pub enum KernelError {
    #[error("Memory error: {0}")]
    #[diagnostic(transparent)]
    Memory(#[from] MemoryError),

    #[error("Trap error: {0}")]
    #[diagnostic(transparent)]
    Trap(#[from] TrapError),

    #[error("Configuration error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

/// Session-level result
pub type KernelResult<T> = Result<T, KernelError>;
