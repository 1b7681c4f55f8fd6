/*!
 * Substrate Configuration
 *
 * Runtime policy for the address space and trap engine. Built from presets,
 * `GUEST_*` environment variables, or a JSON file.
 */

use super::errors::ConfigError;
use super::limits::{
    DEFAULT_CODE_REWRITE_THRESHOLD, DEFAULT_COOPERATIVE_CONTEXT_TIME,
    DEFAULT_MAX_RESERVATION_PROBES, GUEST_PAGE_SIZE,
};
use crate::syscalls::SyscallCategory;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How guest threads map onto host threads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingModel {
    /// One host thread time-slices every guest thread
    Cooperative,
    /// One host thread per guest thread
    MultiThreaded,
}

/// Substrate configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubstrateConfig {
    /// Scheduling model the trap engine runs under
    pub scheduling: SchedulingModel,

    /// Reserve the 32 GiB EIP -> translated code lookup table
    pub large_address_space: bool,

    /// Override of the host allocation granularity in bytes
    pub allocation_granularity: Option<usize>,

    /// Write-fault retranslations before a code page stays writable
    pub code_rewrite_threshold: u8,

    /// Treat protecting a writable-permanent page as host-fatal
    pub strict_code_protection: bool,

    /// Number of 4 GiB-aligned candidate addresses probed per reservation
    pub max_reservation_probes: u32,

    /// Syscall categories traced on every trap
    pub syscall_trace_mask: SyscallCategory,

    /// Instructions charged per 10 ms of syscall time (cooperative only)
    pub cooperative_context_time: u64,
}

impl Default for SubstrateConfig {
    fn default() -> Self {
        Self::cooperative()
    }
}

impl SubstrateConfig {
    /// Single host thread, synchronous fault interposition
    pub fn cooperative() -> Self {
        Self {
            scheduling: SchedulingModel::Cooperative,
            large_address_space: false,
            allocation_granularity: None,
            code_rewrite_threshold: DEFAULT_CODE_REWRITE_THRESHOLD,
            strict_code_protection: false,
            max_reservation_probes: DEFAULT_MAX_RESERVATION_PROBES,
            syscall_trace_mask: SyscallCategory::empty(),
            cooperative_context_time: DEFAULT_COOPERATIVE_CONTEXT_TIME,
        }
    }

    /// One host thread per guest thread, check-then-access faults only
    pub fn multi_threaded() -> Self {
        Self {
            scheduling: SchedulingModel::MultiThreaded,
            ..Self::cooperative()
        }
    }

    /// Windows-like 64 KiB grains so grain rounding is observable on any host
    pub fn testing() -> Self {
        Self {
            allocation_granularity: Some(64 * 1024),
            ..Self::cooperative()
        }
    }

    /// Apply `GUEST_*` environment overrides on top of the defaults
    ///
    /// Environment variables:
    /// - GUEST_SCHEDULING: `cooperative` | `multi_threaded`
    /// - GUEST_LARGE_ADDRESS_SPACE: `1` | `true`
    /// - GUEST_ALLOCATION_GRANULARITY: bytes
    /// - GUEST_CODE_REWRITE_THRESHOLD: retranslations
    /// - GUEST_STRICT_CODE_PROTECTION: `1` | `true`
    /// - GUEST_SYSCALL_TRACE: `|`-separated category names, or `all`
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("GUEST_SCHEDULING") {
            config.scheduling = match value.as_str() {
                "cooperative" => SchedulingModel::Cooperative,
                "multi_threaded" => SchedulingModel::MultiThreaded,
                _ => return Err(invalid("GUEST_SCHEDULING", value)),
            };
        }
        if let Ok(value) = std::env::var("GUEST_LARGE_ADDRESS_SPACE") {
            config.large_address_space = parse_flag(&value);
        }
        if let Ok(value) = std::env::var("GUEST_ALLOCATION_GRANULARITY") {
            let bytes = value
                .parse::<usize>()
                .map_err(|_| invalid("GUEST_ALLOCATION_GRANULARITY", value.clone()))?;
            config.allocation_granularity = Some(bytes);
        }
        if let Ok(value) = std::env::var("GUEST_CODE_REWRITE_THRESHOLD") {
            config.code_rewrite_threshold = value
                .parse::<u8>()
                .map_err(|_| invalid("GUEST_CODE_REWRITE_THRESHOLD", value.clone()))?;
        }
        if let Ok(value) = std::env::var("GUEST_STRICT_CODE_PROTECTION") {
            config.strict_code_protection = parse_flag(&value);
        }
        if let Ok(value) = std::env::var("GUEST_SYSCALL_TRACE") {
            config.syscall_trace_mask = if value == "all" {
                SyscallCategory::all()
            } else {
                bitflags::parser::from_str::<SyscallCategory>(&value.to_ascii_uppercase())
                    .map_err(|_| invalid("GUEST_SYSCALL_TRACE", value.clone()))?
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: Self = serde_json::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the substrate cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(bytes) = self.allocation_granularity {
            if bytes == 0 || bytes % GUEST_PAGE_SIZE != 0 {
                return Err(ConfigError::InvalidGranularity(bytes));
            }
        }
        // 255 is reserved so the per-page u8 counter cannot wrap
        if self.code_rewrite_threshold == 0 || self.code_rewrite_threshold == u8::MAX {
            return Err(ConfigError::InvalidRewriteThreshold(self.code_rewrite_threshold));
        }
        if self.max_reservation_probes == 0 {
            return Err(ConfigError::NoReservationProbes);
        }
        Ok(())
    }

    #[inline]
    pub fn is_cooperative(&self) -> bool {
        self.scheduling == SchedulingModel::Cooperative
    }
}

fn parse_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

fn invalid(key: &'static str, value: String) -> ConfigError {
    ConfigError::InvalidEnvValue { key, value }
}
