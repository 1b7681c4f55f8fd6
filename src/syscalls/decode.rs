/*!
 * Argument Decoding
 *
 * Each registration declares its arguments; the dispatcher decodes them
 * from the argument registers (and guest memory, for strings) before the
 * handler runs. A string that cannot be read fails the syscall with
 * EFAULT or ENAMETOOLONG without invoking the handler.
 */

use super::types::{Errno, TrapError};
use crate::core::limits::MAX_FILEPATH_LEN;
use crate::core::types::GuestAddr;
use crate::memory::{GuestAddressSpace, GuestStringError};
use serde::Serialize;
use std::fmt;

/// Declared kind of one argument register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ArgSpec {
    Int,
    UInt,
    Fd,
    Addr,
    /// NUL-terminated path, read from guest memory
    Path,
    /// Path that may be NULL (utimensat on a descriptor)
    OptPath,
    /// NULL-terminated array of string pointers, read from guest memory
    StrArray,
}

/// Decoded argument value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    Int(i32),
    UInt(u32),
    Fd(i32),
    Addr(GuestAddr),
    Path(String),
    OptPath(Option<String>),
    StrArray(Vec<String>),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Int(v) => write!(f, "{v}"),
            ArgValue::UInt(v) => write!(f, "{v:#x}"),
            ArgValue::Fd(v) => write!(f, "fd={v}"),
            ArgValue::Addr(v) => write!(f, "{v}"),
            ArgValue::Path(v) => write!(f, "{v:?}"),
            ArgValue::OptPath(Some(v)) => write!(f, "{v:?}"),
            ArgValue::OptPath(None) => write!(f, "NULL"),
            ArgValue::StrArray(v) => write!(f, "{v:?}"),
        }
    }
}

/// Arguments of one trapped syscall
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedArgs {
    syscall: &'static str,
    raw: [u32; 6],
    values: Vec<ArgValue>,
}

impl DecodedArgs {
    pub fn decode(
        syscall: &'static str,
        specs: &[ArgSpec],
        raw: [u32; 6],
        memory: &GuestAddressSpace,
    ) -> Result<Self, Errno> {
        let mut values = Vec::with_capacity(specs.len());
        for (spec, &reg) in specs.iter().zip(raw.iter()) {
            let value = match spec {
                ArgSpec::Int => ArgValue::Int(reg as i32),
                ArgSpec::UInt => ArgValue::UInt(reg),
                ArgSpec::Fd => ArgValue::Fd(reg as i32),
                ArgSpec::Addr => ArgValue::Addr(GuestAddr::new(reg)),
                ArgSpec::Path => {
                    if reg == 0 {
                        return Err(Errno::EFAULT);
                    }
                    ArgValue::Path(read_path(memory, reg)?)
                }
                ArgSpec::OptPath => match reg {
                    0 => ArgValue::OptPath(None),
                    _ => ArgValue::OptPath(Some(read_path(memory, reg)?)),
                },
                ArgSpec::StrArray => {
                    let strings = if reg == 0 {
                        Vec::new()
                    } else {
                        memory
                            .read_string_array(GuestAddr::new(reg))
                            .map_err(|e| string_errno(e, Errno::E2BIG))?
                    };
                    ArgValue::StrArray(strings)
                }
            };
            values.push(value);
        }
        Ok(Self { syscall, raw, values })
    }

    /// Arguments taken straight from the registers, no memory reads
    pub fn registers(syscall: &'static str, raw: [u32; 6]) -> Self {
        Self {
            syscall,
            raw,
            values: Vec::new(),
        }
    }

    #[inline]
    pub fn raw(&self, index: usize) -> u32 {
        self.raw.get(index).copied().unwrap_or(0)
    }

    #[inline]
    pub fn int(&self, index: usize) -> i32 {
        self.raw(index) as i32
    }

    #[inline]
    pub fn uint(&self, index: usize) -> u32 {
        self.raw(index)
    }

    #[inline]
    pub fn fd(&self, index: usize) -> i32 {
        self.raw(index) as i32
    }

    #[inline]
    pub fn addr(&self, index: usize) -> GuestAddr {
        GuestAddr::new(self.raw(index))
    }

    pub fn path(&self, index: usize) -> Result<&str, TrapError> {
        match self.values.get(index) {
            Some(ArgValue::Path(path)) => Ok(path),
            _ => Err(self.mismatch(index, ArgSpec::Path)),
        }
    }

    /// `None` when the guest passed NULL
    pub fn opt_path(&self, index: usize) -> Result<Option<&str>, TrapError> {
        match self.values.get(index) {
            Some(ArgValue::OptPath(path)) => Ok(path.as_deref()),
            _ => Err(self.mismatch(index, ArgSpec::OptPath)),
        }
    }

    pub fn strings(&self, index: usize) -> Result<&[String], TrapError> {
        match self.values.get(index) {
            Some(ArgValue::StrArray(strings)) => Ok(strings),
            _ => Err(self.mismatch(index, ArgSpec::StrArray)),
        }
    }

    #[inline]
    pub fn values(&self) -> &[ArgValue] {
        &self.values
    }

    fn mismatch(&self, index: usize, expected: ArgSpec) -> TrapError {
        TrapError::ArgumentSpec {
            syscall: self.syscall,
            index,
            expected,
        }
    }
}

impl fmt::Display for DecodedArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

fn read_path(memory: &GuestAddressSpace, reg: u32) -> Result<String, Errno> {
    memory
        .read_cstring(GuestAddr::new(reg), MAX_FILEPATH_LEN - 1)
        .map_err(|e| string_errno(e, Errno::ENAMETOOLONG))
}

fn string_errno(err: GuestStringError, too_long: Errno) -> Errno {
    match err {
        GuestStringError::Fault(_) => Errno::EFAULT,
        GuestStringError::TooLong { .. } => too_long,
    }
}
