/*!
 * Memory Types
 * Page state, guest-visible faults, and host-fatal memory errors
 */

use crate::core::types::GuestAddr;
use bitflags::bitflags;
use miette::Diagnostic;
use nix::errno::Errno as HostErrno;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Memory operation result (errors are host-fatal)
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Host-fatal memory errors. Guest-visible memory state cannot be trusted
/// after any of these, so the owning session must stop.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum MemoryError {
    #[error("Unsupported host page size: {0} bytes")]
    #[diagnostic(
        code(memory::host_page_size),
        help("Guest pages are 4 KiB; the host page size must match exactly.")
    )]
    UnsupportedPageSize(usize),

    #[error("Unsupported host allocation granularity: {0} bytes")]
    #[diagnostic(
        code(memory::host_granularity),
        help("The allocation granularity must be a non-zero multiple of 4 KiB.")
    )]
    UnsupportedGranularity(usize),

    #[error("Failed to query host memory geometry: {0}")]
    #[diagnostic(code(memory::host_query))]
    HostQuery(HostErrno),

    #[error("Failed to reserve {len:#x} bytes after {probes} candidate addresses")]
    #[diagnostic(
        code(memory::reserve),
        help("Host address space is exhausted or an incompatible module occupies the guest placement.")
    )]
    ReservationExhausted { len: usize, probes: u32 },

    #[error("Failed to release host reservation at {base:#x}: {errno}")]
    #[diagnostic(code(memory::release))]
    Release { base: usize, errno: HostErrno },

    #[error("Failed to commit memory: grain page={grain_page:#x} page={page:#x} count={count}: {errno}")]
    #[diagnostic(code(memory::commit))]
    Commit {
        grain_page: u32,
        page: u32,
        count: u32,
        errno: HostErrno,
    },

    #[error("Failed to decommit memory at page {page:#x}: {errno}")]
    #[diagnostic(code(memory::decommit))]
    Decommit { page: u32, errno: HostErrno },

    #[error("Failed to change protection of page {page:#x}: {errno}")]
    #[diagnostic(code(memory::protect))]
    Protect { page: u32, errno: HostErrno },

    #[error("Tried to make dynamic code page {0:#x} read-only")]
    #[diagnostic(
        code(memory::protect_dynamic),
        help("Pages that exceeded the rewrite threshold are never protected again.")
    )]
    ProtectDynamicPage(u32),

    #[error("Code page {0:#x} is not mapped")]
    #[diagnostic(code(memory::code_page_unmapped))]
    CodePageUnmapped(u32),

    #[error("Page range {first:#x}+{count} is outside the guest address space")]
    #[diagnostic(code(memory::range))]
    PageRange { first: u32, count: u32 },

    #[error("Host range {offset:#x}+{span:#x} is outside a {len:#x} byte region")]
    #[diagnostic(code(memory::host_range))]
    HostRange { offset: usize, span: usize, len: usize },

    #[error("Protection fault at host address {0:#x} outside the guest reservation")]
    #[diagnostic(
        code(memory::foreign_fault),
        help("The fault did not come from guest memory; it is a host crash.")
    )]
    ForeignFault(usize),

    #[error("Code lookup slot for {0} is not committed")]
    #[diagnostic(code(memory::lookup_uncommitted))]
    LookupNotCommitted(GuestAddr),
}

/// Kind of access that faulted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    Read,
    Write,
    Execute,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessKind::Read => write!(f, "read"),
            AccessKind::Write => write!(f, "write"),
            AccessKind::Execute => write!(f, "execute"),
        }
    }
}

/// Guest-visible access violation, delivered to the guest as SIGSEGV
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[error("Guest {access} fault at {address}")]
pub struct GuestFault {
    pub address: GuestAddr,
    pub access: AccessKind,
}

impl GuestFault {
    #[inline]
    pub const fn new(address: GuestAddr, access: AccessKind) -> Self {
        Self { address, access }
    }
}

/// Failures reading strings out of guest memory
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuestStringError {
    #[error(transparent)]
    Fault(#[from] GuestFault),

    #[error("String at {address} exceeds {max_len} bytes")]
    TooLong { address: GuestAddr, max_len: usize },
}

/// Failures writing guest memory
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// Guest-visible; the guest sees EFAULT or SIGSEGV
    #[error(transparent)]
    Fault(#[from] GuestFault),

    /// Host-fatal; raised while unprotecting a code page
    #[error(transparent)]
    Host(#[from] MemoryError),
}

bitflags! {
    /// Per-page logical state
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct PageFlags: u8 {
        /// Page belongs to a guest mapping
        const MAPPED = 0x01;
        const READ = 0x02;
        const WRITE = 0x04;
        const EXEC = 0x08;
        /// Host page is read-only because a translation is cached for it
        const CODE_READONLY = 0x10;
        /// Rewrite threshold exceeded; never protected again
        const DYNAMIC_CODE = 0x20;

        const READ_WRITE = Self::READ.bits() | Self::WRITE.bits();
        const ALL = Self::READ.bits() | Self::WRITE.bits() | Self::EXEC.bits();
    }
}

impl PageFlags {
    /// Permissions requested by a guest mapping, without bookkeeping bits
    #[inline]
    #[must_use]
    pub fn permissions(self) -> Self {
        self & Self::ALL
    }

    #[inline]
    pub fn allows(self, access: AccessKind) -> bool {
        if !self.contains(Self::MAPPED) {
            return false;
        }
        match access {
            // i386 paging cannot express execute-only pages
            AccessKind::Read => self.intersects(Self::READ | Self::EXEC),
            AccessKind::Write => self.contains(Self::WRITE),
            AccessKind::Execute => self.intersects(Self::READ | Self::EXEC),
        }
    }

    /// Code page state derived from the bookkeeping bits
    #[inline]
    pub fn code_state(self) -> CodePageState {
        if self.contains(Self::DYNAMIC_CODE) {
            CodePageState::WritablePermanent
        } else if self.contains(Self::CODE_READONLY) {
            CodePageState::ReadOnlyTracked
        } else {
            CodePageState::Writable
        }
    }
}

/// Protection state of a page with respect to translated code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodePageState {
    Writable,
    ReadOnlyTracked,
    WritablePermanent,
}

/// Result of asking for a page to be protected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectOutcome {
    Protected,
    AlreadyProtected,
    /// Page is writable-permanent; request ignored
    Ignored,
}

/// Result of a write landing on a code page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeWriteOutcome {
    /// Page was not protected (or another thread already handled the fault)
    NotProtected,
    /// Page unprotected and its translation dropped
    Unprotected { rewrite_count: u8, permanent: bool },
}

/// Address space statistics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressSpaceStats {
    pub committed_pages: u64,
    pub protected_code_pages: u64,
    pub code_write_faults: u64,
    pub dynamic_code_pages: u64,
    pub translations_invalidated: u64,
}
