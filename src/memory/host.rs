/*!
 * Host Virtual Memory
 *
 * The host OS surface the address space consumes: reserve, commit,
 * decommit, protect, and release of virtual ranges, plus the page size and
 * allocation granularity policy layered on top of it.
 */

use super::types::{MemoryError, MemoryResult};
use crate::core::limits::GUEST_PAGE_SIZE;
use nix::errno::Errno as HostErrno;
use std::ptr::NonNull;
use tracing::debug;

/// Host result type (errors carry the host errno)
pub type HostResult<T> = Result<T, HostErrno>;

/// Protection applied to committed host pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostProtection {
    ReadOnly,
    ReadWrite,
}

/// Host virtual memory primitives
///
/// # Safety
///
/// The `unsafe` methods change the accessibility of arbitrary host memory.
/// Callers must only pass ranges that lie inside a reservation previously
/// returned by `reserve` on the same host and not yet released.
pub trait HostVirtualMemory: Send + Sync {
    /// Host page size in bytes
    fn page_size(&self) -> HostResult<usize>;

    /// Minimum commit/decommit granularity in bytes
    fn allocation_granularity(&self) -> HostResult<usize>;

    /// Reserve an inaccessible range, preferring `hint`. Returns the actual
    /// placement, which may differ from the hint.
    fn reserve(&self, hint: usize, len: usize) -> HostResult<NonNull<u8>>;

    /// Return a whole reservation to the host
    unsafe fn release(&self, base: NonNull<u8>, len: usize) -> HostResult<()>;

    /// Back a reserved range with storage, readable and writable
    unsafe fn commit(&self, addr: NonNull<u8>, len: usize) -> HostResult<()>;

    /// Drop the storage behind a committed range, leaving it reserved
    unsafe fn decommit(&self, addr: NonNull<u8>, len: usize) -> HostResult<()>;

    /// Change protection of a committed range
    unsafe fn protect(&self, addr: NonNull<u8>, len: usize, prot: HostProtection) -> HostResult<()>;
}

/// One reserved host range. The base never moves for the lifetime of the
/// reservation; every host address is derived from it by offset.
#[derive(Debug)]
pub struct HostRegion {
    base: NonNull<u8>,
    len: usize,
}

// the base pointer prevents these from auto-deriving
unsafe impl Send for HostRegion {}
unsafe impl Sync for HostRegion {}

impl HostRegion {
    pub(crate) fn new(base: NonNull<u8>, len: usize) -> Self {
        Self { base, len }
    }

    #[inline]
    pub(crate) fn base(&self) -> NonNull<u8> {
        self.base
    }

    #[inline]
    pub fn base_address(&self) -> usize {
        self.base.as_ptr() as usize
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Host pointer `offset` bytes into the region, provided `offset + span`
    /// lies inside it
    #[inline]
    pub(crate) fn at(&self, offset: usize, span: usize) -> MemoryResult<NonNull<u8>> {
        if offset > self.len || span > self.len - offset {
            return Err(MemoryError::HostRange {
                offset,
                span,
                len: self.len,
            });
        }
        // SAFETY: bounds checked above; the region is one contiguous reservation
        Ok(unsafe { NonNull::new_unchecked(self.base.as_ptr().add(offset)) })
    }

    /// Offset of a host address inside the region
    #[inline]
    pub fn offset_of(&self, host_addr: usize) -> Option<usize> {
        let base = self.base_address();
        if host_addr >= base && host_addr - base < self.len {
            Some(host_addr - base)
        } else {
            None
        }
    }
}

/// Page size and grain policy for the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostPageAllocator {
    page_size: usize,
    granularity: usize,
}

impl HostPageAllocator {
    /// Query the host and apply an optional granularity override.
    ///
    /// The override may only coarsen the grain: it is raised to at least the
    /// host's own granularity.
    pub fn probe(host: &dyn HostVirtualMemory, granularity_override: Option<usize>) -> MemoryResult<Self> {
        let page_size = host.page_size().map_err(MemoryError::HostQuery)?;
        if page_size != GUEST_PAGE_SIZE {
            return Err(MemoryError::UnsupportedPageSize(page_size));
        }

        let host_granularity = host.allocation_granularity().map_err(MemoryError::HostQuery)?;
        let granularity = match granularity_override {
            Some(bytes) => bytes.max(host_granularity),
            None => host_granularity,
        };
        if granularity == 0 || granularity % GUEST_PAGE_SIZE != 0 {
            return Err(MemoryError::UnsupportedGranularity(granularity));
        }

        debug!(page_size, granularity, "Host page geometry");
        Ok(Self {
            page_size,
            granularity,
        })
    }

    #[inline]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    #[inline]
    pub fn granularity(&self) -> usize {
        self.granularity
    }

    /// Guest pages per commit grain
    #[inline]
    pub fn grain_pages(&self) -> u32 {
        self.units_per_grain(GUEST_PAGE_SIZE)
    }

    /// Tracked units of `unit_bytes` each covered by one commit grain. A
    /// unit larger than the grain commits as a single unit.
    #[inline]
    pub fn units_per_grain(&self, unit_bytes: usize) -> u32 {
        self.granularity.div_ceil(unit_bytes).max(1) as u32
    }
}
