/*!
 * Guest Address Space
 *
 * One 4 GiB host reservation per guest process. Every guest address maps to
 * `base + guest`; the base never moves, and derived host addresses never
 * leave this module. Logical page state lives in side tables guarded by a
 * single reader/writer lock: guest data accesses share it, while mapping,
 * commit, and code page transitions take it exclusively so no thread sees a
 * page as protected after its translation was dropped.
 */

use super::bitmap::PageFlagTable;
use super::code_lookup::CodeLookupTable;
use super::code_pages::{CodePageProtector, HostPages, TranslationCache};
use super::commit::{FillPattern, PageCommitManager};
use super::host::{HostPageAllocator, HostVirtualMemory};
use super::native::NativeHostMemory;
use super::reservation::AddressSpaceReservation;
use super::types::{
    AddressSpaceStats, CodePageState, CodeWriteOutcome, MemoryError, MemoryResult, PageFlags, ProtectOutcome,
};
use crate::core::config::SubstrateConfig;
use crate::core::limits::{GUEST_ADDRESS_SPACE_SIZE, GUEST_PAGE_SIZE, NUMBER_OF_GUEST_PAGES};
use crate::core::types::{GuestAddr, GuestPage};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

pub struct GuestAddressSpace {
    pub(super) reservation: AddressSpaceReservation,
    allocator: HostPageAllocator,
    pub(super) lock: RwLock<()>,
    pub(super) flags: PageFlagTable,
    pub(super) commits: PageCommitManager,
    pub(super) code: CodePageProtector,
    code_lookup: Option<CodeLookupTable>,
}

impl GuestAddressSpace {
    /// Reserve a guest address space (and the code lookup table in
    /// large-address mode) on `host`
    pub fn new(
        config: &SubstrateConfig,
        host: Arc<dyn HostVirtualMemory>,
        cache: Arc<dyn TranslationCache>,
    ) -> MemoryResult<Self> {
        let allocator = HostPageAllocator::probe(host.as_ref(), config.allocation_granularity)?;
        let reservation =
            AddressSpaceReservation::reserve(Arc::clone(&host), GUEST_ADDRESS_SPACE_SIZE, config.max_reservation_probes)?;
        let code_lookup = if config.large_address_space {
            Some(CodeLookupTable::reserve(host, &allocator, config.max_reservation_probes)?)
        } else {
            None
        };

        info!(
            base = format_args!("{:#x}", reservation.region().base_address()),
            grain_pages = allocator.grain_pages(),
            large_address_space = code_lookup.is_some(),
            "Guest address space ready"
        );

        Ok(Self {
            reservation,
            commits: PageCommitManager::new(&allocator, GUEST_PAGE_SIZE, NUMBER_OF_GUEST_PAGES),
            allocator,
            lock: RwLock::new(()),
            flags: PageFlagTable::new(NUMBER_OF_GUEST_PAGES),
            code: CodePageProtector::new(
                NUMBER_OF_GUEST_PAGES,
                config.code_rewrite_threshold,
                config.strict_code_protection,
                cache,
            ),
            code_lookup,
        })
    }

    /// Address space over the running process's own memory
    pub fn native(config: &SubstrateConfig, cache: Arc<dyn TranslationCache>) -> MemoryResult<Self> {
        Self::new(config, Arc::new(NativeHostMemory::new()), cache)
    }

    #[inline]
    pub fn allocator(&self) -> &HostPageAllocator {
        &self.allocator
    }

    /// Base the translator adds to guest addresses in emitted code
    #[inline]
    pub fn host_base(&self) -> usize {
        self.reservation.region().base_address()
    }

    /// Guest address of a host address inside this reservation
    #[inline]
    pub fn guest_address_of(&self, host_addr: usize) -> Option<GuestAddr> {
        self.reservation
            .region()
            .offset_of(host_addr)
            .map(|offset| GuestAddr::new(offset as u32))
    }

    pub fn code_lookup(&self) -> Option<&CodeLookupTable> {
        self.code_lookup.as_ref()
    }

    pub(super) fn host_pages(&self) -> HostPages<'_> {
        HostPages {
            host: self.reservation.host(),
            region: self.reservation.region(),
            flags: &self.flags,
        }
    }

    /// Ensure pages `[first, first + count)` are backed, filling newly
    /// committed grains with `fill`. Whole grains commit together.
    pub fn commit_range(&self, first: GuestPage, count: u32, fill: u32) -> MemoryResult<u32> {
        let _guard = self.lock.write();
        self.commit_locked(first, count, fill)
    }

    fn commit_locked(&self, first: GuestPage, count: u32, fill: u32) -> MemoryResult<u32> {
        let pattern = if fill == 0 {
            FillPattern::Zero
        } else {
            FillPattern::Word32(fill)
        };
        self.commits
            .commit_range(self.reservation.host(), self.reservation.region(), first.0, count, pattern)
    }

    #[inline]
    pub fn is_committed(&self, page: GuestPage) -> bool {
        self.commits.is_committed(page.0)
    }

    /// Map `[first, first + count)` with `perms`, zero-filled. Pages that were
    /// already mapped are replaced.
    pub fn map(&self, first: GuestPage, count: u32, perms: PageFlags) -> MemoryResult<()> {
        check_range(first, count)?;
        let _guard = self.lock.write();

        self.unmap_locked(first, count)?;
        self.commit_locked(first, count, 0)?;
        for page in pages(first, count) {
            self.flags.set(page.0, PageFlags::MAPPED | perms.permissions());
        }
        debug!(page = first.0, count, perms = ?perms.permissions(), "Mapped guest pages");
        Ok(())
    }

    /// Unmap `[first, first + count)`. Bytes are zeroed and any code page
    /// state is dropped along with its translation; storage stays committed.
    pub fn unmap(&self, first: GuestPage, count: u32) -> MemoryResult<()> {
        check_range(first, count)?;
        let _guard = self.lock.write();
        self.unmap_locked(first, count)
    }

    fn unmap_locked(&self, first: GuestPage, count: u32) -> MemoryResult<()> {
        let host_pages = self.host_pages();
        for page in pages(first, count) {
            if !self.flags.get(page.0).contains(PageFlags::MAPPED) {
                continue;
            }
            self.code.forget(&host_pages, page)?;
            if self.is_committed(page) {
                let ptr = self.reservation.region().at(page.start().get() as usize, GUEST_PAGE_SIZE)?;
                // SAFETY: committed, host-writable after `forget`, and the write lock is held
                unsafe { std::ptr::write_bytes(ptr.as_ptr(), 0, GUEST_PAGE_SIZE) };
            }
            self.flags.set(page.0, PageFlags::empty());
        }
        Ok(())
    }

    /// Change logical permissions of the mapped pages in range. Returns how
    /// many pages were changed.
    pub fn set_protection(&self, first: GuestPage, count: u32, perms: PageFlags) -> MemoryResult<u32> {
        check_range(first, count)?;
        let _guard = self.lock.write();

        let mut changed = 0;
        for page in pages(first, count) {
            let flags = self.flags.get(page.0);
            if !flags.contains(PageFlags::MAPPED) {
                continue;
            }
            self.flags.set(page.0, (flags - PageFlags::ALL) | perms.permissions());
            changed += 1;
        }
        Ok(changed)
    }

    /// Logical flags of a page, bookkeeping bits included
    #[inline]
    pub fn protection(&self, page: GuestPage) -> PageFlags {
        self.flags.get(page.0)
    }

    #[inline]
    pub fn code_page_state(&self, page: GuestPage) -> CodePageState {
        self.flags.get(page.0).code_state()
    }

    #[inline]
    pub fn rewrite_count(&self, page: GuestPage) -> u8 {
        self.code.rewrite_count(page)
    }

    /// A translation was cached for `page`: make it read-only on the host
    pub fn protect_code_page(&self, page: GuestPage) -> MemoryResult<ProtectOutcome> {
        check_range(page, 1)?;
        let _guard = self.lock.write();
        self.code.protect(&self.host_pages(), page)
    }

    /// Restore write access and drop the page's translation
    pub fn unprotect_code_page(&self, page: GuestPage) -> MemoryResult<bool> {
        check_range(page, 1)?;
        let _guard = self.lock.write();
        self.code.unprotect(&self.host_pages(), page)
    }

    /// Apply a guest write to a code page: unprotect, invalidate, count.
    /// Shared by the write primitives and the fault interposer.
    pub fn handle_code_write(&self, page: GuestPage) -> MemoryResult<CodeWriteOutcome> {
        check_range(page, 1)?;
        let _guard = self.lock.write();
        self.code.handle_write(&self.host_pages(), page)
    }

    pub fn stats(&self) -> AddressSpaceStats {
        let (protected, write_faults, dynamic, invalidated) = self.code.counters();
        AddressSpaceStats {
            committed_pages: self.commits.committed_units(),
            protected_code_pages: protected,
            code_write_faults: write_faults,
            dynamic_code_pages: dynamic,
            translations_invalidated: invalidated,
        }
    }

    /// Tear down: drop every translation, decommit, clear bookkeeping, and
    /// return the reservation(s) to the host. The only way to reclaim the
    /// address space.
    pub fn release(self) -> MemoryResult<()> {
        {
            let _guard = self.lock.write();
            self.code.reset();
            self.commits
                .decommit_all(self.reservation.host(), self.reservation.region())?;
            self.flags.clear_all();
        }
        if let Some(lookup) = self.code_lookup {
            lookup.release()?;
        }
        info!(base = format_args!("{:#x}", self.reservation.region().base_address()), "Releasing guest address space");
        self.reservation.release()
    }
}

impl std::fmt::Debug for GuestAddressSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuestAddressSpace")
            .field("reservation", &self.reservation)
            .field("allocator", &self.allocator)
            .field("code", &self.code)
            .field("code_lookup", &self.code_lookup)
            .finish_non_exhaustive()
    }
}

fn check_range(first: GuestPage, count: u32) -> MemoryResult<()> {
    if count == 0 || first.index() + count as usize > NUMBER_OF_GUEST_PAGES {
        return Err(MemoryError::PageRange { first: first.0, count });
    }
    Ok(())
}

fn pages(first: GuestPage, count: u32) -> impl Iterator<Item = GuestPage> {
    (first.0..first.0 + count).map(GuestPage::new)
}
