/*!
 * Code Lookup Table
 *
 * Large-address mode side table: one 8-byte slot per guest byte address,
 * mapping an EIP to the host address of its translated code. The 32 GiB
 * range is reserved up front and committed lazily, a guest page's worth of
 * slots at a time, the first time code in that page is translated.
 */

use super::commit::{FillPattern, PageCommitManager};
use super::host::{HostPageAllocator, HostVirtualMemory};
use super::reservation::AddressSpaceReservation;
use super::types::{MemoryError, MemoryResult};
use crate::core::limits::{CODE_LOOKUP_SLOT_SIZE, CODE_LOOKUP_TABLE_SIZE, GUEST_PAGE_SIZE, NUMBER_OF_GUEST_PAGES};
use crate::core::types::{GuestAddr, GuestPage};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Host bytes of slots covering one guest page
const SLOTS_PER_GUEST_PAGE_BYTES: usize = GUEST_PAGE_SIZE * CODE_LOOKUP_SLOT_SIZE;

pub struct CodeLookupTable {
    reservation: AddressSpaceReservation,
    commits: PageCommitManager,
    commit_lock: Mutex<()>,
}

impl CodeLookupTable {
    pub(crate) fn reserve(
        host: Arc<dyn HostVirtualMemory>,
        allocator: &HostPageAllocator,
        max_probes: u32,
    ) -> MemoryResult<Self> {
        let reservation = AddressSpaceReservation::reserve(host, CODE_LOOKUP_TABLE_SIZE, max_probes)?;
        Ok(Self {
            reservation,
            commits: PageCommitManager::new(allocator, SLOTS_PER_GUEST_PAGE_BYTES, NUMBER_OF_GUEST_PAGES),
            commit_lock: Mutex::new(()),
        })
    }

    /// Commit the slots of guest pages `[first, first + count)` and fill new
    /// ones with `default`. Slots already committed keep their values.
    pub fn commit_for(&self, first: GuestPage, count: u32, default: u64) -> MemoryResult<u32> {
        let _guard = self.commit_lock.lock();
        let grains = self.commits.commit_range(
            self.reservation.host(),
            self.reservation.region(),
            first.0,
            count,
            FillPattern::Word64(default),
        )?;
        if grains > 0 {
            debug!(page = first.0, count, grains, "Committed code lookup slots");
        }
        Ok(grains)
    }

    #[inline]
    pub fn is_committed(&self, page: GuestPage) -> bool {
        self.commits.is_committed(page.0)
    }

    /// Slot for `eip`, or `None` while its page is uncommitted
    pub fn get(&self, eip: GuestAddr) -> Option<u64> {
        self.slot(eip).map(|slot| slot.load(Ordering::Acquire))
    }

    pub fn set(&self, eip: GuestAddr, value: u64) -> MemoryResult<()> {
        let slot = self.slot(eip).ok_or(MemoryError::LookupNotCommitted(eip))?;
        slot.store(value, Ordering::Release);
        Ok(())
    }

    fn slot(&self, eip: GuestAddr) -> Option<&AtomicU64> {
        if !self.is_committed(eip.page()) {
            return None;
        }
        let ptr = self
            .reservation
            .region()
            .at(eip.get() as usize * CODE_LOOKUP_SLOT_SIZE, CODE_LOOKUP_SLOT_SIZE)
            .ok()?;
        // SAFETY: the slot is committed, 8-byte aligned, and lives as long as `self`
        Some(unsafe { &*ptr.as_ptr().cast::<AtomicU64>() })
    }

    pub(crate) fn release(self) -> MemoryResult<()> {
        self.commits
            .decommit_all(self.reservation.host(), self.reservation.region())?;
        self.reservation.release()
    }
}

impl std::fmt::Debug for CodeLookupTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeLookupTable")
            .field("reservation", &self.reservation)
            .field("committed_pages", &self.commits.committed_units())
            .finish()
    }
}
