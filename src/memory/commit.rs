/*!
 * Page Commit Manager
 *
 * Commits host storage on demand in whole allocation grains and fills it
 * with a caller-supplied word pattern. Commit state is tracked per unit
 * (a guest page, or the lookup slots of a guest page) in a bitmap, so a
 * range that is already committed is never refilled.
 */

use super::bitmap::PageBitmap;
use super::host::{HostPageAllocator, HostRegion, HostVirtualMemory};
use super::types::{MemoryError, MemoryResult};
use tracing::{error, trace};

/// Pattern written over freshly committed storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillPattern {
    Zero,
    Word32(u32),
    Word64(u64),
}

/// Round `[first, first + count)` outward to whole grains of `unit` units.
/// Returns the first unit of the first grain and the number of grains.
#[inline]
pub fn round_to_grains(first: u64, count: u64, unit: u64) -> (u64, u64) {
    let start = first / unit * unit;
    let end = (first + count).div_ceil(unit) * unit;
    (start, (end - start) / unit)
}

/// Grain-rounded lazy commit over one host region
#[derive(Debug)]
pub struct PageCommitManager {
    unit_bytes: usize,
    units_per_grain: u32,
    committed: PageBitmap,
}

impl PageCommitManager {
    /// Manager for `units` tracked units of `unit_bytes` each
    pub fn new(allocator: &HostPageAllocator, unit_bytes: usize, units: usize) -> Self {
        Self {
            unit_bytes,
            units_per_grain: allocator.units_per_grain(unit_bytes),
            committed: PageBitmap::new(units),
        }
    }

    #[inline]
    pub fn is_committed(&self, unit: u32) -> bool {
        self.committed.get(unit as usize)
    }

    /// Units committed per grain
    #[inline]
    pub fn units_per_grain(&self) -> u32 {
        self.units_per_grain
    }

    #[inline]
    pub fn committed_units(&self) -> u64 {
        self.committed.count_ones()
    }

    /// Ensure `[first, first + count)` is backed and filled. Returns the
    /// number of grains newly committed. The caller serializes commits.
    pub fn commit_range(
        &self,
        host: &dyn HostVirtualMemory,
        region: &HostRegion,
        first: u32,
        count: u32,
        fill: FillPattern,
    ) -> MemoryResult<u32> {
        let total = self.committed.len() as u64;
        if count == 0 || u64::from(first) + u64::from(count) > total {
            return Err(MemoryError::PageRange { first, count });
        }

        let unit = u64::from(self.units_per_grain);
        let (start, grains) = round_to_grains(u64::from(first), u64::from(count), unit);
        let grain_bytes = self.units_per_grain as usize * self.unit_bytes;
        let mut committed = 0;

        for grain in 0..grains {
            let grain_unit = start + grain * unit;
            // whole grains commit together, so the first unit speaks for all
            if self.committed.get(grain_unit as usize) {
                continue;
            }

            let span = grain_bytes.min(region.len() - grain_unit as usize * self.unit_bytes);
            let addr = region.at(grain_unit as usize * self.unit_bytes, span)?;

            // SAFETY: addr..addr+span lies inside `region`, which belongs to `host`
            if let Err(errno) = unsafe { host.commit(addr, span) } {
                error!(grain_page = grain_unit, page = first, count, %errno, "Failed to commit memory");
                return Err(MemoryError::Commit {
                    grain_page: grain_unit as u32,
                    page: first,
                    count,
                    errno,
                });
            }
            // SAFETY: the span was just committed read-write and nothing else aliases it yet
            unsafe { fill_span(addr.as_ptr(), span, fill) };

            self.committed.set_range(grain_unit as usize, self.units_per_grain as usize);
            committed += 1;
            trace!(grain_page = grain_unit, span, "Committed grain");
        }
        Ok(committed)
    }

    /// Decommit every committed grain. Used only at teardown.
    pub fn decommit_all(&self, host: &dyn HostVirtualMemory, region: &HostRegion) -> MemoryResult<()> {
        let unit = self.units_per_grain as usize;
        let grain_bytes = unit * self.unit_bytes;

        for grain_unit in (0..self.committed.len()).step_by(unit) {
            if !self.committed.get(grain_unit) {
                continue;
            }
            let span = grain_bytes.min(region.len() - grain_unit * self.unit_bytes);
            let addr = region.at(grain_unit * self.unit_bytes, span)?;
            // SAFETY: the grain lies inside `region` and was committed on `host`
            unsafe { host.decommit(addr, span) }.map_err(|errno| MemoryError::Decommit {
                page: grain_unit as u32,
                errno,
            })?;
        }
        self.committed.clear_all();
        Ok(())
    }
}

/// # Safety
///
/// `ptr..ptr+len` must be writable and suitably aligned for the pattern.
unsafe fn fill_span(ptr: *mut u8, len: usize, fill: FillPattern) {
    match fill {
        // freshly committed host storage is already zero
        FillPattern::Zero => {}
        FillPattern::Word32(word) => {
            std::slice::from_raw_parts_mut(ptr.cast::<u32>(), len / 4).fill(word);
        }
        FillPattern::Word64(word) => {
            std::slice::from_raw_parts_mut(ptr.cast::<u64>(), len / 8).fill(word);
        }
    }
}
