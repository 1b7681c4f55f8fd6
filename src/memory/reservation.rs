/*!
 * Address Space Reservation
 *
 * Reserves one contiguous, uncommitted host range per guest address space
 * (4 GiB) and, in large-address mode, a second 32 GiB range for the code
 * lookup table. Candidates are probed at successive 4 GiB-aligned addresses
 * so the guest never lands on top of the host's own mappings.
 */

use super::host::{HostRegion, HostVirtualMemory};
use super::types::{MemoryError, MemoryResult};
use crate::core::limits::RESERVATION_ALIGNMENT;
use std::sync::Arc;
use tracing::{debug, error, info};

/// A host reservation that is returned to the host exactly once
pub struct AddressSpaceReservation {
    host: Arc<dyn HostVirtualMemory>,
    region: HostRegion,
    released: bool,
}

impl AddressSpaceReservation {
    /// Probe candidates `i << 32` for `i` in `1..=max_probes` until the host
    /// places a `len`-byte reservation exactly at the candidate.
    pub fn reserve(host: Arc<dyn HostVirtualMemory>, len: usize, max_probes: u32) -> MemoryResult<Self> {
        for i in 1..=u64::from(max_probes) {
            let Some(candidate) = i.checked_mul(RESERVATION_ALIGNMENT as u64).and_then(|c| usize::try_from(c).ok()) else {
                break;
            };

            let placed = match host.reserve(candidate, len) {
                Ok(placed) => placed,
                Err(errno) => {
                    debug!(candidate = format_args!("{candidate:#x}"), %errno, "Reservation candidate refused");
                    continue;
                }
            };

            if placed.as_ptr() as usize == candidate {
                info!(
                    base = format_args!("{candidate:#x}"),
                    len = format_args!("{len:#x}"),
                    probes = i,
                    "Reserved guest host range"
                );
                return Ok(Self {
                    host,
                    region: HostRegion::new(placed, len),
                    released: false,
                });
            }

            // Host moved the hint elsewhere: the candidate is in use
            // SAFETY: `placed` was just returned by `reserve` with this length
            if let Err(errno) = unsafe { host.release(placed, len) } {
                return Err(MemoryError::Release {
                    base: placed.as_ptr() as usize,
                    errno,
                });
            }
        }

        error!(len = format_args!("{len:#x}"), max_probes, "Guest reservation exhausted");
        Err(MemoryError::ReservationExhausted { len, probes: max_probes })
    }

    #[inline]
    pub fn region(&self) -> &HostRegion {
        &self.region
    }

    pub(crate) fn host(&self) -> &dyn HostVirtualMemory {
        self.host.as_ref()
    }

    /// Return the entire range to the host in one call
    pub fn release(mut self) -> MemoryResult<()> {
        self.release_region()
    }

    fn release_region(&mut self) -> MemoryResult<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        let region = &self.region;
        // SAFETY: the region came from `reserve` on this host and is released once
        unsafe { self.host.release(region.base(), region.len()) }.map_err(|errno| MemoryError::Release {
            base: region.base_address(),
            errno,
        })?;
        debug!(base = format_args!("{:#x}", region.base_address()), "Released guest host range");
        Ok(())
    }
}

impl std::fmt::Debug for AddressSpaceReservation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressSpaceReservation")
            .field("region", &self.region)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl Drop for AddressSpaceReservation {
    fn drop(&mut self) {
        if !self.released {
            error!("Host reservation dropped without an explicit release");
            if let Err(e) = self.release_region() {
                error!(error = %e, "Host-fatal: failed to release dropped reservation");
            }
        }
    }
}
