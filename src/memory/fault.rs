/*!
 * Fault Interposer
 *
 * Turns a host protection fault raised while running one cooperative
 * quantum into a code page unprotect, a transparent page-in, or a guest
 * segmentation fault. Only the cooperative scheduler calls it; with one
 * host thread per guest thread, accesses go through the check-then-access
 * primitives instead.
 */

use super::address_space::GuestAddressSpace;
use super::types::{AccessKind, GuestFault, MemoryError, MemoryResult, PageFlags};
use std::sync::Arc;
use tracing::{debug, trace};

/// Outcome of interposing on a host fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultResolution {
    /// Resume the faulting instruction
    Resolved,
    /// Deliver a segmentation fault to the guest and end the quantum
    Forward(GuestFault),
}

/// Host fault capability, one implementation per host platform
pub trait FaultInterposer: Send + Sync {
    fn try_handle_protection_fault(&self, host_addr: usize, access: AccessKind) -> MemoryResult<FaultResolution>;
}

/// Interposer over one guest address space
#[derive(Debug, Clone)]
pub struct CooperativeFaultInterposer {
    space: Arc<GuestAddressSpace>,
}

impl CooperativeFaultInterposer {
    pub fn new(space: Arc<GuestAddressSpace>) -> Self {
        Self { space }
    }
}

impl FaultInterposer for CooperativeFaultInterposer {
    fn try_handle_protection_fault(&self, host_addr: usize, access: AccessKind) -> MemoryResult<FaultResolution> {
        let address = self
            .space
            .guest_address_of(host_addr)
            .ok_or(MemoryError::ForeignFault(host_addr))?;
        let page = address.page();
        let flags = self.space.protection(page);

        if access == AccessKind::Write && flags.contains(PageFlags::CODE_READONLY) {
            let outcome = self.space.handle_code_write(page)?;
            trace!(%address, ?outcome, "Code page write fault resolved");
            return Ok(FaultResolution::Resolved);
        }

        if flags.allows(access) && !self.space.is_committed(page) {
            self.space.commit_range(page, 1, 0)?;
            trace!(%address, "Paged in guest memory");
            return Ok(FaultResolution::Resolved);
        }

        debug!(%address, %access, ?flags, "Forwarding guest segmentation fault");
        Ok(FaultResolution::Forward(GuestFault::new(address, access)))
    }
}
