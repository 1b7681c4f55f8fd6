/*!
 * Memory Module
 * Guest address space: host reservation, lazy commit, code page protection
 */

mod access;
pub mod address_space;
pub mod bitmap;
pub mod code_lookup;
pub mod code_pages;
pub mod commit;
pub mod fault;
pub mod host;
pub mod native;
pub mod reservation;
pub mod types;

// Re-export for convenience
pub use address_space::GuestAddressSpace;
pub use code_lookup::CodeLookupTable;
pub use code_pages::{CodePageProtector, NoTranslationCache, TranslationCache};
pub use commit::{FillPattern, PageCommitManager};
pub use fault::{CooperativeFaultInterposer, FaultInterposer, FaultResolution};
pub use host::{HostPageAllocator, HostProtection, HostRegion, HostResult, HostVirtualMemory};
pub use native::NativeHostMemory;
pub use reservation::AddressSpaceReservation;
pub use types::*;
