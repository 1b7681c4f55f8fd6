/*!
 * System Limits and Constants
 *
 * Guest ABI geometry, host reservation sizes, and policy defaults.
 * Values marked [ABI] are fixed by the emulated i386 Linux calling convention
 * and must not change.
 */

// =============================================================================
// GUEST GEOMETRY
// =============================================================================

/// Guest page shift [ABI]
pub const GUEST_PAGE_SHIFT: u32 = 12;

/// Guest page size (4 KiB) [ABI]
/// Any host page size other than this is an unsupported host
pub const GUEST_PAGE_SIZE: usize = 1 << GUEST_PAGE_SHIFT;

/// Size of one full 32-bit guest address space (4 GiB)
pub const GUEST_ADDRESS_SPACE_SIZE: usize = 1 << 32;

/// Number of guest pages in the 4 GiB range
pub const NUMBER_OF_GUEST_PAGES: usize = GUEST_ADDRESS_SPACE_SIZE / GUEST_PAGE_SIZE;

// =============================================================================
// HOST RESERVATIONS
// =============================================================================

/// Bytes of code lookup table per guest byte (one host pointer slot per address)
pub const CODE_LOOKUP_SLOT_SIZE: usize = std::mem::size_of::<u64>();

/// Size of the code lookup reservation (32 GiB)
pub const CODE_LOOKUP_TABLE_SIZE: usize = GUEST_ADDRESS_SPACE_SIZE * CODE_LOOKUP_SLOT_SIZE;

/// Candidate reservation addresses are multiples of this (4 GiB)
pub const RESERVATION_ALIGNMENT: usize = 1 << 32;

/// Default number of 4 GiB-aligned candidates probed before giving up.
/// Covers the low 128 TiB of a 47-bit user address space.
pub const DEFAULT_MAX_RESERVATION_PROBES: u32 = 0x7fff;

// =============================================================================
// CODE PAGE POLICY
// =============================================================================

/// Write-fault retranslations tolerated before a code page becomes
/// writable-permanent
pub const DEFAULT_CODE_REWRITE_THRESHOLD: u8 = 3;

// =============================================================================
// SYSCALL ABI
// =============================================================================

/// Highest syscall number in this ABI generation [ABI]
pub const MAX_SYSCALL_NUMBER: u32 = 412;

/// Dispatch table length (slots 0..=MAX_SYSCALL_NUMBER)
pub const SYSCALL_TABLE_LEN: usize = MAX_SYSCALL_NUMBER as usize + 1;

/// Longest path accepted from guest memory, terminator included [ABI]
pub const MAX_FILEPATH_LEN: usize = 1024;

/// Upper bound on argv/envp entries read for execve
pub const MAX_STRING_ARRAY_LEN: usize = 4096;

/// Upper bound on a single argv/envp string
pub const MAX_ARG_STRLEN: usize = 128 * 1024;

/// Length in bytes of `int 0x80`
pub const INT80_INSTRUCTION_LEN: u32 = 2;

// =============================================================================
// COOPERATIVE SCHEDULING
// =============================================================================

/// Instructions charged per 10 ms of syscall time in the cooperative model
pub const DEFAULT_COOPERATIVE_CONTEXT_TIME: u64 = 100_000;

/// Microseconds in one context-time unit
pub const CONTEXT_TIME_UNIT_MICROS: u64 = 10_000;
