/*!
 * Syscall Dispatch Table
 *
 * Fixed-size table indexed by syscall number. Built once through
 * `SyscallTableBuilder`, then shared read-only by every trapping thread.
 */

use super::decode::{ArgSpec, DecodedArgs};
use super::traits::KernelServices;
use super::types::{SyscallOutcome, TrapError};
use crate::core::limits::{MAX_SYSCALL_NUMBER, SYSCALL_TABLE_LEN};
use crate::memory::GuestAddressSpace;
use crate::process::GuestThread;
use ahash::AHashSet;
use bitflags::bitflags;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

bitflags! {
    /// Trace categories; a syscall may belong to several
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct SyscallCategory: u32 {
        const PROCESS = 1 << 0;
        const THREAD = 1 << 1;
        const FILE = 1 << 2;
        const READ = 1 << 3;
        const WRITE = 1 << 4;
        const SYSTEM = 1 << 5;
        const SIGNAL = 1 << 6;
        const MEMORY = 1 << 7;
        const SOCKET = 1 << 8;
        const FUTEX = 1 << 9;
    }
}

/// State a handler runs against
pub struct SyscallContext<'a> {
    pub thread: &'a mut GuestThread,
    pub memory: &'a GuestAddressSpace,
    pub kernel: &'a KernelServices,
}

pub type SyscallHandlerFn =
    fn(&mut SyscallContext<'_>, &DecodedArgs) -> Result<SyscallOutcome, TrapError>;

/// One registered syscall
#[derive(Clone, Copy)]
pub struct SyscallEntry {
    pub name: &'static str,
    pub category: SyscallCategory,
    pub args: &'static [ArgSpec],
    pub handler: SyscallHandlerFn,
}

impl std::fmt::Debug for SyscallEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyscallEntry")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// Result of looking a number up
#[derive(Debug, Clone, Copy)]
pub enum SyscallLookup<'a> {
    Found(&'a SyscallEntry),
    /// In range with no handler
    Unimplemented,
    OutOfRange,
}

/// Collects registrations, rejecting duplicates
#[derive(Debug)]
pub struct SyscallTableBuilder {
    entries: Vec<Option<SyscallEntry>>,
}

impl Default for SyscallTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SyscallTableBuilder {
    pub fn new() -> Self {
        Self {
            entries: vec![None; SYSCALL_TABLE_LEN],
        }
    }

    pub fn register(&mut self, number: u32, entry: SyscallEntry) -> Result<&mut Self, TrapError> {
        let slot = self
            .entries
            .get_mut(number as usize)
            .ok_or(TrapError::SyscallOutOfRange {
                number,
                name: entry.name,
            })?;
        if let Some(existing) = slot {
            return Err(TrapError::DuplicateSyscall {
                number,
                existing: existing.name,
                name: entry.name,
            });
        }
        *slot = Some(entry);
        Ok(self)
    }

    pub fn build(self) -> SyscallTable {
        SyscallTable {
            entries: self.entries.into_boxed_slice(),
            reported: Mutex::new(AHashSet::new()),
        }
    }
}

/// Immutable number -> handler table
pub struct SyscallTable {
    entries: Box<[Option<SyscallEntry>]>,
    reported: Mutex<AHashSet<u32>>,
}

impl SyscallTable {
    pub fn lookup(&self, number: u32) -> SyscallLookup<'_> {
        match self.entries.get(number as usize) {
            Some(Some(entry)) => SyscallLookup::Found(entry),
            Some(None) => SyscallLookup::Unimplemented,
            None => SyscallLookup::OutOfRange,
        }
    }

    /// Log a call the table cannot serve: out-of-range numbers every time,
    /// empty slots once per number
    pub fn report_missing(&self, number: u32) {
        if number > MAX_SYSCALL_NUMBER {
            debug!(number, "Syscall number out of range");
            return;
        }
        if self.reported.lock().insert(number) {
            warn!(number, "Unimplemented syscall");
        }
    }

    /// Number of missing syscalls reported so far
    pub fn reported_missing(&self) -> usize {
        self.reported.lock().len()
    }

    pub fn registered(&self) -> impl Iterator<Item = (u32, &SyscallEntry)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(number, entry)| entry.as_ref().map(|e| (number as u32, e)))
    }

    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for SyscallTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyscallTable")
            .field("registered", &self.len())
            .finish_non_exhaustive()
    }
}
