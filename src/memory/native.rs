/*!
 * Native Host Memory
 * `HostVirtualMemory` over POSIX mmap/mprotect/madvise/munmap
 */

use super::host::{HostProtection, HostResult, HostVirtualMemory};
use nix::errno::Errno as HostErrno;
use nix::sys::mman::{madvise, mmap_anonymous, mprotect, munmap, MapFlags, MmapAdvise, ProtFlags};
use nix::unistd::{sysconf, SysconfVar};
use std::num::NonZeroUsize;
use std::ptr::NonNull;

/// Host memory backed by the running process's own address space
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeHostMemory;

impl NativeHostMemory {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn reserve_flags() -> MapFlags {
    MapFlags::MAP_PRIVATE | MapFlags::MAP_NORESERVE
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn reserve_flags() -> MapFlags {
    MapFlags::MAP_PRIVATE
}

impl HostVirtualMemory for NativeHostMemory {
    fn page_size(&self) -> HostResult<usize> {
        match sysconf(SysconfVar::PAGE_SIZE)? {
            Some(size) if size > 0 => Ok(size as usize),
            _ => Err(HostErrno::EINVAL),
        }
    }

    fn allocation_granularity(&self) -> HostResult<usize> {
        // mmap/mprotect granularity is the page size on POSIX hosts
        self.page_size()
    }

    fn reserve(&self, hint: usize, len: usize) -> HostResult<NonNull<u8>> {
        let len = NonZeroUsize::new(len).ok_or(HostErrno::EINVAL)?;
        // SAFETY: without MAP_FIXED the kernel never replaces existing mappings
        let ptr = unsafe { mmap_anonymous(NonZeroUsize::new(hint), len, ProtFlags::PROT_NONE, reserve_flags())? };
        Ok(ptr.cast())
    }

    unsafe fn release(&self, base: NonNull<u8>, len: usize) -> HostResult<()> {
        munmap(base.cast(), len)
    }

    unsafe fn commit(&self, addr: NonNull<u8>, len: usize) -> HostResult<()> {
        mprotect(addr.cast(), len, ProtFlags::PROT_READ | ProtFlags::PROT_WRITE)
    }

    unsafe fn decommit(&self, addr: NonNull<u8>, len: usize) -> HostResult<()> {
        madvise(addr.cast(), len, MmapAdvise::MADV_DONTNEED)?;
        mprotect(addr.cast(), len, ProtFlags::PROT_NONE)
    }

    unsafe fn protect(&self, addr: NonNull<u8>, len: usize, prot: HostProtection) -> HostResult<()> {
        let flags = match prot {
            HostProtection::ReadOnly => ProtFlags::PROT_READ,
            HostProtection::ReadWrite => ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
        };
        mprotect(addr.cast(), len, flags)
    }
}
