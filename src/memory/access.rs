/*!
 * Guest Memory Access
 *
 * Check-then-access primitives used by syscall handlers. Every access is
 * split at page boundaries; each chunk checks the page's logical
 * permissions and commit state before touching host memory. A write that
 * lands on a protected code page goes through the same unprotect path as a
 * host write fault, so rewrite counting is identical under both scheduling
 * models.
 */

use super::address_space::GuestAddressSpace;
use super::types::{AccessError, AccessKind, GuestFault, GuestStringError, PageFlags};
use crate::core::limits::{GUEST_PAGE_SIZE, MAX_ARG_STRLEN, MAX_STRING_ARRAY_LEN};
use crate::core::types::GuestAddr;
use parking_lot::RwLockWriteGuard;

impl GuestAddressSpace {
    /// Walk `[addr, addr + len)` one page chunk at a time as
    /// (guest address, offset into the access, chunk length)
    fn chunks(addr: GuestAddr, len: usize) -> Result<Vec<(GuestAddr, usize, usize)>, GuestFault> {
        let end = u64::from(addr.get()) + len as u64;
        if end > 1 << 32 {
            return Err(GuestFault::new(addr, AccessKind::Read));
        }
        let mut out = Vec::with_capacity(len / GUEST_PAGE_SIZE + 2);
        let mut done = 0;
        while done < len {
            let at = addr.wrapping_add(done as u32);
            let chunk = (GUEST_PAGE_SIZE - at.page_offset()).min(len - done);
            out.push((at, done, chunk));
            done += chunk;
        }
        Ok(out)
    }

    #[inline]
    fn check(&self, at: GuestAddr, access: AccessKind) -> Result<PageFlags, GuestFault> {
        let page = at.page();
        let flags = self.flags.get(page.0);
        if !flags.allows(access) || !self.commits.is_committed(page.0) {
            return Err(GuestFault::new(at, access));
        }
        Ok(flags)
    }

    pub fn read_bytes(&self, addr: GuestAddr, buf: &mut [u8]) -> Result<(), GuestFault> {
        let chunks = Self::chunks(addr, buf.len())?;
        let _guard = self.lock.read();
        for (at, offset, len) in chunks {
            self.check(at, AccessKind::Read)?;
            let src = self
                .reservation
                .region()
                .at(at.get() as usize, len)
                .map_err(|_| GuestFault::new(at, AccessKind::Read))?;
            // SAFETY: the page is committed and mapped; the read lock keeps it so
            unsafe { std::ptr::copy_nonoverlapping(src.as_ptr(), buf[offset..].as_mut_ptr(), len) };
        }
        Ok(())
    }

    pub fn write_bytes(&self, addr: GuestAddr, data: &[u8]) -> Result<(), AccessError> {
        let chunks = Self::chunks(addr, data.len()).map_err(|f| GuestFault::new(f.address, AccessKind::Write))?;
        for (at, offset, len) in chunks {
            let mut guard = self.lock.read();
            let flags = self.check(at, AccessKind::Write)?;

            if flags.contains(PageFlags::CODE_READONLY) {
                drop(guard);
                let write_guard = self.lock.write();
                self.code.handle_write(&self.host_pages(), at.page())?;
                guard = RwLockWriteGuard::downgrade(write_guard);
                // flags may have changed while the lock was released
                self.check(at, AccessKind::Write)?;
            }

            let dst = self.reservation.region().at(at.get() as usize, len)?;
            // SAFETY: the page is committed, mapped writable, and not code-protected
            unsafe { std::ptr::copy_nonoverlapping(data[offset..].as_ptr(), dst.as_ptr(), len) };
            drop(guard);
        }
        Ok(())
    }

    pub fn read_u8(&self, addr: GuestAddr) -> Result<u8, GuestFault> {
        let mut buf = [0u8; 1];
        self.read_bytes(addr, &mut buf)?;
        Ok(buf[0])
    }

    pub fn read_u16(&self, addr: GuestAddr) -> Result<u16, GuestFault> {
        let mut buf = [0u8; 2];
        self.read_bytes(addr, &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    pub fn read_u32(&self, addr: GuestAddr) -> Result<u32, GuestFault> {
        let mut buf = [0u8; 4];
        self.read_bytes(addr, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    pub fn read_u64(&self, addr: GuestAddr) -> Result<u64, GuestFault> {
        let mut buf = [0u8; 8];
        self.read_bytes(addr, &mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    pub fn write_u8(&self, addr: GuestAddr, value: u8) -> Result<(), AccessError> {
        self.write_bytes(addr, &[value])
    }

    pub fn write_u16(&self, addr: GuestAddr, value: u16) -> Result<(), AccessError> {
        self.write_bytes(addr, &value.to_le_bytes())
    }

    pub fn write_u32(&self, addr: GuestAddr, value: u32) -> Result<(), AccessError> {
        self.write_bytes(addr, &value.to_le_bytes())
    }

    pub fn write_u64(&self, addr: GuestAddr, value: u64) -> Result<(), AccessError> {
        self.write_bytes(addr, &value.to_le_bytes())
    }

    /// NUL-terminated string of at most `max_len` bytes before the terminator
    pub fn read_cstring(&self, addr: GuestAddr, max_len: usize) -> Result<String, GuestStringError> {
        let mut bytes = Vec::new();
        let mut at = addr;
        let _guard = self.lock.read();

        loop {
            self.check(at, AccessKind::Read)?;
            let chunk = GUEST_PAGE_SIZE - at.page_offset();
            let src = self
                .reservation
                .region()
                .at(at.get() as usize, chunk)
                .map_err(|_| GuestFault::new(at, AccessKind::Read))?;
            // SAFETY: the rest of the page is committed and readable under the read lock
            let page = unsafe { std::slice::from_raw_parts(src.as_ptr(), chunk) };

            match page.iter().position(|&b| b == 0) {
                Some(nul) => {
                    bytes.extend_from_slice(&page[..nul]);
                    break;
                }
                None => bytes.extend_from_slice(page),
            }
            if bytes.len() > max_len {
                break;
            }
            at = at
                .checked_add(chunk as u32)
                .ok_or(GuestFault::new(at, AccessKind::Read))?;
        }

        if bytes.len() > max_len {
            return Err(GuestStringError::TooLong { address: addr, max_len });
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// NULL-terminated array of string pointers (argv/envp)
    pub fn read_string_array(&self, addr: GuestAddr) -> Result<Vec<String>, GuestStringError> {
        let mut strings = Vec::new();
        let mut slot = addr;
        loop {
            let ptr = self.read_u32(slot)?;
            if ptr == 0 {
                return Ok(strings);
            }
            if strings.len() == MAX_STRING_ARRAY_LEN {
                return Err(GuestStringError::TooLong {
                    address: addr,
                    max_len: MAX_STRING_ARRAY_LEN,
                });
            }
            strings.push(self.read_cstring(GuestAddr::new(ptr), MAX_ARG_STRLEN)?);
            slot = slot
                .checked_add(4)
                .ok_or(GuestFault::new(slot, AccessKind::Read))?;
        }
    }
}
