/*!
 * Page Tables
 * Lock-free per-page bit set and per-page flag bytes
 */

use super::types::PageFlags;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// One bit per page, readable without holding the page lock
pub struct PageBitmap {
    words: Box<[AtomicU64]>,
    len: usize,
}

impl PageBitmap {
    pub fn new(len: usize) -> Self {
        let words = (0..len.div_ceil(64)).map(|_| AtomicU64::new(0)).collect();
        Self { words, len }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn get(&self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        self.words[index / 64].load(Ordering::Acquire) & (1 << (index % 64)) != 0
    }

    #[inline]
    pub fn set(&self, index: usize) {
        if index < self.len {
            self.words[index / 64].fetch_or(1 << (index % 64), Ordering::Release);
        }
    }

    /// Set `[first, first + count)`, clamped to the bitmap
    pub fn set_range(&self, first: usize, count: usize) {
        let end = first.saturating_add(count).min(self.len);
        for index in first..end {
            self.set(index);
        }
    }

    /// Number of set bits
    pub fn count_ones(&self) -> u64 {
        self.words
            .iter()
            .map(|w| u64::from(w.load(Ordering::Relaxed).count_ones()))
            .sum()
    }

    pub fn clear_all(&self) {
        for word in self.words.iter() {
            word.store(0, Ordering::Release);
        }
    }
}

impl std::fmt::Debug for PageBitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageBitmap")
            .field("len", &self.len)
            .field("set", &self.count_ones())
            .finish()
    }
}

/// Logical page flags, one byte per guest page.
///
/// Loads are lock-free; every store happens under the owning address
/// space's write lock.
pub struct PageFlagTable {
    flags: Box<[AtomicU8]>,
}

impl PageFlagTable {
    pub fn new(pages: usize) -> Self {
        Self {
            flags: (0..pages).map(|_| AtomicU8::new(0)).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    #[inline]
    pub fn get(&self, page: u32) -> PageFlags {
        self.flags
            .get(page as usize)
            .map(|f| PageFlags::from_bits_retain(f.load(Ordering::Acquire)))
            .unwrap_or_else(PageFlags::empty)
    }

    #[inline]
    pub fn set(&self, page: u32, flags: PageFlags) {
        if let Some(slot) = self.flags.get(page as usize) {
            slot.store(flags.bits(), Ordering::Release);
        }
    }

    #[inline]
    pub fn insert(&self, page: u32, flags: PageFlags) {
        if let Some(slot) = self.flags.get(page as usize) {
            slot.fetch_or(flags.bits(), Ordering::AcqRel);
        }
    }

    #[inline]
    pub fn remove(&self, page: u32, flags: PageFlags) {
        if let Some(slot) = self.flags.get(page as usize) {
            slot.fetch_and(!flags.bits(), Ordering::AcqRel);
        }
    }

    pub fn clear_all(&self) {
        for slot in self.flags.iter() {
            slot.store(0, Ordering::Release);
        }
    }
}

impl std::fmt::Debug for PageFlagTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageFlagTable").field("pages", &self.flags.len()).finish()
    }
}
