/*!
 * Core Types
 * Guest address and page index types shared across the substrate
 */

use super::limits::{GUEST_PAGE_SHIFT, GUEST_PAGE_SIZE, NUMBER_OF_GUEST_PAGES};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Guest process ID
pub type Pid = u32;

/// Guest thread ID
pub type Tid = u32;

/// A 32-bit guest virtual address
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestAddr(pub u32);

impl GuestAddr {
    pub const NULL: Self = Self(0);

    #[inline]
    #[must_use]
    pub const fn new(addr: u32) -> Self {
        Self(addr)
    }

    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Page containing this address
    #[inline]
    #[must_use]
    pub const fn page(self) -> GuestPage {
        GuestPage(self.0 >> GUEST_PAGE_SHIFT)
    }

    /// Byte offset within the containing page
    #[inline]
    #[must_use]
    pub const fn page_offset(self) -> usize {
        (self.0 as usize) & (GUEST_PAGE_SIZE - 1)
    }

    /// Address `bytes` further on, or `None` past the top of the 4 GiB range
    #[inline]
    #[must_use]
    pub fn checked_add(self, bytes: u32) -> Option<Self> {
        self.0.checked_add(bytes).map(Self)
    }

    #[inline]
    #[must_use]
    pub const fn wrapping_add(self, bytes: u32) -> Self {
        Self(self.0.wrapping_add(bytes))
    }
}

impl From<u32> for GuestAddr {
    fn from(addr: u32) -> Self {
        Self(addr)
    }
}

impl fmt::Display for GuestAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Index of a 4 KiB guest page (0..NUMBER_OF_GUEST_PAGES)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestPage(pub u32);

impl GuestPage {
    #[inline]
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// First guest address in the page
    #[inline]
    #[must_use]
    pub const fn start(self) -> GuestAddr {
        GuestAddr(self.0 << GUEST_PAGE_SHIFT)
    }

    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        (self.0 as usize) < NUMBER_OF_GUEST_PAGES
    }

    #[inline]
    #[must_use]
    pub const fn offset(self, pages: u32) -> Self {
        Self(self.0 + pages)
    }
}

impl fmt::Display for GuestPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page {:#07x}", self.0)
    }
}
