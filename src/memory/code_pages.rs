/*!
 * Code Page Protector
 *
 * Pages holding translated code are made read-only on the host so a guest
 * write is noticed. Each write fault drops the cached translation, restores
 * write access, and bumps the page's rewrite count; once the count passes
 * the threshold the page is treated as self-modifying and never protected
 * again.
 */

use super::bitmap::PageFlagTable;
use super::host::{HostProtection, HostRegion, HostVirtualMemory};
use super::types::{CodeWriteOutcome, MemoryError, MemoryResult, PageFlags, ProtectOutcome};
use crate::core::limits::GUEST_PAGE_SIZE;
use crate::core::types::GuestPage;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Consumer of translated code for one address space (the JIT cache)
pub trait TranslationCache: Send + Sync {
    /// Drop whatever native code was generated from this guest page
    fn invalidate_page(&self, page: GuestPage);

    /// Drop every translation
    fn invalidate_all(&self);
}

/// Cache for address spaces with no translator attached
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTranslationCache;

impl TranslationCache for NoTranslationCache {
    fn invalidate_page(&self, _page: GuestPage) {}

    fn invalidate_all(&self) {}
}

/// Host view the protector operates on. Built by the address space while
/// it holds its write lock.
pub(crate) struct HostPages<'a> {
    pub host: &'a dyn HostVirtualMemory,
    pub region: &'a HostRegion,
    pub flags: &'a PageFlagTable,
}

impl HostPages<'_> {
    fn set_host_protection(&self, page: GuestPage, prot: HostProtection) -> MemoryResult<()> {
        let addr = self.region.at(page.start().get() as usize, GUEST_PAGE_SIZE)?;
        // SAFETY: one guest page inside the reservation owned by `host`
        unsafe { self.host.protect(addr, GUEST_PAGE_SIZE, prot) }.map_err(|errno| {
            error!(page = page.0, %errno, "Failed to change code page protection");
            MemoryError::Protect { page: page.0, errno }
        })
    }
}

/// Per-address-space code page policy
pub struct CodePageProtector {
    threshold: u8,
    strict: bool,
    rewrite_counts: Box<[AtomicU8]>,
    cache: Arc<dyn TranslationCache>,
    protected: AtomicU64,
    write_faults: AtomicU64,
    dynamic: AtomicU64,
    invalidated: AtomicU64,
}

impl CodePageProtector {
    pub fn new(pages: usize, threshold: u8, strict: bool, cache: Arc<dyn TranslationCache>) -> Self {
        Self {
            threshold,
            strict,
            rewrite_counts: (0..pages).map(|_| AtomicU8::new(0)).collect(),
            cache,
            protected: AtomicU64::new(0),
            write_faults: AtomicU64::new(0),
            dynamic: AtomicU64::new(0),
            invalidated: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    #[inline]
    pub fn rewrite_count(&self, page: GuestPage) -> u8 {
        self.rewrite_counts
            .get(page.index())
            .map_or(0, |c| c.load(Ordering::Acquire))
    }

    pub(crate) fn cache(&self) -> &Arc<dyn TranslationCache> {
        &self.cache
    }

    /// Writable -> read-only-tracked
    pub(crate) fn protect(&self, pages: &HostPages<'_>, page: GuestPage) -> MemoryResult<ProtectOutcome> {
        let flags = pages.flags.get(page.0);
        if !flags.contains(PageFlags::MAPPED) {
            return Err(MemoryError::CodePageUnmapped(page.0));
        }
        if flags.contains(PageFlags::DYNAMIC_CODE) {
            if self.strict {
                error!(page = page.0, "Tried to make a dynamic code page read-only");
                return Err(MemoryError::ProtectDynamicPage(page.0));
            }
            debug!(page = page.0, "Ignoring protect of dynamic code page");
            return Ok(ProtectOutcome::Ignored);
        }
        if flags.contains(PageFlags::CODE_READONLY) {
            return Ok(ProtectOutcome::AlreadyProtected);
        }

        pages.set_host_protection(page, HostProtection::ReadOnly)?;
        pages.flags.insert(page.0, PageFlags::CODE_READONLY);
        self.protected.fetch_add(1, Ordering::Relaxed);
        Ok(ProtectOutcome::Protected)
    }

    /// Read-only-tracked -> writable, always dropping the page's translation.
    /// Returns whether the page was protected.
    pub(crate) fn unprotect(&self, pages: &HostPages<'_>, page: GuestPage) -> MemoryResult<bool> {
        let was_protected = pages.flags.get(page.0).contains(PageFlags::CODE_READONLY);
        if was_protected {
            pages.set_host_protection(page, HostProtection::ReadWrite)?;
            pages.flags.remove(page.0, PageFlags::CODE_READONLY);
            self.protected.fetch_sub(1, Ordering::Relaxed);
        }
        self.invalidate(page);
        Ok(was_protected)
    }

    /// A write hit `page`. Unprotects it when protected and counts the
    /// rewrite; the count past the threshold makes the page permanent.
    pub(crate) fn handle_write(&self, pages: &HostPages<'_>, page: GuestPage) -> MemoryResult<CodeWriteOutcome> {
        if !pages.flags.get(page.0).contains(PageFlags::CODE_READONLY) {
            return Ok(CodeWriteOutcome::NotProtected);
        }

        self.unprotect(pages, page)?;
        self.write_faults.fetch_add(1, Ordering::Relaxed);

        let Some(counter) = self.rewrite_counts.get(page.index()) else {
            return Err(MemoryError::PageRange { first: page.0, count: 1 });
        };
        let rewrite_count = counter.load(Ordering::Acquire).saturating_add(1);
        counter.store(rewrite_count, Ordering::Release);

        let permanent = rewrite_count > self.threshold;
        if permanent && !pages.flags.get(page.0).contains(PageFlags::DYNAMIC_CODE) {
            pages.flags.insert(page.0, PageFlags::DYNAMIC_CODE);
            self.dynamic.fetch_add(1, Ordering::Relaxed);
            info!(page = page.0, rewrite_count, "Code page is self-modifying; protection disabled");
        } else {
            debug!(page = page.0, rewrite_count, "Code page written; translation dropped");
        }

        Ok(CodeWriteOutcome::Unprotected {
            rewrite_count,
            permanent,
        })
    }

    /// Forget all code state of an unmapped page
    pub(crate) fn forget(&self, pages: &HostPages<'_>, page: GuestPage) -> MemoryResult<()> {
        let flags = pages.flags.get(page.0);
        if flags.contains(PageFlags::CODE_READONLY) {
            self.unprotect(pages, page)?;
        } else if flags.contains(PageFlags::MAPPED) {
            self.invalidate(page);
        }
        if flags.contains(PageFlags::DYNAMIC_CODE) {
            self.dynamic.fetch_sub(1, Ordering::Relaxed);
        }
        if let Some(counter) = self.rewrite_counts.get(page.index()) {
            counter.store(0, Ordering::Release);
        }
        Ok(())
    }

    /// Teardown: drop every translation and all counters
    pub(crate) fn reset(&self) {
        self.cache.invalidate_all();
        for counter in self.rewrite_counts.iter() {
            counter.store(0, Ordering::Release);
        }
        self.protected.store(0, Ordering::Relaxed);
        self.dynamic.store(0, Ordering::Relaxed);
    }

    fn invalidate(&self, page: GuestPage) {
        self.cache.invalidate_page(page);
        self.invalidated.fetch_add(1, Ordering::Relaxed);
    }

    /// (protected pages, write faults, dynamic pages, invalidations)
    pub(crate) fn counters(&self) -> (u64, u64, u64, u64) {
        (
            self.protected.load(Ordering::Relaxed),
            self.write_faults.load(Ordering::Relaxed),
            self.dynamic.load(Ordering::Relaxed),
            self.invalidated.load(Ordering::Relaxed),
        )
    }
}

impl std::fmt::Debug for CodePageProtector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodePageProtector")
            .field("threshold", &self.threshold)
            .field("strict", &self.strict)
            .field("counters", &self.counters())
            .finish_non_exhaustive()
    }
}
