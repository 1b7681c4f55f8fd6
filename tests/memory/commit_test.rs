/*!
 * Lazy commit tests
 * Grain rounding, idempotent commits, range checks, and teardown
 */

use crate::common::{CountingHost, RecordingCache};
use guest_kernel::{GuestAddressSpace, GuestPage, MemoryError, PageFlags, SubstrateConfig};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// 64 KiB testing grains over 4 KiB pages
const GRAIN_PAGES: u32 = 16;
const LAST_PAGE: u32 = 0xfffff;

fn counting_space() -> (GuestAddressSpace, Arc<CountingHost>) {
    let host = Arc::new(CountingHost::default());
    let space = GuestAddressSpace::new(
        &SubstrateConfig::testing(),
        host.clone(),
        Arc::new(RecordingCache::default()),
    )
    .unwrap();
    (space, host)
}

#[test]
fn test_testing_config_uses_64k_grains() {
    let (space, _) = counting_space();
    assert_eq!(space.allocator().granularity(), 64 * 1024);
    assert_eq!(space.allocator().grain_pages(), GRAIN_PAGES);
    assert_eq!(space.host_base() % (1 << 32), 0);
    space.release().unwrap();
}

#[test]
fn test_commit_rounds_to_whole_grain() {
    let (space, host) = counting_space();

    let grains = space.commit_range(GuestPage(0x203), 2, 0).unwrap();
    assert_eq!(grains, 1);
    assert_eq!(host.commits(), 1);
    assert_eq!(host.committed_bytes(), 64 * 1024);

    for page in 0x200..0x210 {
        assert!(space.is_committed(GuestPage(page)), "page {page:#x}");
    }
    assert!(!space.is_committed(GuestPage(0x1ff)));
    assert!(!space.is_committed(GuestPage(0x210)));
    assert_eq!(space.stats().committed_pages, u64::from(GRAIN_PAGES));
    space.release().unwrap();
}

#[test]
fn test_commit_across_grain_boundary() {
    let (space, host) = counting_space();

    let grains = space.commit_range(GuestPage(0x20f), 2, 0).unwrap();
    assert_eq!(grains, 2);
    assert_eq!(host.commits(), 2);
    assert!(space.is_committed(GuestPage(0x200)));
    assert!(space.is_committed(GuestPage(0x21f)));
    assert!(!space.is_committed(GuestPage(0x220)));
    space.release().unwrap();
}

#[test]
fn test_recommit_touches_nothing() {
    let (space, host) = counting_space();

    space.commit_range(GuestPage(0x400), 1, 0).unwrap();
    let again = space.commit_range(GuestPage(0x40a), 3, 0xdead_beef).unwrap();

    assert_eq!(again, 0);
    assert_eq!(host.commits(), 1);
    space.release().unwrap();
}

#[test]
fn test_last_page_commits_last_grain() {
    let (space, _) = counting_space();

    assert_eq!(space.commit_range(GuestPage(LAST_PAGE), 1, 0).unwrap(), 1);
    assert!(space.is_committed(GuestPage(LAST_PAGE + 1 - GRAIN_PAGES)));
    assert!(!space.is_committed(GuestPage(LAST_PAGE - GRAIN_PAGES)));
    space.release().unwrap();
}

#[test]
fn test_commit_outside_guest_space_is_rejected() {
    let (space, host) = counting_space();

    assert_eq!(
        space.commit_range(GuestPage(LAST_PAGE), 2, 0),
        Err(MemoryError::PageRange {
            first: LAST_PAGE,
            count: 2
        })
    );
    assert!(matches!(
        space.commit_range(GuestPage(0x10), 0, 0),
        Err(MemoryError::PageRange { .. })
    ));
    assert_eq!(host.commits(), 0);
    space.release().unwrap();
}

#[test]
fn test_map_commits_and_sets_permissions() {
    let (space, host) = counting_space();

    space.map(GuestPage(0x300), 2, PageFlags::READ).unwrap();

    assert_eq!(host.commits(), 1);
    assert_eq!(space.protection(GuestPage(0x300)), PageFlags::MAPPED | PageFlags::READ);
    assert_eq!(space.protection(GuestPage(0x302)), PageFlags::empty());
    space.release().unwrap();
}

#[test]
fn test_release_returns_reservation() {
    let (space, host) = counting_space();
    space.map(GuestPage(0x300), 1, PageFlags::READ_WRITE).unwrap();

    space.release().unwrap();
    assert_eq!(host.releases.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unsupported_granularity_is_rejected() {
    let config = SubstrateConfig {
        allocation_granularity: Some(64 * 1024 + 512),
        ..SubstrateConfig::testing()
    };
    let result = GuestAddressSpace::new(
        &config,
        Arc::new(CountingHost::default()),
        Arc::new(RecordingCache::default()),
    );
    assert!(matches!(result, Err(MemoryError::UnsupportedGranularity(_))));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_commit_covers_exactly_the_rounded_range(first in 0u32..0x2000, count in 1u32..48) {
        let (space, host) = counting_space();

        let grains = space.commit_range(GuestPage(first), count, 0).unwrap();

        let start = first / GRAIN_PAGES * GRAIN_PAGES;
        let end = (first + count).div_ceil(GRAIN_PAGES) * GRAIN_PAGES;
        prop_assert_eq!(grains, (end - start) / GRAIN_PAGES);
        prop_assert_eq!(host.commits() as u32, grains);
        prop_assert_eq!(space.stats().committed_pages, u64::from(end - start));
        for page in first..first + count {
            prop_assert!(space.is_committed(GuestPage(page)));
        }
        if start > 0 {
            prop_assert!(!space.is_committed(GuestPage(start - 1)));
        }
        prop_assert!(!space.is_committed(GuestPage(end)));
        space.release().unwrap();
    }
}
