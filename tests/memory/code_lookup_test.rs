/*!
 * Code lookup table tests (large-address mode)
 */

use crate::common::space_with_cache;
use guest_kernel::{GuestAddr, GuestPage, MemoryError, SubstrateConfig};
use pretty_assertions::assert_eq;

const MISS: u64 = 0xdead_0000_0000_0001;

fn large_config() -> SubstrateConfig {
    SubstrateConfig {
        large_address_space: true,
        ..SubstrateConfig::testing()
    }
}

#[test]
fn test_table_only_in_large_mode() {
    let (small, _) = space_with_cache(&SubstrateConfig::testing());
    assert!(small.code_lookup().is_none());

    let (large, _) = space_with_cache(&large_config());
    assert!(large.code_lookup().is_some());
}

#[test]
fn test_slots_fill_with_default_on_commit() {
    let (space, _) = space_with_cache(&large_config());
    let table = space.code_lookup().unwrap();
    let eip = GuestAddr::new(0x0040_1234);

    assert_eq!(table.get(eip), None);
    assert_eq!(table.commit_for(eip.page(), 1, MISS).unwrap(), 1);

    assert_eq!(table.get(eip), Some(MISS));
    assert_eq!(table.get(eip.page().start()), Some(MISS));
}

#[test]
fn test_commit_covers_whole_grain() {
    let (space, _) = space_with_cache(&large_config());
    let table = space.code_lookup().unwrap();

    // 32 KiB of slots per guest page, two pages per 64 KiB grain
    table.commit_for(GuestPage(0x400), 1, MISS).unwrap();
    assert!(table.is_committed(GuestPage(0x401)));
    assert!(!table.is_committed(GuestPage(0x402)));
}

#[test]
fn test_set_and_recommit_keeps_values() {
    let (space, _) = space_with_cache(&large_config());
    let table = space.code_lookup().unwrap();
    let eip = GuestAddr::new(0x0040_2000);
    table.commit_for(eip.page(), 1, MISS).unwrap();

    table.set(eip, 0x7f00_1234_5678).unwrap();
    assert_eq!(table.commit_for(eip.page(), 1, 0).unwrap(), 0);

    assert_eq!(table.get(eip), Some(0x7f00_1234_5678));
    assert_eq!(table.get(eip.wrapping_add(1)), Some(MISS));
}

#[test]
fn test_set_uncommitted_slot_fails() {
    let (space, _) = space_with_cache(&large_config());
    let table = space.code_lookup().unwrap();
    let eip = GuestAddr::new(0x8000_0000);

    assert_eq!(table.set(eip, 1), Err(MemoryError::LookupNotCommitted(eip)));
}
