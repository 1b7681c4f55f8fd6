/*!
 * Guest access primitive tests
 */

use crate::common::{data_addr, mapped_space, write_cstr, DATA_PAGE, DATA_PAGES};
use guest_kernel::memory::GuestStringError;
use guest_kernel::{AccessError, AccessKind, GuestAddr, GuestFault, GuestPage, PageFlags};
use pretty_assertions::assert_eq;

const PAGE: u32 = 4096;

#[test]
fn test_write_then_read_across_page_boundary() {
    let space = mapped_space();
    let addr = data_addr(PAGE - 3);
    let data = [1u8, 2, 3, 4, 5, 6, 7, 8];

    space.write_bytes(addr, &data).unwrap();

    let mut out = [0u8; 8];
    space.read_bytes(addr, &mut out).unwrap();
    assert_eq!(out, data);
}

#[test]
fn test_words_are_little_endian() {
    let space = mapped_space();

    space.write_u32(data_addr(0), 0x1122_3344).unwrap();
    assert_eq!(space.read_u8(data_addr(0)).unwrap(), 0x44);
    assert_eq!(space.read_u16(data_addr(2)).unwrap(), 0x1122);

    space.write_u64(data_addr(8), 0x0102_0304_0506_0708).unwrap();
    assert_eq!(space.read_u32(data_addr(8)).unwrap(), 0x0506_0708);
    assert_eq!(space.read_u64(data_addr(8)).unwrap(), 0x0102_0304_0506_0708);
}

#[test]
fn test_unmapped_read_faults_at_address() {
    let space = mapped_space();
    let addr = GuestAddr::new(0x1234);

    assert_eq!(space.read_u32(addr), Err(GuestFault::new(addr, AccessKind::Read)));
}

#[test]
fn test_write_running_off_mapping_faults_on_next_page() {
    let space = mapped_space();
    let end = DATA_PAGE.offset(DATA_PAGES).start();

    let result = space.write_bytes(data_addr(DATA_PAGES * PAGE - 2), &[0xaa; 4]);

    assert_eq!(result, Err(AccessError::Fault(GuestFault::new(end, AccessKind::Write))));
}

#[test]
fn test_read_past_top_of_address_space_faults() {
    let space = mapped_space();
    let mut buf = [0u8; 4];

    assert!(space.read_bytes(GuestAddr::new(0xffff_fffe), &mut buf).is_err());
}

#[test]
fn test_write_to_read_only_page_faults() {
    let space = mapped_space();
    let changed = space
        .set_protection(DATA_PAGE, DATA_PAGES + 8, PageFlags::READ)
        .unwrap();

    // only mapped pages count
    assert_eq!(changed, DATA_PAGES);
    assert_eq!(
        space.write_u8(data_addr(10), 1),
        Err(AccessError::Fault(GuestFault::new(data_addr(10), AccessKind::Write)))
    );
    assert_eq!(space.read_u8(data_addr(10)).unwrap(), 0);
}

#[test]
fn test_exec_only_page_is_readable() {
    let space = mapped_space();
    space.set_protection(DATA_PAGE, 1, PageFlags::EXEC).unwrap();

    assert!(space.read_u32(data_addr(0)).is_ok());
    assert!(space.write_u32(data_addr(0), 1).is_err());
}

#[test]
fn test_unmap_zeroes_and_keeps_storage() {
    let space = mapped_space();
    space.write_u32(data_addr(PAGE), 0xfeed_face).unwrap();

    space.unmap(DATA_PAGE.offset(1), 1).unwrap();
    assert!(space.read_u32(data_addr(PAGE)).is_err());
    assert!(space.is_committed(DATA_PAGE.offset(1)));

    space.map(DATA_PAGE.offset(1), 1, PageFlags::READ_WRITE).unwrap();
    assert_eq!(space.read_u32(data_addr(PAGE)).unwrap(), 0);
}

#[test]
fn test_map_replaces_existing_contents() {
    let space = mapped_space();
    space.write_u32(data_addr(0), 7).unwrap();

    space.map(DATA_PAGE, 1, PageFlags::READ).unwrap();

    assert_eq!(space.read_u32(data_addr(0)).unwrap(), 0);
    assert_eq!(space.protection(DATA_PAGE), PageFlags::MAPPED | PageFlags::READ);
}

#[test]
fn test_cstring_spanning_pages() {
    let space = mapped_space();
    let addr = data_addr(PAGE - 4);
    write_cstr(&space, addr, "/usr/bin/env");

    assert_eq!(space.read_cstring(addr, 64).unwrap(), "/usr/bin/env");
}

#[test]
fn test_cstring_longer_than_limit() {
    let space = mapped_space();
    write_cstr(&space, data_addr(0), "a-rather-long-name");

    assert_eq!(
        space.read_cstring(data_addr(0), 8),
        Err(GuestStringError::TooLong {
            address: data_addr(0),
            max_len: 8
        })
    );
}

#[test]
fn test_unterminated_cstring_faults_at_mapping_end() {
    let space = mapped_space();
    let last = data_addr(DATA_PAGES * PAGE - 4);
    space.write_bytes(last, b"abcd").unwrap();

    assert!(matches!(
        space.read_cstring(last, 1024),
        Err(GuestStringError::Fault(fault)) if fault.address == DATA_PAGE.offset(DATA_PAGES).start()
    ));
}

#[test]
fn test_string_array() {
    let space = mapped_space();
    write_cstr(&space, data_addr(0x100), "ls");
    write_cstr(&space, data_addr(0x200), "-la");
    let array = data_addr(0x800);
    space.write_u32(array, data_addr(0x100).get()).unwrap();
    space.write_u32(array.wrapping_add(4), data_addr(0x200).get()).unwrap();
    space.write_u32(array.wrapping_add(8), 0).unwrap();

    assert_eq!(space.read_string_array(array).unwrap(), vec!["ls".to_string(), "-la".to_string()]);
}

#[test]
fn test_string_array_with_bad_pointer() {
    let space = mapped_space();
    let array = data_addr(0x800);
    space.write_u32(array, 0x10).unwrap();
    space.write_u32(array.wrapping_add(4), 0).unwrap();

    assert!(matches!(space.read_string_array(array), Err(GuestStringError::Fault(_))));
}

#[test]
fn test_concurrent_writers_on_separate_pages() {
    let space = mapped_space();

    std::thread::scope(|scope| {
        for worker in 0..DATA_PAGES {
            let space = &space;
            scope.spawn(move || {
                let base = data_addr(worker * PAGE);
                for i in 0..256u32 {
                    space.write_u32(base.wrapping_add(i * 4), worker << 16 | i).unwrap();
                }
            });
        }
    });

    for worker in 0..DATA_PAGES {
        let base = data_addr(worker * PAGE);
        assert_eq!(space.read_u32(base.wrapping_add(255 * 4)).unwrap(), worker << 16 | 255);
    }
}

#[test]
fn test_page_range_checks() {
    let space = mapped_space();
    assert!(space.map(GuestPage(0xfffff), 2, PageFlags::READ).is_err());
    assert!(space.unmap(GuestPage(0x10), 0).is_err());
}
