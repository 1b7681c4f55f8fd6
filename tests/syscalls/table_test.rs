/*!
 * Dispatch table tests
 * Custom registrations and lookup bounds over arbitrary numbers
 */

use crate::common::{eax_errno, mapped_space, trapping_thread, TRAP_EIP};
use guest_kernel::core::limits::MAX_SYSCALL_NUMBER;
use guest_kernel::syscalls::numbers as nr;
use guest_kernel::syscalls::{
    ArgSpec, DecodedArgs, SyscallCategory, SyscallContext, SyscallEntry, SyscallLookup, SyscallTableBuilder,
};
use guest_kernel::{
    default_table, Errno, KernelServices, SubstrateConfig, SyscallOutcome, SyscallTrapHandler, TrapDisposition,
    TrapError,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;

fn sum_args(_ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> Result<SyscallOutcome, TrapError> {
    Ok(SyscallOutcome::ok(args.int(0) + args.int(1)))
}

fn jump(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> Result<SyscallOutcome, TrapError> {
    ctx.thread.cpu.eip = args.uint(0);
    Ok(SyscallOutcome::ContinueNoAdvance)
}

fn broken(_ctx: &mut SyscallContext<'_>, _args: &DecodedArgs) -> Result<SyscallOutcome, TrapError> {
    Err(TrapError::invariant("broken", "handler gave up"))
}

fn entry(name: &'static str, args: &'static [ArgSpec], handler: guest_kernel::syscalls::SyscallHandlerFn) -> SyscallEntry {
    SyscallEntry {
        name,
        category: SyscallCategory::SYSTEM,
        args,
        handler,
    }
}

fn custom_handler() -> SyscallTrapHandler {
    let mut builder = SyscallTableBuilder::new();
    builder
        .register(1, entry("sum", &[ArgSpec::Int, ArgSpec::Int], sum_args))
        .unwrap()
        .register(2, entry("jump", &[ArgSpec::UInt], jump))
        .unwrap()
        .register(3, entry("broken", &[], broken))
        .unwrap();
    SyscallTrapHandler::new(
        &SubstrateConfig::testing(),
        Arc::new(builder.build()),
        KernelServices::unsupported(),
    )
}

#[test]
fn test_duplicate_registration_is_rejected() {
    let mut builder = SyscallTableBuilder::new();
    builder.register(7, entry("first", &[], sum_args)).unwrap();

    assert_eq!(
        builder.register(7, entry("second", &[], sum_args)).err(),
        Some(TrapError::DuplicateSyscall {
            number: 7,
            existing: "first",
            name: "second"
        })
    );
}

#[test]
fn test_registration_beyond_table_is_rejected() {
    let mut builder = SyscallTableBuilder::new();
    assert!(matches!(
        builder.register(MAX_SYSCALL_NUMBER + 1, entry("late", &[], sum_args)),
        Err(TrapError::SyscallOutOfRange { .. })
    ));
    assert!(builder.register(MAX_SYSCALL_NUMBER, entry("last", &[], sum_args)).is_ok());
}

#[test]
fn test_negative_result_is_stored_as_is() {
    let space = mapped_space();
    let traps = custom_handler();
    let mut thread = trapping_thread(1, [(-10i32) as u32, 3, 0, 0, 0, 0]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax as i32, -7);
}

#[test]
fn test_handler_positioned_eip_is_kept() {
    let space = mapped_space();
    let traps = custom_handler();
    let mut thread = trapping_thread(2, [0x0800_0000, 0, 0, 0, 0, 0]);

    assert_eq!(traps.handle_trap(&mut thread, &space, 2).unwrap(), TrapDisposition::Resumed);
    assert_eq!(thread.cpu.eip, 0x0800_0000);
    assert_eq!(thread.cpu.eax, 2);
}

#[test]
fn test_handler_error_is_fatal() {
    let space = mapped_space();
    let traps = custom_handler();
    let mut thread = trapping_thread(3, [0; 6]);

    assert!(matches!(
        traps.handle_trap(&mut thread, &space, 2),
        Err(TrapError::Invariant { syscall: "broken", .. })
    ));
    assert_eq!(thread.cpu.eip, TRAP_EIP);
}

#[test]
fn test_default_table_names_are_unique_per_number() {
    let table = default_table().unwrap();
    let mut seen = 0;
    for (number, entry) in table.registered() {
        assert!(number <= MAX_SYSCALL_NUMBER);
        assert!(!entry.name.is_empty());
        assert!(entry.args.len() <= 6, "{} declares too many arguments", entry.name);
        seen += 1;
    }
    assert_eq!(seen, table.len());
}

#[test]
fn test_default_table_serves_time64_variants() {
    let table = default_table().unwrap();
    for number in [nr::CLOCK_GETTIME64, nr::CLOCK_GETRES_TIME64, nr::CLOCK_NANOSLEEP_TIME64] {
        assert!(matches!(table.lookup(number), SyscallLookup::Found(_)), "{number}");
    }
}

#[test]
fn test_default_table_serves_ownership_xattr_and_sysv_calls() {
    let table = default_table().unwrap();
    let numbers = [
        nr::CHOWN32,
        nr::FCHOWN32,
        nr::LCHOWN32,
        nr::FCHOWNAT,
        nr::SETRESUID32,
        nr::SETRESGID32,
        nr::GETRESUID32,
        nr::GETRESGID32,
        nr::GETGROUPS32,
        nr::SETGROUPS32,
        nr::STATFS,
        nr::STATFS64,
        nr::FSTATFS64,
        nr::GETXATTR,
        nr::LGETXATTR,
        nr::FGETXATTR,
        nr::FLISTXATTR,
        nr::FSETXATTR,
        nr::UTIMES,
        nr::UTIMENSAT,
        nr::UTIMENSAT_TIME64,
        nr::RENAMEAT,
        nr::RENAMEAT2,
        nr::SYMLINKAT,
        nr::FCHMODAT,
        nr::FLOCK,
        nr::FADVISE64,
        nr::SYNC_FILE_RANGE,
        nr::SCHED_SETAFFINITY,
        nr::SCHED_GETPARAM,
        nr::SCHED_GETSCHEDULER,
        nr::SCHED_GET_PRIORITY_MAX,
        nr::SCHED_GET_PRIORITY_MIN,
        nr::MINCORE,
        nr::MLOCK,
        nr::MEMFD_CREATE,
        nr::SENDMMSG,
        nr::SIGNALFD4,
        nr::INOTIFY_INIT,
        nr::IPC,
        nr::VM86,
    ];
    for number in numbers {
        assert!(matches!(table.lookup(number), SyscallLookup::Found(_)), "{number}");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_unknown_numbers_never_panic(number in any::<u32>()) {
        let table = default_table().unwrap();
        let lookup = table.lookup(number);
        if number > MAX_SYSCALL_NUMBER {
            prop_assert!(matches!(lookup, SyscallLookup::OutOfRange));
        } else {
            prop_assert!(!matches!(lookup, SyscallLookup::OutOfRange));
        }
    }

    #[test]
    fn prop_out_of_range_trap_is_enosys(number in (MAX_SYSCALL_NUMBER + 1)..=u32::MAX) {
        let space = mapped_space();
        let traps = custom_handler();
        let mut thread = trapping_thread(number, [0; 6]);

        prop_assert_eq!(traps.handle_trap(&mut thread, &space, 2).unwrap(), TrapDisposition::Resumed);
        prop_assert_eq!(thread.cpu.eax, eax_errno(Errno::ENOSYS.code()));
        prop_assert_eq!(thread.cpu.eip, TRAP_EIP + 2);
    }
}
