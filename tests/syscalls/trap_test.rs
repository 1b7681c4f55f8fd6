/*!
 * Trap handler tests
 *
 * Termination, signal diversion, register commit, and the cooperative
 * instruction charge, driven through the default table.
 */

use crate::common::{eax_errno, mapped_space, trapping_thread, PID, TRAP_EIP};
use guest_kernel::core::limits::MAX_SYSCALL_NUMBER;
use guest_kernel::process::BlockHandle;
use guest_kernel::syscalls::numbers as nr;
use guest_kernel::syscalls::{SignalOps, TimeLayout, TimeOps};
use guest_kernel::{
    Errno, GuestAddr, GuestAddressSpace, GuestThread, KernelServices, SubstrateConfig, SyscallOutcome,
    SyscallTrapHandler, ThreadState, TrapDisposition, TrapError,
};
use mockall::mock;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

mock! {
    pub Signals {}
    impl SignalOps for Signals {
        fn deliver_pending(&self, thread: &mut GuestThread, memory: &GuestAddressSpace) -> bool;
    }
}

/// Sleep that blocks the caller `blocks` times before completing
struct BlockingSleep {
    blocks: parking_lot::Mutex<u32>,
}

impl TimeOps for BlockingSleep {
    fn sleep(
        &self,
        _thread: &mut GuestThread,
        _memory: &GuestAddressSpace,
        _clock: u32,
        _flags: u32,
        _request: GuestAddr,
        _remain: GuestAddr,
        _layout: TimeLayout,
    ) -> SyscallOutcome {
        let mut blocks = self.blocks.lock();
        if *blocks > 0 {
            *blocks -= 1;
            return SyscallOutcome::BlockedRetry;
        }
        SyscallOutcome::success()
    }
}

/// Sleep that burns real time on the host
struct SpinningSleep(Duration);

impl TimeOps for SpinningSleep {
    fn sleep(
        &self,
        _thread: &mut GuestThread,
        _memory: &GuestAddressSpace,
        _clock: u32,
        _flags: u32,
        _request: GuestAddr,
        _remain: GuestAddr,
        _layout: TimeLayout,
    ) -> SyscallOutcome {
        std::thread::sleep(self.0);
        SyscallOutcome::success()
    }
}

fn handler(config: &SubstrateConfig, kernel: KernelServices) -> SyscallTrapHandler {
    SyscallTrapHandler::with_default_table(config, kernel).unwrap()
}

fn unsupported() -> SyscallTrapHandler {
    handler(&SubstrateConfig::testing(), KernelServices::unsupported())
}

fn with_signals(signals: MockSignals) -> SyscallTrapHandler {
    handler(
        &SubstrateConfig::testing(),
        KernelServices {
            signals: Arc::new(signals),
            ..KernelServices::unsupported()
        },
    )
}

#[test]
fn test_return_value_commits_and_advances() {
    let space = mapped_space();
    let traps = unsupported();
    let mut thread = trapping_thread(nr::GETPID, [0; 6]);
    thread.cpu.next_block = Some(BlockHandle(7));

    let disposition = traps.handle_trap(&mut thread, &space, 2).unwrap();

    assert_eq!(disposition, TrapDisposition::Resumed);
    assert_eq!(thread.cpu.eax, PID);
    assert_eq!(thread.cpu.eip, TRAP_EIP + 2);
    assert_eq!(thread.cpu.next_block, None);
}

#[test]
fn test_out_of_range_number_is_enosys() {
    let space = mapped_space();
    let traps = unsupported();
    let mut thread = trapping_thread(MAX_SYSCALL_NUMBER + 5, [0; 6]);

    assert_eq!(traps.handle_trap(&mut thread, &space, 2).unwrap(), TrapDisposition::Resumed);
    assert_eq!(thread.cpu.eax, eax_errno(Errno::ENOSYS.code()));
    assert_eq!(thread.cpu.eip, TRAP_EIP + 2);
    // out of range numbers are never remembered
    assert_eq!(traps.table().reported_missing(), 0);
}

#[test]
fn test_huge_number_is_enosys() {
    let space = mapped_space();
    let traps = unsupported();
    let mut thread = trapping_thread(u32::MAX, [0; 6]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, eax_errno(Errno::ENOSYS.code()));
}

#[test]
fn test_empty_slot_is_enosys_and_reported_once() {
    let space = mapped_space();
    let traps = unsupported();

    for _ in 0..3 {
        let mut thread = trapping_thread(0, [0; 6]);
        traps.handle_trap(&mut thread, &space, 2).unwrap();
        assert_eq!(thread.cpu.eax, eax_errno(Errno::ENOSYS.code()));
        assert_eq!(thread.cpu.eip, TRAP_EIP + 2);
    }
    assert_eq!(traps.table().reported_missing(), 1);
    assert_eq!(traps.stats().unimplemented, 3);
}

#[test]
fn test_unsupported_collaborator_returns_enosys() {
    let space = mapped_space();
    let traps = unsupported();
    let mut thread = trapping_thread(nr::NANOSLEEP, [0; 6]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, eax_errno(Errno::ENOSYS.code()));
    assert_eq!(traps.stats().dispatched, 1);
}

#[test]
fn test_terminating_thread_is_torn_down_untouched() {
    let space = mapped_space();
    let traps = unsupported();
    let mut thread = trapping_thread(nr::GETPID, [1, 2, 3, 4, 5, 6]);
    thread.cpu.next_block = Some(BlockHandle(3));
    thread.signals().request_termination();
    let before = thread.cpu.clone();

    let disposition = traps.handle_trap(&mut thread, &space, 2).unwrap();

    assert_eq!(disposition, TrapDisposition::ThreadTerminating);
    assert_eq!(thread.cpu, before);
    assert_eq!(thread.state, ThreadState::Terminated);
    assert_eq!(traps.stats().terminated, 1);
    assert_eq!(traps.stats().dispatched, 0);
}

#[test]
fn test_pending_signal_diverts_trap() {
    let space = mapped_space();
    let mut signals = MockSignals::new();
    signals.expect_deliver_pending().times(1).returning(|thread, _| {
        thread.cpu.eip = 0x0050_0000;
        true
    });
    let traps = with_signals(signals);
    let mut thread = trapping_thread(nr::GETPID, [0; 6]);
    thread.cpu.next_block = Some(BlockHandle(9));
    thread.signals().raise(10);

    let disposition = traps.handle_trap(&mut thread, &space, 2).unwrap();

    assert_eq!(disposition, TrapDisposition::SignalDiverted);
    assert_eq!(thread.cpu.eax, nr::GETPID);
    assert_eq!(thread.cpu.eip, 0x0050_0000);
    assert_eq!(thread.cpu.next_block, None);
    assert_eq!(traps.stats().dispatched, 0);
}

#[test]
fn test_pending_signal_without_handler_dispatches() {
    let space = mapped_space();
    let mut signals = MockSignals::new();
    signals.expect_deliver_pending().times(1).return_const(false);
    let traps = with_signals(signals);
    let mut thread = trapping_thread(nr::GETPID, [0; 6]);
    thread.signals().raise(17);

    assert_eq!(traps.handle_trap(&mut thread, &space, 2).unwrap(), TrapDisposition::Resumed);
    assert_eq!(thread.cpu.eax, PID);
}

#[test]
fn test_no_pending_signal_skips_delivery() {
    let space = mapped_space();
    let mut signals = MockSignals::new();
    signals.expect_deliver_pending().never();
    let traps = with_signals(signals);
    let mut thread = trapping_thread(nr::GETPID, [0; 6]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
}

#[test]
fn test_blocked_call_leaves_eip_on_trap() {
    let space = mapped_space();
    let traps = handler(
        &SubstrateConfig::testing(),
        KernelServices {
            time: Arc::new(BlockingSleep {
                blocks: parking_lot::Mutex::new(1),
            }),
            ..KernelServices::unsupported()
        },
    );
    let mut thread = trapping_thread(nr::NANOSLEEP, [0x0010_0000, 0, 0, 0, 0, 0]);
    thread.cpu.next_block = Some(BlockHandle(1));

    assert_eq!(traps.handle_trap(&mut thread, &space, 2).unwrap(), TrapDisposition::Suspended);
    assert_eq!(thread.cpu.eip, TRAP_EIP);
    assert_eq!(thread.cpu.eax, nr::NANOSLEEP);
    assert_eq!(thread.cpu.next_block, None);

    // woken: the same trap re-executes and completes
    assert_eq!(traps.handle_trap(&mut thread, &space, 2).unwrap(), TrapDisposition::Resumed);
    assert_eq!(thread.cpu.eax, 0);
    assert_eq!(thread.cpu.eip, TRAP_EIP + 2);

    let stats = traps.stats();
    assert_eq!(stats.suspended, 1);
    assert_eq!(stats.resumed, 1);
    assert_eq!(stats.traps, 2);
}

#[test]
fn test_cooperative_charges_instructions_for_host_time() {
    let space = mapped_space();
    let kernel = KernelServices {
        time: Arc::new(SpinningSleep(Duration::from_millis(2))),
        ..KernelServices::unsupported()
    };
    let traps = handler(&SubstrateConfig::testing(), kernel);
    let mut thread = trapping_thread(nr::NANOSLEEP, [0; 6]);
    thread.cpu.block_instruction_count = 5;

    traps.handle_trap(&mut thread, &space, 2).unwrap();

    // 100_000 instructions per 10 ms of host time
    assert!(
        thread.cpu.block_instruction_count >= 5 + 20_000,
        "charged {}",
        thread.cpu.block_instruction_count
    );
}

#[test]
fn test_multi_threaded_charges_nothing() {
    let space = mapped_space();
    let kernel = KernelServices {
        time: Arc::new(SpinningSleep(Duration::from_millis(1))),
        ..KernelServices::unsupported()
    };
    let traps = handler(&SubstrateConfig::multi_threaded(), kernel);
    let mut thread = trapping_thread(nr::NANOSLEEP, [0; 6]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.block_instruction_count, 0);
}

#[test]
fn test_latched_signal_start_is_fatal_when_multi_threaded() {
    let space = mapped_space();
    let traps = handler(&SubstrateConfig::multi_threaded(), KernelServices::unsupported());
    let mut thread = trapping_thread(nr::GETPID, [0; 6]);
    thread.signals().set_start_signal(true);

    assert_eq!(
        traps.handle_trap(&mut thread, &space, 2),
        Err(TrapError::SignalNotInterrupted {
            tid: thread.tid,
            syscall: nr::GETPID
        })
    );
}

#[test]
fn test_latched_signal_start_ignored_when_cooperative() {
    let space = mapped_space();
    let traps = unsupported();
    let mut thread = trapping_thread(nr::GETPID, [0; 6]);
    thread.signals().set_start_signal(true);

    assert!(traps.handle_trap(&mut thread, &space, 2).is_ok());
}

#[test]
fn test_exit_terminates_without_advancing() {
    let space = mapped_space();
    let traps = unsupported();
    let mut thread = trapping_thread(nr::EXIT, [3, 0, 0, 0, 0, 0]);

    assert_eq!(traps.handle_trap(&mut thread, &space, 2).unwrap(), TrapDisposition::Resumed);
    assert_eq!(thread.state, ThreadState::Terminated);
    assert_eq!(thread.cpu.eip, TRAP_EIP);
}

#[test]
fn test_tracing_every_category_still_dispatches() {
    let space = mapped_space();
    let config = SubstrateConfig {
        syscall_trace_mask: guest_kernel::syscalls::SyscallCategory::all(),
        ..SubstrateConfig::testing()
    };
    let traps = handler(&config, KernelServices::unsupported());
    let mut thread = trapping_thread(nr::GETPID, [0; 6]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, PID);
}
