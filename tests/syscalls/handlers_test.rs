/*!
 * Handler shim tests
 *
 * Argument decoding from guest memory and the reshaping the shims do
 * before reaching a collaborator.
 */

use crate::common::{data_addr, eax_errno, mapped_space, trapping_thread, write_cstr, TRAP_EIP};
use guest_kernel::syscalls::numbers as nr;
use guest_kernel::syscalls::{
    FileOps, MemoryMapOps, ProcessId, ProcessOps, ShmCall, TimeLayout, TimesLayout,
};
use guest_kernel::{
    Errno, GuestAddr, GuestAddressSpace, GuestThread, KernelServices, SubstrateConfig, SyscallOutcome,
    SyscallTrapHandler, TrapDisposition,
};
use mockall::mock;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::Arc;

mock! {
    pub Process {}
    impl ProcessOps for Process {
        fn execve(
            &self,
            thread: &mut GuestThread,
            memory: &GuestAddressSpace,
            path: &str,
            args: &[String],
            env: &[String],
        ) -> bool;
        fn id(&self, thread: &GuestThread, which: ProcessId) -> i32;
        fn set_credentials(&self, thread: &GuestThread, which: ProcessId, value: u32) -> SyscallOutcome;
        fn wait(
            &self,
            thread: &mut GuestThread,
            memory: &GuestAddressSpace,
            pid: i32,
            status: GuestAddr,
            options: u32,
        ) -> SyscallOutcome;
        fn getrusage(&self, thread: &GuestThread, memory: &GuestAddressSpace, who: i32, usage: GuestAddr) -> SyscallOutcome;
    }
}

mock! {
    pub Files {}
    impl FileOps for Files {
        fn write(
            &self,
            thread: &mut GuestThread,
            memory: &GuestAddressSpace,
            fd: i32,
            buf: GuestAddr,
            len: u32,
            offset: Option<u64>,
        ) -> SyscallOutcome;
        fn open(&self, thread: &GuestThread, dirfd: i32, path: &str, flags: u32, mode: u32) -> SyscallOutcome;
        fn lseek(&self, thread: &GuestThread, fd: i32, offset: i64, whence: u32) -> Result<i64, Errno>;
        fn rename(&self, thread: &GuestThread, from: &str, to: &str) -> SyscallOutcome;
    }
}

mock! {
    pub Mappings {}
    impl MemoryMapOps for Mappings {
        fn mmap(
            &self,
            thread: &GuestThread,
            memory: &GuestAddressSpace,
            addr: GuestAddr,
            len: u32,
            prot: u32,
            flags: u32,
            fd: i32,
            offset: u64,
        ) -> SyscallOutcome;
        fn shm(&self, thread: &GuestThread, memory: &GuestAddressSpace, call: ShmCall) -> SyscallOutcome;
    }
}

/// Records every timestamp update it is asked for
#[derive(Default)]
struct TimesRecorder {
    calls: Mutex<Vec<(i32, Option<String>, TimesLayout)>>,
}

impl FileOps for TimesRecorder {
    #[allow(clippy::too_many_arguments)]
    fn set_times(
        &self,
        _thread: &GuestThread,
        _memory: &GuestAddressSpace,
        dirfd: i32,
        path: Option<&str>,
        _times: GuestAddr,
        _flags: u32,
        layout: TimesLayout,
    ) -> SyscallOutcome {
        self.calls.lock().push((dirfd, path.map(str::to_owned), layout));
        SyscallOutcome::success()
    }
}

fn handler(kernel: KernelServices) -> SyscallTrapHandler {
    SyscallTrapHandler::with_default_table(&SubstrateConfig::testing(), kernel).unwrap()
}

fn with_process(process: MockProcess) -> SyscallTrapHandler {
    handler(KernelServices {
        process: Arc::new(process),
        ..KernelServices::unsupported()
    })
}

fn with_files(files: MockFiles) -> SyscallTrapHandler {
    handler(KernelServices {
        files: Arc::new(files),
        ..KernelServices::unsupported()
    })
}

fn with_mappings(mappings: MockMappings) -> SyscallTrapHandler {
    handler(KernelServices {
        memory: Arc::new(mappings),
        ..KernelServices::unsupported()
    })
}

/// argv array at 0x800 pointing at strings from 0x100
fn write_argv(space: &GuestAddressSpace, args: &[&str]) -> GuestAddr {
    let array = data_addr(0x800);
    for (i, arg) in args.iter().enumerate() {
        let at = data_addr(0x100 + 0x40 * i as u32);
        write_cstr(space, at, arg);
        space.write_u32(array.wrapping_add(4 * i as u32), at.get()).unwrap();
    }
    space.write_u32(array.wrapping_add(4 * args.len() as u32), 0).unwrap();
    array
}

#[test]
fn test_execve_success_keeps_handler_eip() {
    let space = mapped_space();
    write_cstr(&space, data_addr(0), "/bin/true");
    let argv = write_argv(&space, &["true", "-v"]);

    let mut process = MockProcess::new();
    process
        .expect_execve()
        .withf(|_, _, path, args, env| path == "/bin/true" && args == ["true", "-v"] && env.is_empty())
        .times(1)
        .returning(|thread, _, _, _, _| {
            thread.cpu.eip = 0x0804_8000;
            true
        });
    let traps = with_process(process);
    let mut thread = trapping_thread(nr::EXECVE, [data_addr(0).get(), argv.get(), 0, 0, 0, 0]);

    assert_eq!(traps.handle_trap(&mut thread, &space, 2).unwrap(), TrapDisposition::Resumed);
    assert_eq!(thread.cpu.eip, 0x0804_8000);
    assert_eq!(thread.cpu.eax, nr::EXECVE);
}

#[test]
fn test_execve_failure_is_enoent() {
    let space = mapped_space();
    write_cstr(&space, data_addr(0), "/missing");
    let mut process = MockProcess::new();
    process.expect_execve().times(1).return_const(false);
    let traps = with_process(process);
    let mut thread = trapping_thread(nr::EXECVE, [data_addr(0).get(), 0, 0, 0, 0, 0]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, eax_errno(Errno::ENOENT.code()));
    assert_eq!(thread.cpu.eip, TRAP_EIP + 2);
}

#[test]
fn test_null_path_faults_before_handler() {
    let space = mapped_space();
    let mut process = MockProcess::new();
    process.expect_execve().never();
    let traps = with_process(process);
    let mut thread = trapping_thread(nr::EXECVE, [0; 6]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, eax_errno(Errno::EFAULT.code()));
}

#[test]
fn test_unmapped_path_faults_before_handler() {
    let space = mapped_space();
    let mut files = MockFiles::new();
    files.expect_open().never();
    let traps = with_files(files);
    let mut thread = trapping_thread(nr::OPEN, [0x0000_2000, 0, 0, 0, 0, 0]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, eax_errno(Errno::EFAULT.code()));
}

#[test]
fn test_overlong_path_is_enametoolong() {
    let space = mapped_space();
    write_cstr(&space, data_addr(0), &"x".repeat(2000));
    let mut files = MockFiles::new();
    files.expect_open().never();
    let traps = with_files(files);
    let mut thread = trapping_thread(nr::OPEN, [data_addr(0).get(), 0, 0, 0, 0, 0]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, eax_errno(Errno::ENAMETOOLONG.code()));
}

#[test]
fn test_open_uses_cwd_relative_dirfd() {
    let space = mapped_space();
    write_cstr(&space, data_addr(0), "etc/passwd");
    let mut files = MockFiles::new();
    files
        .expect_open()
        .withf(|_, dirfd, path, flags, mode| *dirfd == -100 && path == "etc/passwd" && *flags == 0o2 && *mode == 0o644)
        .times(1)
        .return_const(SyscallOutcome::ok(3));
    let traps = with_files(files);
    let mut thread = trapping_thread(nr::OPEN, [data_addr(0).get(), 0o2, 0o644, 0, 0, 0]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, 3);
}

#[test]
fn test_write_passes_buffer_through() {
    let space = mapped_space();
    let mut files = MockFiles::new();
    files
        .expect_write()
        .withf(|_, _, fd, buf, len, offset| *fd == 1 && buf.get() == 0x0010_0000 && *len == 12 && offset.is_none())
        .times(1)
        .return_const(SyscallOutcome::ok(12));
    let traps = with_files(files);
    let mut thread = trapping_thread(nr::WRITE, [1, 0x0010_0000, 12, 0, 0, 0]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, 12);
}

#[test]
fn test_pwrite64_joins_offset_registers() {
    let space = mapped_space();
    let mut files = MockFiles::new();
    files
        .expect_write()
        .withf(|_, _, _, _, _, offset| *offset == Some(0x0000_0001_0000_0020))
        .times(1)
        .return_const(SyscallOutcome::ok(4));
    let traps = with_files(files);
    let mut thread = trapping_thread(nr::PWRITE64, [5, 0x0010_0000, 4, 0x20, 1, 0]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, 4);
}

#[test]
fn test_lseek_past_32_bits_overflows() {
    let space = mapped_space();
    let mut files = MockFiles::new();
    files
        .expect_lseek()
        .withf(|_, fd, offset, whence| *fd == 3 && *offset == 0 && *whence == 2)
        .times(1)
        .returning(|_, _, _, _| Ok(1 << 33));
    let traps = with_files(files);
    let mut thread = trapping_thread(nr::LSEEK, [3, 0, 2, 0, 0, 0]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, eax_errno(Errno::EOVERFLOW.code()));
}

#[test]
fn test_llseek_writes_full_offset() {
    let space = mapped_space();
    let mut files = MockFiles::new();
    files
        .expect_lseek()
        .withf(|_, fd, offset, whence| *fd == 3 && *offset == 0x0000_0002_0000_0000 && *whence == 0)
        .times(1)
        .returning(|_, _, offset, _| Ok(offset));
    let traps = with_files(files);
    let result = data_addr(0x40);
    let mut thread = trapping_thread(nr::LLSEEK, [3, 2, 0, result.get(), 0, 0]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, 0);
    assert_eq!(space.read_u64(result).unwrap(), 0x0000_0002_0000_0000);
}

#[test]
fn test_llseek_bad_result_pointer_is_efault() {
    let space = mapped_space();
    let mut files = MockFiles::new();
    files.expect_lseek().returning(|_, _, _, _| Ok(0));
    let traps = with_files(files);
    let mut thread = trapping_thread(nr::LLSEEK, [3, 0, 0, 0x10, 0, 0]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, eax_errno(Errno::EFAULT.code()));
}

#[test]
fn test_mmap2_offset_is_in_pages() {
    let space = mapped_space();
    let mut mappings = MockMappings::new();
    mappings
        .expect_mmap()
        .withf(|_, _, _, len, _, _, fd, offset| *len == 0x2000 && *fd == 4 && *offset == 3 * 4096)
        .times(1)
        .return_const(SyscallOutcome::ok(0x4000_0000));
    let traps = with_mappings(mappings);
    let mut thread = trapping_thread(nr::MMAP2, [0, 0x2000, 3, 2, 4, 3]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, 0x4000_0000);
}

#[test]
fn test_old_mmap_reads_argument_block() {
    let space = mapped_space();
    let block = data_addr(0x200);
    for (i, word) in [0x5000_0000u32, 0x1000, 3, 0x22, (-1i32) as u32, 0x3000].iter().enumerate() {
        space.write_u32(block.wrapping_add(4 * i as u32), *word).unwrap();
    }
    let mut mappings = MockMappings::new();
    mappings
        .expect_mmap()
        .withf(|_, _, addr, len, prot, flags, fd, offset| {
            addr.get() == 0x5000_0000 && *len == 0x1000 && *prot == 3 && *flags == 0x22 && *fd == -1 && *offset == 0x3000
        })
        .times(1)
        .return_const(SyscallOutcome::ok(0x5000_0000));
    let traps = with_mappings(mappings);
    let mut thread = trapping_thread(nr::MMAP, [block.get(), 0, 0, 0, 0, 0]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, 0x5000_0000);
}

#[test]
fn test_old_mmap_unaligned_offset_is_einval() {
    let space = mapped_space();
    let block = data_addr(0x200);
    space.write_u32(block.wrapping_add(20), 0x10).unwrap();
    let mut mappings = MockMappings::new();
    mappings.expect_mmap().never();
    let traps = with_mappings(mappings);
    let mut thread = trapping_thread(nr::MMAP, [block.get(), 0, 0, 0, 0, 0]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, eax_errno(Errno::EINVAL.code()));
}

#[test]
fn test_old_mmap_unreadable_block_is_efault() {
    let space = mapped_space();
    let traps = handler(KernelServices::unsupported());
    let mut thread = trapping_thread(nr::MMAP, [0x30, 0, 0, 0, 0, 0]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, eax_errno(Errno::EFAULT.code()));
}

fn reaping_process(pid: i32) -> MockProcess {
    let mut process = MockProcess::new();
    process.expect_wait().times(1).return_const(SyscallOutcome::ok(pid));
    process
}

#[test]
fn test_wait4_unwritable_rusage_is_efault() {
    let space = mapped_space();
    let mut process = reaping_process(42);
    process
        .expect_getrusage()
        .withf(|_, _, who, usage| *who == -1 && *usage == data_addr(0x40))
        .times(1)
        .return_const(SyscallOutcome::err(Errno::EFAULT));
    let traps = with_process(process);
    let mut thread = trapping_thread(nr::WAIT4, [u32::MAX, 0, 0, data_addr(0x40).get(), 0, 0]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, eax_errno(Errno::EFAULT.code()));
}

#[test]
fn test_wait4_keeps_pid_when_rusage_is_unavailable() {
    let space = mapped_space();
    let mut process = reaping_process(42);
    process
        .expect_getrusage()
        .times(1)
        .return_const(SyscallOutcome::err(Errno::ENOSYS));
    let traps = with_process(process);
    let mut thread = trapping_thread(nr::WAIT4, [u32::MAX, 0, 0, data_addr(0x40).get(), 0, 0]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, 42);
}

#[test]
fn test_wait4_without_rusage_pointer_skips_it() {
    let space = mapped_space();
    let mut process = reaping_process(42);
    process.expect_getrusage().never();
    let traps = with_process(process);
    let mut thread = trapping_thread(nr::WAIT4, [u32::MAX, 0, 0, 0, 0, 0]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, 42);
}

#[test]
fn test_getresuid_writes_each_non_null_pointer() {
    let space = mapped_space();
    let mut process = MockProcess::new();
    process.expect_id().returning(|_, which| match which {
        ProcessId::Uid => 1000,
        ProcessId::EffectiveUid => 0,
        _ => -1,
    });
    let traps = with_process(process);
    space.write_u32(data_addr(4), 0xdead_beef).unwrap();
    let mut thread = trapping_thread(nr::GETRESUID32, [data_addr(0).get(), 0, data_addr(8).get(), 0, 0, 0]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, 0);
    assert_eq!(space.read_u32(data_addr(0)).unwrap(), 1000);
    assert_eq!(space.read_u32(data_addr(4)).unwrap(), 0xdead_beef);
    assert_eq!(space.read_u32(data_addr(8)).unwrap(), 1000);
}

#[test]
fn test_getresgid_bad_pointer_is_efault() {
    let space = mapped_space();
    let mut process = MockProcess::new();
    process.expect_id().return_const(10);
    let traps = with_process(process);
    let mut thread = trapping_thread(nr::GETRESGID32, [0x10, 0, 0, 0, 0, 0]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, eax_errno(Errno::EFAULT.code()));
}

#[test]
fn test_setresuid_leaves_minus_one_unchanged() {
    let space = mapped_space();
    let mut process = MockProcess::new();
    process
        .expect_set_credentials()
        .withf(|_, which, value| *which == ProcessId::EffectiveUid && *value == 0)
        .times(1)
        .return_const(SyscallOutcome::success());
    let traps = with_process(process);
    let mut thread = trapping_thread(nr::SETRESUID32, [u32::MAX, 0, u32::MAX, 0, 0, 0]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, 0);
}

#[test]
fn test_getgroups_reports_primary_group() {
    let space = mapped_space();
    let mut process = MockProcess::new();
    process.expect_id().withf(|_, which| *which == ProcessId::Gid).return_const(50);
    let traps = with_process(process);
    let mut thread = trapping_thread(nr::GETGROUPS32, [4, data_addr(0).get(), 0, 0, 0, 0]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, 1);
    assert_eq!(space.read_u32(data_addr(0)).unwrap(), 50);
}

#[test]
fn test_setgroups_adopts_first_group() {
    let space = mapped_space();
    space.write_u32(data_addr(0), 77).unwrap();
    let mut process = MockProcess::new();
    process
        .expect_set_credentials()
        .withf(|_, which, value| *which == ProcessId::Gid && *value == 77)
        .times(1)
        .return_const(SyscallOutcome::success());
    let traps = with_process(process);
    let mut thread = trapping_thread(nr::SETGROUPS32, [2, data_addr(0).get(), 0, 0, 0, 0]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, 0);
}

#[test]
fn test_renameat_with_cwd_or_absolute_paths_uses_rename() {
    let space = mapped_space();
    write_cstr(&space, data_addr(0), "a.txt");
    write_cstr(&space, data_addr(0x40), "/tmp/b.txt");
    let mut files = MockFiles::new();
    files
        .expect_rename()
        .withf(|_, from, to| from == "a.txt" && to == "/tmp/b.txt")
        .times(1)
        .return_const(SyscallOutcome::success());
    let traps = with_files(files);
    let mut thread = trapping_thread(
        nr::RENAMEAT,
        [(-100i32) as u32, data_addr(0).get(), 7, data_addr(0x40).get(), 0, 0],
    );

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, 0);
}

#[test]
fn test_renameat_relative_to_directory_is_unimplemented() {
    let space = mapped_space();
    write_cstr(&space, data_addr(0), "a.txt");
    let mut files = MockFiles::new();
    files.expect_rename().never();
    let traps = with_files(files);
    let mut thread = trapping_thread(nr::RENAMEAT, [5, data_addr(0).get(), 5, data_addr(0).get(), 0, 0]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, eax_errno(Errno::ENOSYS.code()));
}

#[test]
fn test_utimensat_null_path_targets_descriptor() {
    let space = mapped_space();
    write_cstr(&space, data_addr(0), "stamp");
    let recorder = Arc::new(TimesRecorder::default());
    let traps = handler(KernelServices {
        files: recorder.clone(),
        ..KernelServices::unsupported()
    });

    let mut thread = trapping_thread(nr::UTIMENSAT_TIME64, [3, 0, data_addr(0x80).get(), 0, 0, 0]);
    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, 0);

    let mut thread = trapping_thread(nr::UTIMENSAT, [(-100i32) as u32, data_addr(0).get(), 0, 0, 0, 0]);
    traps.handle_trap(&mut thread, &space, 2).unwrap();

    let mut thread = trapping_thread(nr::UTIMES, [data_addr(0).get(), 0, 0, 0, 0, 0]);
    traps.handle_trap(&mut thread, &space, 2).unwrap();

    assert_eq!(
        *recorder.calls.lock(),
        vec![
            (3, None, TimesLayout::Timespec(TimeLayout::Time64)),
            (-100, Some("stamp".to_owned()), TimesLayout::Timespec(TimeLayout::Time32)),
            (-100, Some("stamp".to_owned()), TimesLayout::Timeval),
        ]
    );
}

#[test]
fn test_extended_attributes_are_unsupported() {
    let space = mapped_space();
    write_cstr(&space, data_addr(0), "/etc/hosts");
    let traps = handler(KernelServices::unsupported());
    for (number, args) in [
        (nr::GETXATTR, [data_addr(0).get(), data_addr(0x40).get(), 0, 0, 0, 0]),
        (nr::FGETXATTR, [3, data_addr(0x40).get(), 0, 0, 0, 0]),
        (nr::FLISTXATTR, [3, 0, 0, 0, 0, 0]),
    ] {
        let mut thread = trapping_thread(number, args);
        traps.handle_trap(&mut thread, &space, 2).unwrap();
        assert_eq!(thread.cpu.eax, eax_errno(Errno::EOPNOTSUPP.code()), "{number}");
    }
}

#[test]
fn test_scheduler_queries_report_fixed_policy() {
    let space = mapped_space();
    let traps = handler(KernelServices::unsupported());
    for (number, expected) in [
        (nr::SCHED_GETSCHEDULER, 0),
        (nr::SCHED_GET_PRIORITY_MAX, 32),
        (nr::SCHED_GET_PRIORITY_MIN, 0),
        (nr::SCHED_GETPARAM, eax_errno(Errno::EPERM.code())),
        (nr::SCHED_SETAFFINITY, 0),
    ] {
        let mut thread = trapping_thread(number, [0, 128, data_addr(0).get(), 0, 0, 0]);
        traps.handle_trap(&mut thread, &space, 2).unwrap();
        assert_eq!(thread.cpu.eax, expected, "{number}");
    }
}

#[test]
fn test_ipc_routes_shared_memory_calls() {
    let space = mapped_space();
    let mut mappings = MockMappings::new();
    mappings
        .expect_shm()
        .withf(|_, _, call| {
            *call
                == ShmCall::Get {
                    key: 5,
                    size: 4096,
                    flags: 0o1600,
                }
        })
        .times(1)
        .return_const(SyscallOutcome::ok(9));
    let traps = with_mappings(mappings);
    // IPCOP_shmget
    let mut thread = trapping_thread(nr::IPC, [23, 5, 4096, 0o1600, 0, 0]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, 9);
}

#[test]
fn test_ipc_semaphores_are_unimplemented() {
    let space = mapped_space();
    let mut mappings = MockMappings::new();
    mappings.expect_shm().never();
    let traps = with_mappings(mappings);
    // SEMOP
    let mut thread = trapping_thread(nr::IPC, [1, 0, 0, 0, 0, 0]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, eax_errno(Errno::ENOSYS.code()));
}

#[test]
fn test_signalfd4_rejects_wrong_mask_size() {
    let space = mapped_space();
    let traps = handler(KernelServices::unsupported());
    let mut thread = trapping_thread(nr::SIGNALFD4, [u32::MAX, data_addr(0).get(), 4, 0, 0, 0]);

    traps.handle_trap(&mut thread, &space, 2).unwrap();
    assert_eq!(thread.cpu.eax, eax_errno(Errno::EINVAL.code()));
}
