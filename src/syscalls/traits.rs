/*!
 * Kernel Collaborator Traits
 *
 * The emulated kernel's subsystems as seen from the syscall shims. Each
 * method returns the final outcome for the guest: a value (negative errno
 * on failure), or one of the control sentinels. Default bodies report the
 * call as unimplemented, so an implementation only overrides what it serves.
 */

use super::types::{Errno, SyscallOutcome};
use crate::core::types::GuestAddr;
use crate::memory::{GuestAddressSpace, GuestFault};
use crate::process::{GuestThread, ThreadState};
use std::sync::Arc;

/// `dirfd` meaning "relative to the working directory"
pub const AT_FDCWD: i32 = -100;

/// `unlinkat` flag removing a directory
pub const AT_REMOVEDIR: u32 = 0x200;

/// `fstatat` flag for lstat semantics
pub const AT_SYMLINK_NOFOLLOW: u32 = 0x100;

/// Signal delivered for guest access violations
pub const SIGSEGV: u32 = 11;

const fn unimplemented() -> SyscallOutcome {
    SyscallOutcome::err(Errno::ENOSYS)
}

fn resolves_from_cwd(dirfd: i32, path: &str) -> bool {
    dirfd == AT_FDCWD || path.starts_with('/')
}

/// Process identity queried by the id syscalls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessId {
    Pid,
    ParentPid,
    Tid,
    ProcessGroup,
    Uid,
    Gid,
    EffectiveUid,
    EffectiveGid,
}

/// Time structure layout written to the guest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeLayout {
    /// 32-bit seconds
    Time32,
    /// 64-bit seconds
    Time64,
}

/// File named by path or by descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileTarget<'a> {
    Path(&'a str),
    Fd(i32),
}

/// Timestamp pair layout read by the utime family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimesLayout {
    /// `struct timeval[2]` (utimes)
    Timeval,
    /// `struct timespec[2]` (utimensat)
    Timespec(TimeLayout),
}

/// One System V shared memory operation demultiplexed from `ipc`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShmCall {
    Get { key: i32, size: u32, flags: u32 },
    /// The attach address is written to `result`
    Attach { id: i32, addr: GuestAddr, flags: u32, result: GuestAddr },
    Detach { addr: GuestAddr },
    Control { id: i32, cmd: i32, buf: GuestAddr },
}

/// Process and thread table
pub trait ProcessOps: Send + Sync {
    /// Tear down a thread whose termination was requested
    fn terminate_current(&self, thread: &mut GuestThread) {
        thread.state = ThreadState::Terminated;
    }

    /// Identity of the calling thread or its process
    fn id(&self, thread: &GuestThread, which: ProcessId) -> i32 {
        match which {
            ProcessId::Pid | ProcessId::ProcessGroup => thread.pid as i32,
            ProcessId::Tid => thread.tid as i32,
            _ => 0,
        }
    }

    fn exit_thread(&self, thread: &mut GuestThread, code: i32) -> SyscallOutcome {
        let _ = code;
        thread.state = ThreadState::Terminated;
        SyscallOutcome::ContinueNoAdvance
    }

    fn exit_group(&self, thread: &mut GuestThread, code: i32) -> SyscallOutcome {
        self.exit_thread(thread, code)
    }

    /// Replace the running image. On success EIP points at the new entry.
    fn execve(
        &self,
        thread: &mut GuestThread,
        memory: &GuestAddressSpace,
        path: &str,
        args: &[String],
        env: &[String],
    ) -> bool {
        let _ = (thread, memory, path, args, env);
        false
    }

    fn clone_thread(
        &self,
        thread: &mut GuestThread,
        memory: &GuestAddressSpace,
        flags: u32,
        child_stack: GuestAddr,
        parent_tid: GuestAddr,
        tls: GuestAddr,
        child_tid: GuestAddr,
    ) -> SyscallOutcome {
        let _ = (thread, memory, flags, child_stack, parent_tid, tls, child_tid);
        unimplemented()
    }

    fn vfork(&self, thread: &mut GuestThread) -> SyscallOutcome {
        let _ = thread;
        unimplemented()
    }

    /// waitpid/wait4; blocks with `BlockedRetry` until a child changes state
    fn wait(
        &self,
        thread: &mut GuestThread,
        memory: &GuestAddressSpace,
        pid: i32,
        status: GuestAddr,
        options: u32,
    ) -> SyscallOutcome {
        let _ = (thread, memory, pid, status, options);
        unimplemented()
    }

    fn getpgid(&self, thread: &GuestThread, pid: i32) -> SyscallOutcome {
        let _ = (thread, pid);
        unimplemented()
    }

    fn setpgid(&self, thread: &GuestThread, pid: i32, pgid: i32) -> SyscallOutcome {
        let _ = (thread, pid, pgid);
        unimplemented()
    }

    fn setsid(&self, thread: &GuestThread) -> SyscallOutcome {
        let _ = thread;
        unimplemented()
    }

    fn set_credentials(&self, thread: &GuestThread, which: ProcessId, value: u32) -> SyscallOutcome {
        let _ = (thread, which, value);
        unimplemented()
    }

    fn umask(&self, thread: &GuestThread, mask: u32) -> SyscallOutcome {
        let _ = (thread, mask);
        unimplemented()
    }

    fn uname(&self, memory: &GuestAddressSpace, buf: GuestAddr) -> SyscallOutcome {
        let _ = (memory, buf);
        unimplemented()
    }

    fn sysinfo(&self, memory: &GuestAddressSpace, buf: GuestAddr) -> SyscallOutcome {
        let _ = (memory, buf);
        unimplemented()
    }

    fn prctl(&self, thread: &mut GuestThread, option: i32, arg: u32) -> SyscallOutcome {
        let _ = (thread, option, arg);
        unimplemented()
    }

    fn set_thread_area(&self, thread: &mut GuestThread, memory: &GuestAddressSpace, info: GuestAddr) -> SyscallOutcome {
        let _ = (thread, memory, info);
        unimplemented()
    }

    fn modify_ldt(
        &self,
        thread: &mut GuestThread,
        memory: &GuestAddressSpace,
        func: i32,
        ptr: GuestAddr,
        count: u32,
    ) -> SyscallOutcome {
        let _ = (thread, memory, func, ptr, count);
        unimplemented()
    }

    fn set_tid_address(&self, thread: &mut GuestThread, addr: GuestAddr) -> SyscallOutcome {
        let _ = addr;
        SyscallOutcome::ok(thread.tid as i32)
    }

    fn set_robust_list(&self, thread: &mut GuestThread, head: GuestAddr, len: u32) -> SyscallOutcome {
        let _ = (thread, head, len);
        SyscallOutcome::success()
    }

    /// getrlimit/setrlimit/prlimit64
    fn rlimit(
        &self,
        thread: &GuestThread,
        memory: &GuestAddressSpace,
        pid: i32,
        resource: u32,
        new_limit: GuestAddr,
        old_limit: GuestAddr,
    ) -> SyscallOutcome {
        let _ = (thread, memory, pid, resource, new_limit, old_limit);
        unimplemented()
    }

    fn getrusage(&self, thread: &GuestThread, memory: &GuestAddressSpace, who: i32, usage: GuestAddr) -> SyscallOutcome {
        let _ = (thread, memory, who, usage);
        unimplemented()
    }

    fn setpriority(&self, thread: &GuestThread, which: i32, who: i32, priority: i32) -> SyscallOutcome {
        let _ = (thread, which, who, priority);
        SyscallOutcome::success()
    }

    fn sched_yield(&self, thread: &mut GuestThread) -> SyscallOutcome {
        let _ = thread;
        SyscallOutcome::success()
    }

    fn sched_getaffinity(
        &self,
        thread: &GuestThread,
        memory: &GuestAddressSpace,
        pid: i32,
        len: u32,
        mask: GuestAddr,
    ) -> SyscallOutcome {
        let _ = (thread, memory, pid, len, mask);
        unimplemented()
    }

    fn getrandom(&self, memory: &GuestAddressSpace, buf: GuestAddr, len: u32, flags: u32) -> SyscallOutcome {
        let _ = (memory, buf, len, flags);
        unimplemented()
    }
}

/// Virtual filesystem and descriptor table
pub trait FileOps: Send + Sync {
    /// read/pread64
    fn read(
        &self,
        thread: &mut GuestThread,
        memory: &GuestAddressSpace,
        fd: i32,
        buf: GuestAddr,
        len: u32,
        offset: Option<u64>,
    ) -> SyscallOutcome {
        let _ = (thread, memory, fd, buf, len, offset);
        unimplemented()
    }

    /// write/pwrite64
    fn write(
        &self,
        thread: &mut GuestThread,
        memory: &GuestAddressSpace,
        fd: i32,
        buf: GuestAddr,
        len: u32,
        offset: Option<u64>,
    ) -> SyscallOutcome {
        let _ = (thread, memory, fd, buf, len, offset);
        unimplemented()
    }

    fn writev(&self, thread: &mut GuestThread, memory: &GuestAddressSpace, fd: i32, iov: GuestAddr, count: u32) -> SyscallOutcome {
        let _ = (thread, memory, fd, iov, count);
        unimplemented()
    }

    /// open/openat
    fn open(&self, thread: &GuestThread, dirfd: i32, path: &str, flags: u32, mode: u32) -> SyscallOutcome {
        let _ = (thread, dirfd, path, flags, mode);
        unimplemented()
    }

    fn close(&self, thread: &GuestThread, fd: i32) -> SyscallOutcome {
        let _ = (thread, fd);
        unimplemented()
    }

    /// New file offset, or the errno
    fn lseek(&self, thread: &GuestThread, fd: i32, offset: i64, whence: u32) -> Result<i64, Errno> {
        let _ = (thread, fd, offset, whence);
        Err(Errno::ENOSYS)
    }

    /// stat64/lstat64/fstatat64
    fn stat(
        &self,
        thread: &GuestThread,
        memory: &GuestAddressSpace,
        dirfd: i32,
        path: &str,
        buf: GuestAddr,
        flags: u32,
    ) -> SyscallOutcome {
        let _ = (thread, memory, dirfd, path, buf, flags);
        unimplemented()
    }

    fn fstat(&self, thread: &GuestThread, memory: &GuestAddressSpace, fd: i32, buf: GuestAddr) -> SyscallOutcome {
        let _ = (thread, memory, fd, buf);
        unimplemented()
    }

    /// access/faccessat
    fn access(&self, thread: &GuestThread, dirfd: i32, path: &str, mode: u32, flags: u32) -> SyscallOutcome {
        let _ = (thread, dirfd, path, mode, flags);
        unimplemented()
    }

    /// unlink/rmdir/unlinkat
    fn unlink(&self, thread: &GuestThread, dirfd: i32, path: &str, flags: u32) -> SyscallOutcome {
        let _ = (thread, dirfd, path, flags);
        unimplemented()
    }

    /// mkdir/mkdirat
    fn mkdir(&self, thread: &GuestThread, dirfd: i32, path: &str, mode: u32) -> SyscallOutcome {
        let _ = (thread, dirfd, path, mode);
        unimplemented()
    }

    /// readlink/readlinkat
    fn readlink(
        &self,
        thread: &GuestThread,
        memory: &GuestAddressSpace,
        dirfd: i32,
        path: &str,
        buf: GuestAddr,
        len: u32,
    ) -> SyscallOutcome {
        let _ = (thread, memory, dirfd, path, buf, len);
        unimplemented()
    }

    fn link(&self, thread: &GuestThread, from: &str, to: &str) -> SyscallOutcome {
        let _ = (thread, from, to);
        unimplemented()
    }

    fn symlink(&self, thread: &GuestThread, target: &str, link: &str) -> SyscallOutcome {
        let _ = (thread, target, link);
        unimplemented()
    }

    fn rename(&self, thread: &GuestThread, from: &str, to: &str) -> SyscallOutcome {
        let _ = (thread, from, to);
        unimplemented()
    }

    fn chdir(&self, thread: &GuestThread, path: &str) -> SyscallOutcome {
        let _ = (thread, path);
        unimplemented()
    }

    fn fchdir(&self, thread: &GuestThread, fd: i32) -> SyscallOutcome {
        let _ = (thread, fd);
        unimplemented()
    }

    fn chmod(&self, thread: &GuestThread, path: &str, mode: u32) -> SyscallOutcome {
        let _ = (thread, path, mode);
        unimplemented()
    }

    fn fchmod(&self, thread: &GuestThread, fd: i32, mode: u32) -> SyscallOutcome {
        let _ = (thread, fd, mode);
        unimplemented()
    }

    fn getcwd(&self, thread: &GuestThread, memory: &GuestAddressSpace, buf: GuestAddr, len: u32) -> SyscallOutcome {
        let _ = (thread, memory, buf, len);
        unimplemented()
    }

    fn dup(&self, thread: &GuestThread, fd: i32) -> SyscallOutcome {
        let _ = (thread, fd);
        unimplemented()
    }

    fn dup2(&self, thread: &GuestThread, fd: i32, new_fd: i32) -> SyscallOutcome {
        let _ = (thread, fd, new_fd);
        unimplemented()
    }

    /// pipe/pipe2; writes both descriptors to `fds`
    fn pipe(&self, thread: &GuestThread, memory: &GuestAddressSpace, fds: GuestAddr, flags: u32) -> SyscallOutcome {
        let _ = (thread, memory, fds, flags);
        unimplemented()
    }

    fn ioctl(&self, thread: &mut GuestThread, memory: &GuestAddressSpace, fd: i32, request: u32, arg: GuestAddr) -> SyscallOutcome {
        let _ = (thread, memory, fd, request, arg);
        unimplemented()
    }

    fn fcntl(&self, thread: &mut GuestThread, memory: &GuestAddressSpace, fd: i32, cmd: u32, arg: u32) -> SyscallOutcome {
        let _ = (thread, memory, fd, cmd, arg);
        unimplemented()
    }

    fn truncate(&self, thread: &GuestThread, fd: i32, len: u64) -> SyscallOutcome {
        let _ = (thread, fd, len);
        unimplemented()
    }

    /// fsync/fdatasync
    fn fsync(&self, thread: &GuestThread, fd: i32, data_only: bool) -> SyscallOutcome {
        let _ = (thread, fd, data_only);
        SyscallOutcome::success()
    }

    /// statfs/statfs64/fstatfs64
    fn statfs(
        &self,
        thread: &GuestThread,
        memory: &GuestAddressSpace,
        target: FileTarget<'_>,
        buf: GuestAddr,
        statfs64: bool,
    ) -> SyscallOutcome {
        let _ = (thread, memory, target, buf, statfs64);
        unimplemented()
    }

    /// utimes/utimensat; without a path the times apply to `dirfd` itself
    #[allow(clippy::too_many_arguments)]
    fn set_times(
        &self,
        thread: &GuestThread,
        memory: &GuestAddressSpace,
        dirfd: i32,
        path: Option<&str>,
        times: GuestAddr,
        flags: u32,
        layout: TimesLayout,
    ) -> SyscallOutcome {
        let _ = (thread, memory, dirfd, path, times, flags, layout);
        unimplemented()
    }

    /// renameat/renameat2. Plain renames fall back to `rename`.
    fn renameat(&self, thread: &GuestThread, from_dir: i32, from: &str, to_dir: i32, to: &str, flags: u32) -> SyscallOutcome {
        if flags == 0 && resolves_from_cwd(from_dir, from) && resolves_from_cwd(to_dir, to) {
            return self.rename(thread, from, to);
        }
        unimplemented()
    }

    /// Falls back to `symlink` when `link` does not depend on `dirfd`
    fn symlinkat(&self, thread: &GuestThread, target: &str, dirfd: i32, link: &str) -> SyscallOutcome {
        if resolves_from_cwd(dirfd, link) {
            return self.symlink(thread, target, link);
        }
        unimplemented()
    }

    fn memfd_create(&self, thread: &GuestThread, name: &str, flags: u32) -> SyscallOutcome {
        let _ = (thread, name, flags);
        unimplemented()
    }

    fn inotify_init(&self, thread: &GuestThread) -> SyscallOutcome {
        let _ = thread;
        unimplemented()
    }

    /// getdents/getdents64
    fn getdents(
        &self,
        thread: &GuestThread,
        memory: &GuestAddressSpace,
        fd: i32,
        buf: GuestAddr,
        len: u32,
        dirent64: bool,
    ) -> SyscallOutcome {
        let _ = (thread, memory, fd, buf, len, dirent64);
        unimplemented()
    }

    fn select(
        &self,
        thread: &mut GuestThread,
        memory: &GuestAddressSpace,
        nfds: i32,
        read_fds: GuestAddr,
        write_fds: GuestAddr,
        except_fds: GuestAddr,
        timeout: GuestAddr,
    ) -> SyscallOutcome {
        let _ = (thread, memory, nfds, read_fds, write_fds, except_fds, timeout);
        unimplemented()
    }

    fn poll(&self, thread: &mut GuestThread, memory: &GuestAddressSpace, fds: GuestAddr, nfds: u32, timeout_ms: i32) -> SyscallOutcome {
        let _ = (thread, memory, fds, nfds, timeout_ms);
        unimplemented()
    }

    fn epoll_create(&self, thread: &GuestThread, flags: u32) -> SyscallOutcome {
        let _ = (thread, flags);
        unimplemented()
    }

    fn epoll_ctl(
        &self,
        thread: &GuestThread,
        memory: &GuestAddressSpace,
        epfd: i32,
        op: i32,
        fd: i32,
        event: GuestAddr,
    ) -> SyscallOutcome {
        let _ = (thread, memory, epfd, op, fd, event);
        unimplemented()
    }

    fn epoll_wait(
        &self,
        thread: &mut GuestThread,
        memory: &GuestAddressSpace,
        epfd: i32,
        events: GuestAddr,
        max_events: i32,
        timeout_ms: i32,
    ) -> SyscallOutcome {
        let _ = (thread, memory, epfd, events, max_events, timeout_ms);
        unimplemented()
    }
}

/// Guest mapping layer (mmap and friends)
pub trait MemoryMapOps: Send + Sync {
    fn brk(&self, thread: &GuestThread, memory: &GuestAddressSpace, addr: GuestAddr) -> SyscallOutcome {
        let _ = (thread, memory, addr);
        unimplemented()
    }

    /// `offset` is in bytes
    #[allow(clippy::too_many_arguments)]
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
    ) -> SyscallOutcome {
        let _ = (thread, memory, addr, len, prot, flags, fd, offset);
        unimplemented()
    }

    fn munmap(&self, thread: &GuestThread, memory: &GuestAddressSpace, addr: GuestAddr, len: u32) -> SyscallOutcome {
        let _ = (thread, memory, addr, len);
        unimplemented()
    }

    fn mprotect(&self, thread: &GuestThread, memory: &GuestAddressSpace, addr: GuestAddr, len: u32, prot: u32) -> SyscallOutcome {
        let _ = (thread, memory, addr, len, prot);
        unimplemented()
    }

    fn mremap(
        &self,
        thread: &GuestThread,
        memory: &GuestAddressSpace,
        old_addr: GuestAddr,
        old_len: u32,
        new_len: u32,
        flags: u32,
    ) -> SyscallOutcome {
        let _ = (thread, memory, old_addr, old_len, new_len, flags);
        unimplemented()
    }

    fn madvise(&self, memory: &GuestAddressSpace, addr: GuestAddr, len: u32, advice: u32) -> SyscallOutcome {
        let _ = (memory, addr, len, advice);
        SyscallOutcome::success()
    }

    fn msync(&self, memory: &GuestAddressSpace, addr: GuestAddr, len: u32, flags: u32) -> SyscallOutcome {
        let _ = (memory, addr, len, flags);
        SyscallOutcome::success()
    }

    /// Guest pages are never swapped
    fn mlock(&self, memory: &GuestAddressSpace, addr: GuestAddr, len: u32) -> SyscallOutcome {
        let _ = (memory, addr, len);
        SyscallOutcome::success()
    }

    fn mincore(&self, memory: &GuestAddressSpace, addr: GuestAddr, len: u32, vec: GuestAddr) -> SyscallOutcome {
        let _ = (memory, addr, len, vec);
        unimplemented()
    }

    /// System V shared memory
    fn shm(&self, thread: &GuestThread, memory: &GuestAddressSpace, call: ShmCall) -> SyscallOutcome {
        let _ = (thread, memory, call);
        unimplemented()
    }
}

/// Signal delivery
pub trait SignalOps: Send + Sync {
    /// Run pending signals. Returns true when a handler must run before the
    /// trapping syscall, which is then abandoned.
    fn deliver_pending(&self, thread: &mut GuestThread, memory: &GuestAddressSpace) -> bool {
        let _ = (thread, memory);
        false
    }

    /// Deliver a guest access violation
    fn segmentation_fault(&self, thread: &mut GuestThread, memory: &GuestAddressSpace, fault: GuestFault) {
        let _ = (memory, fault);
        thread.signals().raise(SIGSEGV);
    }

    fn kill(&self, thread: &GuestThread, pid: i32, signal: u32) -> SyscallOutcome {
        let _ = (thread, pid, signal);
        unimplemented()
    }

    fn tgkill(&self, thread: &GuestThread, tgid: i32, tid: i32, signal: u32) -> SyscallOutcome {
        let _ = (thread, tgid, tid, signal);
        unimplemented()
    }

    fn sigaction(
        &self,
        thread: &GuestThread,
        memory: &GuestAddressSpace,
        signal: u32,
        action: GuestAddr,
        old_action: GuestAddr,
    ) -> SyscallOutcome {
        let _ = (thread, memory, signal, action, old_action);
        unimplemented()
    }

    /// Usually `ContinueNoAdvance`: a newly unblocked signal may run first
    fn sigprocmask(
        &self,
        thread: &mut GuestThread,
        memory: &GuestAddressSpace,
        how: u32,
        set: GuestAddr,
        old_set: GuestAddr,
    ) -> SyscallOutcome {
        let _ = (thread, memory, how, set, old_set);
        unimplemented()
    }

    /// Restores the interrupted register file
    fn sigreturn(&self, thread: &mut GuestThread, memory: &GuestAddressSpace) -> SyscallOutcome {
        let _ = (thread, memory);
        unimplemented()
    }

    fn sigsuspend(&self, thread: &mut GuestThread, memory: &GuestAddressSpace, mask: GuestAddr) -> SyscallOutcome {
        let _ = (thread, memory, mask);
        unimplemented()
    }

    fn sigaltstack(&self, thread: &mut GuestThread, memory: &GuestAddressSpace, stack: GuestAddr, old_stack: GuestAddr) -> SyscallOutcome {
        let _ = (thread, memory, stack, old_stack);
        unimplemented()
    }

    /// signalfd4; `fd` is -1 for a new descriptor
    fn signalfd(&self, thread: &GuestThread, memory: &GuestAddressSpace, fd: i32, mask: GuestAddr, flags: u32) -> SyscallOutcome {
        let _ = (thread, memory, fd, mask, flags);
        unimplemented()
    }

    fn alarm(&self, thread: &GuestThread, seconds: u32) -> SyscallOutcome {
        let _ = (thread, seconds);
        unimplemented()
    }

    fn setitimer(&self, thread: &GuestThread, memory: &GuestAddressSpace, which: u32, value: GuestAddr, old_value: GuestAddr) -> SyscallOutcome {
        let _ = (thread, memory, which, value, old_value);
        unimplemented()
    }
}

/// Clocks and sleeping
pub trait TimeOps: Send + Sync {
    fn time(&self, memory: &GuestAddressSpace, out: GuestAddr) -> SyscallOutcome {
        let _ = (memory, out);
        unimplemented()
    }

    fn times(&self, thread: &GuestThread, memory: &GuestAddressSpace, buf: GuestAddr) -> SyscallOutcome {
        let _ = (thread, memory, buf);
        unimplemented()
    }

    fn gettimeofday(&self, memory: &GuestAddressSpace, tv: GuestAddr, tz: GuestAddr) -> SyscallOutcome {
        let _ = (memory, tv, tz);
        unimplemented()
    }

    fn clock_gettime(&self, memory: &GuestAddressSpace, clock: u32, ts: GuestAddr, layout: TimeLayout) -> SyscallOutcome {
        let _ = (memory, clock, ts, layout);
        unimplemented()
    }

    fn clock_getres(&self, memory: &GuestAddressSpace, clock: u32, res: GuestAddr, layout: TimeLayout) -> SyscallOutcome {
        let _ = (memory, clock, res, layout);
        unimplemented()
    }

    /// nanosleep/clock_nanosleep. Returns `BlockedRetry` until the deadline
    /// passes, then a concrete result.
    #[allow(clippy::too_many_arguments)]
    fn sleep(
        &self,
        thread: &mut GuestThread,
        memory: &GuestAddressSpace,
        clock: u32,
        flags: u32,
        request: GuestAddr,
        remain: GuestAddr,
        layout: TimeLayout,
    ) -> SyscallOutcome {
        let _ = (thread, memory, clock, flags, request, remain, layout);
        unimplemented()
    }
}

/// One socket operation, shared by the direct syscalls and `socketcall`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketCall {
    Socket { domain: i32, kind: i32, protocol: i32 },
    Bind { fd: i32, addr: GuestAddr, len: u32 },
    Connect { fd: i32, addr: GuestAddr, len: u32 },
    Listen { fd: i32, backlog: i32 },
    Accept { fd: i32, addr: GuestAddr, len: GuestAddr, flags: u32 },
    GetSockName { fd: i32, addr: GuestAddr, len: GuestAddr },
    GetPeerName { fd: i32, addr: GuestAddr, len: GuestAddr },
    SocketPair { domain: i32, kind: i32, protocol: i32, fds: GuestAddr },
    SendTo { fd: i32, buf: GuestAddr, len: u32, flags: u32, dest: GuestAddr, dest_len: u32 },
    RecvFrom { fd: i32, buf: GuestAddr, len: u32, flags: u32, src: GuestAddr, src_len: GuestAddr },
    Shutdown { fd: i32, how: i32 },
    SetSockOpt { fd: i32, level: i32, name: i32, value: GuestAddr, len: u32 },
    GetSockOpt { fd: i32, level: i32, name: i32, value: GuestAddr, len: GuestAddr },
    SendMsg { fd: i32, msg: GuestAddr, flags: u32 },
    RecvMsg { fd: i32, msg: GuestAddr, flags: u32 },
    SendMmsg { fd: i32, msgs: GuestAddr, count: u32, flags: u32 },
}

/// Socket layer
pub trait SocketOps: Send + Sync {
    fn call(&self, thread: &mut GuestThread, memory: &GuestAddressSpace, call: SocketCall) -> SyscallOutcome {
        let _ = (thread, memory, call);
        unimplemented()
    }
}

/// Futex wait queues
pub trait FutexOps: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    fn futex(
        &self,
        thread: &mut GuestThread,
        memory: &GuestAddressSpace,
        addr: GuestAddr,
        op: u32,
        value: u32,
        timeout: GuestAddr,
        addr2: GuestAddr,
        value3: u32,
    ) -> SyscallOutcome {
        let _ = (thread, memory, addr, op, value, timeout, addr2, value3);
        unimplemented()
    }
}

/// Collaborators bundled for the dispatcher
#[derive(Clone)]
pub struct KernelServices {
    pub process: Arc<dyn ProcessOps>,
    pub files: Arc<dyn FileOps>,
    pub memory: Arc<dyn MemoryMapOps>,
    pub signals: Arc<dyn SignalOps>,
    pub time: Arc<dyn TimeOps>,
    pub sockets: Arc<dyn SocketOps>,
    pub futex: Arc<dyn FutexOps>,
}

/// Kernel with no subsystems attached; every call falls back to its
/// default body
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedKernel;

impl ProcessOps for UnsupportedKernel {}
impl FileOps for UnsupportedKernel {}
impl MemoryMapOps for UnsupportedKernel {}
impl SignalOps for UnsupportedKernel {}
impl TimeOps for UnsupportedKernel {}
impl SocketOps for UnsupportedKernel {}
impl FutexOps for UnsupportedKernel {}

impl KernelServices {
    /// Every subsystem served by one object
    pub fn uniform<K>(kernel: Arc<K>) -> Self
    where
        K: ProcessOps + FileOps + MemoryMapOps + SignalOps + TimeOps + SocketOps + FutexOps + 'static,
    {
        Self {
            process: kernel.clone(),
            files: kernel.clone(),
            memory: kernel.clone(),
            signals: kernel.clone(),
            time: kernel.clone(),
            sockets: kernel.clone(),
            futex: kernel,
        }
    }

    pub fn unsupported() -> Self {
        Self::uniform(Arc::new(UnsupportedKernel))
    }
}

impl std::fmt::Debug for KernelServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelServices").finish_non_exhaustive()
    }
}
