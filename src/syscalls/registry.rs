/*!
 * Default Syscall Registry
 *
 * Wires Linux i386 syscall numbers to their handler shims, argument
 * declarations and trace categories. Numbers not listed here stay empty
 * and fail with ENOSYS.
 */

use super::decode::ArgSpec;
use super::handlers::{files, futex, memory, network, process, signal, time};
use super::numbers as nr;
use super::table::{SyscallCategory, SyscallEntry, SyscallTable, SyscallTableBuilder};
use super::types::TrapError;

/// Register a block of syscalls:
/// `NUMBER => "name", CATEGORY, [ArgSpec...], handler;`
macro_rules! register_syscalls {
    ($builder:expr; $($number:expr => $name:literal, $category:expr, [$($arg:ident),*], $handler:path;)*) => {
        $(
            $builder.register(
                $number,
                SyscallEntry {
                    name: $name,
                    category: $category,
                    args: &[$(ArgSpec::$arg),*],
                    handler: $handler,
                },
            )?;
        )*
    };
}

const PROCESS: SyscallCategory = SyscallCategory::PROCESS;
const THREAD: SyscallCategory = SyscallCategory::THREAD;
const FILE: SyscallCategory = SyscallCategory::FILE;
const FILE_READ: SyscallCategory = SyscallCategory::FILE.union(SyscallCategory::READ);
const FILE_WRITE: SyscallCategory = SyscallCategory::FILE.union(SyscallCategory::WRITE);
const SYSTEM: SyscallCategory = SyscallCategory::SYSTEM;
const SIGNAL: SyscallCategory = SyscallCategory::SIGNAL;
const MEMORY: SyscallCategory = SyscallCategory::MEMORY;
const SOCKET: SyscallCategory = SyscallCategory::SOCKET;
const FUTEX: SyscallCategory = SyscallCategory::FUTEX.union(SyscallCategory::THREAD);

/// Table with every syscall this kernel layer serves
pub fn default_table() -> Result<SyscallTable, TrapError> {
    let mut builder = SyscallTableBuilder::new();
    register_process(&mut builder)?;
    register_files(&mut builder)?;
    register_memory(&mut builder)?;
    register_signals(&mut builder)?;
    register_time(&mut builder)?;
    register_sockets(&mut builder)?;
    register_syscalls! { builder;
        nr::FUTEX => "futex", FUTEX, [Addr, UInt, UInt, Addr, Addr, UInt], futex::sys_futex;
    }
    Ok(builder.build())
}

fn register_process(builder: &mut SyscallTableBuilder) -> Result<(), TrapError> {
    register_syscalls! { builder;
        nr::EXIT => "exit", THREAD, [Int], process::sys_exit;
        nr::EXIT_GROUP => "exit_group", PROCESS, [Int], process::sys_exit_group;
        nr::WAITPID => "waitpid", PROCESS, [Int, Addr, UInt], process::sys_waitpid;
        nr::WAIT4 => "wait4", PROCESS, [Int, Addr, UInt, Addr], process::sys_wait4;
        nr::EXECVE => "execve", PROCESS, [Path, StrArray, StrArray], process::sys_execve;
        nr::CLONE => "clone", THREAD, [UInt, Addr, Addr, Addr, Addr], process::sys_clone;
        nr::VFORK => "vfork", PROCESS, [], process::sys_vfork;
        nr::GETPID => "getpid", PROCESS, [], process::sys_getpid;
        nr::GETPPID => "getppid", PROCESS, [], process::sys_getppid;
        nr::GETTID => "gettid", THREAD, [], process::sys_gettid;
        nr::GETPGRP => "getpgrp", PROCESS, [], process::sys_getpgrp;
        nr::GETUID => "getuid", PROCESS, [], process::sys_getuid;
        nr::GETGID => "getgid", PROCESS, [], process::sys_getgid;
        nr::GETEUID => "geteuid", PROCESS, [], process::sys_geteuid;
        nr::GETEGID => "getegid", PROCESS, [], process::sys_getegid;
        nr::GETUID32 => "getuid32", PROCESS, [], process::sys_getuid;
        nr::GETGID32 => "getgid32", PROCESS, [], process::sys_getgid;
        nr::GETEUID32 => "geteuid32", PROCESS, [], process::sys_geteuid;
        nr::GETEGID32 => "getegid32", PROCESS, [], process::sys_getegid;
        nr::SETUID32 => "setuid32", PROCESS, [UInt], process::sys_setuid;
        nr::SETGID32 => "setgid32", PROCESS, [UInt], process::sys_setgid;
        nr::SETRESUID32 => "setresuid32", PROCESS, [UInt, UInt, UInt], process::sys_setresuid;
        nr::SETRESGID32 => "setresgid32", PROCESS, [UInt, UInt, UInt], process::sys_setresgid;
        nr::GETRESUID32 => "getresuid32", PROCESS, [Addr, Addr, Addr], process::sys_getresuid;
        nr::GETRESGID32 => "getresgid32", PROCESS, [Addr, Addr, Addr], process::sys_getresgid;
        nr::GETGROUPS32 => "getgroups32", PROCESS, [Int, Addr], process::sys_getgroups;
        nr::SETGROUPS32 => "setgroups32", PROCESS, [UInt, Addr], process::sys_setgroups;
        nr::GETPGID => "getpgid", PROCESS, [Int], process::sys_getpgid;
        nr::SETPGID => "setpgid", PROCESS, [Int, Int], process::sys_setpgid;
        nr::SETSID => "setsid", PROCESS, [], process::sys_setsid;
        nr::UMASK => "umask", PROCESS, [UInt], process::sys_umask;
        nr::UNAME => "uname", SYSTEM, [Addr], process::sys_uname;
        nr::SYSINFO => "sysinfo", SYSTEM, [Addr], process::sys_sysinfo;
        nr::PRCTL => "prctl", PROCESS, [Int, UInt], process::sys_prctl;
        nr::SET_THREAD_AREA => "set_thread_area", THREAD, [Addr], process::sys_set_thread_area;
        nr::MODIFY_LDT => "modify_ldt", THREAD, [Int, Addr, UInt], process::sys_modify_ldt;
        nr::SET_TID_ADDRESS => "set_tid_address", THREAD, [Addr], process::sys_set_tid_address;
        nr::SET_ROBUST_LIST => "set_robust_list", THREAD, [Addr, UInt], process::sys_set_robust_list;
        nr::SETRLIMIT => "setrlimit", PROCESS, [UInt, Addr], process::sys_setrlimit;
        nr::UGETRLIMIT => "ugetrlimit", PROCESS, [UInt, Addr], process::sys_getrlimit;
        nr::PRLIMIT64 => "prlimit64", PROCESS, [Int, UInt, Addr, Addr], process::sys_prlimit64;
        nr::GETRUSAGE => "getrusage", PROCESS, [Int, Addr], process::sys_getrusage;
        nr::SETPRIORITY => "setpriority", PROCESS, [Int, Int, Int], process::sys_setpriority;
        nr::SCHED_YIELD => "sched_yield", THREAD, [], process::sys_sched_yield;
        nr::SCHED_GETAFFINITY => "sched_getaffinity", THREAD, [Int, UInt, Addr], process::sys_sched_getaffinity;
        nr::SCHED_SETAFFINITY => "sched_setaffinity", THREAD, [Int, UInt, Addr], process::sys_ignored;
        nr::SCHED_GETPARAM => "sched_getparam", THREAD, [Int, Addr], process::sys_sched_getparam;
        nr::SCHED_GETSCHEDULER => "sched_getscheduler", THREAD, [Int], process::sys_sched_getscheduler;
        nr::SCHED_GET_PRIORITY_MAX => "sched_get_priority_max", THREAD, [Int], process::sys_sched_get_priority_max;
        nr::SCHED_GET_PRIORITY_MIN => "sched_get_priority_min", THREAD, [Int], process::sys_sched_get_priority_min;
        nr::GETRANDOM => "getrandom", SYSTEM, [Addr, UInt, UInt], process::sys_getrandom;
        nr::PTRACE => "ptrace", PROCESS, [Int, Int, Addr, Addr], process::sys_ptrace;
        nr::UTIME => "utime", FILE, [Path, Addr], process::sys_ignored;
        nr::SYNC => "sync", FILE, [], process::sys_ignored;
        nr::IOPERM => "ioperm", SYSTEM, [UInt, UInt, Int], process::sys_ignored;
        nr::IOPL => "iopl", SYSTEM, [UInt], process::sys_ignored;
        nr::VM86 => "vm86", SYSTEM, [UInt, Addr], process::sys_vm86;
    }
    Ok(())
}

fn register_files(builder: &mut SyscallTableBuilder) -> Result<(), TrapError> {
    register_syscalls! { builder;
        nr::READ => "read", FILE_READ, [Fd, Addr, UInt], files::sys_read;
        nr::WRITE => "write", FILE_WRITE, [Fd, Addr, UInt], files::sys_write;
        nr::PREAD64 => "pread64", FILE_READ, [Fd, Addr, UInt, UInt, UInt], files::sys_pread64;
        nr::PWRITE64 => "pwrite64", FILE_WRITE, [Fd, Addr, UInt, UInt, UInt], files::sys_pwrite64;
        nr::WRITEV => "writev", FILE_WRITE, [Fd, Addr, UInt], files::sys_writev;
        nr::OPEN => "open", FILE, [Path, UInt, UInt], files::sys_open;
        nr::OPENAT => "openat", FILE, [Fd, Path, UInt, UInt], files::sys_openat;
        nr::CLOSE => "close", FILE, [Fd], files::sys_close;
        nr::LSEEK => "lseek", FILE, [Fd, Int, UInt], files::sys_lseek;
        nr::LLSEEK => "_llseek", FILE, [Fd, UInt, UInt, Addr, UInt], files::sys_llseek;
        nr::STAT64 => "stat64", FILE, [Path, Addr], files::sys_stat64;
        nr::LSTAT64 => "lstat64", FILE, [Path, Addr], files::sys_lstat64;
        nr::FSTAT64 => "fstat64", FILE, [Fd, Addr], files::sys_fstat64;
        nr::FSTATAT64 => "fstatat64", FILE, [Fd, Path, Addr, UInt], files::sys_fstatat64;
        nr::STATFS => "statfs", FILE, [Path, Addr], files::sys_statfs;
        nr::STATFS64 => "statfs64", FILE, [Path, UInt, Addr], files::sys_statfs64;
        nr::FSTATFS64 => "fstatfs64", FILE, [Fd, UInt, Addr], files::sys_fstatfs64;
        nr::ACCESS => "access", FILE, [Path, UInt], files::sys_access;
        nr::FACCESSAT => "faccessat", FILE, [Fd, Path, UInt, UInt], files::sys_faccessat;
        nr::UNLINK => "unlink", FILE, [Path], files::sys_unlink;
        nr::UNLINKAT => "unlinkat", FILE, [Fd, Path, UInt], files::sys_unlinkat;
        nr::RMDIR => "rmdir", FILE, [Path], files::sys_rmdir;
        nr::MKDIR => "mkdir", FILE, [Path, UInt], files::sys_mkdir;
        nr::MKDIRAT => "mkdirat", FILE, [Fd, Path, UInt], files::sys_mkdirat;
        nr::READLINK => "readlink", FILE, [Path, Addr, UInt], files::sys_readlink;
        nr::READLINKAT => "readlinkat", FILE, [Fd, Path, Addr, UInt], files::sys_readlinkat;
        nr::LINK => "link", FILE, [Path, Path], files::sys_link;
        nr::SYMLINK => "symlink", FILE, [Path, Path], files::sys_symlink;
        nr::RENAME => "rename", FILE, [Path, Path], files::sys_rename;
        nr::RENAMEAT => "renameat", FILE, [Fd, Path, Fd, Path], files::sys_renameat;
        nr::RENAMEAT2 => "renameat2", FILE, [Fd, Path, Fd, Path, UInt], files::sys_renameat2;
        nr::SYMLINKAT => "symlinkat", FILE, [Path, Fd, Path], files::sys_symlinkat;
        nr::UTIMES => "utimes", FILE, [Path, Addr], files::sys_utimes;
        nr::UTIMENSAT => "utimensat", FILE, [Fd, OptPath, Addr, UInt], files::sys_utimensat;
        nr::UTIMENSAT_TIME64 => "utimensat_time64", FILE, [Fd, OptPath, Addr, UInt], files::sys_utimensat_time64;
        nr::CHOWN32 => "chown32", FILE, [Path, UInt, UInt], process::sys_ignored;
        nr::LCHOWN32 => "lchown32", FILE, [Path, UInt, UInt], process::sys_ignored;
        nr::FCHOWN32 => "fchown32", FILE, [Fd, UInt, UInt], process::sys_ignored;
        nr::FCHOWNAT => "fchownat", FILE, [Fd, Path, UInt, UInt, UInt], process::sys_ignored;
        nr::FCHMODAT => "fchmodat", FILE, [Fd, Path, UInt], process::sys_ignored;
        nr::GETXATTR => "getxattr", FILE, [Path, Addr, Addr, UInt], files::sys_xattr;
        nr::LGETXATTR => "lgetxattr", FILE, [Path, Addr, Addr, UInt], files::sys_xattr;
        nr::FGETXATTR => "fgetxattr", FILE, [Fd, Addr, Addr, UInt], files::sys_xattr;
        nr::FLISTXATTR => "flistxattr", FILE, [Fd, Addr, UInt], files::sys_xattr;
        nr::FSETXATTR => "fsetxattr", FILE, [Fd, Addr, Addr, UInt, UInt], files::sys_xattr;
        nr::MEMFD_CREATE => "memfd_create", FILE, [Path, UInt], files::sys_memfd_create;
        nr::INOTIFY_INIT => "inotify_init", FILE, [], files::sys_inotify_init;
        nr::CHDIR => "chdir", FILE, [Path], files::sys_chdir;
        nr::FCHDIR => "fchdir", FILE, [Fd], files::sys_fchdir;
        nr::CHMOD => "chmod", FILE, [Path, UInt], files::sys_chmod;
        nr::FCHMOD => "fchmod", FILE, [Fd, UInt], files::sys_fchmod;
        nr::GETCWD => "getcwd", FILE, [Addr, UInt], files::sys_getcwd;
        nr::DUP => "dup", FILE, [Fd], files::sys_dup;
        nr::DUP2 => "dup2", FILE, [Fd, Fd], files::sys_dup2;
        nr::PIPE => "pipe", FILE, [Addr], files::sys_pipe;
        nr::PIPE2 => "pipe2", FILE, [Addr, UInt], files::sys_pipe2;
        nr::IOCTL => "ioctl", FILE, [Fd, UInt, Addr], files::sys_ioctl;
        nr::FCNTL64 => "fcntl64", FILE, [Fd, UInt, UInt], files::sys_fcntl64;
        nr::FTRUNCATE => "ftruncate", FILE_WRITE, [Fd, UInt], files::sys_ftruncate;
        nr::FTRUNCATE64 => "ftruncate64", FILE_WRITE, [Fd, UInt, UInt], files::sys_ftruncate64;
        nr::FSYNC => "fsync", FILE, [Fd], files::sys_fsync;
        nr::FDATASYNC => "fdatasync", FILE, [Fd], files::sys_fdatasync;
        nr::FLOCK => "flock", FILE, [Fd, UInt], process::sys_ignored;
        nr::FADVISE64 => "fadvise64", FILE, [Fd, UInt, UInt, UInt, UInt], process::sys_ignored;
        nr::SYNC_FILE_RANGE => "sync_file_range", FILE, [Fd, UInt, UInt, UInt, UInt, UInt], process::sys_ignored;
        nr::GETDENTS => "getdents", FILE_READ, [Fd, Addr, UInt], files::sys_getdents;
        nr::GETDENTS64 => "getdents64", FILE_READ, [Fd, Addr, UInt], files::sys_getdents64;
        nr::NEWSELECT => "_newselect", FILE, [Int, Addr, Addr, Addr, Addr], files::sys_newselect;
        nr::POLL => "poll", FILE, [Addr, UInt, Int], files::sys_poll;
        nr::EPOLL_CREATE => "epoll_create", FILE, [Int], files::sys_epoll_create;
        nr::EPOLL_CREATE1 => "epoll_create1", FILE, [UInt], files::sys_epoll_create1;
        nr::EPOLL_CTL => "epoll_ctl", FILE, [Fd, Int, Fd, Addr], files::sys_epoll_ctl;
        nr::EPOLL_WAIT => "epoll_wait", FILE, [Fd, Addr, Int, Int], files::sys_epoll_wait;
    }
    Ok(())
}

fn register_memory(builder: &mut SyscallTableBuilder) -> Result<(), TrapError> {
    register_syscalls! { builder;
        nr::BRK => "brk", MEMORY, [Addr], memory::sys_brk;
        nr::MMAP => "mmap", MEMORY, [Addr], memory::sys_old_mmap;
        nr::MMAP2 => "mmap2", MEMORY, [Addr, UInt, UInt, UInt, Fd, UInt], memory::sys_mmap2;
        nr::MUNMAP => "munmap", MEMORY, [Addr, UInt], memory::sys_munmap;
        nr::MPROTECT => "mprotect", MEMORY, [Addr, UInt, UInt], memory::sys_mprotect;
        nr::MREMAP => "mremap", MEMORY, [Addr, UInt, UInt, UInt], memory::sys_mremap;
        nr::MADVISE => "madvise", MEMORY, [Addr, UInt, UInt], memory::sys_madvise;
        nr::MSYNC => "msync", MEMORY, [Addr, UInt, UInt], memory::sys_msync;
        nr::MLOCK => "mlock", MEMORY, [Addr, UInt], memory::sys_mlock;
        nr::MINCORE => "mincore", MEMORY, [Addr, UInt, Addr], memory::sys_mincore;
        nr::IPC => "ipc", MEMORY.union(SYSTEM), [UInt, UInt, UInt, UInt, Addr, Int], memory::sys_ipc;
    }
    Ok(())
}

fn register_signals(builder: &mut SyscallTableBuilder) -> Result<(), TrapError> {
    register_syscalls! { builder;
        nr::KILL => "kill", SIGNAL, [Int, UInt], signal::sys_kill;
        nr::TGKILL => "tgkill", SIGNAL, [Int, Int, UInt], signal::sys_tgkill;
        nr::RT_SIGACTION => "rt_sigaction", SIGNAL, [UInt, Addr, Addr, UInt], signal::sys_rt_sigaction;
        nr::RT_SIGPROCMASK => "rt_sigprocmask", SIGNAL, [UInt, Addr, Addr, UInt], signal::sys_rt_sigprocmask;
        nr::RT_SIGSUSPEND => "rt_sigsuspend", SIGNAL, [Addr, UInt], signal::sys_rt_sigsuspend;
        nr::SIGRETURN => "sigreturn", SIGNAL, [], signal::sys_sigreturn;
        nr::RT_SIGRETURN => "rt_sigreturn", SIGNAL, [], signal::sys_sigreturn;
        nr::SIGALTSTACK => "sigaltstack", SIGNAL, [Addr, Addr], signal::sys_sigaltstack;
        nr::ALARM => "alarm", SIGNAL, [UInt], signal::sys_alarm;
        nr::SETITIMER => "setitimer", SIGNAL, [UInt, Addr, Addr], signal::sys_setitimer;
        nr::SIGNALFD4 => "signalfd4", SIGNAL, [Fd, Addr, UInt, UInt], signal::sys_signalfd4;
    }
    Ok(())
}

fn register_time(builder: &mut SyscallTableBuilder) -> Result<(), TrapError> {
    register_syscalls! { builder;
        nr::TIME => "time", SYSTEM, [Addr], time::sys_time;
        nr::TIMES => "times", SYSTEM, [Addr], time::sys_times;
        nr::GETTIMEOFDAY => "gettimeofday", SYSTEM, [Addr, Addr], time::sys_gettimeofday;
        nr::NANOSLEEP => "nanosleep", SYSTEM, [Addr, Addr], time::sys_nanosleep;
        nr::CLOCK_GETTIME => "clock_gettime", SYSTEM, [UInt, Addr], time::sys_clock_gettime;
        nr::CLOCK_GETRES => "clock_getres", SYSTEM, [UInt, Addr], time::sys_clock_getres;
        nr::CLOCK_NANOSLEEP => "clock_nanosleep", SYSTEM, [UInt, UInt, Addr, Addr], time::sys_clock_nanosleep;
        nr::CLOCK_GETTIME64 => "clock_gettime64", SYSTEM, [UInt, Addr], time::sys_clock_gettime64;
        nr::CLOCK_GETRES_TIME64 => "clock_getres_time64", SYSTEM, [UInt, Addr], time::sys_clock_getres_time64;
        nr::CLOCK_NANOSLEEP_TIME64 => "clock_nanosleep_time64", SYSTEM, [UInt, UInt, Addr, Addr], time::sys_clock_nanosleep_time64;
    }
    Ok(())
}

fn register_sockets(builder: &mut SyscallTableBuilder) -> Result<(), TrapError> {
    register_syscalls! { builder;
        nr::SOCKETCALL => "socketcall", SOCKET, [UInt, Addr], network::sys_socketcall;
        nr::SOCKET => "socket", SOCKET, [Int, Int, Int], network::sys_socket;
        nr::SOCKETPAIR => "socketpair", SOCKET, [Int, Int, Int, Addr], network::sys_socketpair;
        nr::BIND => "bind", SOCKET, [Fd, Addr, UInt], network::sys_bind;
        nr::CONNECT => "connect", SOCKET, [Fd, Addr, UInt], network::sys_connect;
        nr::LISTEN => "listen", SOCKET, [Fd, Int], network::sys_listen;
        nr::ACCEPT4 => "accept4", SOCKET, [Fd, Addr, Addr, UInt], network::sys_accept4;
        nr::GETSOCKOPT => "getsockopt", SOCKET, [Fd, Int, Int, Addr, Addr], network::sys_getsockopt;
        nr::SETSOCKOPT => "setsockopt", SOCKET, [Fd, Int, Int, Addr, UInt], network::sys_setsockopt;
        nr::GETSOCKNAME => "getsockname", SOCKET, [Fd, Addr, Addr], network::sys_getsockname;
        nr::GETPEERNAME => "getpeername", SOCKET, [Fd, Addr, Addr], network::sys_getpeername;
        nr::SENDTO => "sendto", SOCKET, [Fd, Addr, UInt, UInt, Addr, UInt], network::sys_sendto;
        nr::SENDMSG => "sendmsg", SOCKET, [Fd, Addr, UInt], network::sys_sendmsg;
        nr::RECVFROM => "recvfrom", SOCKET, [Fd, Addr, UInt, UInt, Addr, Addr], network::sys_recvfrom;
        nr::RECVMSG => "recvmsg", SOCKET, [Fd, Addr, UInt], network::sys_recvmsg;
        nr::SHUTDOWN => "shutdown", SOCKET, [Fd, Int], network::sys_shutdown;
        nr::SENDMMSG => "sendmmsg", SOCKET, [Fd, Addr, UInt, UInt], network::sys_sendmmsg;
    }
    Ok(())
}
