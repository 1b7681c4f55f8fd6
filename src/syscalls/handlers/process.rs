/*!
 * Process Syscalls
 * Lifecycle, identity, credentials and resource limits
 */

use super::{guest_access, HandlerResult};
use crate::core::types::GuestAddr;
use crate::syscalls::decode::DecodedArgs;
use crate::syscalls::table::SyscallContext;
use crate::syscalls::traits::ProcessId;
use crate::syscalls::types::{Errno, SyscallOutcome};
use tracing::warn;

/// Priority range reported for SCHED_OTHER
const PRIORITY_MAX: i32 = 32;
const PRIORITY_MIN: i32 = 0;

/// id argument meaning "leave unchanged"
const UNCHANGED_ID: u32 = u32::MAX;

pub(crate) fn sys_exit(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.process.exit_thread(ctx.thread, args.int(0)))
}

pub(crate) fn sys_exit_group(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.process.exit_group(ctx.thread, args.int(0)))
}

/// On success the new image's entry is already in EIP, so nothing is
/// written back.
pub(crate) fn sys_execve(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let path = args.path(0)?;
    let argv = args.strings(1)?;
    let envp = args.strings(2)?;
    if ctx.kernel.process.execve(ctx.thread, ctx.memory, path, argv, envp) {
        Ok(SyscallOutcome::ContinueNoAdvance)
    } else {
        Ok(SyscallOutcome::err(Errno::ENOENT))
    }
}

pub(crate) fn sys_clone(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.process.clone_thread(
        ctx.thread,
        ctx.memory,
        args.uint(0),
        args.addr(1),
        args.addr(2),
        args.addr(3),
        args.addr(4),
    ))
}

pub(crate) fn sys_vfork(ctx: &mut SyscallContext<'_>, _args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.process.vfork(ctx.thread))
}

pub(crate) fn sys_waitpid(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx
        .kernel
        .process
        .wait(ctx.thread, ctx.memory, args.int(0), args.addr(1), args.uint(2)))
}

/// The rusage pointer is filled separately when present. An unwritable
/// rusage fails the call with EFAULT even though the child was reaped.
pub(crate) fn sys_wait4(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let outcome = ctx
        .kernel
        .process
        .wait(ctx.thread, ctx.memory, args.int(0), args.addr(1), args.uint(2));
    let usage = args.addr(3);
    let Some(pid) = outcome.value().filter(|&pid| pid > 0) else {
        return Ok(outcome);
    };
    if usage.is_null() {
        return Ok(outcome);
    }
    // RUSAGE_CHILDREN
    match ctx.kernel.process.getrusage(ctx.thread, ctx.memory, -1, usage).value() {
        Some(code) if code == Errno::EFAULT.negated() => Ok(SyscallOutcome::err(Errno::EFAULT)),
        Some(code) if code < 0 => {
            warn!(pid, code, "wait4 could not fill rusage");
            Ok(outcome)
        }
        _ => Ok(outcome),
    }
}

fn identity(ctx: &mut SyscallContext<'_>, which: ProcessId) -> HandlerResult {
    Ok(SyscallOutcome::ok(ctx.kernel.process.id(ctx.thread, which)))
}

pub(crate) fn sys_getpid(ctx: &mut SyscallContext<'_>, _args: &DecodedArgs) -> HandlerResult {
    identity(ctx, ProcessId::Pid)
}

pub(crate) fn sys_getppid(ctx: &mut SyscallContext<'_>, _args: &DecodedArgs) -> HandlerResult {
    identity(ctx, ProcessId::ParentPid)
}

pub(crate) fn sys_gettid(ctx: &mut SyscallContext<'_>, _args: &DecodedArgs) -> HandlerResult {
    identity(ctx, ProcessId::Tid)
}

pub(crate) fn sys_getpgrp(ctx: &mut SyscallContext<'_>, _args: &DecodedArgs) -> HandlerResult {
    identity(ctx, ProcessId::ProcessGroup)
}

pub(crate) fn sys_getuid(ctx: &mut SyscallContext<'_>, _args: &DecodedArgs) -> HandlerResult {
    identity(ctx, ProcessId::Uid)
}

pub(crate) fn sys_getgid(ctx: &mut SyscallContext<'_>, _args: &DecodedArgs) -> HandlerResult {
    identity(ctx, ProcessId::Gid)
}

pub(crate) fn sys_geteuid(ctx: &mut SyscallContext<'_>, _args: &DecodedArgs) -> HandlerResult {
    identity(ctx, ProcessId::EffectiveUid)
}

pub(crate) fn sys_getegid(ctx: &mut SyscallContext<'_>, _args: &DecodedArgs) -> HandlerResult {
    identity(ctx, ProcessId::EffectiveGid)
}

pub(crate) fn sys_getpgid(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.process.getpgid(ctx.thread, args.int(0)))
}

pub(crate) fn sys_setpgid(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.process.setpgid(ctx.thread, args.int(0), args.int(1)))
}

pub(crate) fn sys_setsid(ctx: &mut SyscallContext<'_>, _args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.process.setsid(ctx.thread))
}

pub(crate) fn sys_setuid(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.process.set_credentials(ctx.thread, ProcessId::Uid, args.uint(0)))
}

pub(crate) fn sys_setgid(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.process.set_credentials(ctx.thread, ProcessId::Gid, args.uint(0)))
}

/// Write each requested id to its non-null pointer
fn write_ids(ctx: &mut SyscallContext<'_>, targets: [(GuestAddr, ProcessId); 3]) -> HandlerResult {
    for (ptr, which) in targets {
        if ptr.is_null() {
            continue;
        }
        let value = ctx.kernel.process.id(ctx.thread, which) as u32;
        if let Err(errno) = guest_access(ctx.memory.write_u32(ptr, value))? {
            return Ok(SyscallOutcome::err(errno));
        }
    }
    Ok(SyscallOutcome::success())
}

/// Saved ids are not tracked; the real id stands in for them
pub(crate) fn sys_getresuid(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    write_ids(
        ctx,
        [
            (args.addr(0), ProcessId::Uid),
            (args.addr(1), ProcessId::EffectiveUid),
            (args.addr(2), ProcessId::Uid),
        ],
    )
}

pub(crate) fn sys_getresgid(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    write_ids(
        ctx,
        [
            (args.addr(0), ProcessId::Gid),
            (args.addr(1), ProcessId::EffectiveGid),
            (args.addr(2), ProcessId::Gid),
        ],
    )
}

fn set_ids(ctx: &mut SyscallContext<'_>, updates: [(u32, ProcessId); 2]) -> HandlerResult {
    for (value, which) in updates {
        if value == UNCHANGED_ID {
            continue;
        }
        let outcome = ctx.kernel.process.set_credentials(ctx.thread, which, value);
        if outcome.value() != Some(0) {
            return Ok(outcome);
        }
    }
    Ok(SyscallOutcome::success())
}

pub(crate) fn sys_setresuid(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    set_ids(ctx, [(args.uint(0), ProcessId::Uid), (args.uint(1), ProcessId::EffectiveUid)])
}

pub(crate) fn sys_setresgid(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    set_ids(ctx, [(args.uint(0), ProcessId::Gid), (args.uint(1), ProcessId::EffectiveGid)])
}

/// The primary group is the only supplementary group
pub(crate) fn sys_getgroups(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let size = args.int(0);
    if size < 0 {
        return Ok(SyscallOutcome::err(Errno::EINVAL));
    }
    if size > 0 {
        let gid = ctx.kernel.process.id(ctx.thread, ProcessId::Gid) as u32;
        if let Err(errno) = guest_access(ctx.memory.write_u32(args.addr(1), gid))? {
            return Ok(SyscallOutcome::err(errno));
        }
    }
    Ok(SyscallOutcome::ok(1))
}

/// The first listed group becomes the primary group
pub(crate) fn sys_setgroups(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    if args.uint(0) == 0 {
        return Ok(SyscallOutcome::success());
    }
    match ctx.memory.read_u32(args.addr(1)) {
        Ok(gid) => Ok(ctx.kernel.process.set_credentials(ctx.thread, ProcessId::Gid, gid)),
        Err(_) => Ok(SyscallOutcome::err(Errno::EFAULT)),
    }
}

pub(crate) fn sys_umask(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.process.umask(ctx.thread, args.uint(0) & 0o777))
}

pub(crate) fn sys_uname(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.process.uname(ctx.memory, args.addr(0)))
}

pub(crate) fn sys_sysinfo(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.process.sysinfo(ctx.memory, args.addr(0)))
}

pub(crate) fn sys_prctl(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.process.prctl(ctx.thread, args.int(0), args.uint(1)))
}

pub(crate) fn sys_set_thread_area(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.process.set_thread_area(ctx.thread, ctx.memory, args.addr(0)))
}

pub(crate) fn sys_modify_ldt(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx
        .kernel
        .process
        .modify_ldt(ctx.thread, ctx.memory, args.int(0), args.addr(1), args.uint(2)))
}

pub(crate) fn sys_set_tid_address(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.process.set_tid_address(ctx.thread, args.addr(0)))
}

pub(crate) fn sys_set_robust_list(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.process.set_robust_list(ctx.thread, args.addr(0), args.uint(1)))
}

pub(crate) fn sys_setrlimit(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx
        .kernel
        .process
        .rlimit(ctx.thread, ctx.memory, 0, args.uint(0), args.addr(1), GuestAddr::NULL))
}

pub(crate) fn sys_getrlimit(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    if args.addr(1).is_null() {
        return Ok(SyscallOutcome::err(Errno::EFAULT));
    }
    Ok(ctx
        .kernel
        .process
        .rlimit(ctx.thread, ctx.memory, 0, args.uint(0), GuestAddr::NULL, args.addr(1)))
}

pub(crate) fn sys_prlimit64(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.process.rlimit(
        ctx.thread,
        ctx.memory,
        args.int(0),
        args.uint(1),
        args.addr(2),
        args.addr(3),
    ))
}

pub(crate) fn sys_getrusage(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.process.getrusage(ctx.thread, ctx.memory, args.int(0), args.addr(1)))
}

pub(crate) fn sys_setpriority(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx
        .kernel
        .process
        .setpriority(ctx.thread, args.int(0), args.int(1), args.int(2)))
}

pub(crate) fn sys_sched_yield(ctx: &mut SyscallContext<'_>, _args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.process.sched_yield(ctx.thread))
}

pub(crate) fn sys_sched_getaffinity(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.process.sched_getaffinity(
        ctx.thread,
        ctx.memory,
        args.int(0),
        args.uint(1),
        args.addr(2),
    ))
}

/// Only SCHED_OTHER exists
pub(crate) fn sys_sched_getscheduler(_ctx: &mut SyscallContext<'_>, _args: &DecodedArgs) -> HandlerResult {
    Ok(SyscallOutcome::success())
}

pub(crate) fn sys_sched_getparam(_ctx: &mut SyscallContext<'_>, _args: &DecodedArgs) -> HandlerResult {
    Ok(SyscallOutcome::err(Errno::EPERM))
}

pub(crate) fn sys_sched_get_priority_max(_ctx: &mut SyscallContext<'_>, _args: &DecodedArgs) -> HandlerResult {
    Ok(SyscallOutcome::ok(PRIORITY_MAX))
}

pub(crate) fn sys_sched_get_priority_min(_ctx: &mut SyscallContext<'_>, _args: &DecodedArgs) -> HandlerResult {
    Ok(SyscallOutcome::ok(PRIORITY_MIN))
}

/// Virtual 8086 mode is not emulated
pub(crate) fn sys_vm86(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    warn!(tid = ctx.thread.tid, func = args.uint(0), "vm86 requested");
    Ok(SyscallOutcome::err(Errno::ENOSYS))
}

pub(crate) fn sys_getrandom(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx
        .kernel
        .process
        .getrandom(ctx.memory, args.addr(0), args.uint(1), args.uint(2)))
}

/// Debugging other processes is never permitted
pub(crate) fn sys_ptrace(_ctx: &mut SyscallContext<'_>, _args: &DecodedArgs) -> HandlerResult {
    Ok(SyscallOutcome::err(Errno::EPERM))
}

/// Accepted and ignored; the registry lists which calls land here
pub(crate) fn sys_ignored(_ctx: &mut SyscallContext<'_>, _args: &DecodedArgs) -> HandlerResult {
    Ok(SyscallOutcome::success())
}
