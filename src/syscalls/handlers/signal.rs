/*!
 * Signal Syscalls
 */

use super::HandlerResult;
use crate::syscalls::decode::DecodedArgs;
use crate::syscalls::table::SyscallContext;
use crate::syscalls::types::{Errno, SyscallOutcome};

/// Guest sigset size in bytes
const SIGSET_SIZE: u32 = 8;

pub(crate) fn sys_kill(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.signals.kill(ctx.thread, args.int(0), args.uint(1)))
}

pub(crate) fn sys_tgkill(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx
        .kernel
        .signals
        .tgkill(ctx.thread, args.int(0), args.int(1), args.uint(2)))
}

pub(crate) fn sys_rt_sigaction(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    if args.uint(3) != SIGSET_SIZE {
        return Ok(SyscallOutcome::err(Errno::EINVAL));
    }
    Ok(ctx.kernel.signals.sigaction(
        ctx.thread,
        ctx.memory,
        args.uint(0),
        args.addr(1),
        args.addr(2),
    ))
}

pub(crate) fn sys_rt_sigprocmask(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    if args.uint(3) != SIGSET_SIZE {
        return Ok(SyscallOutcome::err(Errno::EINVAL));
    }
    Ok(ctx.kernel.signals.sigprocmask(
        ctx.thread,
        ctx.memory,
        args.uint(0),
        args.addr(1),
        args.addr(2),
    ))
}

pub(crate) fn sys_rt_sigsuspend(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    if args.uint(1) != SIGSET_SIZE {
        return Ok(SyscallOutcome::err(Errno::EINVAL));
    }
    Ok(ctx.kernel.signals.sigsuspend(ctx.thread, ctx.memory, args.addr(0)))
}

/// sigreturn and rt_sigreturn; the collaborator restores every register
pub(crate) fn sys_sigreturn(ctx: &mut SyscallContext<'_>, _args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.signals.sigreturn(ctx.thread, ctx.memory))
}

pub(crate) fn sys_sigaltstack(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx
        .kernel
        .signals
        .sigaltstack(ctx.thread, ctx.memory, args.addr(0), args.addr(1)))
}

pub(crate) fn sys_alarm(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.signals.alarm(ctx.thread, args.uint(0)))
}

pub(crate) fn sys_setitimer(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.signals.setitimer(
        ctx.thread,
        ctx.memory,
        args.uint(0),
        args.addr(1),
        args.addr(2),
    ))
}

/// `signalfd4(fd, mask, size, flags)`
pub(crate) fn sys_signalfd4(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    if args.uint(2) != SIGSET_SIZE {
        return Ok(SyscallOutcome::err(Errno::EINVAL));
    }
    Ok(ctx
        .kernel
        .signals
        .signalfd(ctx.thread, ctx.memory, args.fd(0), args.addr(1), args.uint(3)))
}
