/*!
 * Time Syscalls
 * Clock reads and sleeps, in both 32-bit and time64 layouts
 */

use super::HandlerResult;
use crate::syscalls::decode::DecodedArgs;
use crate::syscalls::table::SyscallContext;
use crate::syscalls::traits::TimeLayout;

/// nanosleep measures against the monotonic clock
const CLOCK_MONOTONIC: u32 = 1;

pub(crate) fn sys_time(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.time.time(ctx.memory, args.addr(0)))
}

pub(crate) fn sys_times(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.time.times(ctx.thread, ctx.memory, args.addr(0)))
}

pub(crate) fn sys_gettimeofday(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.time.gettimeofday(ctx.memory, args.addr(0), args.addr(1)))
}

fn clock_gettime(ctx: &mut SyscallContext<'_>, args: &DecodedArgs, layout: TimeLayout) -> HandlerResult {
    Ok(ctx
        .kernel
        .time
        .clock_gettime(ctx.memory, args.uint(0), args.addr(1), layout))
}

pub(crate) fn sys_clock_gettime(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    clock_gettime(ctx, args, TimeLayout::Time32)
}

pub(crate) fn sys_clock_gettime64(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    clock_gettime(ctx, args, TimeLayout::Time64)
}

fn clock_getres(ctx: &mut SyscallContext<'_>, args: &DecodedArgs, layout: TimeLayout) -> HandlerResult {
    Ok(ctx
        .kernel
        .time
        .clock_getres(ctx.memory, args.uint(0), args.addr(1), layout))
}

pub(crate) fn sys_clock_getres(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    clock_getres(ctx, args, TimeLayout::Time32)
}

pub(crate) fn sys_clock_getres_time64(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    clock_getres(ctx, args, TimeLayout::Time64)
}

pub(crate) fn sys_nanosleep(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.time.sleep(
        ctx.thread,
        ctx.memory,
        CLOCK_MONOTONIC,
        0,
        args.addr(0),
        args.addr(1),
        TimeLayout::Time32,
    ))
}

fn clock_nanosleep(ctx: &mut SyscallContext<'_>, args: &DecodedArgs, layout: TimeLayout) -> HandlerResult {
    Ok(ctx.kernel.time.sleep(
        ctx.thread,
        ctx.memory,
        args.uint(0),
        args.uint(1),
        args.addr(2),
        args.addr(3),
        layout,
    ))
}

pub(crate) fn sys_clock_nanosleep(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    clock_nanosleep(ctx, args, TimeLayout::Time32)
}

pub(crate) fn sys_clock_nanosleep_time64(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    clock_nanosleep(ctx, args, TimeLayout::Time64)
}
