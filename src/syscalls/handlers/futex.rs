/*!
 * Futex Syscall
 */

use super::HandlerResult;
use crate::syscalls::decode::DecodedArgs;
use crate::syscalls::table::SyscallContext;

/// `futex(uaddr, op, val, timeout, uaddr2, val3)`; waits come back as
/// `BlockedRetry` until woken
pub(crate) fn sys_futex(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.futex.futex(
        ctx.thread,
        ctx.memory,
        args.addr(0),
        args.uint(1),
        args.uint(2),
        args.addr(3),
        args.addr(4),
        args.uint(5),
    ))
}
