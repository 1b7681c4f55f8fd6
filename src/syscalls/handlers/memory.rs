/*!
 * Memory Syscalls
 * Guest mappings, program break and mapping advice
 */

use super::HandlerResult;
use crate::core::limits::GUEST_PAGE_SIZE;
use crate::core::types::GuestAddr;
use crate::syscalls::decode::DecodedArgs;
use crate::syscalls::table::SyscallContext;
use crate::syscalls::traits::ShmCall;
use crate::syscalls::types::{Errno, SyscallOutcome};
use tracing::warn;

/// `ipc` operation numbers for System V shared memory
pub mod ipc {
    pub const SHMAT: u32 = 21;
    pub const SHMDT: u32 = 22;
    pub const SHMGET: u32 = 23;
    pub const SHMCTL: u32 = 24;
}

pub(crate) fn sys_brk(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.memory.brk(ctx.thread, ctx.memory, args.addr(0)))
}

/// Old-style mmap: a single pointer to six words
/// `{addr, len, prot, flags, fd, offset}` with a byte offset that must be
/// page aligned
pub(crate) fn sys_old_mmap(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let mut raw = [0u8; 24];
    if ctx.memory.read_bytes(args.addr(0), &mut raw).is_err() {
        return Ok(SyscallOutcome::err(Errno::EFAULT));
    }
    let word = |i: usize| u32::from_le_bytes([raw[i * 4], raw[i * 4 + 1], raw[i * 4 + 2], raw[i * 4 + 3]]);

    let offset = word(5);
    if offset as usize % GUEST_PAGE_SIZE != 0 {
        return Ok(SyscallOutcome::err(Errno::EINVAL));
    }
    Ok(ctx.kernel.memory.mmap(
        ctx.thread,
        ctx.memory,
        GuestAddr::new(word(0)),
        word(1),
        word(2),
        word(3),
        word(4) as i32,
        u64::from(offset),
    ))
}

/// mmap2 takes its offset in 4 KiB units
pub(crate) fn sys_mmap2(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let offset = u64::from(args.uint(5)) * GUEST_PAGE_SIZE as u64;
    Ok(ctx.kernel.memory.mmap(
        ctx.thread,
        ctx.memory,
        args.addr(0),
        args.uint(1),
        args.uint(2),
        args.uint(3),
        args.fd(4),
        offset,
    ))
}

pub(crate) fn sys_munmap(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx
        .kernel
        .memory
        .munmap(ctx.thread, ctx.memory, args.addr(0), args.uint(1)))
}

pub(crate) fn sys_mprotect(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx
        .kernel
        .memory
        .mprotect(ctx.thread, ctx.memory, args.addr(0), args.uint(1), args.uint(2)))
}

pub(crate) fn sys_mremap(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.memory.mremap(
        ctx.thread,
        ctx.memory,
        args.addr(0),
        args.uint(1),
        args.uint(2),
        args.uint(3),
    ))
}

pub(crate) fn sys_madvise(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx
        .kernel
        .memory
        .madvise(ctx.memory, args.addr(0), args.uint(1), args.uint(2)))
}

pub(crate) fn sys_msync(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx
        .kernel
        .memory
        .msync(ctx.memory, args.addr(0), args.uint(1), args.uint(2)))
}

pub(crate) fn sys_mlock(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.memory.mlock(ctx.memory, args.addr(0), args.uint(1)))
}

pub(crate) fn sys_mincore(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx
        .kernel
        .memory
        .mincore(ctx.memory, args.addr(0), args.uint(1), args.addr(2)))
}

/// Build the shared memory operation for `ipc(call, first, second, third,
/// ptr, fifth)`. The high half of `call` carries an ABI version.
pub fn decode_ipc_call(call: u32, first: u32, second: u32, third: u32, ptr: u32) -> Option<ShmCall> {
    Some(match call & 0xffff {
        ipc::SHMAT => ShmCall::Attach {
            id: first as i32,
            addr: GuestAddr::new(ptr),
            flags: second,
            result: GuestAddr::new(third),
        },
        ipc::SHMDT => ShmCall::Detach { addr: GuestAddr::new(ptr) },
        ipc::SHMGET => ShmCall::Get {
            key: first as i32,
            size: second,
            flags: third,
        },
        ipc::SHMCTL => ShmCall::Control {
            id: first as i32,
            cmd: second as i32,
            buf: GuestAddr::new(ptr),
        },
        _ => return None,
    })
}

/// Semaphores and message queues are not served
pub(crate) fn sys_ipc(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let call = args.uint(0);
    match decode_ipc_call(call, args.uint(1), args.uint(2), args.uint(3), args.uint(4)) {
        Some(op) => Ok(ctx.kernel.memory.shm(ctx.thread, ctx.memory, op)),
        None => {
            warn!(call, "Unsupported ipc operation");
            Ok(SyscallOutcome::err(Errno::ENOSYS))
        }
    }
}
