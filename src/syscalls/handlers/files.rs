/*!
 * File Syscalls
 * Descriptor I/O, path operations and readiness polling
 */

use super::{guest_access, join_u64, HandlerResult};
use crate::syscalls::decode::DecodedArgs;
use crate::syscalls::table::SyscallContext;
use crate::syscalls::traits::{
    FileTarget, TimeLayout, TimesLayout, AT_FDCWD, AT_REMOVEDIR, AT_SYMLINK_NOFOLLOW,
};
use crate::syscalls::types::{Errno, SyscallOutcome};

pub(crate) fn sys_read(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx
        .kernel
        .files
        .read(ctx.thread, ctx.memory, args.fd(0), args.addr(1), args.uint(2), None))
}

pub(crate) fn sys_write(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx
        .kernel
        .files
        .write(ctx.thread, ctx.memory, args.fd(0), args.addr(1), args.uint(2), None))
}

pub(crate) fn sys_pread64(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let offset = join_u64(args.uint(3), args.uint(4));
    Ok(ctx.kernel.files.read(
        ctx.thread,
        ctx.memory,
        args.fd(0),
        args.addr(1),
        args.uint(2),
        Some(offset),
    ))
}

pub(crate) fn sys_pwrite64(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let offset = join_u64(args.uint(3), args.uint(4));
    Ok(ctx.kernel.files.write(
        ctx.thread,
        ctx.memory,
        args.fd(0),
        args.addr(1),
        args.uint(2),
        Some(offset),
    ))
}

pub(crate) fn sys_writev(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx
        .kernel
        .files
        .writev(ctx.thread, ctx.memory, args.fd(0), args.addr(1), args.uint(2)))
}

pub(crate) fn sys_open(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let path = args.path(0)?;
    Ok(ctx
        .kernel
        .files
        .open(ctx.thread, AT_FDCWD, path, args.uint(1), args.uint(2)))
}

pub(crate) fn sys_openat(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let path = args.path(1)?;
    Ok(ctx
        .kernel
        .files
        .open(ctx.thread, args.fd(0), path, args.uint(2), args.uint(3)))
}

pub(crate) fn sys_close(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.files.close(ctx.thread, args.fd(0)))
}

/// 32-bit lseek: offsets past 2 GiB cannot be returned in EAX
pub(crate) fn sys_lseek(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let result = ctx
        .kernel
        .files
        .lseek(ctx.thread, args.fd(0), i64::from(args.int(1)), args.uint(2))
        .and_then(|pos| i32::try_from(pos).map_err(|_| Errno::EOVERFLOW));
    Ok(SyscallOutcome::from_result(result))
}

/// `_llseek(fd, high, low, result, whence)`; the new offset is written to
/// `result`
pub(crate) fn sys_llseek(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let offset = join_u64(args.uint(2), args.uint(1)) as i64;
    let pos = match ctx.kernel.files.lseek(ctx.thread, args.fd(0), offset, args.uint(4)) {
        Ok(pos) => pos,
        Err(errno) => return Ok(SyscallOutcome::err(errno)),
    };
    let written = guest_access(ctx.memory.write_u64(args.addr(3), pos as u64))?;
    Ok(SyscallOutcome::from_result(written.map(|()| 0)))
}

pub(crate) fn sys_stat64(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let path = args.path(0)?;
    Ok(ctx
        .kernel
        .files
        .stat(ctx.thread, ctx.memory, AT_FDCWD, path, args.addr(1), 0))
}

pub(crate) fn sys_lstat64(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let path = args.path(0)?;
    Ok(ctx.kernel.files.stat(
        ctx.thread,
        ctx.memory,
        AT_FDCWD,
        path,
        args.addr(1),
        AT_SYMLINK_NOFOLLOW,
    ))
}

pub(crate) fn sys_fstatat64(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let path = args.path(1)?;
    Ok(ctx.kernel.files.stat(
        ctx.thread,
        ctx.memory,
        args.fd(0),
        path,
        args.addr(2),
        args.uint(3),
    ))
}

pub(crate) fn sys_fstat64(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.files.fstat(ctx.thread, ctx.memory, args.fd(0), args.addr(1)))
}

pub(crate) fn sys_statfs(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let path = args.path(0)?;
    Ok(ctx
        .kernel
        .files
        .statfs(ctx.thread, ctx.memory, FileTarget::Path(path), args.addr(1), false))
}

/// `statfs64(path, size, buf)`
pub(crate) fn sys_statfs64(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let path = args.path(0)?;
    Ok(ctx
        .kernel
        .files
        .statfs(ctx.thread, ctx.memory, FileTarget::Path(path), args.addr(2), true))
}

pub(crate) fn sys_fstatfs64(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx
        .kernel
        .files
        .statfs(ctx.thread, ctx.memory, FileTarget::Fd(args.fd(0)), args.addr(2), true))
}

/// Extended attributes are not supported on any file
pub(crate) fn sys_xattr(_ctx: &mut SyscallContext<'_>, _args: &DecodedArgs) -> HandlerResult {
    Ok(SyscallOutcome::err(Errno::EOPNOTSUPP))
}

pub(crate) fn sys_access(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let path = args.path(0)?;
    Ok(ctx.kernel.files.access(ctx.thread, AT_FDCWD, path, args.uint(1), 0))
}

pub(crate) fn sys_faccessat(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let path = args.path(1)?;
    Ok(ctx
        .kernel
        .files
        .access(ctx.thread, args.fd(0), path, args.uint(2), args.uint(3)))
}

pub(crate) fn sys_unlink(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let path = args.path(0)?;
    Ok(ctx.kernel.files.unlink(ctx.thread, AT_FDCWD, path, 0))
}

pub(crate) fn sys_rmdir(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let path = args.path(0)?;
    Ok(ctx.kernel.files.unlink(ctx.thread, AT_FDCWD, path, AT_REMOVEDIR))
}

pub(crate) fn sys_unlinkat(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let path = args.path(1)?;
    Ok(ctx.kernel.files.unlink(ctx.thread, args.fd(0), path, args.uint(2)))
}

pub(crate) fn sys_mkdir(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let path = args.path(0)?;
    Ok(ctx.kernel.files.mkdir(ctx.thread, AT_FDCWD, path, args.uint(1)))
}

pub(crate) fn sys_mkdirat(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let path = args.path(1)?;
    Ok(ctx.kernel.files.mkdir(ctx.thread, args.fd(0), path, args.uint(2)))
}

pub(crate) fn sys_readlink(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let path = args.path(0)?;
    Ok(ctx.kernel.files.readlink(
        ctx.thread,
        ctx.memory,
        AT_FDCWD,
        path,
        args.addr(1),
        args.uint(2),
    ))
}

pub(crate) fn sys_readlinkat(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let path = args.path(1)?;
    Ok(ctx.kernel.files.readlink(
        ctx.thread,
        ctx.memory,
        args.fd(0),
        path,
        args.addr(2),
        args.uint(3),
    ))
}

pub(crate) fn sys_link(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.files.link(ctx.thread, args.path(0)?, args.path(1)?))
}

pub(crate) fn sys_symlink(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.files.symlink(ctx.thread, args.path(0)?, args.path(1)?))
}

pub(crate) fn sys_rename(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.files.rename(ctx.thread, args.path(0)?, args.path(1)?))
}

pub(crate) fn sys_renameat(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx
        .kernel
        .files
        .renameat(ctx.thread, args.fd(0), args.path(1)?, args.fd(2), args.path(3)?, 0))
}

pub(crate) fn sys_renameat2(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.files.renameat(
        ctx.thread,
        args.fd(0),
        args.path(1)?,
        args.fd(2),
        args.path(3)?,
        args.uint(4),
    ))
}

/// `symlinkat(target, dirfd, linkpath)`
pub(crate) fn sys_symlinkat(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx
        .kernel
        .files
        .symlinkat(ctx.thread, args.path(0)?, args.fd(1), args.path(2)?))
}

pub(crate) fn sys_utimes(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let path = args.path(0)?;
    Ok(ctx.kernel.files.set_times(
        ctx.thread,
        ctx.memory,
        AT_FDCWD,
        Some(path),
        args.addr(1),
        0,
        TimesLayout::Timeval,
    ))
}

fn utimensat(ctx: &mut SyscallContext<'_>, args: &DecodedArgs, layout: TimeLayout) -> HandlerResult {
    let path = args.opt_path(1)?;
    Ok(ctx.kernel.files.set_times(
        ctx.thread,
        ctx.memory,
        args.fd(0),
        path,
        args.addr(2),
        args.uint(3),
        TimesLayout::Timespec(layout),
    ))
}

/// A NULL path targets `dirfd` itself (futimens)
pub(crate) fn sys_utimensat(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    utimensat(ctx, args, TimeLayout::Time32)
}

pub(crate) fn sys_utimensat_time64(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    utimensat(ctx, args, TimeLayout::Time64)
}

pub(crate) fn sys_memfd_create(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.files.memfd_create(ctx.thread, args.path(0)?, args.uint(1)))
}

pub(crate) fn sys_inotify_init(ctx: &mut SyscallContext<'_>, _args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.files.inotify_init(ctx.thread))
}

pub(crate) fn sys_chdir(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.files.chdir(ctx.thread, args.path(0)?))
}

pub(crate) fn sys_fchdir(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.files.fchdir(ctx.thread, args.fd(0)))
}

pub(crate) fn sys_chmod(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.files.chmod(ctx.thread, args.path(0)?, args.uint(1)))
}

pub(crate) fn sys_fchmod(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.files.fchmod(ctx.thread, args.fd(0), args.uint(1)))
}

pub(crate) fn sys_getcwd(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.files.getcwd(ctx.thread, ctx.memory, args.addr(0), args.uint(1)))
}

pub(crate) fn sys_dup(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.files.dup(ctx.thread, args.fd(0)))
}

pub(crate) fn sys_dup2(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.files.dup2(ctx.thread, args.fd(0), args.fd(1)))
}

pub(crate) fn sys_pipe(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.files.pipe(ctx.thread, ctx.memory, args.addr(0), 0))
}

pub(crate) fn sys_pipe2(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.files.pipe(ctx.thread, ctx.memory, args.addr(0), args.uint(1)))
}

pub(crate) fn sys_ioctl(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx
        .kernel
        .files
        .ioctl(ctx.thread, ctx.memory, args.fd(0), args.uint(1), args.addr(2)))
}

pub(crate) fn sys_fcntl64(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx
        .kernel
        .files
        .fcntl(ctx.thread, ctx.memory, args.fd(0), args.uint(1), args.uint(2)))
}

pub(crate) fn sys_ftruncate(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.files.truncate(ctx.thread, args.fd(0), u64::from(args.uint(1))))
}

pub(crate) fn sys_ftruncate64(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let len = join_u64(args.uint(1), args.uint(2));
    Ok(ctx.kernel.files.truncate(ctx.thread, args.fd(0), len))
}

pub(crate) fn sys_fsync(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.files.fsync(ctx.thread, args.fd(0), false))
}

pub(crate) fn sys_fdatasync(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.files.fsync(ctx.thread, args.fd(0), true))
}

pub(crate) fn sys_getdents(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.files.getdents(
        ctx.thread,
        ctx.memory,
        args.fd(0),
        args.addr(1),
        args.uint(2),
        false,
    ))
}

pub(crate) fn sys_getdents64(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.files.getdents(
        ctx.thread,
        ctx.memory,
        args.fd(0),
        args.addr(1),
        args.uint(2),
        true,
    ))
}

pub(crate) fn sys_newselect(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.files.select(
        ctx.thread,
        ctx.memory,
        args.int(0),
        args.addr(1),
        args.addr(2),
        args.addr(3),
        args.addr(4),
    ))
}

pub(crate) fn sys_poll(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx
        .kernel
        .files
        .poll(ctx.thread, ctx.memory, args.addr(0), args.uint(1), args.int(2)))
}

/// The size hint only has to be positive
pub(crate) fn sys_epoll_create(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    if args.int(0) <= 0 {
        return Ok(SyscallOutcome::err(Errno::EINVAL));
    }
    Ok(ctx.kernel.files.epoll_create(ctx.thread, 0))
}

pub(crate) fn sys_epoll_create1(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.files.epoll_create(ctx.thread, args.uint(0)))
}

pub(crate) fn sys_epoll_ctl(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.files.epoll_ctl(
        ctx.thread,
        ctx.memory,
        args.fd(0),
        args.int(1),
        args.fd(2),
        args.addr(3),
    ))
}

pub(crate) fn sys_epoll_wait(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    Ok(ctx.kernel.files.epoll_wait(
        ctx.thread,
        ctx.memory,
        args.fd(0),
        args.addr(1),
        args.int(2),
        args.int(3),
    ))
}
