/*!
 * Socket Syscalls
 *
 * Sockets reach the kernel two ways: the multiplexed `socketcall(call,
 * args)` whose arguments sit in a guest word array, and the direct
 * syscalls added later. Both decode into one `SocketCall`.
 */

use super::HandlerResult;
use crate::core::types::GuestAddr;
use crate::syscalls::decode::DecodedArgs;
use crate::syscalls::table::SyscallContext;
use crate::syscalls::traits::SocketCall;
use crate::syscalls::types::{Errno, SyscallOutcome};
use tracing::warn;

/// socketcall call numbers
pub mod call {
    pub const SOCKET: u32 = 1;
    pub const BIND: u32 = 2;
    pub const CONNECT: u32 = 3;
    pub const LISTEN: u32 = 4;
    pub const ACCEPT: u32 = 5;
    pub const GETSOCKNAME: u32 = 6;
    pub const GETPEERNAME: u32 = 7;
    pub const SOCKETPAIR: u32 = 8;
    pub const SEND: u32 = 9;
    pub const RECV: u32 = 10;
    pub const SENDTO: u32 = 11;
    pub const RECVFROM: u32 = 12;
    pub const SHUTDOWN: u32 = 13;
    pub const SETSOCKOPT: u32 = 14;
    pub const GETSOCKOPT: u32 = 15;
    pub const SENDMSG: u32 = 16;
    pub const RECVMSG: u32 = 17;
    pub const ACCEPT4: u32 = 18;
    pub const SENDMMSG: u32 = 20;
}

/// Words each socketcall reads from its argument array
fn word_count(call: u32) -> Option<usize> {
    Some(match call {
        call::LISTEN | call::SHUTDOWN => 2,
        call::SOCKET
        | call::BIND
        | call::CONNECT
        | call::ACCEPT
        | call::GETSOCKNAME
        | call::GETPEERNAME
        | call::SENDMSG
        | call::RECVMSG => 3,
        call::SOCKETPAIR | call::SEND | call::RECV | call::ACCEPT4 | call::SENDMMSG => 4,
        call::SETSOCKOPT | call::GETSOCKOPT => 5,
        call::SENDTO | call::RECVFROM => 6,
        _ => return None,
    })
}

/// Build the operation for a socketcall number from its argument words
pub fn decode_socket_call(call: u32, a: [u32; 6]) -> Option<SocketCall> {
    let fd = a[0] as i32;
    let addr = |i: usize| GuestAddr::new(a[i]);
    Some(match call {
        call::SOCKET => SocketCall::Socket {
            domain: a[0] as i32,
            kind: a[1] as i32,
            protocol: a[2] as i32,
        },
        call::BIND => SocketCall::Bind { fd, addr: addr(1), len: a[2] },
        call::CONNECT => SocketCall::Connect { fd, addr: addr(1), len: a[2] },
        call::LISTEN => SocketCall::Listen { fd, backlog: a[1] as i32 },
        call::ACCEPT => SocketCall::Accept {
            fd,
            addr: addr(1),
            len: addr(2),
            flags: 0,
        },
        call::ACCEPT4 => SocketCall::Accept {
            fd,
            addr: addr(1),
            len: addr(2),
            flags: a[3],
        },
        call::GETSOCKNAME => SocketCall::GetSockName { fd, addr: addr(1), len: addr(2) },
        call::GETPEERNAME => SocketCall::GetPeerName { fd, addr: addr(1), len: addr(2) },
        call::SOCKETPAIR => SocketCall::SocketPair {
            domain: a[0] as i32,
            kind: a[1] as i32,
            protocol: a[2] as i32,
            fds: addr(3),
        },
        call::SEND => SocketCall::SendTo {
            fd,
            buf: addr(1),
            len: a[2],
            flags: a[3],
            dest: GuestAddr::NULL,
            dest_len: 0,
        },
        call::RECV => SocketCall::RecvFrom {
            fd,
            buf: addr(1),
            len: a[2],
            flags: a[3],
            src: GuestAddr::NULL,
            src_len: GuestAddr::NULL,
        },
        call::SENDTO => SocketCall::SendTo {
            fd,
            buf: addr(1),
            len: a[2],
            flags: a[3],
            dest: addr(4),
            dest_len: a[5],
        },
        call::RECVFROM => SocketCall::RecvFrom {
            fd,
            buf: addr(1),
            len: a[2],
            flags: a[3],
            src: addr(4),
            src_len: addr(5),
        },
        call::SHUTDOWN => SocketCall::Shutdown { fd, how: a[1] as i32 },
        call::SETSOCKOPT => SocketCall::SetSockOpt {
            fd,
            level: a[1] as i32,
            name: a[2] as i32,
            value: addr(3),
            len: a[4],
        },
        call::GETSOCKOPT => SocketCall::GetSockOpt {
            fd,
            level: a[1] as i32,
            name: a[2] as i32,
            value: addr(3),
            len: addr(4),
        },
        call::SENDMSG => SocketCall::SendMsg { fd, msg: addr(1), flags: a[2] },
        call::RECVMSG => SocketCall::RecvMsg { fd, msg: addr(1), flags: a[2] },
        call::SENDMMSG => SocketCall::SendMmsg {
            fd,
            msgs: addr(1),
            count: a[2],
            flags: a[3],
        },
        _ => return None,
    })
}

/// `socketcall(call, args)`
pub(crate) fn sys_socketcall(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    let number = args.uint(0);
    let Some(count) = word_count(number) else {
        warn!(call = number, "Unknown socketcall");
        return Ok(SyscallOutcome::err(Errno::EINVAL));
    };

    let mut words = [0u32; 6];
    let base = args.addr(1);
    for (i, word) in words.iter_mut().take(count).enumerate() {
        let at = match base.checked_add(4 * i as u32) {
            Some(at) => at,
            None => return Ok(SyscallOutcome::err(Errno::EFAULT)),
        };
        match ctx.memory.read_u32(at) {
            Ok(value) => *word = value,
            Err(_) => return Ok(SyscallOutcome::err(Errno::EFAULT)),
        }
    }

    match decode_socket_call(number, words) {
        Some(call) => Ok(ctx.kernel.sockets.call(ctx.thread, ctx.memory, call)),
        None => Ok(SyscallOutcome::err(Errno::EINVAL)),
    }
}

fn direct(ctx: &mut SyscallContext<'_>, args: &DecodedArgs, call: u32) -> HandlerResult {
    let words = std::array::from_fn(|i| args.raw(i));
    match decode_socket_call(call, words) {
        Some(op) => Ok(ctx.kernel.sockets.call(ctx.thread, ctx.memory, op)),
        None => Ok(SyscallOutcome::err(Errno::EINVAL)),
    }
}

pub(crate) fn sys_socket(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    direct(ctx, args, call::SOCKET)
}

pub(crate) fn sys_socketpair(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    direct(ctx, args, call::SOCKETPAIR)
}

pub(crate) fn sys_bind(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    direct(ctx, args, call::BIND)
}

pub(crate) fn sys_connect(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    direct(ctx, args, call::CONNECT)
}

pub(crate) fn sys_listen(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    direct(ctx, args, call::LISTEN)
}

pub(crate) fn sys_accept4(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    direct(ctx, args, call::ACCEPT4)
}

pub(crate) fn sys_getsockopt(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    direct(ctx, args, call::GETSOCKOPT)
}

pub(crate) fn sys_setsockopt(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    direct(ctx, args, call::SETSOCKOPT)
}

pub(crate) fn sys_getsockname(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    direct(ctx, args, call::GETSOCKNAME)
}

pub(crate) fn sys_getpeername(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    direct(ctx, args, call::GETPEERNAME)
}

pub(crate) fn sys_sendto(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    direct(ctx, args, call::SENDTO)
}

pub(crate) fn sys_sendmsg(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    direct(ctx, args, call::SENDMSG)
}

pub(crate) fn sys_recvfrom(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    direct(ctx, args, call::RECVFROM)
}

pub(crate) fn sys_recvmsg(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    direct(ctx, args, call::RECVMSG)
}

pub(crate) fn sys_shutdown(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    direct(ctx, args, call::SHUTDOWN)
}

pub(crate) fn sys_sendmmsg(ctx: &mut SyscallContext<'_>, args: &DecodedArgs) -> HandlerResult {
    direct(ctx, args, call::SENDMMSG)
}
