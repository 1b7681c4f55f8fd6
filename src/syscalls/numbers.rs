/*!
 * Syscall Numbers
 * Linux i386 syscall numbers served by the default table
 */

pub const EXIT: u32 = 1;
pub const READ: u32 = 3;
pub const WRITE: u32 = 4;
pub const OPEN: u32 = 5;
pub const CLOSE: u32 = 6;
pub const WAITPID: u32 = 7;
pub const LINK: u32 = 9;
pub const UNLINK: u32 = 10;
pub const EXECVE: u32 = 11;
pub const CHDIR: u32 = 12;
pub const TIME: u32 = 13;
pub const CHMOD: u32 = 15;
pub const LSEEK: u32 = 19;
pub const GETPID: u32 = 20;
pub const GETUID: u32 = 24;
pub const PTRACE: u32 = 26;
pub const ALARM: u32 = 27;
pub const UTIME: u32 = 30;
pub const ACCESS: u32 = 33;
pub const SYNC: u32 = 36;
pub const KILL: u32 = 37;
pub const RENAME: u32 = 38;
pub const MKDIR: u32 = 39;
pub const RMDIR: u32 = 40;
pub const DUP: u32 = 41;
pub const PIPE: u32 = 42;
pub const TIMES: u32 = 43;
pub const BRK: u32 = 45;
pub const GETGID: u32 = 47;
pub const GETEUID: u32 = 49;
pub const GETEGID: u32 = 50;
pub const IOCTL: u32 = 54;
pub const SETPGID: u32 = 57;
pub const UMASK: u32 = 60;
pub const DUP2: u32 = 63;
pub const GETPPID: u32 = 64;
pub const GETPGRP: u32 = 65;
pub const SETSID: u32 = 66;
pub const SETRLIMIT: u32 = 75;
pub const GETRUSAGE: u32 = 77;
pub const GETTIMEOFDAY: u32 = 78;
pub const SYMLINK: u32 = 83;
pub const READLINK: u32 = 85;
pub const MMAP: u32 = 90;
pub const MUNMAP: u32 = 91;
pub const FTRUNCATE: u32 = 93;
pub const FCHMOD: u32 = 94;
pub const SETPRIORITY: u32 = 97;
pub const STATFS: u32 = 99;
pub const IOPERM: u32 = 101;
pub const SOCKETCALL: u32 = 102;
pub const SETITIMER: u32 = 104;
pub const IOPL: u32 = 110;
pub const WAIT4: u32 = 114;
pub const SYSINFO: u32 = 116;
pub const IPC: u32 = 117;
pub const FSYNC: u32 = 118;
pub const SIGRETURN: u32 = 119;
pub const CLONE: u32 = 120;
pub const UNAME: u32 = 122;
pub const MODIFY_LDT: u32 = 123;
pub const MPROTECT: u32 = 125;
pub const GETPGID: u32 = 132;
pub const FCHDIR: u32 = 133;
pub const LLSEEK: u32 = 140;
pub const GETDENTS: u32 = 141;
pub const NEWSELECT: u32 = 142;
pub const FLOCK: u32 = 143;
pub const MSYNC: u32 = 144;
pub const WRITEV: u32 = 146;
pub const FDATASYNC: u32 = 148;
pub const MLOCK: u32 = 150;
pub const SCHED_GETPARAM: u32 = 155;
pub const SCHED_GETSCHEDULER: u32 = 157;
pub const SCHED_YIELD: u32 = 158;
pub const SCHED_GET_PRIORITY_MAX: u32 = 159;
pub const SCHED_GET_PRIORITY_MIN: u32 = 160;
pub const NANOSLEEP: u32 = 162;
pub const MREMAP: u32 = 163;
pub const VM86: u32 = 166;
pub const POLL: u32 = 168;
pub const PRCTL: u32 = 172;
pub const RT_SIGRETURN: u32 = 173;
pub const RT_SIGACTION: u32 = 174;
pub const RT_SIGPROCMASK: u32 = 175;
pub const RT_SIGSUSPEND: u32 = 179;
pub const PREAD64: u32 = 180;
pub const PWRITE64: u32 = 181;
pub const GETCWD: u32 = 183;
pub const SIGALTSTACK: u32 = 186;
pub const VFORK: u32 = 190;
pub const UGETRLIMIT: u32 = 191;
pub const MMAP2: u32 = 192;
pub const FTRUNCATE64: u32 = 194;
pub const STAT64: u32 = 195;
pub const LSTAT64: u32 = 196;
pub const FSTAT64: u32 = 197;
pub const LCHOWN32: u32 = 198;
pub const GETUID32: u32 = 199;
pub const GETGID32: u32 = 200;
pub const GETEUID32: u32 = 201;
pub const GETEGID32: u32 = 202;
pub const GETGROUPS32: u32 = 205;
pub const SETGROUPS32: u32 = 206;
pub const FCHOWN32: u32 = 207;
pub const SETRESUID32: u32 = 208;
pub const GETRESUID32: u32 = 209;
pub const SETRESGID32: u32 = 210;
pub const GETRESGID32: u32 = 211;
pub const CHOWN32: u32 = 212;
pub const SETUID32: u32 = 213;
pub const SETGID32: u32 = 214;
pub const MINCORE: u32 = 218;
pub const MADVISE: u32 = 219;
pub const GETDENTS64: u32 = 220;
pub const FCNTL64: u32 = 221;
pub const GETTID: u32 = 224;
pub const FSETXATTR: u32 = 228;
pub const GETXATTR: u32 = 229;
pub const LGETXATTR: u32 = 230;
pub const FGETXATTR: u32 = 231;
pub const FLISTXATTR: u32 = 234;
pub const FUTEX: u32 = 240;
pub const SCHED_SETAFFINITY: u32 = 241;
pub const SCHED_GETAFFINITY: u32 = 242;
pub const SET_THREAD_AREA: u32 = 243;
pub const EXIT_GROUP: u32 = 252;
pub const EPOLL_CREATE: u32 = 254;
pub const EPOLL_CTL: u32 = 255;
pub const EPOLL_WAIT: u32 = 256;
pub const SET_TID_ADDRESS: u32 = 258;
pub const CLOCK_GETTIME: u32 = 265;
pub const CLOCK_GETRES: u32 = 266;
pub const CLOCK_NANOSLEEP: u32 = 267;
pub const STATFS64: u32 = 268;
pub const FSTATFS64: u32 = 269;
pub const TGKILL: u32 = 270;
pub const UTIMES: u32 = 271;
pub const FADVISE64: u32 = 272;
pub const INOTIFY_INIT: u32 = 291;
pub const OPENAT: u32 = 295;
pub const MKDIRAT: u32 = 296;
pub const FCHOWNAT: u32 = 298;
pub const FSTATAT64: u32 = 300;
pub const UNLINKAT: u32 = 301;
pub const RENAMEAT: u32 = 302;
pub const SYMLINKAT: u32 = 304;
pub const READLINKAT: u32 = 305;
pub const FCHMODAT: u32 = 306;
pub const FACCESSAT: u32 = 307;
pub const SET_ROBUST_LIST: u32 = 311;
pub const SYNC_FILE_RANGE: u32 = 314;
pub const UTIMENSAT: u32 = 320;
pub const SIGNALFD4: u32 = 327;
pub const EPOLL_CREATE1: u32 = 329;
pub const PIPE2: u32 = 331;
pub const PRLIMIT64: u32 = 340;
pub const SENDMMSG: u32 = 345;
pub const RENAMEAT2: u32 = 353;
pub const GETRANDOM: u32 = 355;
pub const MEMFD_CREATE: u32 = 356;
pub const SOCKET: u32 = 359;
pub const SOCKETPAIR: u32 = 360;
pub const BIND: u32 = 361;
pub const CONNECT: u32 = 362;
pub const LISTEN: u32 = 363;
pub const ACCEPT4: u32 = 364;
pub const GETSOCKOPT: u32 = 365;
pub const SETSOCKOPT: u32 = 366;
pub const GETSOCKNAME: u32 = 367;
pub const GETPEERNAME: u32 = 368;
pub const SENDTO: u32 = 369;
pub const SENDMSG: u32 = 370;
pub const RECVFROM: u32 = 371;
pub const RECVMSG: u32 = 372;
pub const SHUTDOWN: u32 = 373;
pub const CLOCK_GETTIME64: u32 = 403;
pub const CLOCK_GETRES_TIME64: u32 = 406;
pub const CLOCK_NANOSLEEP_TIME64: u32 = 407;
pub const UTIMENSAT_TIME64: u32 = 412;
