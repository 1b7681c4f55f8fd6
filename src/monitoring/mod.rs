/*!
 * Monitoring
 * Trap counters and structured tracing
 */

mod metrics;
mod tracer;

pub use metrics::{TrapMetrics, TrapMetricsSnapshot};
pub use tracer::{init_tracing, next_trace_id, span_syscall, SyscallSpan};
