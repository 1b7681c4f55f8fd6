/*!
 * Tracing
 * Subscriber setup and per-trap spans
 */

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Syscalls slower than this are reported at warn level
const SLOW_SYSCALL_MICROS: u64 = 10_000;

static NEXT_TRACE_ID: AtomicU64 = AtomicU64::new(1);

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: log filter (default: info)
/// - GUEST_TRACE_JSON: `1` | `true` for JSON output
///
/// Safe to call more than once; later calls leave the first subscriber in
/// place.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("GUEST_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let initialized = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_span_events(FmtSpan::NONE)
                    .compact(),
            )
            .try_init()
    };

    if initialized.is_ok() {
        info!(json = use_json, "Tracing initialized");
    }
}

/// Monotonic id correlating the events of one trap
pub fn next_trace_id() -> u64 {
    NEXT_TRACE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Span covering one dispatched syscall
pub struct SyscallSpan {
    span: tracing::Span,
    start: Instant,
    syscall: &'static str,
    trace_id: u64,
}

impl SyscallSpan {
    pub fn new(syscall: &'static str, number: u32, tid: u32) -> Self {
        let trace_id = next_trace_id();
        let span = span!(
            Level::TRACE,
            "syscall",
            trace_id,
            syscall,
            number,
            tid,
            duration_us = tracing::field::Empty,
        );
        Self {
            span,
            start: Instant::now(),
            syscall,
            trace_id,
        }
    }

    #[inline]
    pub fn trace_id(&self) -> u64 {
        self.trace_id
    }

    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }

    /// Microseconds since the span opened
    #[inline]
    pub fn elapsed_micros(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_micros()).unwrap_or(u64::MAX)
    }
}

impl Drop for SyscallSpan {
    fn drop(&mut self) {
        let duration = self.elapsed_micros();
        self.span.record("duration_us", duration);
        let _entered = self.span.enter();
        if duration > SLOW_SYSCALL_MICROS {
            warn!(
                trace_id = self.trace_id,
                syscall = self.syscall,
                duration_us = duration,
                "Slow syscall"
            );
        } else {
            debug!(trace_id = self.trace_id, syscall = self.syscall, "Syscall completed");
        }
    }
}

#[inline]
pub fn span_syscall(syscall: &'static str, number: u32, tid: u32) -> SyscallSpan {
    SyscallSpan::new(syscall, number, tid)
}
