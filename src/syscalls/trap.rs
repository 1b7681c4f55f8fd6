/*!
 * Syscall Trap Handler
 *
 * Entered when a guest thread executes the syscall trap. Order of work:
 * termination check, pending-signal diversion, table dispatch, then
 * commit of the outcome to the register file. EIP only moves past the trap
 * for a concrete return value; a blocked call leaves EIP on the trap so it
 * re-executes when the thread is woken.
 */

use super::decode::DecodedArgs;
use super::table::{SyscallCategory, SyscallContext, SyscallLookup, SyscallTable};
use super::traits::KernelServices;
use super::types::{Errno, SyscallOutcome, SyscallTrap, TrapDisposition, TrapError};
use crate::core::config::{SchedulingModel, SubstrateConfig};
use crate::core::limits::CONTEXT_TIME_UNIT_MICROS;
use crate::memory::GuestAddressSpace;
use crate::monitoring::{span_syscall, TrapMetrics, TrapMetricsSnapshot};
use crate::process::GuestThread;
use std::sync::Arc;
use tracing::{debug, error};

pub struct SyscallTrapHandler {
    table: Arc<SyscallTable>,
    kernel: KernelServices,
    scheduling: SchedulingModel,
    trace_mask: SyscallCategory,
    context_time: u64,
    metrics: TrapMetrics,
}

impl SyscallTrapHandler {
    pub fn new(config: &SubstrateConfig, table: Arc<SyscallTable>, kernel: KernelServices) -> Self {
        Self {
            table,
            kernel,
            scheduling: config.scheduling,
            trace_mask: config.syscall_trace_mask,
            context_time: config.cooperative_context_time,
            metrics: TrapMetrics::new(),
        }
    }

    /// Handler over `registry::default_table`
    pub fn with_default_table(config: &SubstrateConfig, kernel: KernelServices) -> Result<Self, TrapError> {
        let table = super::registry::default_table()?;
        Ok(Self::new(config, Arc::new(table), kernel))
    }

    #[inline]
    pub fn table(&self) -> &SyscallTable {
        &self.table
    }

    #[inline]
    pub fn kernel(&self) -> &KernelServices {
        &self.kernel
    }

    pub fn stats(&self) -> TrapMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Handle one syscall trap on `thread`
    ///
    /// `instruction_len` is the length of the trap instruction (2 for
    /// `int 0x80`). Errors are host-fatal invariant violations; guest
    /// failures come back as negative errno in EAX.
    pub fn handle_trap(
        &self,
        thread: &mut GuestThread,
        memory: &GuestAddressSpace,
        instruction_len: u32,
    ) -> Result<TrapDisposition, TrapError> {
        self.metrics.record_trap();
        let disposition = self.process_trap(thread, memory, instruction_len)?;
        self.metrics.record_disposition(disposition);
        Ok(disposition)
    }

    fn process_trap(
        &self,
        thread: &mut GuestThread,
        memory: &GuestAddressSpace,
        instruction_len: u32,
    ) -> Result<TrapDisposition, TrapError> {
        if thread.signals().is_terminating() {
            debug!(tid = thread.tid, "Trap on terminating thread");
            self.kernel.process.terminate_current(thread);
            return Ok(TrapDisposition::ThreadTerminating);
        }

        if thread.signals().has_pending() && self.kernel.signals.deliver_pending(thread, memory) {
            thread.cpu.clear_next_block();
            return Ok(TrapDisposition::SignalDiverted);
        }

        let trap = SyscallTrap::from_cpu(&thread.cpu, instruction_len);
        let outcome = self.dispatch(thread, memory, &trap)?;

        if self.scheduling == SchedulingModel::MultiThreaded && thread.signals().start_signal() {
            error!(tid = thread.tid, syscall = trap.number, "Signal start latched across a completed syscall");
            return Err(TrapError::SignalNotInterrupted {
                tid: thread.tid,
                syscall: trap.number,
            });
        }

        let disposition = match outcome {
            SyscallOutcome::Return(value) => {
                thread.cpu.eax = value as u32;
                thread.cpu.eip = thread.cpu.eip.wrapping_add(trap.instruction_len);
                TrapDisposition::Resumed
            }
            SyscallOutcome::ContinueNoAdvance => TrapDisposition::Resumed,
            SyscallOutcome::BlockedRetry => TrapDisposition::Suspended,
        };
        thread.cpu.clear_next_block();
        Ok(disposition)
    }

    fn dispatch(
        &self,
        thread: &mut GuestThread,
        memory: &GuestAddressSpace,
        trap: &SyscallTrap,
    ) -> Result<SyscallOutcome, TrapError> {
        let entry = match self.table.lookup(trap.number) {
            SyscallLookup::Found(entry) => entry,
            SyscallLookup::Unimplemented | SyscallLookup::OutOfRange => {
                self.table.report_missing(trap.number);
                self.metrics.record_unimplemented();
                return Ok(SyscallOutcome::err(Errno::ENOSYS));
            }
        };
        let traced = entry.category.intersects(self.trace_mask);

        let span = span_syscall(entry.name, trap.number, thread.tid);
        let _entered = span.enter();

        let args = match DecodedArgs::decode(entry.name, entry.args, trap.args, memory) {
            Ok(args) => args,
            Err(errno) => {
                if traced {
                    debug!(syscall = entry.name, %errno, "Syscall arguments unreadable");
                }
                return Ok(SyscallOutcome::err(errno));
            }
        };

        let mut ctx = SyscallContext {
            thread: &mut *thread,
            memory,
            kernel: &self.kernel,
        };
        let outcome = (entry.handler)(&mut ctx, &args)?;

        let micros = span.elapsed_micros();
        self.metrics.record_dispatch(micros);
        if self.scheduling == SchedulingModel::Cooperative {
            let charged = self.context_time.saturating_mul(micros) / CONTEXT_TIME_UNIT_MICROS;
            thread.cpu.block_instruction_count = thread.cpu.block_instruction_count.saturating_add(charged);
        }

        if traced {
            debug!(syscall = entry.name, args = %args, result = ?outcome, "Syscall");
        }
        Ok(outcome)
    }
}

impl std::fmt::Debug for SyscallTrapHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyscallTrapHandler")
            .field("table", &self.table)
            .field("scheduling", &self.scheduling)
            .field("trace_mask", &self.trace_mask)
            .finish_non_exhaustive()
    }
}
