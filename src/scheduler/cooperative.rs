/*!
 * Cooperative Scheduler
 *
 * One host thread time-slices every guest thread of one address space.
 * Only one guest thread executes at a time, which is what makes in-line
 * fault interposition safe: a host protection fault always belongs to the
 * thread currently running.
 */

use super::traits::QuantumRunner;
use super::types::{HostFault, QuantumOutcome, SchedulerExit, SchedulerStats, SliceExit};
use crate::core::errors::KernelResult;
use crate::core::types::Tid;
use crate::memory::{CooperativeFaultInterposer, FaultInterposer, FaultResolution, GuestAddressSpace};
use crate::process::{GuestThread, ThreadState};
use crate::syscalls::{SyscallTrapHandler, TrapDisposition};
use ahash::AHashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, trace};

struct Parked {
    thread: GuestThread,
    deadline: Option<Instant>,
}

pub struct CooperativeScheduler<R: QuantumRunner> {
    memory: Arc<GuestAddressSpace>,
    traps: Arc<SyscallTrapHandler>,
    interposer: CooperativeFaultInterposer,
    runner: R,
    runnable: VecDeque<GuestThread>,
    blocked: AHashMap<Tid, Parked>,
    stats: SchedulerStats,
}

impl<R: QuantumRunner> CooperativeScheduler<R> {
    pub fn new(memory: Arc<GuestAddressSpace>, traps: Arc<SyscallTrapHandler>, runner: R) -> Self {
        let interposer = CooperativeFaultInterposer::new(Arc::clone(&memory));
        Self {
            memory,
            traps,
            interposer,
            runner,
            runnable: VecDeque::new(),
            blocked: AHashMap::new(),
            stats: SchedulerStats::default(),
        }
    }

    /// Queue a thread at the back of the run queue
    pub fn spawn(&mut self, mut thread: GuestThread) {
        thread.state = ThreadState::Runnable;
        self.runnable.push_back(thread);
    }

    /// Make a blocked thread runnable again. Its trap re-executes.
    pub fn wake(&mut self, tid: Tid) -> bool {
        match self.blocked.remove(&tid) {
            Some(parked) => {
                self.stats.wakeups += 1;
                self.spawn(parked.thread);
                true
            }
            None => false,
        }
    }

    /// Wake a blocked thread once `deadline` passes
    pub fn wake_at(&mut self, tid: Tid, deadline: Instant) -> bool {
        match self.blocked.get_mut(&tid) {
            Some(parked) => {
                parked.deadline = Some(deadline);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn runnable(&self) -> usize {
        self.runnable.len()
    }

    #[inline]
    pub fn blocked(&self) -> usize {
        self.blocked.len()
    }

    pub fn is_blocked(&self, tid: Tid) -> bool {
        self.blocked.contains_key(&tid)
    }

    #[inline]
    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    #[inline]
    pub fn memory(&self) -> &Arc<GuestAddressSpace> {
        &self.memory
    }

    pub fn runner_mut(&mut self) -> &mut R {
        &mut self.runner
    }

    /// Run one quantum of the next runnable thread; `None` when nothing is
    /// runnable
    pub fn run_once(&mut self) -> KernelResult<Option<(Tid, QuantumOutcome)>> {
        self.wake_expired(Instant::now());
        let Some(mut thread) = self.runnable.pop_front() else {
            return Ok(None);
        };
        self.stats.quanta += 1;
        thread.cpu.block_instruction_count = 0;
        let tid = thread.tid;

        let outcome = self.run_quantum(&mut thread)?;
        match outcome {
            QuantumOutcome::Requeued => self.runnable.push_back(thread),
            QuantumOutcome::Blocked => {
                thread.state = ThreadState::Blocked;
                self.blocked.insert(tid, Parked { thread, deadline: None });
            }
            QuantumOutcome::Exited => {
                self.stats.exited += 1;
                debug!(tid, "Guest thread exited");
            }
        }
        Ok(Some((tid, outcome)))
    }

    /// Run until every thread has exited, or every remaining thread is
    /// blocked with no deadline
    pub fn run(&mut self) -> KernelResult<SchedulerExit> {
        loop {
            if self.run_once()?.is_some() {
                continue;
            }
            if self.blocked.is_empty() {
                info!(quanta = self.stats.quanta, "All guest threads exited");
                return Ok(SchedulerExit::AllExited);
            }
            match self.next_deadline() {
                Some(deadline) => {
                    let now = Instant::now();
                    if deadline > now {
                        std::thread::sleep(deadline - now);
                    }
                }
                None => return Ok(SchedulerExit::AllBlocked),
            }
        }
    }

    fn run_quantum(&mut self, thread: &mut GuestThread) -> KernelResult<QuantumOutcome> {
        loop {
            let exit = match self.runner.run_quantum(thread, &self.memory) {
                Ok(exit) => exit,
                Err(fault) => {
                    if self.interpose(thread, fault)? {
                        continue;
                    }
                    // the segmentation signal may have killed the thread
                    if thread.state == ThreadState::Terminated {
                        return Ok(QuantumOutcome::Exited);
                    }
                    return Ok(QuantumOutcome::Requeued);
                }
            };

            match exit {
                SliceExit::Trap { instruction_len } => {
                    self.stats.traps += 1;
                    match self.traps.handle_trap(thread, &self.memory, instruction_len)? {
                        TrapDisposition::Resumed | TrapDisposition::SignalDiverted => {
                            if thread.state == ThreadState::Terminated {
                                return Ok(QuantumOutcome::Exited);
                            }
                        }
                        TrapDisposition::Suspended => return Ok(QuantumOutcome::Blocked),
                        TrapDisposition::ThreadTerminating => return Ok(QuantumOutcome::Exited),
                    }
                }
                SliceExit::QuantumExpired => return Ok(QuantumOutcome::Requeued),
                SliceExit::Halted => return Ok(QuantumOutcome::Exited),
            }
        }
    }

    /// Returns true when the faulting instruction should be re-run
    fn interpose(&mut self, thread: &mut GuestThread, fault: HostFault) -> KernelResult<bool> {
        match self
            .interposer
            .try_handle_protection_fault(fault.host_addr, fault.access)?
        {
            FaultResolution::Resolved => {
                self.stats.faults_resolved += 1;
                Ok(true)
            }
            FaultResolution::Forward(guest_fault) => {
                self.stats.faults_forwarded += 1;
                trace!(tid = thread.tid, %guest_fault, "Delivering segmentation fault");
                self.traps
                    .kernel()
                    .signals
                    .segmentation_fault(thread, &self.memory, guest_fault);
                thread.cpu.clear_next_block();
                Ok(false)
            }
        }
    }

    fn wake_expired(&mut self, now: Instant) {
        let expired: Vec<Tid> = self
            .blocked
            .iter()
            .filter(|(_, parked)| parked.deadline.is_some_and(|d| d <= now))
            .map(|(&tid, _)| tid)
            .collect();
        for tid in expired {
            self.wake(tid);
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.blocked.values().filter_map(|p| p.deadline).min()
    }
}

impl<R: QuantumRunner> std::fmt::Debug for CooperativeScheduler<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CooperativeScheduler")
            .field("runnable", &self.runnable.len())
            .field("blocked", &self.blocked.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
