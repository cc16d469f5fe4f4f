// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::clock::{Clock, SystemClock};
use super::queue::{ResumeTarget, ScheduledEntry};
use crate::task::{Nested, Task, TaskId, Until, Wait, WaitCondition};
use anyhow::Result;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::rc::{Rc, Weak};
use std::time::Duration;

/// Counters describing the scheduler's work so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Number of completed sweeps.
    pub sweeps: u64,
    /// Number of task resumptions across all sweeps.
    pub resumes: u64,
    /// Number of finished tasks removed from the queue.
    pub reaped: u64,
    /// Largest queue length observed.
    pub peak_queue_len: usize,
}

struct Shared {
    queue: RefCell<VecDeque<ScheduledEntry>>,
    tick_count: Cell<u64>,
    elapsed: Cell<Duration>,
    current: Cell<Option<TaskId>>,
    running: Cell<bool>,
    stats: Cell<SchedulerStats>,
    clock: Box<dyn Clock>,
}

impl Shared {
    fn add(&self, task: Task) -> TaskId {
        assert!(
            task.can_resume(),
            "Scheduler::add called with task {task} in state {:?}",
            task.state()
        );
        let id = task.id();
        let len = {
            let mut queue = self.queue.borrow_mut();
            queue.push_front(ScheduledEntry::new(task));
            queue.len()
        };
        self.record(|stats| stats.peak_queue_len = stats.peak_queue_len.max(len));
        log::debug!("Scheduler: queued task {id} (queue length {len}).");
        id
    }

    fn reschedule_ticks(&self, id: TaskId, ticks: u64) {
        if ticks == 0 {
            self.set_target(id, ResumeTarget::NextSweep);
        } else {
            self.set_target(id, ResumeTarget::Tick(self.tick_count.get() + ticks));
        }
    }

    fn reschedule_after(&self, id: TaskId, delay: Duration) {
        self.set_target(id, ResumeTarget::Elapsed(self.elapsed.get() + delay));
    }

    fn run(&self) -> Result<()> {
        assert!(
            !self.running.replace(true),
            "Scheduler::run called while the scheduler is already running"
        );
        let _running = RunningFlag(&self.running);

        log::info!("Scheduler: running {} task(s).", self.len());

        while !self.is_empty() {
            let sweep_start = self.clock.now();
            let order: Vec<TaskId> = self
                .queue
                .borrow()
                .iter()
                .map(ScheduledEntry::id)
                .collect();

            for id in order {
                if let Err(e) = self.resume_entry(id) {
                    log::error!(
                        "Scheduler: task {id} failed at tick {}: {e:#}",
                        self.tick_count.get()
                    );
                    self.teardown();
                    return Err(e);
                }
            }

            self.reap();

            let sweep = self.clock.now().saturating_sub(sweep_start);
            self.tick_count.set(self.tick_count.get() + 1);
            self.elapsed.set(self.elapsed.get() + sweep);
            self.record(|stats| stats.sweeps += 1);
        }

        log::info!(
            "Scheduler: all tasks finished after {} tick(s), {} resume(s), {:?} elapsed.",
            self.tick_count.get(),
            self.stats.get().resumes,
            self.elapsed.get()
        );
        Ok(())
    }

    fn teardown(&self) {
        let discarded = std::mem::take(&mut *self.queue.borrow_mut());
        if !discarded.is_empty() {
            log::info!("Scheduler: discarding {} task(s).", discarded.len());
        }
        drop(discarded);
    }

    fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    fn park_current(&self, condition: WaitCondition) {
        let Some(id) = self.current.get() else {
            panic!("a Wait was awaited outside of a scheduler sweep; only tasks resumed by Scheduler::run can suspend on it");
        };
        match condition {
            WaitCondition::NextSweep => self.set_target(id, ResumeTarget::NextSweep),
            WaitCondition::Ticks(ticks) => self.reschedule_ticks(id, ticks),
            WaitCondition::Elapsed(delay) => self.reschedule_after(id, delay),
        }
    }

    fn set_target(&self, id: TaskId, target: ResumeTarget) {
        let tick_count = self.tick_count.get();
        if let ResumeTarget::Tick(tick) = target {
            assert!(
                tick >= tick_count,
                "task {id} rescheduled for tick {tick}, which is before the current tick {tick_count}"
            );
        }

        let mut queue = self.queue.borrow_mut();
        let Some(entry) = queue.iter_mut().find(|entry| entry.holds(id)) else {
            panic!("reschedule of task {id}, which is not queued on this scheduler");
        };
        log::trace!("Scheduler: task {id} parked until {target:?}.");
        entry.target = target;
    }

    fn resume_entry(&self, id: TaskId) -> Result<()> {
        let tick_count = self.tick_count.get();
        let elapsed = self.elapsed.get();

        let mut task = {
            let mut queue = self.queue.borrow_mut();
            let Some(entry) = queue.iter_mut().find(|entry| entry.holds(id)) else {
                return Ok(());
            };
            if !entry.is_eligible(tick_count, elapsed) {
                return Ok(());
            }
            // A task that suspends without registering a wait comes back next sweep.
            entry.target = ResumeTarget::NextSweep;
            match entry.take_task() {
                Some(task) => task,
                None => return Ok(()),
            }
        };

        log::trace!("Scheduler: resuming task {task} at tick {tick_count}.");
        self.current.set(Some(id));
        let outcome = task.resume();
        self.current.set(None);
        self.record(|stats| stats.resumes += 1);

        outcome?;

        let orphan = {
            let mut queue = self.queue.borrow_mut();
            match queue.iter_mut().find(|entry| entry.holds(id)) {
                Some(entry) => {
                    entry.restore(task);
                    None
                }
                // The queue was torn down while the task was running.
                None => Some(task),
            }
        };
        drop(orphan);
        Ok(())
    }

    fn reap(&self) {
        let finished = {
            let mut queue = self.queue.borrow_mut();
            let (alive, finished): (VecDeque<_>, VecDeque<_>) = std::mem::take(&mut *queue)
                .into_iter()
                .partition(ScheduledEntry::can_resume);
            *queue = alive;
            finished
        };

        if finished.is_empty() {
            return;
        }
        for entry in &finished {
            log::debug!(
                "Scheduler: reaped task {} at tick {}.",
                entry.id(),
                self.tick_count.get()
            );
        }
        let count = finished.len() as u64;
        self.record(|stats| stats.reaped += count);
    }

    fn record(&self, update: impl FnOnce(&mut SchedulerStats)) {
        let mut stats = self.stats.get();
        update(&mut stats);
        self.stats.set(stats);
    }
}

/// A single-threaded cooperative scheduler.
///
/// The host creates one `Scheduler` per game run and owns it. Routines and
/// tasks never hold the scheduler itself: they capture a
/// [`SchedulerHandle`] from [`handle`](Self::handle), which does not keep
/// the queue alive. Dropping the `Scheduler` therefore discards every task
/// still queued, together with everything those tasks captured.
///
/// # Fatal conditions
///
/// Rescheduling a task the queue does not hold, setting a tick target in
/// the past, awaiting a wait outside of a sweep, and calling `run` from
/// inside a task all indicate broken bookkeeping and panic immediately.
pub struct Scheduler {
    shared: Rc<Shared>,
}

impl Scheduler {
    /// Creates an empty scheduler measuring sweeps with the wall clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }

    /// Creates an empty scheduler measuring sweeps with `clock`.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            shared: Rc::new(Shared {
                queue: RefCell::new(VecDeque::new()),
                tick_count: Cell::new(0),
                elapsed: Cell::new(Duration::ZERO),
                current: Cell::new(None),
                running: Cell::new(false),
                stats: Cell::new(SchedulerStats::default()),
                clock: Box::new(clock),
            }),
        }
    }

    /// Returns a handle for tasks and routines to capture.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            shared: Rc::downgrade(&self.shared),
        }
    }

    /// Queues `task` at the front of the queue, eligible on the next sweep.
    ///
    /// Front insertion means the most recently added task resumes first
    /// within a sweep. A task added while a sweep is in progress is first
    /// resumed on the following sweep.
    ///
    /// # Panics
    ///
    /// Panics if the task cannot be resumed.
    pub fn add(&self, task: Task) -> TaskId {
        self.shared.add(task)
    }

    /// Makes task `id` eligible again once `ticks` more sweeps have completed.
    ///
    /// A delay of zero makes it eligible on the next sweep.
    pub fn reschedule_ticks(&self, id: TaskId, ticks: u64) {
        self.shared.reschedule_ticks(id, ticks);
    }

    /// Makes task `id` eligible again once `delay` more time has accumulated.
    pub fn reschedule_after(&self, id: TaskId, delay: Duration) {
        self.shared.reschedule_after(id, delay);
    }

    /// Runs sweeps until every queued task has finished.
    ///
    /// Each sweep resumes the eligible tasks in queue order, removes the ones
    /// that finished, then advances the tick count by one and the elapsed
    /// time by the measured duration of the sweep.
    ///
    /// An error returned by a task ends the loop immediately. The remaining
    /// tasks are discarded and the error is returned unchanged.
    pub fn run(&self) -> Result<()> {
        self.shared.run()
    }

    /// Discards every queued task without resuming it.
    ///
    /// Dropping a task drops everything its computation captured, including
    /// subscription guards.
    pub fn teardown(&self) {
        self.shared.teardown();
    }

    /// Returns the number of completed sweeps.
    pub fn tick_count(&self) -> u64 {
        self.shared.tick_count.get()
    }

    /// Returns the accumulated duration of all completed sweeps.
    pub fn elapsed(&self) -> Duration {
        self.shared.elapsed.get()
    }

    /// Returns the number of queued tasks.
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    /// Returns `true` if no task is queued.
    pub fn is_empty(&self) -> bool {
        self.shared.is_empty()
    }

    /// Returns the task being resumed right now, if any.
    pub fn current_task(&self) -> Option<TaskId> {
        self.shared.current.get()
    }

    /// Returns `true` while [`run`](Self::run) is executing.
    pub fn is_running(&self) -> bool {
        self.shared.running.get()
    }

    /// Returns a snapshot of the scheduler's counters.
    pub fn stats(&self) -> SchedulerStats {
        self.shared.stats.get()
    }

    /// Returns a wait that suspends the current task for `ticks` sweeps.
    pub fn wait_ticks(&self, ticks: u64) -> Wait {
        Wait::ticks(&self.handle(), ticks)
    }

    /// Returns a wait that suspends the current task for `delay` of scheduler time.
    pub fn wait_for(&self, delay: Duration) -> Wait {
        Wait::duration(&self.handle(), delay)
    }

    /// Returns a wait that suspends the current task until the next sweep.
    pub fn yield_now(&self) -> Wait {
        Wait::next(&self.handle())
    }

    /// Returns a wait that suspends the current task until `condition` holds.
    pub fn wait_until(&self, condition: impl FnMut() -> bool + 'static) -> Until {
        Wait::until(&self.handle(), condition)
    }

    /// Returns a wait that suspends, then drives `inner` to completion.
    pub fn wait_on<F: Future>(&self, inner: F) -> Nested<F> {
        Wait::nested(&self.handle(), inner)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shared.teardown();
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("tick_count", &self.tick_count())
            .field("elapsed", &self.elapsed())
            .field("queued", &self.len())
            .field("running", &self.is_running())
            .finish()
    }
}

/// A non-owning reference to a [`Scheduler`].
///
/// This is what tasks capture to build waits, spawn further tasks and read
/// the clock. Every method panics once the `Scheduler` it came from has been
/// dropped; a task can only observe that if it escapes its scheduler.
#[derive(Clone)]
pub struct SchedulerHandle {
    shared: Weak<Shared>,
}

impl SchedulerHandle {
    fn shared(&self) -> Rc<Shared> {
        match self.shared.upgrade() {
            Some(shared) => shared,
            None => panic!("SchedulerHandle used after its Scheduler was dropped"),
        }
    }

    /// Returns `true` while the scheduler this handle refers to exists.
    pub fn is_alive(&self) -> bool {
        self.shared.strong_count() > 0
    }

    /// Same as [`Scheduler::add`].
    pub fn add(&self, task: Task) -> TaskId {
        self.shared().add(task)
    }

    /// Same as [`Scheduler::reschedule_ticks`].
    pub fn reschedule_ticks(&self, id: TaskId, ticks: u64) {
        self.shared().reschedule_ticks(id, ticks);
    }

    /// Same as [`Scheduler::reschedule_after`].
    pub fn reschedule_after(&self, id: TaskId, delay: Duration) {
        self.shared().reschedule_after(id, delay);
    }

    /// Same as [`Scheduler::tick_count`].
    pub fn tick_count(&self) -> u64 {
        self.shared().tick_count.get()
    }

    /// Same as [`Scheduler::elapsed`].
    pub fn elapsed(&self) -> Duration {
        self.shared().elapsed.get()
    }

    /// Same as [`Scheduler::len`].
    pub fn len(&self) -> usize {
        self.shared().len()
    }

    /// Same as [`Scheduler::is_empty`].
    pub fn is_empty(&self) -> bool {
        self.shared().is_empty()
    }

    /// Same as [`Scheduler::current_task`].
    pub fn current_task(&self) -> Option<TaskId> {
        self.shared().current.get()
    }

    /// Same as [`Scheduler::is_running`].
    pub fn is_running(&self) -> bool {
        self.shared().running.get()
    }

    /// Same as [`Scheduler::stats`].
    pub fn stats(&self) -> SchedulerStats {
        self.shared().stats.get()
    }

    /// Same as [`Scheduler::wait_ticks`].
    pub fn wait_ticks(&self, ticks: u64) -> Wait {
        Wait::ticks(self, ticks)
    }

    /// Same as [`Scheduler::wait_for`].
    pub fn wait_for(&self, delay: Duration) -> Wait {
        Wait::duration(self, delay)
    }

    /// Same as [`Scheduler::yield_now`].
    pub fn yield_now(&self) -> Wait {
        Wait::next(self)
    }

    /// Same as [`Scheduler::wait_until`].
    pub fn wait_until(&self, condition: impl FnMut() -> bool + 'static) -> Until {
        Wait::until(self, condition)
    }

    /// Same as [`Scheduler::wait_on`].
    pub fn wait_on<F: Future>(&self, inner: F) -> Nested<F> {
        Wait::nested(self, inner)
    }

    /// Registers the resume condition of the task being resumed.
    pub(crate) fn park_current(&self, condition: WaitCondition) {
        self.shared().park_current(condition);
    }

    #[cfg(test)]
    fn set_target(&self, id: TaskId, target: ResumeTarget) {
        self.shared().set_target(id, target);
    }
}

impl fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// Clears the running flag when `run` returns or unwinds.
struct RunningFlag<'a>(&'a Cell<bool>);

impl Drop for RunningFlag<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
