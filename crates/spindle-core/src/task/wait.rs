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

use crate::scheduler::SchedulerHandle;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

/// The resume condition a [`Wait`] registers for the suspending task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WaitCondition {
    /// Eligible on the next sweep.
    NextSweep,
    /// Eligible once this many sweeps have completed.
    Ticks(u64),
    /// Eligible once this much scheduler time has accumulated.
    Elapsed(Duration),
}

/// A single-use suspension point.
///
/// Awaiting a `Wait` always suspends the current task once: the first poll
/// registers the task and its resume condition with the scheduler and
/// returns `Pending`, and the scheduler resumes the task when the condition
/// is met. There is no way to cancel a wait other than the scheduler
/// discarding the task altogether.
///
/// A `Wait` may only be awaited from inside a task the scheduler is
/// currently resuming.
#[must_use = "a wait does nothing unless awaited"]
pub struct Wait {
    scheduler: SchedulerHandle,
    condition: WaitCondition,
    suspended: bool,
}

impl Wait {
    /// Suspends until `ticks` more sweeps have completed.
    ///
    /// A delay of zero resumes on the next sweep, same as [`Wait::next`].
    pub fn ticks(scheduler: &SchedulerHandle, ticks: u64) -> Self {
        Self::with_condition(scheduler, WaitCondition::Ticks(ticks))
    }

    /// Suspends until the scheduler's accumulated time has advanced by `delay`.
    pub fn duration(scheduler: &SchedulerHandle, delay: Duration) -> Self {
        Self::with_condition(scheduler, WaitCondition::Elapsed(delay))
    }

    /// Suspends until the next sweep.
    pub fn next(scheduler: &SchedulerHandle) -> Self {
        Self::with_condition(scheduler, WaitCondition::NextSweep)
    }

    /// Suspends, then drives `inner` to completion and yields its output.
    ///
    /// Waits inside `inner` suspend the task that awaits the returned future.
    pub fn nested<F: Future>(scheduler: &SchedulerHandle, inner: F) -> Nested<F> {
        Nested {
            scheduler: scheduler.clone(),
            inner: Box::pin(inner),
            suspended: false,
        }
    }

    /// Suspends until `condition` returns `true`.
    ///
    /// The condition is checked once per sweep, starting with the sweep after
    /// the one that suspended, so this never completes synchronously.
    pub fn until(scheduler: &SchedulerHandle, condition: impl FnMut() -> bool + 'static) -> Until {
        Until {
            scheduler: scheduler.clone(),
            condition: Box::new(condition),
            suspended: false,
        }
    }

    fn with_condition(scheduler: &SchedulerHandle, condition: WaitCondition) -> Self {
        Self {
            scheduler: scheduler.clone(),
            condition,
            suspended: false,
        }
    }
}

impl Future for Wait {
    type Output = ();

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        if this.suspended {
            return Poll::Ready(());
        }
        this.suspended = true;
        this.scheduler.park_current(this.condition);
        Poll::Pending
    }
}

impl fmt::Debug for Wait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wait")
            .field("condition", &self.condition)
            .field("suspended", &self.suspended)
            .finish()
    }
}

/// A wait whose resume condition is the completion of a nested computation.
///
/// Created by [`Wait::nested`] or [`Scheduler::wait_on`](crate::Scheduler::wait_on).
#[must_use = "a wait does nothing unless awaited"]
pub struct Nested<F: Future> {
    scheduler: SchedulerHandle,
    inner: Pin<Box<F>>,
    suspended: bool,
}

impl<F: Future> Future for Nested<F> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<F::Output> {
        let this = self.get_mut();
        if !this.suspended {
            this.suspended = true;
            this.scheduler.park_current(WaitCondition::NextSweep);
            return Poll::Pending;
        }
        this.inner.as_mut().poll(cx)
    }
}

/// A wait that resumes on the first sweep where a condition holds.
///
/// Created by [`Wait::until`] or [`Scheduler::wait_until`](crate::Scheduler::wait_until). Typically used to
/// park a routine until a particular [`GameState`](crate::GameState) is
/// reached.
#[must_use = "a wait does nothing unless awaited"]
pub struct Until {
    scheduler: SchedulerHandle,
    condition: Box<dyn FnMut() -> bool>,
    suspended: bool,
}

impl Future for Until {
    type Output = ();

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        if this.suspended && (this.condition)() {
            return Poll::Ready(());
        }
        this.suspended = true;
        this.scheduler.park_current(WaitCondition::NextSweep);
        Poll::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ManualClock, Scheduler, Task};
    use anyhow::anyhow;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn tick_wait_resumes_exactly_at_target() {
        let scheduler = Scheduler::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sched = scheduler.handle();
        let log = seen.clone();
        scheduler.add(Task::new(async move {
            log.borrow_mut().push(sched.tick_count());
            Wait::ticks(&sched, 3).await;
            log.borrow_mut().push(sched.tick_count());
            Ok(())
        }));
        scheduler.run().unwrap();

        assert_eq!(*seen.borrow(), vec![0, 3]);
    }

    #[test]
    fn zero_tick_wait_resumes_next_sweep() {
        let scheduler = Scheduler::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sched = scheduler.handle();
        let log = seen.clone();
        scheduler.add(Task::new(async move {
            Wait::ticks(&sched, 0).await;
            log.borrow_mut().push(sched.tick_count());
            Wait::next(&sched).await;
            log.borrow_mut().push(sched.tick_count());
            Ok(())
        }));
        scheduler.run().unwrap();

        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn duration_wait_follows_the_scheduler_clock() {
        let clock = ManualClock::new();
        let scheduler = Scheduler::with_clock(clock.clone());
        let resumed_at = Rc::new(Cell::new(None));

        // Every sweep takes 10ms of manual time.
        let ticker = clock.clone();
        let sched = scheduler.handle();
        scheduler.add(Task::named("ticker", async move {
            for _ in 0..10 {
                ticker.advance(Duration::from_millis(10));
                sched.wait_ticks(1).await;
            }
            Ok(())
        }));

        let sched = scheduler.handle();
        let slot = resumed_at.clone();
        scheduler.add(Task::named("sleeper", async move {
            Wait::duration(&sched, Duration::from_millis(35)).await;
            slot.set(Some((sched.tick_count(), sched.elapsed())));
            Ok(())
        }));
        scheduler.run().unwrap();

        // sleeper suspends at elapsed 0 with threshold 35ms; elapsed reaches 40ms after sweep 4.
        assert_eq!(
            resumed_at.get(),
            Some((4, Duration::from_millis(40)))
        );
    }

    #[test]
    fn nested_wait_yields_the_inner_result() {
        let scheduler = Scheduler::new();
        let outcome = Rc::new(RefCell::new(None));

        let sched = scheduler.handle();
        let slot = outcome.clone();
        scheduler.add(Task::new(async move {
            let inner_sched = sched.clone();
            let loaded = Wait::nested(&sched, async move {
                inner_sched.wait_ticks(2).await;
                Ok::<_, anyhow::Error>(42)
            })
            .await?;
            *slot.borrow_mut() = Some((loaded, sched.tick_count()));
            Ok(())
        }));
        scheduler.run().unwrap();

        // One sweep for the nested suspension itself, then two ticks inside.
        assert_eq!(*outcome.borrow(), Some((42, 3)));
    }

    #[test]
    fn nested_task_failure_reaches_the_outer_task() {
        let scheduler = Scheduler::new();

        let sched = scheduler.handle();
        scheduler.add(Task::new(async move {
            let child = Task::named("child", async { Err(anyhow!("missing level file")) });
            Wait::nested(&sched, child).await
        }));

        let err = scheduler.run().unwrap_err();
        assert_eq!(err.to_string(), "missing level file");
    }

    #[test]
    fn until_checks_once_per_sweep() {
        let scheduler = Scheduler::new();
        let checks = Rc::new(Cell::new(0u32));
        let resumed_at = Rc::new(Cell::new(0));

        let sched = scheduler.handle();
        let counter = checks.clone();
        let slot = resumed_at.clone();
        scheduler.add(Task::new(async move {
            let clock_reader = sched.clone();
            Wait::until(&sched, move || {
                counter.set(counter.get() + 1);
                clock_reader.tick_count() >= 5
            })
            .await;
            slot.set(sched.tick_count());
            Ok(())
        }));
        scheduler.run().unwrap();

        assert_eq!(resumed_at.get(), 5);
        // Checked on sweeps 1 through 5.
        assert_eq!(checks.get(), 5);
    }

    #[test]
    #[should_panic(expected = "outside of a scheduler sweep")]
    fn waiting_outside_a_scheduler_panics() {
        let scheduler = Scheduler::new();
        let sched = scheduler.handle();
        let mut task = Task::new(async move {
            sched.wait_ticks(1).await;
            Ok(())
        });
        let _ = task.resume();
    }
}
