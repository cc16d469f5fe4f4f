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

use anyhow::Result;
use futures_util::task::noop_waker_ref;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};

/// The boxed computation a task owns.
type Frame = Pin<Box<dyn Future<Output = Result<()>>>>;

// 0 is reserved for empty tasks.
static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// An opaque, comparable identity for a [`Task`].
///
/// The scheduler uses it to find a queued entry again when a suspended task
/// asks to be rescheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    const EMPTY: TaskId = TaskId(0);

    fn next() -> Self {
        TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a task is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// The computation is parked and can be resumed.
    Suspended,
    /// The computation ran to completion.
    Finished,
    /// The computation returned an error, which was handed to the resume call that saw it.
    Failed,
    /// The task owns no computation, e.g. after being moved out with [`std::mem::take`].
    Empty,
}

impl TaskState {
    /// Returns `true` for the terminal states.
    pub fn is_finished(&self) -> bool {
        matches!(self, TaskState::Finished | TaskState::Failed)
    }
}

/// A resumable unit of routine logic.
///
/// A task exclusively owns one suspended computation. It is move-only;
/// dropping it releases the computation together with everything the
/// computation captured, which is how subscriptions held by a routine are
/// released when the scheduler discards its task.
pub struct Task {
    id: TaskId,
    name: String,
    frame: Option<Frame>,
    state: TaskState,
}

impl Task {
    /// Wraps a not-yet-started computation into a task.
    ///
    /// The future does not run until the first [`resume`](Self::resume).
    pub fn new<F>(computation: F) -> Self
    where
        F: Future<Output = Result<()>> + 'static,
    {
        Self::named("task", computation)
    }

    /// Same as [`Task::new`], with a name used in log output.
    pub fn named<F>(name: impl Into<String>, computation: F) -> Self
    where
        F: Future<Output = Result<()>> + 'static,
    {
        Self {
            id: TaskId::next(),
            name: name.into(),
            frame: Some(Box::pin(computation)),
            state: TaskState::Suspended,
        }
    }

    /// Returns the identity of this task.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the name given at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Returns `true` if the task owns a computation that has not finished.
    pub fn can_resume(&self) -> bool {
        self.frame.is_some()
    }

    /// Returns `true` if this task is the one identified by `id`.
    pub fn has_handle(&self, id: TaskId) -> bool {
        self.id != TaskId::EMPTY && self.id == id
    }

    /// Drives the computation to its next suspension point or to completion.
    ///
    /// Returns the computation's own error if it failed during this step.
    ///
    /// # Panics
    ///
    /// Resuming a task that already finished, or an empty one, is a
    /// programming error and panics.
    pub fn resume(&mut self) -> Result<()> {
        let mut cx = Context::from_waker(noop_waker_ref());
        match self.step(&mut cx) {
            Poll::Pending => Ok(()),
            Poll::Ready(outcome) => outcome,
        }
    }

    fn step(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        let Some(frame) = self.frame.as_mut() else {
            panic!(
                "task '{}' {} resumed while {:?}; a finished task must never run again",
                self.name, self.id, self.state
            );
        };

        let outcome = match frame.as_mut().poll(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(outcome) => outcome,
        };

        self.frame = None;
        match &outcome {
            Ok(()) => {
                self.state = TaskState::Finished;
                log::debug!("Task '{}' {} finished.", self.name, self.id);
            }
            Err(e) => {
                self.state = TaskState::Failed;
                log::debug!("Task '{}' {} failed: {e:#}", self.name, self.id);
            }
        }
        Poll::Ready(outcome)
    }
}

/// A default task is empty: it owns no computation and cannot be resumed.
impl Default for Task {
    fn default() -> Self {
        Self {
            id: TaskId::EMPTY,
            name: String::new(),
            frame: None,
            state: TaskState::Empty,
        }
    }
}

/// Awaiting a task drives it to completion from inside another computation.
///
/// Any wait the inner task suspends on is registered on behalf of the outer
/// task currently being resumed.
impl Future for Task {
    type Output = Result<()>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.get_mut().step(cx)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state)
            .finish()
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' {}", self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use futures_util::future::poll_fn;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Suspends exactly once, like a wait that is immediately satisfied.
    async fn yield_once() {
        let mut yielded = false;
        poll_fn(|_| {
            if yielded {
                Poll::Ready(())
            } else {
                yielded = true;
                Poll::Pending
            }
        })
        .await
    }

    #[derive(Debug, PartialEq)]
    struct LoadFailed {
        attempts: u32,
    }

    impl fmt::Display for LoadFailed {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "load failed after {} attempts", self.attempts)
        }
    }

    impl std::error::Error for LoadFailed {}

    #[test]
    fn new_task_is_resumable_and_lazy() {
        let started = Rc::new(Cell::new(false));
        let flag = started.clone();
        let task = Task::new(async move {
            flag.set(true);
            Ok(())
        });

        assert!(task.can_resume());
        assert_eq!(task.state(), TaskState::Suspended);
        assert!(!started.get(), "The computation must not run before the first resume");
    }

    #[test]
    fn resume_steps_between_suspensions() {
        let steps = Rc::new(Cell::new(0));
        let counter = steps.clone();
        let mut task = Task::named("stepper", async move {
            counter.set(1);
            yield_once().await;
            counter.set(2);
            Ok(())
        });

        task.resume().unwrap();
        assert_eq!(steps.get(), 1);
        assert!(task.can_resume());

        task.resume().unwrap();
        assert_eq!(steps.get(), 2);
        assert!(!task.can_resume());
        assert_eq!(task.state(), TaskState::Finished);
    }

    #[test]
    fn resume_hands_back_the_exact_error() {
        let mut task = Task::new(async {
            yield_once().await;
            Err(LoadFailed { attempts: 3 }.into())
        });

        task.resume().unwrap();
        let err = task.resume().unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoadFailed>(),
            Some(&LoadFailed { attempts: 3 })
        );
        assert_eq!(task.state(), TaskState::Failed);
        assert!(!task.can_resume());
    }

    #[test]
    #[should_panic(expected = "must never run again")]
    fn resuming_a_finished_task_panics() {
        let mut task = Task::new(async { Ok(()) });
        task.resume().unwrap();
        let _ = task.resume();
    }

    #[test]
    fn has_handle_matches_only_its_own_id() {
        let a = Task::new(async { Ok(()) });
        let b = Task::new(async { Ok(()) });

        assert!(a.has_handle(a.id()));
        assert!(!a.has_handle(b.id()));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn taking_a_task_leaves_an_empty_source() {
        let mut original = Task::named("mover", async { Ok(()) });
        let id = original.id();

        let mut moved = std::mem::take(&mut original);

        assert!(!original.can_resume());
        assert_eq!(original.state(), TaskState::Empty);
        assert!(!original.has_handle(id));
        assert!(moved.has_handle(id));
        moved.resume().unwrap();
        assert_eq!(moved.state(), TaskState::Finished);
    }

    #[test]
    fn dropping_a_suspended_task_releases_its_captures() {
        let guard = Rc::new(());
        let held = guard.clone();
        let mut task = Task::new(async move {
            let _held = held;
            yield_once().await;
            Ok(())
        });
        task.resume().unwrap();
        assert_eq!(Rc::strong_count(&guard), 2);

        drop(task);
        assert_eq!(Rc::strong_count(&guard), 1);
    }

    #[test]
    fn awaiting_a_task_drives_it_to_completion() {
        let inner = Task::new(async {
            yield_once().await;
            Err(anyhow!("inner gave up"))
        });
        let mut outer = Task::new(async move {
            let result = inner.await;
            assert_eq!(result.unwrap_err().to_string(), "inner gave up");
            Ok(())
        });

        outer.resume().unwrap();
        assert!(outer.can_resume());
        outer.resume().unwrap();
        assert_eq!(outer.state(), TaskState::Finished);
    }
}
