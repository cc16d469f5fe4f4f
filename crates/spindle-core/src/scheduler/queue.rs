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

use crate::task::{Task, TaskId};
use std::time::Duration;

/// When a queued task becomes eligible to resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeTarget {
    /// Eligible on the next sweep that reaches it.
    NextSweep,
    /// Eligible on the sweep whose tick count equals this value.
    Tick(u64),
    /// Eligible once the scheduler's accumulated time reaches this value.
    Elapsed(Duration),
}

impl ResumeTarget {
    /// Returns `true` if the target is met at the given tick and elapsed time.
    pub fn is_due(&self, tick_count: u64, elapsed: Duration) -> bool {
        match *self {
            ResumeTarget::NextSweep => true,
            ResumeTarget::Tick(tick) => tick == tick_count,
            ResumeTarget::Elapsed(threshold) => elapsed >= threshold,
        }
    }
}

/// A queued task paired with its resume target.
///
/// The task is taken out of the entry while it is being resumed, so the
/// entry keeps its own copy of the id for lookups made during that window.
#[derive(Debug)]
pub(crate) struct ScheduledEntry {
    id: TaskId,
    task: Option<Task>,
    pub(crate) target: ResumeTarget,
}

impl ScheduledEntry {
    pub(crate) fn new(task: Task) -> Self {
        Self {
            id: task.id(),
            task: Some(task),
            target: ResumeTarget::NextSweep,
        }
    }

    pub(crate) fn id(&self) -> TaskId {
        self.id
    }

    pub(crate) fn holds(&self, id: TaskId) -> bool {
        match &self.task {
            Some(task) => task.has_handle(id),
            None => self.id == id,
        }
    }

    pub(crate) fn is_eligible(&self, tick_count: u64, elapsed: Duration) -> bool {
        self.task.is_some() && self.target.is_due(tick_count, elapsed)
    }

    pub(crate) fn can_resume(&self) -> bool {
        self.task.as_ref().is_some_and(Task::can_resume)
    }

    pub(crate) fn take_task(&mut self) -> Option<Task> {
        self.task.take()
    }

    pub(crate) fn restore(&mut self, task: Task) {
        debug_assert!(task.has_handle(self.id));
        self.task = Some(task);
    }
}
