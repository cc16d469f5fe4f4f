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

//! The cooperative, tick-driven task scheduler.
//!
//! The [`Scheduler`] owns an ordered queue of suspended tasks. Each call to
//! [`Scheduler::run`] performs sweeps over that queue until it is empty:
//! every task whose resume target is met is resumed in queue order, finished
//! tasks are reaped, and the tick count and elapsed time advance.
//!
//! Everything happens on the calling thread. Tasks only give up control at
//! explicit [`Wait`](crate::Wait) points, so the interleaving is fully
//! determined by queue order and resume targets.

mod clock;
mod executor;
mod queue;

pub use self::clock::{Clock, ManualClock, SystemClock};
pub use self::executor::{Scheduler, SchedulerHandle, SchedulerStats};
pub use self::queue::ResumeTarget;
