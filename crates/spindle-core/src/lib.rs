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

//! # Spindle Core
//!
//! The cooperative concurrency core shared by every routine of a game run:
//! a tick-driven [`Scheduler`] that interleaves suspended [`Task`]s on a
//! single thread, and a synchronous [`MessageBus`] routines use to talk to
//! each other without holding references to one another.

#![warn(missing_docs)]

pub mod event;
pub mod routine;
pub mod scheduler;
pub mod state;
pub mod task;
pub mod utils;

pub use event::{
    AutoSubscribe, ButtonState, EntityId, KeyCode, Message, MessageBus, MessageKind, Subscriber,
};
pub use routine::Routine;
pub use scheduler::{
    Clock, ManualClock, ResumeTarget, Scheduler, SchedulerHandle, SchedulerStats, SystemClock,
};
pub use state::GameState;
pub use task::{Task, TaskId, TaskState, Wait};
pub use utils::timer::Stopwatch;
