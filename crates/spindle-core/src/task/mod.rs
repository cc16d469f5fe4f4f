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

//! Resumable units of routine logic and the primitives they suspend on.
//!
//! A [`Task`] owns one suspended computation, expressed as a Rust future.
//! The [`Scheduler`](crate::Scheduler) drives it one step at a time by
//! calling [`Task::resume`]; between steps the computation is parked at a
//! [`Wait`], which told the scheduler when it wants to run next.
//!
//! ```rust
//! use spindle_core::{Scheduler, Task};
//!
//! let scheduler = Scheduler::new();
//! let sched = scheduler.handle();
//! scheduler.add(Task::named("countdown", async move {
//!     for _ in 0..3 {
//!         sched.wait_ticks(1).await;
//!     }
//!     Ok(())
//! }));
//! scheduler.run().unwrap();
//! assert_eq!(scheduler.tick_count(), 4);
//! ```

mod handle;
mod wait;

pub use self::handle::{Task, TaskId, TaskState};
pub use self::wait::{Nested, Until, Wait};

pub(crate) use self::wait::WaitCondition;
