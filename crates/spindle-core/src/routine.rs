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

//! The contract every routine fulfils towards the host.

use crate::task::Task;
use std::rc::Rc;

/// An independently written piece of game logic driven by the scheduler.
///
/// A routine produces exactly one [`Task`]. The task loops until the routine
/// decides to stop, typically after observing
/// [`GameState::Exiting`](crate::GameState::Exiting), performs one step of
/// work per iteration and suspends on a [`Wait`](crate::Wait) before the
/// next one. Routines talk to each other only through the
/// [`MessageBus`](crate::MessageBus).
pub trait Routine {
    /// Creates the task that runs this routine.
    ///
    /// The task keeps the routine alive for as long as it runs.
    fn create_task(self: Rc<Self>) -> Task;
}
