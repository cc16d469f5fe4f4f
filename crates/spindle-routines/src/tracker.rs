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

//! A passive subscriber that remembers the current game state.

use spindle_core::{GameState, Subscriber};
use std::cell::Cell;

/// Mirrors the game state announced on the bus.
///
/// Routines that only need to know *whether* the game is still going share
/// a tracker instead of subscribing to `STATE_CHANGE` themselves.
#[derive(Debug, Default)]
pub struct StateTracker {
    state: Cell<GameState>,
    changes: Cell<u64>,
}

impl StateTracker {
    /// Creates a tracker starting in [`GameState::MainMenu`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last announced state.
    pub fn state(&self) -> GameState {
        self.state.get()
    }

    /// Returns `true` once the game has started shutting down.
    pub fn is_exiting(&self) -> bool {
        self.state.get().is_exiting()
    }

    /// Returns how many state announcements were observed.
    pub fn changes(&self) -> u64 {
        self.changes.get()
    }
}

impl Subscriber for StateTracker {
    fn name(&self) -> &str {
        "state_tracker"
    }

    fn handle_state_change(&self, state: GameState) {
        log::debug!("StateTracker: {} -> {state}", self.state.get());
        self.state.set(state);
        self.changes.set(self.changes.get() + 1);
    }
}
