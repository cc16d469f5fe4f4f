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

//! The lifecycle state of a game run, broadcast through `STATE_CHANGE`.

use std::fmt;

/// The coarse lifecycle phase every routine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    /// The title menu is shown; gameplay routines idle.
    #[default]
    MainMenu,
    /// Gameplay is live.
    Running,
    /// Gameplay is frozen until resumed.
    Paused,
    /// The run is shutting down. Routines observing it should let their task finish.
    Exiting,
}

impl GameState {
    /// Returns the canonical upper-case name of the state.
    pub fn name(&self) -> &'static str {
        match self {
            GameState::MainMenu => "MAIN_MENU",
            GameState::Running => "RUNNING",
            GameState::Paused => "PAUSED",
            GameState::Exiting => "EXITING",
        }
    }

    /// Returns `true` once the run is shutting down.
    pub fn is_exiting(&self) -> bool {
        matches!(self, GameState::Exiting)
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
