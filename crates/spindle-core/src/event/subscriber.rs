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

use super::message::{ButtonState, EntityId, KeyCode};
use crate::state::GameState;

/// The receiving side of the [`MessageBus`](super::MessageBus).
///
/// There is one handler per message category. Every handler has a default
/// implementation that logs the message and ignores it, so a routine only
/// overrides the handlers for the categories it subscribes to.
///
/// Handlers take `&self`: a handler may post further messages, which can be
/// dispatched back to the same subscriber before the first handler returns.
/// Implementors keep their mutable state in `Cell`/`RefCell` fields and must
/// not hold a borrow across a call to the bus.
pub trait Subscriber {
    /// A short name used in log output.
    fn name(&self) -> &str {
        "subscriber"
    }

    /// A keyboard key went down or up.
    fn handle_key_press(&self, key: KeyCode, state: ButtonState) {
        log::trace!("{} ignored KEY_PRESS {key:?} {state:?}", self.name());
    }

    /// The mouse moved by (`dx`, `dy`).
    fn handle_mouse_move(&self, dx: f64, dy: f64) {
        log::trace!("{} ignored MOUSE_MOVE ({dx}, {dy})", self.name());
    }

    /// A mouse button went down or up with the cursor at (`x`, `y`).
    fn handle_mouse_button(&self, x: f64, y: f64, state: ButtonState) {
        log::trace!("{} ignored MOUSE_BUTTON_PRESS ({x}, {y}) {state:?}", self.name());
    }

    /// The mouse wheel scrolled by (`dx`, `dy`).
    fn handle_mouse_scroll(&self, dx: f64, dy: f64) {
        log::trace!("{} ignored MOUSE_SCROLL ({dx}, {dy})", self.name());
    }

    /// The level named `level` was completed.
    fn handle_level_complete(&self, level: &str) {
        log::trace!("{} ignored LEVEL_COMPLETE '{level}'", self.name());
    }

    /// Entities `first` and `second` started overlapping.
    fn handle_entity_intersect(&self, first: EntityId, second: EntityId) {
        log::trace!("{} ignored ENTITY_INTERSECT {first} {second}", self.name());
    }

    /// The current level should restart.
    fn handle_restart_level(&self) {
        log::trace!("{} ignored RESTART_LEVEL", self.name());
    }

    /// The player asked to quit.
    fn handle_quit(&self) {
        log::trace!("{} ignored QUIT", self.name());
    }

    /// The game entered `state`.
    fn handle_state_change(&self, state: GameState) {
        log::trace!("{} ignored STATE_CHANGE {state}", self.name());
    }
}
