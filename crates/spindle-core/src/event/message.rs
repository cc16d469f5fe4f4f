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

//! The closed set of messages routines exchange, and their payloads.

use super::subscriber::Subscriber;
use crate::state::GameState;
use std::fmt;

/// A keyboard key identifier.
///
/// Values follow the usual desktop key-code layout: printable keys use their
/// upper-case ASCII code, special keys start at 256.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub u32);

impl KeyCode {
    /// The space bar.
    pub const SPACE: KeyCode = KeyCode(32);
    /// The `R` key.
    pub const R: KeyCode = KeyCode(82);
    /// The `Q` key.
    pub const Q: KeyCode = KeyCode(81);
    /// The escape key.
    pub const ESCAPE: KeyCode = KeyCode(256);
    /// The enter key.
    pub const ENTER: KeyCode = KeyCode(257);
    /// The right arrow.
    pub const RIGHT: KeyCode = KeyCode(262);
    /// The left arrow.
    pub const LEFT: KeyCode = KeyCode(263);
    /// The down arrow.
    pub const DOWN: KeyCode = KeyCode(264);
    /// The up arrow.
    pub const UP: KeyCode = KeyCode(265);
}

/// Whether a key or mouse button went down or came back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonState {
    /// The button went down.
    Pressed,
    /// The button came back up.
    Released,
}

impl ButtonState {
    /// Returns `true` for [`ButtonState::Pressed`].
    pub fn is_pressed(&self) -> bool {
        matches!(self, ButtonState::Pressed)
    }
}

/// Identifies an entity of the simulated world in intersection reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity:{}", self.0)
    }
}

/// The category of a message, used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageKind {
    /// A keyboard key changed state.
    KeyPress,
    /// The mouse moved.
    MouseMove,
    /// A mouse button changed state.
    MouseButtonPress,
    /// The mouse wheel scrolled.
    MouseScroll,
    /// A level was completed.
    LevelComplete,
    /// Two entities started overlapping.
    EntityIntersect,
    /// The current level should restart.
    RestartLevel,
    /// The player asked to quit.
    Quit,
    /// The game changed lifecycle state.
    StateChange,
}

impl MessageKind {
    /// Every message kind, in declaration order.
    pub const ALL: [MessageKind; 9] = [
        MessageKind::KeyPress,
        MessageKind::MouseMove,
        MessageKind::MouseButtonPress,
        MessageKind::MouseScroll,
        MessageKind::LevelComplete,
        MessageKind::EntityIntersect,
        MessageKind::RestartLevel,
        MessageKind::Quit,
        MessageKind::StateChange,
    ];

    /// Returns the canonical upper-case name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            MessageKind::KeyPress => "KEY_PRESS",
            MessageKind::MouseMove => "MOUSE_MOVE",
            MessageKind::MouseButtonPress => "MOUSE_BUTTON_PRESS",
            MessageKind::MouseScroll => "MOUSE_SCROLL",
            MessageKind::LevelComplete => "LEVEL_COMPLETE",
            MessageKind::EntityIntersect => "ENTITY_INTERSECT",
            MessageKind::RestartLevel => "RESTART_LEVEL",
            MessageKind::Quit => "QUIT",
            MessageKind::StateChange => "STATE_CHANGE",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A message together with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// A keyboard key changed state.
    KeyPress {
        /// The key.
        key: KeyCode,
        /// Whether it went down or up.
        state: ButtonState,
    },
    /// The mouse moved by a relative amount.
    MouseMove {
        /// Horizontal movement.
        dx: f64,
        /// Vertical movement.
        dy: f64,
    },
    /// A mouse button changed state at a cursor position.
    MouseButton {
        /// Cursor x coordinate.
        x: f64,
        /// Cursor y coordinate.
        y: f64,
        /// Whether it went down or up.
        state: ButtonState,
    },
    /// The mouse wheel scrolled.
    MouseScroll {
        /// Horizontal scroll amount.
        dx: f64,
        /// Vertical scroll amount.
        dy: f64,
    },
    /// A level was completed.
    LevelComplete {
        /// The name of the completed level.
        level: String,
    },
    /// Two entities started overlapping.
    EntityIntersect {
        /// The first entity of the pair.
        first: EntityId,
        /// The second entity of the pair.
        second: EntityId,
    },
    /// The current level should restart.
    RestartLevel,
    /// The player asked to quit.
    Quit,
    /// The game changed lifecycle state.
    StateChange(GameState),
}

impl Message {
    /// Returns the category this message is routed by.
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::KeyPress { .. } => MessageKind::KeyPress,
            Message::MouseMove { .. } => MessageKind::MouseMove,
            Message::MouseButton { .. } => MessageKind::MouseButtonPress,
            Message::MouseScroll { .. } => MessageKind::MouseScroll,
            Message::LevelComplete { .. } => MessageKind::LevelComplete,
            Message::EntityIntersect { .. } => MessageKind::EntityIntersect,
            Message::RestartLevel => MessageKind::RestartLevel,
            Message::Quit => MessageKind::Quit,
            Message::StateChange(_) => MessageKind::StateChange,
        }
    }

    /// Calls the handler of `subscriber` that matches this message.
    pub(crate) fn deliver(&self, subscriber: &dyn Subscriber) {
        match self {
            Message::KeyPress { key, state } => subscriber.handle_key_press(*key, *state),
            Message::MouseMove { dx, dy } => subscriber.handle_mouse_move(*dx, *dy),
            Message::MouseButton { x, y, state } => subscriber.handle_mouse_button(*x, *y, *state),
            Message::MouseScroll { dx, dy } => subscriber.handle_mouse_scroll(*dx, *dy),
            Message::LevelComplete { level } => subscriber.handle_level_complete(level),
            Message::EntityIntersect { first, second } => {
                subscriber.handle_entity_intersect(*first, *second)
            }
            Message::RestartLevel => subscriber.handle_restart_level(),
            Message::Quit => subscriber.handle_quit(),
            Message::StateChange(state) => subscriber.handle_state_change(*state),
        }
    }
}
