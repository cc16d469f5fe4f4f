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

//! # Spindle Routines
//!
//! The routines of a small game built on `spindle-core`: each one owns a
//! single [`Task`](spindle_core::Task) and talks to the others only through
//! the [`MessageBus`](spindle_core::MessageBus).
//!
//! Rendering, audio output, physics and input devices are stand-ins that log
//! what they would do; what matters here is how the routines interleave and
//! coordinate the game's lifecycle.

#![warn(missing_docs)]

pub mod config;
pub mod director;
pub mod game;
pub mod input;
pub mod level;
pub mod physics;
pub mod render;
pub mod sound;
pub mod tracker;

pub use config::{ConfigError, GameConfig, InputEvent, LevelConfig, ScriptedInput};
pub use director::Director;
pub use game::{Game, GameSummary};
pub use input::Input;
pub use level::Level;
pub use physics::Physics;
pub use render::{Camera, Render};
pub use sound::{Cue, Sound};
pub use tracker::StateTracker;
