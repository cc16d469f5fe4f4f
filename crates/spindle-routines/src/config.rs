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

//! Game configuration: the level list, pacing, and the scripted input
//! timeline that stands in for a real input device.

use serde::{Deserialize, Serialize};
use spindle_core::KeyCode;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors raised while loading a [`GameConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file '{}': {source}", .path.display())]
    Io {
        /// The path that was read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not a valid configuration document.
    #[error("invalid config file '{}': {source}", .path.display())]
    Parse {
        /// The path that was read.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// The configuration declares no level to play.
    #[error("config must declare at least one level")]
    NoLevels,
    /// The player could never reach a goal.
    #[error("player_speed must be a positive number, got {0}")]
    InvalidSpeed(f64),
}

/// A level: a name and the position of its goal on the track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// The level name reported in `LEVEL_COMPLETE`.
    pub name: String,
    /// Where the goal sits, in world units from the start line.
    pub goal: f64,
}

impl LevelConfig {
    /// Creates a level.
    pub fn new(name: impl Into<String>, goal: f64) -> Self {
        Self {
            name: name.into(),
            goal,
        }
    }
}

/// One input event of the scripted timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// A keyboard key went down or up.
    Key {
        /// The key code.
        key: u32,
        /// `true` when the key went down.
        pressed: bool,
    },
    /// The mouse moved.
    MouseMove {
        /// Horizontal movement.
        dx: f64,
        /// Vertical movement.
        dy: f64,
    },
    /// A mouse button went down or up.
    MouseButton {
        /// Cursor x coordinate.
        x: f64,
        /// Cursor y coordinate.
        y: f64,
        /// `true` when the button went down.
        pressed: bool,
    },
    /// The mouse wheel scrolled.
    MouseScroll {
        /// Horizontal scroll amount.
        dx: f64,
        /// Vertical scroll amount.
        dy: f64,
    },
    /// The window was closed.
    Quit,
}

impl InputEvent {
    /// A key press or release.
    pub fn key(key: KeyCode, pressed: bool) -> Self {
        InputEvent::Key {
            key: key.0,
            pressed,
        }
    }
}

/// An input event and the tick it fires on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedInput {
    /// The scheduler tick on which the event is posted.
    pub tick: u64,
    /// The event itself.
    pub event: InputEvent,
}

impl ScriptedInput {
    /// Creates a scripted event.
    pub fn at(tick: u64, event: InputEvent) -> Self {
        Self { tick, event }
    }
}

/// Everything the routines need to know about a game session.
///
/// Every field has a default, so a config file only lists what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// The levels, played in order.
    pub levels: Vec<LevelConfig>,
    /// Player movement per physics step while an arrow key is held.
    pub player_speed: f64,
    /// Target scheduler time between rendered frames, in milliseconds.
    ///
    /// Scheduler time only grows by the time spent inside sweeps, so 0
    /// (render on every sweep) is the default.
    pub frame_interval_ms: u64,
    /// The input routine posts `QUIT` once the scheduler reaches this tick.
    pub max_ticks: u64,
    /// The input timeline replayed by the input routine.
    pub input_script: Vec<ScriptedInput>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            levels: vec![
                LevelConfig::new("training", 4.0),
                LevelConfig::new("canyon", 7.0),
                LevelConfig::new("summit", 10.0),
            ],
            player_speed: 0.5,
            frame_interval_ms: 0,
            max_ticks: 5_000,
            input_script: vec![
                ScriptedInput::at(
                    5,
                    InputEvent::MouseButton {
                        x: 320.0,
                        y: 240.0,
                        pressed: true,
                    },
                ),
                ScriptedInput::at(
                    6,
                    InputEvent::MouseButton {
                        x: 320.0,
                        y: 240.0,
                        pressed: false,
                    },
                ),
                ScriptedInput::at(8, InputEvent::key(KeyCode::RIGHT, true)),
                ScriptedInput::at(10, InputEvent::MouseMove { dx: 4.0, dy: -2.0 }),
                ScriptedInput::at(12, InputEvent::MouseScroll { dx: 0.0, dy: 1.0 }),
                ScriptedInput::at(14, InputEvent::key(KeyCode::ESCAPE, true)),
                ScriptedInput::at(15, InputEvent::key(KeyCode::ESCAPE, false)),
                ScriptedInput::at(40, InputEvent::key(KeyCode::ESCAPE, true)),
                ScriptedInput::at(41, InputEvent::key(KeyCode::ESCAPE, false)),
                ScriptedInput::at(44, InputEvent::key(KeyCode::R, true)),
                ScriptedInput::at(45, InputEvent::key(KeyCode::R, false)),
            ],
        }
    }
}

impl GameConfig {
    /// Loads and validates a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GameConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        log::info!(
            "Loaded game config from '{}' ({} level(s), {} scripted input(s)).",
            path.display(),
            config.levels.len(),
            config.input_script.len()
        );
        Ok(config)
    }

    /// Checks that the configuration describes a playable session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }
        if self.player_speed.is_nan() || self.player_speed <= 0.0 {
            return Err(ConfigError::InvalidSpeed(self.player_speed));
        }
        Ok(())
    }

    /// Returns the target time between rendered frames.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Returns the level names, in play order.
    pub fn level_names(&self) -> Vec<String> {
        self.levels.iter().map(|level| level.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.level_names(), ["training", "canyon", "summit"]);
        assert_eq!(config.frame_interval(), Duration::ZERO);
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{ "max_ticks": 42 }"#).unwrap();
        assert_eq!(config.max_ticks, 42);
        assert_eq!(config.levels, GameConfig::default().levels);
    }

    #[test]
    fn scripted_events_use_a_type_tag() {
        let json = r#"[
            { "tick": 3, "event": { "type": "key", "key": 262, "pressed": true } },
            { "tick": 9, "event": { "type": "quit" } }
        ]"#;
        let script: Vec<ScriptedInput> = serde_json::from_str(json).unwrap();
        assert_eq!(
            script,
            vec![
                ScriptedInput::at(3, InputEvent::key(KeyCode::RIGHT, true)),
                ScriptedInput::at(9, InputEvent::Quit),
            ]
        );
    }

    #[test]
    fn validation_rejects_unplayable_sessions() {
        let mut config = GameConfig::default();
        config.player_speed = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSpeed(speed)) if speed == 0.0
        ));

        config.player_speed = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSpeed(speed)) if speed.is_nan()
        ));

        config.levels.clear();
        assert!(matches!(config.validate(), Err(ConfigError::NoLevels)));
    }
}
