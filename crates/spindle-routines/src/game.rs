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

//! Wires every routine of a session onto one scheduler and bus.

use crate::config::{ConfigError, GameConfig};
use crate::director::Director;
use crate::input::Input;
use crate::level::Level;
use crate::physics::Physics;
use crate::render::Render;
use crate::sound::{Cue, Sound};
use crate::tracker::StateTracker;
use anyhow::Result;
use spindle_core::{
    AutoSubscribe, GameState, MessageBus, MessageKind, Routine, Scheduler, SchedulerHandle,
};
use std::rc::Rc;

/// What a finished session looked like.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSummary {
    /// The last state announced on the bus.
    pub final_state: GameState,
    /// Sweeps the scheduler completed.
    pub ticks: u64,
    /// Levels completed before the session ended.
    pub levels_completed: usize,
    /// Frames the renderer produced.
    pub frames_rendered: u64,
    /// Cues the sound routine played, in order.
    pub cues: Vec<Cue>,
    /// Where the player stood when the session ended.
    pub player_position: f64,
}

/// A fully assembled game session.
///
/// [`Game::assemble`] queues one task per routine. Tasks are added so that
/// each sweep resumes the director first, then input, level, physics, sound
/// and finally render.
pub struct Game {
    scheduler: SchedulerHandle,
    tracker: Rc<StateTracker>,
    director: Rc<Director>,
    input: Rc<Input>,
    level: Rc<Level>,
    physics: Rc<Physics>,
    render: Rc<Render>,
    sound: Rc<Sound>,
    _tracker_subscription: AutoSubscribe,
}

impl Game {
    /// Validates `config` and queues every routine's task on `scheduler`.
    pub fn assemble(
        config: &GameConfig,
        scheduler: &Scheduler,
        bus: &MessageBus,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let tracker = Rc::new(StateTracker::new());
        let tracker_subscription = AutoSubscribe::new(bus, &tracker, [MessageKind::StateChange]);

        let render = Rc::new(Render::new(scheduler, bus, config.frame_interval()));
        let sound = Rc::new(Sound::new(scheduler, bus));
        let physics = Rc::new(Physics::new(
            scheduler,
            bus,
            config.levels.clone(),
            config.player_speed,
        ));
        let level = Rc::new(Level::new(scheduler, bus, config.level_names()));
        let input = Rc::new(Input::new(
            scheduler,
            bus,
            Rc::clone(&tracker),
            config.input_script.clone(),
            config.max_ticks,
        ));
        let director = Rc::new(Director::new(scheduler, bus, config.level_names()));

        // The scheduler resumes the most recently added task first.
        scheduler.add(Rc::clone(&render).create_task());
        scheduler.add(Rc::clone(&sound).create_task());
        scheduler.add(Rc::clone(&physics).create_task());
        scheduler.add(Rc::clone(&level).create_task());
        scheduler.add(Rc::clone(&input).create_task());
        scheduler.add(Rc::clone(&director).create_task());

        log::info!(
            "Game: assembled {} routine(s) for {} level(s).",
            scheduler.len(),
            config.levels.len()
        );

        Ok(Self {
            scheduler: scheduler.handle(),
            tracker,
            director,
            input,
            level,
            physics,
            render,
            sound,
            _tracker_subscription: tracker_subscription,
        })
    }

    /// Runs `scheduler` to completion and summarizes the session.
    ///
    /// `scheduler` must be the one the game was assembled on.
    pub fn play(&self, scheduler: &Scheduler) -> Result<GameSummary> {
        scheduler.run()?;
        let summary = self.summary();
        log::info!(
            "Game: {} after {} tick(s), {} level(s) completed.",
            summary.final_state,
            summary.ticks,
            summary.levels_completed
        );
        Ok(summary)
    }

    /// Summarizes the session as it stands.
    ///
    /// # Panics
    ///
    /// Panics if the scheduler the game was assembled on was dropped.
    pub fn summary(&self) -> GameSummary {
        GameSummary {
            final_state: self.tracker.state(),
            ticks: self.scheduler.tick_count(),
            levels_completed: self.level.levels_completed(),
            frames_rendered: self.render.frames_rendered(),
            cues: self.sound.played(),
            player_position: self.physics.player_position(),
        }
    }

    /// Returns the shared state tracker.
    pub fn tracker(&self) -> &StateTracker {
        &self.tracker
    }

    /// Returns the director.
    pub fn director(&self) -> &Director {
        &self.director
    }

    /// Returns the input routine.
    pub fn input(&self) -> &Input {
        &self.input
    }

    /// Returns the level routine.
    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Returns the physics routine.
    pub fn physics(&self) -> &Physics {
        &self.physics
    }

    /// Returns the renderer.
    pub fn render(&self) -> &Render {
        &self.render
    }

    /// Returns the sound routine.
    pub fn sound(&self) -> &Sound {
        &self.sound
    }
}
