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

//! A one-dimensional physics stand-in.
//!
//! The world is a straight track: the player starts at zero and moves along
//! it while an arrow key is held, and the goal of the current level sits
//! somewhere ahead. Overlap between the two is reported as
//! `ENTITY_INTERSECT` on the step where it begins.

use crate::config::LevelConfig;
use spindle_core::{
    AutoSubscribe, ButtonState, EntityId, GameState, KeyCode, MessageBus, MessageKind, Routine,
    Scheduler, SchedulerHandle, Subscriber, Task,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// The player's entity.
pub const PLAYER: EntityId = EntityId(1);
/// The current level's goal.
pub const GOAL: EntityId = EntityId(2);

const PLAYER_HALF_EXTENT: f64 = 0.5;
const GOAL_HALF_EXTENT: f64 = 0.5;

#[derive(Debug, Default)]
struct World {
    player: f64,
    velocity: f64,
    goal: f64,
    level: usize,
    overlapping: bool,
}

impl World {
    fn reset_player(&mut self) {
        self.player = 0.0;
        self.overlapping = false;
    }

    /// Integrates one step. Returns `true` when an overlap starts.
    fn step(&mut self) -> bool {
        self.player += self.velocity;
        let touching = (self.player - self.goal).abs() <= PLAYER_HALF_EXTENT + GOAL_HALF_EXTENT;
        let entered = touching && !self.overlapping;
        self.overlapping = touching;
        entered
    }
}

/// Moves the player and detects when it reaches the goal.
///
/// Steps once per sweep while the game is running, and sleeps until it runs
/// again otherwise.
pub struct Physics {
    scheduler: SchedulerHandle,
    bus: MessageBus,
    levels: Vec<LevelConfig>,
    speed: f64,
    state: Cell<GameState>,
    world: RefCell<World>,
    steps: Cell<u64>,
}

impl Physics {
    /// Creates the physics routine for `levels`, moving the player `speed`
    /// units per step.
    pub fn new(scheduler: &Scheduler, bus: &MessageBus, levels: Vec<LevelConfig>, speed: f64) -> Self {
        let world = World {
            goal: levels.first().map_or(0.0, |level| level.goal),
            ..World::default()
        };
        Self {
            scheduler: scheduler.handle(),
            bus: bus.clone(),
            levels,
            speed,
            state: Cell::new(GameState::MainMenu),
            world: RefCell::new(world),
            steps: Cell::new(0),
        }
    }

    /// Returns the player's position on the track.
    pub fn player_position(&self) -> f64 {
        self.world.borrow().player
    }

    /// Returns the position of the current goal.
    pub fn goal_position(&self) -> f64 {
        self.world.borrow().goal
    }

    /// Returns how many steps were simulated.
    pub fn steps(&self) -> u64 {
        self.steps.get()
    }

    fn step(&self) {
        let entered = self.world.borrow_mut().step();
        self.steps.set(self.steps.get() + 1);
        if entered {
            log::debug!(
                "Physics: {PLAYER} reached {GOAL} at {:.2}.",
                self.player_position()
            );
            self.bus.post_entity_intersect(PLAYER, GOAL);
        }
    }
}

impl Subscriber for Physics {
    fn name(&self) -> &str {
        "physics"
    }

    fn handle_key_press(&self, key: KeyCode, state: ButtonState) {
        let direction = match key {
            KeyCode::RIGHT => 1.0,
            KeyCode::LEFT => -1.0,
            _ => return,
        };
        let mut world = self.world.borrow_mut();
        world.velocity = if state.is_pressed() {
            direction * self.speed
        } else {
            0.0
        };
    }

    fn handle_restart_level(&self) {
        log::debug!("Physics: player back at the start line.");
        self.world.borrow_mut().reset_player();
    }

    fn handle_level_complete(&self, level: &str) {
        let mut world = self.world.borrow_mut();
        world.level += 1;
        world.reset_player();
        if let Some(next) = self.levels.get(world.level) {
            world.goal = next.goal;
            log::debug!("Physics: '{level}' done, goal moved to {:.2}.", next.goal);
        }
    }

    fn handle_state_change(&self, state: GameState) {
        self.state.set(state);
    }
}

impl Routine for Physics {
    fn create_task(self: Rc<Self>) -> Task {
        Task::named("physics", async move {
            let _subscription = AutoSubscribe::new(
                &self.bus,
                &self,
                [
                    MessageKind::KeyPress,
                    MessageKind::RestartLevel,
                    MessageKind::LevelComplete,
                    MessageKind::StateChange,
                ],
            );

            loop {
                match self.state.get() {
                    GameState::Exiting => break,
                    GameState::Running => {
                        self.step();
                        self.scheduler.wait_ticks(1).await;
                    }
                    GameState::MainMenu | GameState::Paused => {
                        let physics = Rc::clone(&self);
                        self.scheduler
                            .wait_until(move || {
                                matches!(physics.state.get(), GameState::Running | GameState::Exiting)
                            })
                            .await;
                    }
                }
            }
            log::debug!("Physics: stopped after {} step(s).", self.steps());
            Ok(())
        })
    }
}
