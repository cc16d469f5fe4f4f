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

//! The director owns the game state machine.
//!
//! It is the only routine that posts `STATE_CHANGE`. Every other routine
//! reacts to those announcements instead of deciding on its own when the
//! game starts, pauses or ends.

use spindle_core::{
    AutoSubscribe, ButtonState, GameState, KeyCode, MessageBus, MessageKind, Routine, Scheduler,
    SchedulerHandle, Subscriber, Task,
};
use std::cell::Cell;
use std::rc::Rc;

/// Drives the game state from input and level progress.
pub struct Director {
    scheduler: SchedulerHandle,
    bus: MessageBus,
    levels: Vec<String>,
    state: Cell<GameState>,
    level_index: Cell<usize>,
    levels_completed: Cell<usize>,
}

impl Director {
    /// Creates a director for a session playing `levels` in order.
    pub fn new(scheduler: &Scheduler, bus: &MessageBus, levels: Vec<String>) -> Self {
        Self {
            scheduler: scheduler.handle(),
            bus: bus.clone(),
            levels,
            state: Cell::new(GameState::MainMenu),
            level_index: Cell::new(0),
            levels_completed: Cell::new(0),
        }
    }

    /// Returns the state the director last announced.
    pub fn state(&self) -> GameState {
        self.state.get()
    }

    /// Returns the name of the level being played, if any is left.
    pub fn current_level(&self) -> Option<&str> {
        self.levels.get(self.level_index.get()).map(String::as_str)
    }

    /// Returns how many levels were completed so far.
    pub fn levels_completed(&self) -> usize {
        self.levels_completed.get()
    }

    fn transition(&self, next: GameState) {
        let previous = self.state.replace(next);
        if previous == next {
            return;
        }
        log::info!(
            "Director: {previous} -> {next} at tick {}.",
            self.scheduler.tick_count()
        );
        self.bus.post_state_change(next);
    }
}

impl Subscriber for Director {
    fn name(&self) -> &str {
        "director"
    }

    fn handle_key_press(&self, key: KeyCode, state: ButtonState) {
        if !state.is_pressed() {
            return;
        }
        match (self.state.get(), key) {
            (GameState::Exiting, _) => {}
            (_, KeyCode::Q) => self.bus.post_quit(),
            (GameState::MainMenu, _) => self.transition(GameState::Running),
            (GameState::Running, KeyCode::ESCAPE) => self.transition(GameState::Paused),
            (GameState::Running, KeyCode::R) => {
                log::info!("Director: restarting level {:?}.", self.current_level());
                self.bus.post_restart_level();
            }
            (GameState::Paused, KeyCode::ESCAPE) => self.transition(GameState::Running),
            _ => {}
        }
    }

    fn handle_mouse_button(&self, _x: f64, _y: f64, state: ButtonState) {
        if state.is_pressed() && self.state.get() == GameState::MainMenu {
            self.transition(GameState::Running);
        }
    }

    fn handle_level_complete(&self, level: &str) {
        let completed = self.levels_completed.get() + 1;
        self.levels_completed.set(completed);
        let next = self.level_index.get() + 1;
        self.level_index.set(next);

        match self.levels.get(next) {
            Some(upcoming) => {
                log::info!("Director: level '{level}' complete, next up '{upcoming}'.");
            }
            None => {
                log::info!("Director: level '{level}' complete, no levels left.");
                self.transition(GameState::Exiting);
            }
        }
    }

    fn handle_quit(&self) {
        self.transition(GameState::Exiting);
    }
}

impl Routine for Director {
    fn create_task(self: Rc<Self>) -> Task {
        Task::named("director", async move {
            let _subscription = AutoSubscribe::new(
                &self.bus,
                &self,
                [
                    MessageKind::KeyPress,
                    MessageKind::MouseButtonPress,
                    MessageKind::LevelComplete,
                    MessageKind::Quit,
                ],
            );
            self.bus.post_state_change(self.state.get());

            while !self.state.get().is_exiting() {
                self.scheduler.wait_ticks(1).await;
            }
            log::debug!("Director: finished at tick {}.", self.scheduler.tick_count());
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::StateTracker;

    fn setup(scheduler: &Scheduler) -> (MessageBus, Rc<Director>, Rc<StateTracker>) {
        let bus = MessageBus::new();
        let director = Rc::new(Director::new(
            scheduler,
            &bus,
            vec!["first".to_owned(), "second".to_owned()],
        ));
        bus.subscribe(MessageKind::KeyPress, &director);
        bus.subscribe(MessageKind::MouseButtonPress, &director);
        bus.subscribe(MessageKind::LevelComplete, &director);
        bus.subscribe(MessageKind::Quit, &director);
        let tracker = Rc::new(StateTracker::new());
        bus.subscribe(MessageKind::StateChange, &tracker);
        (bus, director, tracker)
    }

    #[test]
    fn escape_toggles_pause_while_playing() {
        let scheduler = Scheduler::new();
        let (bus, director, tracker) = setup(&scheduler);

        bus.post_key_press(KeyCode::ENTER, ButtonState::Pressed);
        assert_eq!(tracker.state(), GameState::Running);

        bus.post_key_press(KeyCode::ESCAPE, ButtonState::Pressed);
        assert_eq!(director.state(), GameState::Paused);

        // Releases never change the state.
        bus.post_key_press(KeyCode::ESCAPE, ButtonState::Released);
        assert_eq!(director.state(), GameState::Paused);

        bus.post_key_press(KeyCode::ESCAPE, ButtonState::Pressed);
        assert_eq!(tracker.state(), GameState::Running);
        assert_eq!(tracker.changes(), 3);
    }

    #[test]
    fn mouse_click_starts_the_game_from_the_menu_only() {
        let scheduler = Scheduler::new();
        let (bus, director, tracker) = setup(&scheduler);

        bus.post_mouse_button(10.0, 10.0, ButtonState::Pressed);
        assert_eq!(director.state(), GameState::Running);

        bus.post_mouse_button(10.0, 10.0, ButtonState::Pressed);
        assert_eq!(tracker.changes(), 1);
    }

    #[test]
    fn q_quits_through_the_bus() {
        let scheduler = Scheduler::new();
        let (bus, director, tracker) = setup(&scheduler);

        bus.post_key_press(KeyCode::Q, ButtonState::Pressed);

        assert_eq!(director.state(), GameState::Exiting);
        assert!(tracker.is_exiting());
    }

    #[test]
    fn finishing_the_last_level_exits() {
        let scheduler = Scheduler::new();
        let (bus, director, tracker) = setup(&scheduler);
        bus.post_key_press(KeyCode::SPACE, ButtonState::Pressed);

        bus.post_level_complete("first");
        assert_eq!(director.current_level(), Some("second"));
        assert_eq!(tracker.state(), GameState::Running);

        bus.post_level_complete("second");
        assert_eq!(director.levels_completed(), 2);
        assert_eq!(director.current_level(), None);
        assert!(tracker.is_exiting());
    }
}
