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

//! Level bookkeeping: turns the player reaching the goal into
//! `LEVEL_COMPLETE`.

use crate::physics::{GOAL, PLAYER};
use spindle_core::{
    AutoSubscribe, EntityId, GameState, MessageBus, MessageKind, Routine, Scheduler,
    SchedulerHandle, Subscriber, Task,
};
use std::cell::Cell;
use std::rc::Rc;

/// Tracks which level is being played and announces its completion.
pub struct Level {
    scheduler: SchedulerHandle,
    bus: MessageBus,
    levels: Vec<String>,
    index: Cell<usize>,
    completed: Cell<bool>,
    restarts: Cell<u32>,
    state: Cell<GameState>,
}

impl Level {
    /// Creates the level routine for `levels`, played in order.
    pub fn new(scheduler: &Scheduler, bus: &MessageBus, levels: Vec<String>) -> Self {
        Self {
            scheduler: scheduler.handle(),
            bus: bus.clone(),
            levels,
            index: Cell::new(0),
            completed: Cell::new(false),
            restarts: Cell::new(0),
            state: Cell::new(GameState::MainMenu),
        }
    }

    /// Returns the name of the level being played, if any is left.
    pub fn current(&self) -> Option<&str> {
        self.levels.get(self.index.get()).map(String::as_str)
    }

    /// Returns how many levels were completed.
    pub fn levels_completed(&self) -> usize {
        self.index.get()
    }

    /// Returns how many times the current session restarted a level.
    pub fn restarts(&self) -> u32 {
        self.restarts.get()
    }
}

impl Subscriber for Level {
    fn name(&self) -> &str {
        "level"
    }

    fn handle_entity_intersect(&self, first: EntityId, second: EntityId) {
        let reached_goal = matches!((first, second), (PLAYER, GOAL) | (GOAL, PLAYER));
        if !reached_goal || self.completed.replace(true) {
            return;
        }
        let Some(level) = self.current().map(str::to_owned) else {
            return;
        };
        log::info!(
            "Level: '{level}' complete at tick {}.",
            self.scheduler.tick_count()
        );
        self.bus.post_level_complete(level);
    }

    fn handle_level_complete(&self, _level: &str) {
        self.index.set(self.index.get() + 1);
        self.completed.set(false);
    }

    fn handle_restart_level(&self) {
        self.restarts.set(self.restarts.get() + 1);
        self.completed.set(false);
    }

    fn handle_state_change(&self, state: GameState) {
        self.state.set(state);
    }
}

impl Routine for Level {
    fn create_task(self: Rc<Self>) -> Task {
        Task::named("level", async move {
            let _subscription = AutoSubscribe::new(
                &self.bus,
                &self,
                [
                    MessageKind::EntityIntersect,
                    MessageKind::LevelComplete,
                    MessageKind::RestartLevel,
                    MessageKind::StateChange,
                ],
            );
            let level = Rc::clone(&self);
            self.scheduler
                .wait_until(move || level.state.get().is_exiting())
                .await;
            log::debug!(
                "Level: {} of {} level(s) completed.",
                self.levels_completed(),
                self.levels.len()
            );
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Completions(RefCell<Vec<String>>);

    impl Subscriber for Completions {
        fn handle_level_complete(&self, level: &str) {
            self.0.borrow_mut().push(level.to_owned());
        }
    }

    #[test]
    fn each_level_completes_once() {
        let scheduler = Scheduler::new();
        let bus = MessageBus::new();
        let level = Rc::new(Level::new(
            &scheduler,
            &bus,
            vec!["a".to_owned(), "b".to_owned()],
        ));
        bus.subscribe(MessageKind::EntityIntersect, &level);
        bus.subscribe(MessageKind::LevelComplete, &level);
        let completions = Rc::new(Completions::default());
        bus.subscribe(MessageKind::LevelComplete, &completions);

        bus.post_entity_intersect(GOAL, PLAYER);
        assert_eq!(level.current(), Some("b"));
        bus.post_entity_intersect(PLAYER, EntityId(7));
        bus.post_entity_intersect(PLAYER, GOAL);
        bus.post_entity_intersect(PLAYER, GOAL);

        assert_eq!(*completions.0.borrow(), ["a", "b"]);
        assert_eq!(level.levels_completed(), 2);
        assert_eq!(level.current(), None);
    }
}
