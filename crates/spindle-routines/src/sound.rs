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

//! An audio stand-in: queues cues from game events and plays one per sweep.

use spindle_core::{
    AutoSubscribe, EntityId, GameState, MessageBus, MessageKind, Routine, Scheduler,
    SchedulerHandle, Subscriber, Task,
};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// A sound the game would play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cue {
    /// Background music, started whenever play starts or resumes.
    Music,
    /// The pause jingle.
    Pause,
    /// Two entities touched.
    Bump,
    /// A level was completed.
    Fanfare(String),
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cue::Music => f.write_str("music"),
            Cue::Pause => f.write_str("pause"),
            Cue::Bump => f.write_str("bump"),
            Cue::Fanfare(level) => write!(f, "fanfare({level})"),
        }
    }
}

/// Plays queued cues, one per sweep, and flushes the rest on exit.
pub struct Sound {
    scheduler: SchedulerHandle,
    bus: MessageBus,
    state: Cell<GameState>,
    queue: RefCell<VecDeque<Cue>>,
    played: RefCell<Vec<Cue>>,
}

impl Sound {
    /// Creates the sound routine.
    pub fn new(scheduler: &Scheduler, bus: &MessageBus) -> Self {
        Self {
            scheduler: scheduler.handle(),
            bus: bus.clone(),
            state: Cell::new(GameState::MainMenu),
            queue: RefCell::new(VecDeque::new()),
            played: RefCell::new(Vec::new()),
        }
    }

    /// Returns every cue played so far, in order.
    pub fn played(&self) -> Vec<Cue> {
        self.played.borrow().clone()
    }

    fn enqueue(&self, cue: Cue) {
        self.queue.borrow_mut().push_back(cue);
    }

    fn play_next(&self) -> bool {
        let Some(cue) = self.queue.borrow_mut().pop_front() else {
            return false;
        };
        log::info!("Sound: playing {cue} at tick {}.", self.scheduler.tick_count());
        self.played.borrow_mut().push(cue);
        true
    }
}

impl Subscriber for Sound {
    fn name(&self) -> &str {
        "sound"
    }

    fn handle_entity_intersect(&self, _first: EntityId, _second: EntityId) {
        self.enqueue(Cue::Bump);
    }

    fn handle_level_complete(&self, level: &str) {
        self.enqueue(Cue::Fanfare(level.to_owned()));
    }

    fn handle_state_change(&self, state: GameState) {
        let previous = self.state.replace(state);
        if previous == state {
            return;
        }
        match state {
            GameState::Running => self.enqueue(Cue::Music),
            GameState::Paused => self.enqueue(Cue::Pause),
            GameState::MainMenu | GameState::Exiting => {}
        }
    }
}

impl Routine for Sound {
    fn create_task(self: Rc<Self>) -> Task {
        Task::named("sound", async move {
            let _subscription = AutoSubscribe::new(
                &self.bus,
                &self,
                [
                    MessageKind::EntityIntersect,
                    MessageKind::LevelComplete,
                    MessageKind::StateChange,
                ],
            );

            while !self.state.get().is_exiting() {
                self.play_next();
                self.scheduler.wait_ticks(1).await;
            }
            while self.play_next() {}
            Ok(())
        })
    }
}
