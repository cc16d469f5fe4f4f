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

//! Replays a scripted input timeline onto the bus.

use crate::config::{InputEvent, ScriptedInput};
use crate::tracker::StateTracker;
use spindle_core::{
    ButtonState, KeyCode, MessageBus, Routine, Scheduler, SchedulerHandle, Task,
};
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

fn button(pressed: bool) -> ButtonState {
    if pressed {
        ButtonState::Pressed
    } else {
        ButtonState::Released
    }
}

/// Stands in for the window's input device.
///
/// Each sweep it posts the events scripted for the current tick. Once the
/// scheduler reaches `max_ticks` it posts `QUIT`, so a session always ends
/// even if the script never does.
pub struct Input {
    scheduler: SchedulerHandle,
    bus: MessageBus,
    tracker: Rc<StateTracker>,
    script: Vec<ScriptedInput>,
    max_ticks: u64,
    posted: Cell<usize>,
}

impl Input {
    /// Creates an input routine replaying `script`.
    ///
    /// Events are replayed in tick order; events sharing a tick keep their
    /// script order.
    pub fn new(
        scheduler: &Scheduler,
        bus: &MessageBus,
        tracker: Rc<StateTracker>,
        mut script: Vec<ScriptedInput>,
        max_ticks: u64,
    ) -> Self {
        script.sort_by_key(|input| input.tick);
        Self {
            scheduler: scheduler.handle(),
            bus: bus.clone(),
            tracker,
            script,
            max_ticks,
            posted: Cell::new(0),
        }
    }

    /// Returns how many scripted events were posted.
    pub fn events_posted(&self) -> usize {
        self.posted.get()
    }

    fn post(&self, event: &InputEvent) {
        log::debug!(
            "Input: posting {event:?} at tick {}.",
            self.scheduler.tick_count()
        );
        match *event {
            InputEvent::Key { key, pressed } => self.bus.post_key_press(KeyCode(key), button(pressed)),
            InputEvent::MouseMove { dx, dy } => self.bus.post_mouse_move(dx, dy),
            InputEvent::MouseButton { x, y, pressed } => {
                self.bus.post_mouse_button(x, y, button(pressed))
            }
            InputEvent::MouseScroll { dx, dy } => self.bus.post_mouse_scroll(dx, dy),
            InputEvent::Quit => self.bus.post_quit(),
        }
        self.posted.set(self.posted.get() + 1);
    }
}

impl Routine for Input {
    fn create_task(self: Rc<Self>) -> Task {
        Task::named("input", async move {
            let mut pending: VecDeque<&ScriptedInput> = self.script.iter().collect();
            let mut quit_posted = false;

            loop {
                let tick = self.scheduler.tick_count();
                while let Some(input) = pending.front().copied().filter(|input| input.tick <= tick) {
                    self.post(&input.event);
                    pending.pop_front();
                }

                if !quit_posted && tick >= self.max_ticks && !self.tracker.is_exiting() {
                    log::warn!("Input: tick limit {} reached, quitting.", self.max_ticks);
                    self.bus.post_quit();
                    quit_posted = true;
                }

                if self.tracker.is_exiting() {
                    break;
                }
                self.scheduler.wait_ticks(1).await;
            }

            if !pending.is_empty() {
                log::debug!("Input: {} scripted event(s) never fired.", pending.len());
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spindle_core::{GameState, MessageKind, Subscriber};
    use std::cell::RefCell;

    /// Records key presses and ends the game on `QUIT`.
    struct Recorder {
        bus: MessageBus,
        scheduler: SchedulerHandle,
        keys: RefCell<Vec<(u64, KeyCode)>>,
    }

    impl Subscriber for Recorder {
        fn handle_key_press(&self, key: KeyCode, _state: ButtonState) {
            self.keys.borrow_mut().push((self.scheduler.tick_count(), key));
        }

        fn handle_quit(&self) {
            self.bus.post_state_change(GameState::Exiting);
        }
    }

    fn session(script: Vec<ScriptedInput>, max_ticks: u64) -> (Scheduler, Rc<Recorder>, Rc<Input>) {
        let scheduler = Scheduler::new();
        let bus = MessageBus::new();
        let tracker = Rc::new(StateTracker::new());
        bus.subscribe(MessageKind::StateChange, &tracker);
        let recorder = Rc::new(Recorder {
            bus: bus.clone(),
            scheduler: scheduler.handle(),
            keys: RefCell::new(Vec::new()),
        });
        bus.subscribe(MessageKind::KeyPress, &recorder);
        bus.subscribe(MessageKind::Quit, &recorder);

        let input = Rc::new(Input::new(&scheduler, &bus, tracker, script, max_ticks));
        scheduler.add(input.clone().create_task());
        scheduler.run().unwrap();
        (scheduler, recorder, input)
    }

    #[test]
    fn script_is_replayed_in_tick_order() {
        let script = vec![
            ScriptedInput::at(4, InputEvent::Quit),
            ScriptedInput::at(2, InputEvent::key(KeyCode::UP, true)),
            ScriptedInput::at(0, InputEvent::key(KeyCode::ENTER, true)),
            ScriptedInput::at(2, InputEvent::key(KeyCode::DOWN, true)),
        ];

        let (scheduler, recorder, input) = session(script, 100);

        assert_eq!(
            *recorder.keys.borrow(),
            vec![(0, KeyCode::ENTER), (2, KeyCode::UP), (2, KeyCode::DOWN)]
        );
        assert_eq!(input.events_posted(), 4);
        assert_eq!(scheduler.tick_count(), 5);
    }

    #[test]
    fn tick_limit_forces_a_quit() {
        let script = vec![ScriptedInput::at(50, InputEvent::key(KeyCode::SPACE, true))];

        let (scheduler, recorder, input) = session(script, 3);

        assert!(recorder.keys.borrow().is_empty());
        assert_eq!(input.events_posted(), 0);
        assert_eq!(scheduler.tick_count(), 4);
    }
}
