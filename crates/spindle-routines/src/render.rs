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

//! A rendering stand-in that paces frames with time-based waits.

use spindle_core::{
    AutoSubscribe, GameState, MessageBus, MessageKind, Routine, Scheduler, SchedulerHandle,
    Stopwatch, Subscriber, Task,
};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

const MIN_ZOOM: f64 = 0.25;
const MAX_ZOOM: f64 = 4.0;
const ZOOM_STEP: f64 = 0.1;

/// The camera the renderer would draw with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Horizontal pan.
    pub x: f64,
    /// Vertical pan.
    pub y: f64,
    /// Zoom factor, 1.0 being unscaled.
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

/// Renders one frame per `frame_interval` of scheduler time while the game
/// is running.
///
/// Between frames the renderer also watches the game state, so pausing or
/// exiting interrupts the frame wait instead of letting it run out.
pub struct Render {
    scheduler: SchedulerHandle,
    bus: MessageBus,
    frame_interval: Duration,
    state: Cell<GameState>,
    camera: Cell<Camera>,
    frames: Cell<u64>,
}

impl Render {
    /// Creates a renderer targeting one frame per `frame_interval`.
    pub fn new(scheduler: &Scheduler, bus: &MessageBus, frame_interval: Duration) -> Self {
        Self {
            scheduler: scheduler.handle(),
            bus: bus.clone(),
            frame_interval,
            state: Cell::new(GameState::MainMenu),
            camera: Cell::new(Camera::default()),
            frames: Cell::new(0),
        }
    }

    /// Returns how many frames were rendered.
    pub fn frames_rendered(&self) -> u64 {
        self.frames.get()
    }

    /// Returns the current camera.
    pub fn camera(&self) -> Camera {
        self.camera.get()
    }

    fn render_frame(&self, frame_time: Duration) {
        let frame = self.frames.get() + 1;
        self.frames.set(frame);
        let camera = self.camera.get();
        log::trace!(
            "Render: frame {frame} at tick {} ({:.3} ms since last), camera ({:.1}, {:.1}) x{:.2}.",
            self.scheduler.tick_count(),
            frame_time.as_secs_f64() * 1000.0,
            camera.x,
            camera.y,
            camera.zoom
        );
    }
}

impl Subscriber for Render {
    fn name(&self) -> &str {
        "render"
    }

    fn handle_mouse_move(&self, dx: f64, dy: f64) {
        let mut camera = self.camera.get();
        camera.x += dx;
        camera.y += dy;
        self.camera.set(camera);
    }

    fn handle_mouse_scroll(&self, _dx: f64, dy: f64) {
        let mut camera = self.camera.get();
        camera.zoom = (camera.zoom + dy * ZOOM_STEP).clamp(MIN_ZOOM, MAX_ZOOM);
        self.camera.set(camera);
    }

    fn handle_state_change(&self, state: GameState) {
        self.state.set(state);
    }
}

impl Routine for Render {
    fn create_task(self: Rc<Self>) -> Task {
        Task::named("render", async move {
            let _subscription = AutoSubscribe::new(
                &self.bus,
                &self,
                [
                    MessageKind::MouseMove,
                    MessageKind::MouseScroll,
                    MessageKind::StateChange,
                ],
            );
            let mut stopwatch = Stopwatch::new();

            loop {
                match self.state.get() {
                    GameState::Exiting => break,
                    GameState::Running => {
                        self.render_frame(stopwatch.lap());
                        let deadline = self.scheduler.elapsed() + self.frame_interval;
                        let render = Rc::clone(&self);
                        self.scheduler
                            .wait_until(move || {
                                render.state.get() != GameState::Running
                                    || render.scheduler.elapsed() >= deadline
                            })
                            .await;
                    }
                    GameState::MainMenu | GameState::Paused => {
                        let render = Rc::clone(&self);
                        self.scheduler
                            .wait_until(move || {
                                matches!(render.state.get(), GameState::Running | GameState::Exiting)
                            })
                            .await;
                        stopwatch.lap();
                    }
                }
            }
            log::info!("Render: {} frame(s) rendered.", self.frames_rendered());
            Ok(())
        })
    }
}
