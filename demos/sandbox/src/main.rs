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

// Spindle Sandbox
// Plays one scripted game session and prints its summary.
//
// Usage: sandbox [CONFIG.json]

use anyhow::{Context, Result};
use spindle_core::{MessageBus, Scheduler};
use spindle_routines::{Game, GameConfig};
use std::path::PathBuf;

fn load_config() -> Result<GameConfig> {
    match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => GameConfig::load(&path)
            .with_context(|| format!("could not load game config '{}'", path.display())),
        None => {
            log::info!("No config file given, playing the built-in session.");
            Ok(GameConfig::default())
        }
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    let scheduler = Scheduler::new();
    let bus = MessageBus::new();

    let game = Game::assemble(&config, &scheduler, &bus).context("could not assemble the game")?;
    let summary = game.play(&scheduler).context("game session failed")?;

    let stats = scheduler.stats();
    log::info!(
        "Session over: {} at tick {} ({} resume(s), {:?} of scheduler time).",
        summary.final_state,
        summary.ticks,
        stats.resumes,
        scheduler.elapsed()
    );
    log::info!(
        "Levels completed: {}/{}, frames rendered: {}, player at {:.2}.",
        summary.levels_completed,
        config.levels.len(),
        summary.frames_rendered,
        summary.player_position
    );
    let cues: Vec<String> = summary.cues.iter().map(ToString::to_string).collect();
    log::info!("Cues played: [{}]", cues.join(", "));
    Ok(())
}
