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

//! Time sources for the scheduler's elapsed-time accounting.

use crate::utils::timer::Stopwatch;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// A monotonic time source.
///
/// The scheduler samples it at the start and end of every sweep and adds
/// the difference to its accumulated elapsed time. Duration-based waits are
/// compared against that accumulated time only.
pub trait Clock {
    /// Returns the time elapsed since the clock's own origin.
    fn now(&self) -> Duration;
}

/// Wall-clock time, measured from the moment the clock was created.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    stopwatch: Stopwatch,
}

impl SystemClock {
    /// Creates a clock whose origin is now.
    pub fn new() -> Self {
        Self {
            stopwatch: Stopwatch::new(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.stopwatch.elapsed()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same reading, so a test can hand one clone to the
/// scheduler and advance another from inside a task.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    /// Creates a clock reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let handle = clock.clone();

        handle.advance(Duration::from_millis(16));
        handle.advance(Duration::from_millis(4));

        assert_eq!(clock.now(), Duration::from_millis(20));
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
