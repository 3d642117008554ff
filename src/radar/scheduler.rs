// Copyright 2025 Chris Custine
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

//! Paint-tick bookkeeping.
//!
//! The scope repaints every frame but only swaps in a new data snapshot when
//! [`FrameScheduler::should_refresh`] says so. Both rates are independent.

use std::time::{Duration, Instant};

/// Wall time between FPS samples
const FPS_SAMPLE_PERIOD: Duration = Duration::from_millis(1000);

/// Decides when the cached scene should pick up a new snapshot.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    last_draw: Option<Instant>,
    initial_draw: bool,
    upstream_was_empty: bool,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler {
    /// New scheduler with the initial-draw flag raised.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_draw: None,
            initial_draw: true,
            upstream_was_empty: true,
        }
    }

    /// Force a refresh on the next tick.
    pub fn request_initial_draw(&mut self) {
        self.initial_draw = true;
    }

    /// Report whether the upstream aircraft snapshot currently has entries.
    /// An empty to non-empty transition raises the initial-draw flag.
    pub fn observe_upstream(&mut self, is_empty: bool) {
        if self.upstream_was_empty && !is_empty {
            self.initial_draw = true;
        }
        self.upstream_was_empty = is_empty;
    }

    /// True when `now - last_draw > interval` or an initial draw is pending.
    /// Returning true records `now` as the last draw and clears the flag.
    pub fn should_refresh(&mut self, now: Instant, interval: Duration) -> bool {
        let due = match self.last_draw {
            Some(last) => now.saturating_duration_since(last) > interval,
            None => true,
        };
        if due || self.initial_draw {
            self.last_draw = Some(now);
            self.initial_draw = false;
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn last_draw(&self) -> Option<Instant> {
        self.last_draw
    }
}

/// Frames painted per wall-clock second.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    frames: u32,
    window_start: Instant,
    last_sample: u32,
}

impl FpsCounter {
    #[must_use]
    pub fn new(now: Instant) -> Self {
        Self {
            frames: 0,
            window_start: now,
            last_sample: 0,
        }
    }

    /// Count one painted frame.
    pub fn tick(&mut self, now: Instant) {
        self.frames += 1;
        if now.saturating_duration_since(self.window_start) >= FPS_SAMPLE_PERIOD {
            self.last_sample = self.frames;
            self.frames = 0;
            self.window_start = now;
        }
    }

    /// Frames counted in the last full sample period.
    #[must_use]
    pub fn fps(&self) -> u32 {
        self.last_sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_refreshes() {
        let mut scheduler = FrameScheduler::new();
        let now = Instant::now();
        assert!(scheduler.should_refresh(now, Duration::from_secs(1)));
        assert!(!scheduler.should_refresh(now + Duration::from_millis(500), Duration::from_secs(1)));
    }

    #[test]
    fn test_refresh_after_interval_elapses() {
        let mut scheduler = FrameScheduler::new();
        let start = Instant::now();
        let interval = Duration::from_millis(250);
        assert!(scheduler.should_refresh(start, interval));

        // Strictly greater than the interval is required.
        assert!(!scheduler.should_refresh(start + interval, interval));
        assert!(scheduler.should_refresh(start + interval + Duration::from_millis(1), interval));
        assert_eq!(scheduler.last_draw(), Some(start + interval + Duration::from_millis(1)));
    }

    #[test]
    fn test_upstream_fill_forces_refresh() {
        let mut scheduler = FrameScheduler::new();
        let start = Instant::now();
        let interval = Duration::from_secs(10);
        assert!(scheduler.should_refresh(start, interval));

        scheduler.observe_upstream(true);
        assert!(!scheduler.should_refresh(start + Duration::from_millis(16), interval));

        scheduler.observe_upstream(false);
        assert!(scheduler.should_refresh(start + Duration::from_millis(32), interval));

        // Staying non-empty does not keep forcing refreshes.
        scheduler.observe_upstream(false);
        assert!(!scheduler.should_refresh(start + Duration::from_millis(48), interval));
    }

    #[test]
    fn test_fps_samples_once_per_second() {
        let start = Instant::now();
        let mut fps = FpsCounter::new(start);
        for i in 1..60 {
            fps.tick(start + Duration::from_millis(i * 16));
        }
        assert_eq!(fps.fps(), 0);

        fps.tick(start + Duration::from_millis(1000));
        assert_eq!(fps.fps(), 60);

        fps.tick(start + Duration::from_millis(1016));
        assert_eq!(fps.fps(), 60);
    }
}
