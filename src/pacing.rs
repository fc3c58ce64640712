//! Host-loop frame pacing and timing stats.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

const MAX_SAMPLES: usize = 60;

/// Blocks the host loop to a fixed cadence and keeps a rolling frame-time window.
pub struct FramePacer {
    interval: Duration,
    last_frame: Instant,
    frame_times: VecDeque<Duration>,
}

impl FramePacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_frame: Instant::now(),
            frame_times: VecDeque::with_capacity(MAX_SAMPLES),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sleeps out whatever is left of the interval since the previous frame ended.
    pub fn wait(&mut self) {
        let elapsed = self.last_frame.elapsed();
        if let Some(remaining) = self.interval.checked_sub(elapsed) {
            spin_sleep::sleep(remaining);
        }

        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.record(frame_time);
    }

    pub fn record(&mut self, frame_time: Duration) {
        self.frame_times.push_back(frame_time);
        if self.frame_times.len() > MAX_SAMPLES {
            self.frame_times.pop_front();
        }
    }

    pub fn frame_time_ms(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }
        let total: Duration = self.frame_times.iter().sum();
        total.as_secs_f32() * 1000.0 / self.frame_times.len() as f32
    }

    pub fn fps(&self) -> f32 {
        let frame_time = self.frame_time_ms();
        if frame_time > 0.0 {
            1000.0 / frame_time
        } else {
            0.0
        }
    }

    pub fn sample_count(&self) -> usize {
        self.frame_times.len()
    }
}
