//! Simulation step timing

use super::ring_buffer::RingBuffer;
use std::time::{Duration, Instant};

pub struct StepTimer {
    steps: RingBuffer<Duration>,
    total_steps: u64,
}

impl StepTimer {
    pub fn new(capacity: usize) -> Self {
        Self {
            steps: RingBuffer::new(capacity),
            total_steps: 0,
        }
    }

    /// Run `f`, recording how long it took.
    pub fn time<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        self.steps.push(start.elapsed());
        self.total_steps += 1;
        result
    }

    pub fn step_time_ms(&self) -> f64 {
        self.steps.average().as_secs_f64() * 1000.0
    }

    pub fn worst_step_ms(&self) -> f64 {
        self.steps.max().as_secs_f64() * 1000.0
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_timed_steps() {
        let mut timer = StepTimer::new(4);
        let value = timer.time(|| 7);
        timer.time(|| ());
        assert_eq!(value, 7);
        assert_eq!(timer.total_steps(), 2);
        assert!(timer.worst_step_ms() >= timer.step_time_ms());
    }
}
