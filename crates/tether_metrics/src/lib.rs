//! Tether Metrics - step timing and event counters
//!
//! Everything vanishes when the `metrics` feature is off: the stub types keep
//! the same API and record nothing.
//!
//! ```ignore
//! use tether_metrics::StepTimer;
//!
//! let mut timer = StepTimer::new(120);
//! timer.time(|| world_step());
//! println!("step: {:.3} ms", timer.step_time_ms());
//! ```

#[cfg(feature = "metrics")]
mod counter;
#[cfg(feature = "metrics")]
mod ring_buffer;
#[cfg(feature = "metrics")]
mod step_timer;

#[cfg(feature = "metrics")]
pub use counter::Counter;
#[cfg(feature = "metrics")]
pub use ring_buffer::RingBuffer;
#[cfg(feature = "metrics")]
pub use step_timer::StepTimer;

// ============================================================================
// No-op stubs when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
pub struct StepTimer;

#[cfg(not(feature = "metrics"))]
impl StepTimer {
    pub fn new(_capacity: usize) -> Self { Self }
    pub fn time<F, R>(&mut self, f: F) -> R where F: FnOnce() -> R { f() }
    pub fn step_time_ms(&self) -> f64 { 0.0 }
    pub fn worst_step_ms(&self) -> f64 { 0.0 }
    pub fn total_steps(&self) -> u64 { 0 }
}

#[cfg(not(feature = "metrics"))]
#[derive(Default)]
pub struct Counter;

#[cfg(not(feature = "metrics"))]
impl Counter {
    pub fn new() -> Self { Self }
    pub fn increment(&mut self, _name: &'static str, _value: usize) {}
    pub fn get(&self, _name: &str) -> usize { 0 }
    pub fn reset_all(&mut self) {}
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ { std::iter::empty() }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_compiles_with_either_backend() {
        let mut timer = super::StepTimer::new(60);
        let mut counter = super::Counter::new();
        timer.time(|| ());
        counter.increment("created", 1);
        assert!(timer.step_time_ms() >= 0.0);
    }
}
