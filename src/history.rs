//! Per-device counter history and delta computation.
//!
//! Only the latest counter sample is kept; what accumulates is the list of
//! derived [`RateSample`]s inside the averaging window, capped so a tiny tick
//! interval cannot grow it without bound.

use crate::device::CounterSample;
use std::collections::VecDeque;
use std::time::{Duration, SystemTime};

/// Upper bound on retained rate samples per device.
pub const MAX_RATE_SAMPLES: usize = 65_536;

/// Tick interval assumed for sizing when the configured one is zero.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSample {
    pub timestamp: SystemTime,
    pub bits_in_per_sec: f64,
    pub bits_out_per_sec: f64,
}

/// Counter movement between two consecutive samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterDelta {
    pub elapsed: Duration,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub packets_in: Option<u64>,
    pub packets_out: Option<u64>,
}

/// What happened to a sample handed to [`SampleHistory::append`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Append {
    /// First sample; stored as the baseline, nothing derived.
    Primed,
    /// Timestamp not after the previous one; sample dropped.
    Skipped,
    Advanced { delta: CounterDelta, rate: RateSample },
}

pub struct SampleHistory {
    previous: Option<CounterSample>,
    rates: VecDeque<RateSample>,
    window: Duration,
    capacity: usize,
}

impl SampleHistory {
    pub fn new(window: Duration, tick_interval: Duration) -> Self {
        let window = window.max(Duration::from_secs(1));
        let capacity = Self::capacity_for(window, tick_interval);
        Self {
            previous: None,
            rates: VecDeque::with_capacity(capacity.min(1024)),
            window,
            capacity,
        }
    }

    /// Applies a new window and tick interval; the baseline sample is kept
    /// and rates outside the new window are dropped right away.
    pub fn set_window(&mut self, window: Duration, tick_interval: Duration) {
        self.window = window.max(Duration::from_secs(1));
        self.capacity = Self::capacity_for(self.window, tick_interval);
        if let Some(latest) = self.rates.back().map(|r| r.timestamp) {
            self.evict(latest);
        }
    }

    /// Twice the rate samples needed to cover `window` at `tick_interval`,
    /// plus one. Ticks arriving early under scheduler jitter still fit; the
    /// time window does the eviction and the cap only bounds memory.
    pub fn capacity_for(window: Duration, tick_interval: Duration) -> usize {
        let tick = if tick_interval.is_zero() {
            DEFAULT_TICK_INTERVAL
        } else {
            tick_interval
        };
        let ticks = (window.as_secs_f64() / tick.as_secs_f64()).ceil() * 2.0;
        if ticks.is_finite() && ticks < MAX_RATE_SAMPLES as f64 {
            (ticks as usize + 1).clamp(2, MAX_RATE_SAMPLES)
        } else {
            MAX_RATE_SAMPLES
        }
    }

    pub fn append(&mut self, sample: CounterSample) -> Append {
        let Some(previous) = &self.previous else {
            self.previous = Some(sample);
            return Append::Primed;
        };

        let elapsed = match sample.timestamp.duration_since(previous.timestamp) {
            Ok(elapsed) if !elapsed.is_zero() => elapsed,
            _ => return Append::Skipped,
        };

        let delta = CounterDelta {
            elapsed,
            bytes_in: counter_delta(sample.bytes_in, previous.bytes_in),
            bytes_out: counter_delta(sample.bytes_out, previous.bytes_out),
            packets_in: optional_delta(sample.packets_in, previous.packets_in),
            packets_out: optional_delta(sample.packets_out, previous.packets_out),
        };

        let seconds = elapsed.as_secs_f64();
        let rate = RateSample {
            timestamp: sample.timestamp,
            bits_in_per_sec: delta.bytes_in as f64 * 8.0 / seconds,
            bits_out_per_sec: delta.bytes_out as f64 * 8.0 / seconds,
        };

        self.rates.push_back(rate);
        self.evict(sample.timestamp);
        self.previous = Some(sample);

        Append::Advanced { delta, rate }
    }

    fn evict(&mut self, now: SystemTime) {
        if let Some(cutoff) = now.checked_sub(self.window) {
            while self.rates.front().is_some_and(|r| r.timestamp < cutoff) {
                self.rates.pop_front();
            }
        }
        while self.rates.len() > self.capacity {
            self.rates.pop_front();
        }
    }

    /// Rate samples inside the averaging window, oldest first.
    pub fn rates(&self) -> &VecDeque<RateSample> {
        &self.rates
    }

    pub fn latest_rate(&self) -> Option<&RateSample> {
        self.rates.back()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn reset(&mut self) {
        self.previous = None;
        self.rates.clear();
    }
}

/// Delta between two readings of a monotonic counter. A lower reading is
/// taken as a restart from zero, so the delta is the new reading itself;
/// counter width is not known, so no wraparound reconstruction is attempted.
pub fn counter_delta(current: u64, previous: u64) -> u64 {
    if current >= previous {
        current - previous
    } else {
        current
    }
}

fn optional_delta(current: Option<u64>, previous: Option<u64>) -> Option<u64> {
    Some(counter_delta(current?, previous?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: f64, bytes_in: u64, bytes_out: u64) -> CounterSample {
        CounterSample::at(
            SystemTime::UNIX_EPOCH + Duration::from_secs_f64(secs),
            bytes_in,
            bytes_out,
        )
    }

    fn history(window_secs: u64) -> SampleHistory {
        SampleHistory::new(
            Duration::from_secs(window_secs),
            Duration::from_secs(1),
        )
    }

    #[test]
    fn test_first_sample_primes() {
        let mut h = history(300);
        assert_eq!(h.append(at(0.0, 0, 0)), Append::Primed);
        assert!(h.rates().is_empty());
        assert!(h.previous.is_some());
    }

    #[test]
    fn test_rate_in_bits_per_second() {
        let mut h = history(300);
        h.append(at(0.0, 0, 0));
        let Append::Advanced { delta, rate } = h.append(at(1.0, 125_000, 250)) else {
            panic!("expected a rate");
        };
        assert_eq!(delta.bytes_in, 125_000);
        assert_eq!(rate.bits_in_per_sec, 1_000_000.0);
        assert_eq!(rate.bits_out_per_sec, 2_000.0);
    }

    #[test]
    fn test_half_second_tick_doubles_rate() {
        let mut h = history(300);
        h.append(at(0.0, 0, 0));
        h.append(at(0.5, 1000, 0));
        assert_eq!(h.latest_rate().unwrap().bits_in_per_sec, 16_000.0);
    }

    #[test]
    fn test_non_positive_elapsed_is_skipped() {
        let mut h = history(300);
        h.append(at(10.0, 100, 100));
        assert_eq!(h.append(at(10.0, 200, 200)), Append::Skipped);
        assert_eq!(h.append(at(9.0, 300, 300)), Append::Skipped);

        // Baseline unchanged: the next good sample measures from t=10
        let Append::Advanced { delta, .. } = h.append(at(11.0, 400, 400)) else {
            panic!("expected a rate");
        };
        assert_eq!(delta.bytes_in, 300);
        assert_eq!(h.rates().len(), 1);
    }

    #[test]
    fn test_counter_reset_counts_new_value() {
        assert_eq!(counter_delta(500, 100), 400);
        assert_eq!(counter_delta(100, u32::MAX as u64 - 50), 100);
        assert_eq!(counter_delta(0, 10), 0);

        let mut h = history(300);
        h.append(at(0.0, 10_000, 10_000).with_packets(50, 50));
        let Append::Advanced { delta, rate } = h.append(at(1.0, 300, 20_000).with_packets(2, 60))
        else {
            panic!("expected a rate");
        };
        assert_eq!(delta.bytes_in, 300);
        assert_eq!(delta.packets_in, Some(2));
        assert_eq!(delta.packets_out, Some(10));
        assert!(rate.bits_in_per_sec >= 0.0);
    }

    #[test]
    fn test_missing_packets_yield_no_packet_delta() {
        let mut h = history(300);
        h.append(at(0.0, 0, 0));
        let Append::Advanced { delta, .. } = h.append(at(1.0, 1, 1).with_packets(1, 1)) else {
            panic!("expected a rate");
        };
        assert_eq!(delta.packets_in, None);
    }

    #[test]
    fn test_window_eviction() {
        let mut h = history(5);
        h.append(at(0.0, 0, 0));
        for t in 1..=10 {
            h.append(at(t as f64, t * 100, 0));
        }
        // Samples at t=5..=10 fall within [10 - 5, 10]
        assert_eq!(h.rates().len(), 6);
        assert_eq!(
            h.rates().front().unwrap().timestamp,
            SystemTime::UNIX_EPOCH + Duration::from_secs(5)
        );
    }

    #[test]
    fn test_capacity_bounds_memory() {
        assert_eq!(
            SampleHistory::capacity_for(Duration::from_secs(300), Duration::from_millis(500)),
            1201
        );
        assert_eq!(
            SampleHistory::capacity_for(Duration::from_secs(300), Duration::from_nanos(1)),
            MAX_RATE_SAMPLES
        );
        assert_eq!(
            SampleHistory::capacity_for(Duration::from_secs(1), Duration::from_secs(60)),
            3
        );

        // Configured for 100 s ticks but fed every second: capped at 7
        let mut h = SampleHistory::new(Duration::from_secs(300), Duration::from_secs(100));
        assert_eq!(h.capacity(), 7);
        h.append(at(0.0, 0, 0));
        for t in 1..=20 {
            h.append(at(t as f64, t, t));
        }
        assert_eq!(h.rates().len(), 7);
    }

    #[test]
    fn test_jittery_ticks_keep_the_whole_window() {
        // 5 s window at a nominal 1 s tick, ticks arriving every 0.6 s
        let mut h = history(5);
        h.append(at(0.0, 0, 0));
        for i in 1..=20 {
            h.append(at(i as f64 * 0.6, i * 100, 0));
        }
        // Rates at 7.2 s ..= 12.0 s fall within [12 - 5, 12]
        assert_eq!(h.rates().len(), 9);
        assert!(h.rates().len() <= h.capacity());
    }

    #[test]
    fn test_window_is_at_least_one_second() {
        let mut h = SampleHistory::new(Duration::ZERO, Duration::from_millis(500));
        assert_eq!(h.window, Duration::from_secs(1));
        h.set_window(Duration::ZERO, Duration::from_millis(500));
        assert_eq!(h.window, Duration::from_secs(1));
    }

    #[test]
    fn test_shrinking_window_drops_old_rates() {
        let mut h = history(300);
        h.append(at(0.0, 0, 0));
        for t in 1..=10 {
            h.append(at(t as f64, t * 100, 0));
        }
        assert_eq!(h.rates().len(), 10);

        h.set_window(Duration::from_secs(3), Duration::from_secs(1));
        assert_eq!(h.rates().len(), 4);
        assert_eq!(h.capacity(), 7);

        // Baseline kept: the next sample yields a rate, not a new prime
        assert!(matches!(h.append(at(11.0, 1100, 0)), Append::Advanced { .. }));
    }

    #[test]
    fn test_reset_forgets_baseline() {
        let mut h = history(300);
        h.append(at(0.0, 0, 0));
        h.append(at(1.0, 10, 10));
        h.reset();
        assert!(h.rates().is_empty());
        assert_eq!(h.append(at(2.0, 20, 20)), Append::Primed);
    }
}
