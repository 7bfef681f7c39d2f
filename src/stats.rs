use crate::history::{Append, CounterDelta, SampleHistory};
use crate::device::CounterSample;
use std::time::Duration;

/// Everything the rendering surface shows for one device. Rates are in
/// bits per second, totals in bytes and packets.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DisplayStats {
    pub current_in: f64,
    pub current_out: f64,
    pub average_in: f64,
    pub average_out: f64,
    pub min_in: f64,
    pub max_in: f64,
    pub min_out: f64,
    pub max_out: f64,
    pub total_in: u64,
    pub total_out: u64,
    pub total_packets_in: u64,
    pub total_packets_out: u64,
}

#[derive(Debug, Clone, Copy)]
struct Extrema {
    min: f64,
    max: f64,
}

impl Extrema {
    fn observe(slot: &mut Option<Self>, value: f64) {
        match slot {
            Some(e) => {
                e.min = e.min.min(value);
                e.max = e.max.max(value);
            }
            None => *slot = Some(Self { min: value, max: value }),
        }
    }
}

/// Turns counter samples into rates, windowed averages, lifetime extrema and
/// running totals for one device.
pub struct StatisticsEngine {
    history: SampleHistory,

    extrema_in: Option<Extrema>,
    extrema_out: Option<Extrema>,

    // Sums of observed deltas since tracking began
    total_bytes_in: u64,
    total_bytes_out: u64,
    total_packets_in: u64,
    total_packets_out: u64,

    stats: DisplayStats,
}

impl StatisticsEngine {
    pub fn new(window: Duration, tick_interval: Duration) -> Self {
        Self {
            history: SampleHistory::new(window, tick_interval),
            extrema_in: None,
            extrema_out: None,
            total_bytes_in: 0,
            total_bytes_out: 0,
            total_packets_in: 0,
            total_packets_out: 0,
            stats: DisplayStats::default(),
        }
    }

    /// Feeds one counter sample and refreshes the derived statistics.
    pub fn add_sample(&mut self, sample: CounterSample) -> Append {
        let outcome = self.history.append(sample);
        if let Append::Advanced { delta, rate } = outcome {
            self.accumulate(&delta);
            Extrema::observe(&mut self.extrema_in, rate.bits_in_per_sec);
            Extrema::observe(&mut self.extrema_out, rate.bits_out_per_sec);
            self.stats = self.recompute();
        }
        outcome
    }

    fn accumulate(&mut self, delta: &CounterDelta) {
        self.total_bytes_in = self.total_bytes_in.saturating_add(delta.bytes_in);
        self.total_bytes_out = self.total_bytes_out.saturating_add(delta.bytes_out);
        if let Some(packets) = delta.packets_in {
            self.total_packets_in = self.total_packets_in.saturating_add(packets);
        }
        if let Some(packets) = delta.packets_out {
            self.total_packets_out = self.total_packets_out.saturating_add(packets);
        }
    }

    pub fn recompute(&self) -> DisplayStats {
        let rates = self.history.rates();
        let (current_in, current_out) = self
            .history
            .latest_rate()
            .map_or((0.0, 0.0), |r| (r.bits_in_per_sec, r.bits_out_per_sec));

        let (average_in, average_out) = if rates.is_empty() {
            (0.0, 0.0)
        } else {
            let count = rates.len() as f64;
            let (sum_in, sum_out) = rates.iter().fold((0.0, 0.0), |(a, b), r| {
                (a + r.bits_in_per_sec, b + r.bits_out_per_sec)
            });
            (sum_in / count, sum_out / count)
        };

        let extrema_in = self.extrema_in.unwrap_or(Extrema { min: 0.0, max: 0.0 });
        let extrema_out = self.extrema_out.unwrap_or(Extrema { min: 0.0, max: 0.0 });

        DisplayStats {
            current_in,
            current_out,
            average_in,
            average_out,
            min_in: extrema_in.min,
            max_in: extrema_in.max,
            min_out: extrema_out.min,
            max_out: extrema_out.max,
            total_in: self.total_bytes_in,
            total_out: self.total_bytes_out,
            total_packets_in: self.total_packets_in,
            total_packets_out: self.total_packets_out,
        }
    }

    /// Changes the averaging window; lifetime extrema and totals are kept.
    pub fn set_window(&mut self, window: Duration, tick_interval: Duration) {
        self.history.set_window(window, tick_interval);
        self.stats = self.recompute();
    }

    /// Statistics as of the last sample that produced a rate.
    pub fn stats(&self) -> &DisplayStats {
        &self.stats
    }

    pub fn history(&self) -> &SampleHistory {
        &self.history
    }

    pub fn sample_count(&self) -> usize {
        self.history.rates().len()
    }

    pub fn reset(&mut self) {
        self.history.reset();
        self.extrema_in = None;
        self.extrema_out = None;
        self.total_bytes_in = 0;
        self.total_bytes_out = 0;
        self.total_packets_in = 0;
        self.total_packets_out = 0;
        self.stats = DisplayStats::default();
    }
}
