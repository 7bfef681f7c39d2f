//! Settings that can be changed while the monitor is running.
//!
//! The panel lists one row per [`OptionField`]; arrow keys move the
//! selection and `+`/`-` step the selected value. Numeric fields live in
//! [`Config`] so that a later save writes them out unchanged.

use crate::config::Config;
use crate::units::Unit;
use crate::validation::{MAX_BANDWIDTH, MAX_REFRESH_INTERVAL};

const AVERAGE_WINDOW_STEP: u64 = 10;
const MIN_AVERAGE_WINDOW: u64 = 10;
const MAX_AVERAGE_WINDOW: u64 = 3600;

const REFRESH_STEP: u64 = 100;
const MIN_REFRESH_INTERVAL: u64 = 100;

/// Smallest fixed bar scale in kbit/s; halving below it switches to auto.
const MIN_FIXED_BAR_MAX: u64 = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionField {
    AverageWindow,
    MaxIncoming,
    MaxOutgoing,
    RefreshInterval,
    TrafficUnit,
    DataUnit,
    MultipleDevices,
}

impl OptionField {
    pub const ALL: [Self; 7] = [
        Self::AverageWindow,
        Self::MaxIncoming,
        Self::MaxOutgoing,
        Self::RefreshInterval,
        Self::TrafficUnit,
        Self::DataUnit,
        Self::MultipleDevices,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::AverageWindow => "Average window",
            Self::MaxIncoming => "Max incoming",
            Self::MaxOutgoing => "Max outgoing",
            Self::RefreshInterval => "Refresh interval",
            Self::TrafficUnit => "Traffic unit",
            Self::DataUnit => "Data unit",
            Self::MultipleDevices => "Multiple devices",
        }
    }

    /// Steps a numeric setting stored in `config`. Returns whether the value
    /// changed; unit and view fields are not stored here and never change.
    pub fn adjust(&self, config: &mut Config, step: Step) -> bool {
        match self {
            Self::AverageWindow => {
                let window = step_linear(
                    u64::from(config.average_window),
                    step,
                    AVERAGE_WINDOW_STEP,
                    MIN_AVERAGE_WINDOW,
                    MAX_AVERAGE_WINDOW,
                );
                replace(&mut config.average_window, window as u32)
            }
            Self::MaxIncoming => {
                let max = step_bar_max(config.max_incoming, step);
                replace(&mut config.max_incoming, max)
            }
            Self::MaxOutgoing => {
                let max = step_bar_max(config.max_outgoing, step);
                replace(&mut config.max_outgoing, max)
            }
            Self::RefreshInterval => {
                let interval = step_linear(
                    config.refresh_interval,
                    step,
                    REFRESH_STEP,
                    MIN_REFRESH_INTERVAL,
                    MAX_REFRESH_INTERVAL,
                );
                replace(&mut config.refresh_interval, interval)
            }
            Self::TrafficUnit | Self::DataUnit | Self::MultipleDevices => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Up,
    Down,
}

impl Step {
    pub fn cycle(&self, unit: Unit) -> Unit {
        match self {
            Self::Up => unit.next(),
            Self::Down => unit.previous(),
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

/// Values already outside `[min, max]` only move back towards the range.
fn step_linear(value: u64, step: Step, amount: u64, min: u64, max: u64) -> u64 {
    match step {
        Step::Up if value >= max => value,
        Step::Up => value.saturating_add(amount).min(max),
        Step::Down if value <= min => value,
        Step::Down => value.saturating_sub(amount).max(min),
    }
}

/// Doubles or halves a bar scale in kbit/s; 0 is auto scaling.
fn step_bar_max(kbits: u64, step: Step) -> u64 {
    match step {
        Step::Up if kbits == 0 => MIN_FIXED_BAR_MAX,
        Step::Up => kbits.saturating_mul(2).min(MAX_BANDWIDTH),
        Step::Down if kbits / 2 < MIN_FIXED_BAR_MAX => 0,
        Step::Down => kbits / 2,
    }
}

/// Visibility and selected row of the options panel.
#[derive(Debug, Clone, Default)]
pub struct OptionsPanel {
    pub visible: bool,
    selected: usize,
}

impl OptionsPanel {
    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn selected(&self) -> OptionField {
        OptionField::ALL[self.selected]
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % OptionField::ALL.len();
    }

    pub fn select_previous(&mut self) {
        let count = OptionField::ALL.len();
        self.selected = (self.selected + count - 1) % count;
    }
}
