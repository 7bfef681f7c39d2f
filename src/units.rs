//! Unit selection and number formatting for rates and volumes.
//!
//! Bit units scale by 1000, byte units by 1024. All inputs are bits (rates)
//! or bytes (volumes); formatting is pure and independent of sampling.

use std::fmt;

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Unit {
    #[value(name = "h")]
    HumanBit, // Auto-scale bits
    #[value(name = "H")]
    HumanByte, // Auto-scale bytes
    #[value(name = "b")]
    Bit,
    #[value(name = "B")]
    Byte,
    #[value(name = "k")]
    #[default]
    KiloBit,
    #[value(name = "K")]
    KiloByte,
    #[value(name = "m")]
    MegaBit,
    #[value(name = "M")]
    MegaByte,
    #[value(name = "g")]
    GigaBit,
    #[value(name = "G")]
    GigaByte,
}

const BIT_LABELS: [&str; 4] = ["bit", "kbit", "Mbit", "Gbit"];
const BYTE_LABELS: [&str; 4] = ["B", "kB", "MB", "GB"];

impl Unit {
    /// Cycle order used by the interactive unit toggle.
    #[must_use]
    pub fn next(&self) -> Self {
        match self {
            Self::HumanBit => Self::HumanByte,
            Self::HumanByte => Self::Bit,
            Self::Bit => Self::Byte,
            Self::Byte => Self::KiloBit,
            Self::KiloBit => Self::KiloByte,
            Self::KiloByte => Self::MegaBit,
            Self::MegaBit => Self::MegaByte,
            Self::MegaByte => Self::GigaBit,
            Self::GigaBit => Self::GigaByte,
            Self::GigaByte => Self::HumanBit,
        }
    }

    #[must_use]
    pub fn previous(&self) -> Self {
        let mut unit = *self;
        while unit.next() != *self {
            unit = unit.next();
        }
        unit
    }

    #[must_use]
    pub fn letter(&self) -> &'static str {
        match self {
            Self::HumanBit => "h",
            Self::HumanByte => "H",
            Self::Bit => "b",
            Self::Byte => "B",
            Self::KiloBit => "k",
            Self::KiloByte => "K",
            Self::MegaBit => "m",
            Self::MegaByte => "M",
            Self::GigaBit => "g",
            Self::GigaByte => "G",
        }
    }

    #[must_use]
    pub fn from_letter(s: &str) -> Option<Self> {
        match s {
            "h" => Some(Self::HumanBit),
            "H" => Some(Self::HumanByte),
            "b" => Some(Self::Bit),
            "B" => Some(Self::Byte),
            "k" => Some(Self::KiloBit),
            "K" => Some(Self::KiloByte),
            "m" => Some(Self::MegaBit),
            "M" => Some(Self::MegaByte),
            "g" => Some(Self::GigaBit),
            "G" => Some(Self::GigaByte),
            _ => None,
        }
    }

    pub fn is_bits(&self) -> bool {
        matches!(
            self,
            Self::HumanBit | Self::Bit | Self::KiloBit | Self::MegaBit | Self::GigaBit
        )
    }

    /// Fixed power for non-auto units (0 = bit/byte, 3 = giga).
    fn power(&self) -> Option<i32> {
        match self {
            Self::HumanBit | Self::HumanByte => None,
            Self::Bit | Self::Byte => Some(0),
            Self::KiloBit | Self::KiloByte => Some(1),
            Self::MegaBit | Self::MegaByte => Some(2),
            Self::GigaBit | Self::GigaByte => Some(3),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::HumanBit => "Human Readable (Bit)",
            Self::HumanByte => "Human Readable (Byte)",
            Self::Bit => "Bit",
            Self::Byte => "Byte",
            Self::KiloBit => "kBit",
            Self::KiloByte => "kByte",
            Self::MegaBit => "MBit",
            Self::MegaByte => "MByte",
            Self::GigaBit => "GBit",
            Self::GigaByte => "GByte",
        };
        f.write_str(name)
    }
}

/// Expresses `bits` in `unit`, returning the magnitude and its label.
///
/// Auto units pick the largest unit whose displayed magnitude is at least 1,
/// falling back to the smallest one for values below 1 bit (or byte). A
/// value that would round up to a whole next unit (`1000 kbit`) is shown in
/// that unit instead.
pub fn scale(bits: f64, unit: Unit) -> (f64, &'static str) {
    let bits = if bits.is_finite() { bits.max(0.0) } else { 0.0 };
    let (base, factor, labels) = if unit.is_bits() {
        (bits, 1000.0_f64, &BIT_LABELS)
    } else {
        (bits / 8.0, 1024.0_f64, &BYTE_LABELS)
    };
    let top = labels.len() as i32 - 1;

    let power = unit.power().unwrap_or_else(|| {
        let power = (1..=top)
            .rev()
            .find(|p| base / factor.powi(*p) >= 1.0)
            .unwrap_or(0);
        if power < top && round_to_display(base / factor.powi(power)) >= factor {
            power + 1
        } else {
            power
        }
    });

    (base / factor.powi(power), labels[power as usize])
}

/// `1500000.0` bits/s in [`Unit::HumanBit`] gives `"1.5 Mbit/s"`.
pub fn format_rate(bits_per_sec: f64, unit: Unit) -> String {
    let (magnitude, label) = scale(bits_per_sec, unit);
    format!("{} {label}/s", format_magnitude(magnitude))
}

pub fn format_volume(bytes: u64, unit: Unit) -> String {
    let (magnitude, label) = scale(bytes as f64 * 8.0, unit);
    format!("{} {label}", format_magnitude(magnitude))
}

/// Two decimals at most, without trailing zeros.
pub fn format_magnitude(value: f64) -> String {
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn round_to_display(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Multiplier turning a magnitude in `label` back into bits.
pub fn label_factor(label: &str) -> Option<f64> {
    if let Some(p) = BIT_LABELS.iter().position(|l| *l == label) {
        return Some(1000.0_f64.powi(p as i32));
    }
    BYTE_LABELS
        .iter()
        .position(|l| *l == label)
        .map(|p| 8.0 * 1024.0_f64.powi(p as i32))
}
