use std::collections::VecDeque;

/// Default floor for auto-scaled graphs, in bits per second.
pub const AUTO_SCALE_FLOOR: f64 = 1000.0;

/// The value mapped to full bar height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Deflection {
    Fixed(f64),
    Auto { floor: f64 },
}

impl Default for Deflection {
    fn default() -> Self {
        Self::Auto {
            floor: AUTO_SCALE_FLOOR,
        }
    }
}

impl Deflection {
    /// A configured cap in kbit/s; zero selects auto scaling.
    pub fn from_kbits(kbits: u64) -> Self {
        if kbits == 0 {
            Self::default()
        } else {
            Self::Fixed(kbits as f64 * 1000.0)
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Self::Auto { .. })
    }
}

/// Fixed-width scrolling series of rate values, most recent last.
///
/// Holds raw values only; scaling happens in [`GraphBuffer::render`].
#[derive(Debug, Clone)]
pub struct GraphBuffer {
    values: VecDeque<f64>,
    deflection: Deflection,
}

impl GraphBuffer {
    pub fn new(width: usize, deflection: Deflection) -> Self {
        Self {
            values: VecDeque::from(vec![0.0; width]),
            deflection,
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.values.is_empty() {
            return;
        }
        self.values.pop_front();
        self.values.push_back(value);
    }

    /// Changes the width, keeping the most recent values and padding the
    /// oldest end with zeros.
    pub fn resize(&mut self, width: usize) {
        while self.values.len() > width {
            self.values.pop_front();
        }
        while self.values.len() < width {
            self.values.push_front(0.0);
        }
    }

    pub fn scale(&self) -> f64 {
        match self.deflection {
            Deflection::Fixed(max) => max,
            Deflection::Auto { floor } => self
                .values
                .iter()
                .map(|v| v.abs())
                .filter(|v| v.is_finite())
                .fold(floor, f64::max),
        }
    }

    /// Bar height per buffered value, each within `[0, height]`.
    pub fn render(&self, height: u16) -> Vec<u16> {
        let scale = self.scale();
        self.values
            .iter()
            .map(|value| bar_height(*value, scale, height))
            .collect()
    }

    pub fn values(&self) -> &VecDeque<f64> {
        &self.values
    }

    pub fn width(&self) -> usize {
        self.values.len()
    }

    pub fn deflection(&self) -> Deflection {
        self.deflection
    }

    pub fn set_deflection(&mut self, deflection: Deflection) {
        self.deflection = deflection;
    }

    pub fn clear(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0.0);
    }
}

fn bar_height(value: f64, scale: f64, height: u16) -> u16 {
    if value.is_nan() || value <= 0.0 || scale.is_nan() || scale <= 0.0 {
        return 0;
    }
    let ratio = value / scale;
    if ratio >= 1.0 {
        return height;
    }
    ((ratio * f64::from(height)).floor() as u16).min(height)
}

/// Incoming and outgoing graphs of one device.
#[derive(Debug, Clone)]
pub struct TrafficGraphs {
    pub incoming: GraphBuffer,
    pub outgoing: GraphBuffer,
}

impl TrafficGraphs {
    pub fn new(width: usize, deflection_in: Deflection, deflection_out: Deflection) -> Self {
        Self {
            incoming: GraphBuffer::new(width, deflection_in),
            outgoing: GraphBuffer::new(width, deflection_out),
        }
    }

    pub fn push(&mut self, bits_in: f64, bits_out: f64) {
        self.incoming.push(bits_in);
        self.outgoing.push(bits_out);
    }

    pub fn resize(&mut self, width: usize) {
        self.incoming.resize(width);
        self.outgoing.resize(width);
    }
}
