//! Sample-rate-aware passive models: one-pole RC filters and the
//! capacitor/inductor blocks the emitted code instantiates.

use std::f64::consts::PI;

use super::diode::DENORMAL_GUARD;

/// One-pole RC low-pass: `y[n] = y[n-1] + α · (x[n] − y[n-1])` with
/// `α = dt / (RC + dt)`.
#[derive(Debug, Clone)]
pub struct RcLowPass {
    resistance: f64,
    capacitance: f64,
    alpha: f64,
    state: f64,
}

impl RcLowPass {
    pub fn new(resistance: f64, capacitance: f64) -> Self {
        Self {
            resistance,
            capacitance,
            alpha: 0.0,
            state: 0.0,
        }
    }

    /// Construct directly from a cutoff frequency.
    pub fn from_cutoff(cutoff_hz: f64) -> Self {
        // Split the time constant arbitrarily: R fixed at 1 kΩ
        let resistance = 1_000.0;
        let capacitance = 1.0 / (2.0 * PI * cutoff_hz * resistance);
        Self::new(resistance, capacitance)
    }

    pub fn cutoff(&self) -> f64 {
        1.0 / (2.0 * PI * self.resistance * self.capacitance)
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        let dt = 1.0 / sample_rate;
        let rc = self.resistance * self.capacitance;
        self.alpha = dt / (rc + dt);
        self.state = 0.0;
    }

    pub fn process(&mut self, x: f64) -> f64 {
        self.state += self.alpha * (x - self.state);
        if self.state.abs() < DENORMAL_GUARD {
            self.state = 0.0;
        }
        self.state
    }
}

/// One-pole RC high-pass, complementary to [`RcLowPass`].
#[derive(Debug, Clone)]
pub struct RcHighPass {
    lowpass: RcLowPass,
}

impl RcHighPass {
    pub fn new(resistance: f64, capacitance: f64) -> Self {
        Self {
            lowpass: RcLowPass::new(resistance, capacitance),
        }
    }

    pub fn cutoff(&self) -> f64 {
        self.lowpass.cutoff()
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        self.lowpass.prepare(sample_rate);
    }

    pub fn process(&mut self, x: f64) -> f64 {
        let low = self.lowpass.process(x);
        let y = x - low;
        if y.abs() < DENORMAL_GUARD {
            0.0
        } else {
            y
        }
    }
}

/// Series resistor against a nominal load: a frequency-independent
/// voltage divider.
#[derive(Debug, Clone, Copy)]
pub struct ResistorModel {
    pub resistance: f64,
}

impl ResistorModel {
    pub const NOMINAL_LOAD: f64 = 10_000.0;

    pub fn new(resistance: f64) -> Self {
        Self { resistance }
    }

    pub fn process(&self, x: f64) -> f64 {
        let y = x * Self::NOMINAL_LOAD / (self.resistance + Self::NOMINAL_LOAD);
        if y.abs() < DENORMAL_GUARD {
            0.0
        } else {
            y
        }
    }
}

/// Series capacitor with ESR, modeled as a high-pass against a nominal
/// load.
#[derive(Debug, Clone)]
pub struct CapacitorModel {
    pub capacitance: f64,
    pub esr: f64,
    filter: RcHighPass,
}

impl CapacitorModel {
    /// Nominal load the coupling path sees.
    pub const NOMINAL_LOAD: f64 = 10_000.0;

    pub fn new(capacitance: f64, esr: f64) -> Self {
        Self {
            capacitance,
            esr,
            filter: RcHighPass::new(Self::NOMINAL_LOAD + esr, capacitance),
        }
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        self.filter.prepare(sample_rate);
    }

    pub fn process(&mut self, x: f64) -> f64 {
        self.filter.process(x)
    }
}

/// Series inductor with DC resistance, modeled as a low-pass against a
/// nominal load.
#[derive(Debug, Clone)]
pub struct InductorModel {
    pub inductance: f64,
    pub dc_resistance: f64,
    alpha: f64,
    state: f64,
}

impl InductorModel {
    pub const NOMINAL_LOAD: f64 = 10_000.0;

    pub fn new(inductance: f64, dc_resistance: f64) -> Self {
        Self {
            inductance,
            dc_resistance,
            alpha: 0.0,
            state: 0.0,
        }
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        let dt = 1.0 / sample_rate;
        // Time constant τ = L / R_total
        let tau = self.inductance / (Self::NOMINAL_LOAD + self.dc_resistance);
        self.alpha = dt / (tau + dt);
        self.state = 0.0;
    }

    pub fn process(&mut self, x: f64) -> f64 {
        self.state += self.alpha * (x - self.state);
        if self.state.abs() < DENORMAL_GUARD {
            self.state = 0.0;
        }
        self.state
    }
}
