//! Shockley diode models: damped Newton-Raphson solver, precomputed
//! lookup table, and the clipping-stage wrapper the emitted code
//! instantiates.
//!
//! The implicit equation solved per sample is
//! `V_applied = V_diode + I_diode · R_load` with
//! `I_diode = I_s · (exp(V / (n·V_T)) − 1)`.

use crate::THERMAL_VOLTAGE;

/// Exponent clamp window applied before every `exp` evaluation.
pub const EXP_ARG_MIN: f64 = -50.0;
pub const EXP_ARG_MAX: f64 = 20.0;

/// Newton step damping factor.
pub const NR_DAMPING: f64 = 0.5;

/// Diode-voltage iterate clamp window.
pub const V_DIODE_MIN: f64 = -0.5;
pub const V_DIODE_MAX: f64 = 1.0;

/// Load resistance baked into the clipping-stage residual.
pub const CLIPPER_LOAD_RESISTANCE: f64 = 10_000.0;

/// Values whose magnitude falls below this are zeroed to keep denormals
/// out of the audio path.
pub const DENORMAL_GUARD: f64 = 1e-20;

/// Physical parameters of one diode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiodeCharacteristics {
    /// Saturation current I_s
    pub saturation_current: f64,
    /// Ideality factor n
    pub ideality: f64,
    /// Series resistance R_s
    pub series_resistance: f64,
    /// Zero-bias junction capacitance
    pub junction_capacitance: f64,
    /// Grading coefficient
    pub grading: f64,
}

impl DiodeCharacteristics {
    /// 1N4148 small-signal silicon switching diode.
    pub fn si_1n4148() -> Self {
        Self {
            saturation_current: 1.4e-14,
            ideality: 1.06,
            series_resistance: 0.25,
            junction_capacitance: 0.4e-12,
            grading: 0.4,
        }
    }

    /// 1N914 silicon signal diode.
    pub fn si_1n914() -> Self {
        Self {
            saturation_current: 2.6e-15,
            ideality: 1.04,
            series_resistance: 0.1,
            junction_capacitance: 0.95e-12,
            grading: 0.4,
        }
    }

    /// OA90 germanium diode; the higher ideality gives the softer knee.
    pub fn ge_oa90() -> Self {
        Self {
            saturation_current: 5.0e-15,
            ideality: 1.3,
            series_resistance: 0.5,
            junction_capacitance: 2.0e-12,
            grading: 0.5,
        }
    }

    /// 1N4007 silicon rectifier.
    pub fn si_1n4007() -> Self {
        Self {
            saturation_current: 1.0e-14,
            ideality: 1.08,
            series_resistance: 0.5,
            junction_capacitance: 0.8e-12,
            grading: 0.4,
        }
    }

    /// n·V_T product used throughout the solver.
    pub fn n_vt(&self) -> f64 {
        self.ideality * THERMAL_VOLTAGE
    }

    /// Shockley current at a diode voltage, exponent clamped.
    pub fn current(&self, v_diode: f64) -> f64 {
        let arg = (v_diode / self.n_vt()).clamp(EXP_ARG_MIN, EXP_ARG_MAX);
        self.saturation_current * (arg.exp() - 1.0)
    }

    /// Small-signal conductance dI/dV at a diode voltage.
    pub fn conductance(&self, v_diode: f64) -> f64 {
        let arg = (v_diode / self.n_vt()).clamp(EXP_ARG_MIN, EXP_ARG_MAX);
        (self.saturation_current / self.n_vt()) * arg.exp()
    }
}

/// Result of one Newton-Raphson solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiodeSolution {
    pub v_diode: f64,
    pub i_diode: f64,
    /// Iterations spent; equals the cap when the solver fell back to the
    /// last iterate
    pub iterations: usize,
    pub converged: bool,
}

/// Solver configuration. The audio-rate path uses a tight iteration cap
/// and tolerance; diagnostics can afford more.
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    pub max_iterations: usize,
    pub tolerance: f64,
    pub initial_guess: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            tolerance: 1e-6,
            initial_guess: 0.3,
        }
    }
}

/// Damped Newton-Raphson solver for the loaded diode equation.
#[derive(Debug, Clone)]
pub struct DiodeNewtonRaphson {
    chars: DiodeCharacteristics,
    load_resistance: f64,
}

impl DiodeNewtonRaphson {
    pub fn new(chars: DiodeCharacteristics, load_resistance: f64) -> Self {
        Self {
            chars,
            load_resistance,
        }
    }

    /// Solve `V_applied = V_diode + I(V_diode) · R_load`. Never fails:
    /// on non-convergence the last iterate is returned.
    pub fn solve(&self, v_applied: f64, config: &SolverConfig) -> DiodeSolution {
        let mut v = config.initial_guess;

        for iter in 0..config.max_iterations {
            let i = self.chars.current(v);
            let residual = v_applied - (v + i * self.load_resistance);

            if residual.abs() < config.tolerance {
                return DiodeSolution {
                    v_diode: v,
                    i_diode: i,
                    iterations: iter + 1,
                    converged: true,
                };
            }

            let jacobian = 1.0 + self.load_resistance * self.chars.conductance(v);
            v += NR_DAMPING * (residual / jacobian);
            v = v.clamp(V_DIODE_MIN, V_DIODE_MAX);
        }

        DiodeSolution {
            v_diode: v,
            i_diode: self.chars.current(v),
            iterations: config.max_iterations,
            converged: false,
        }
    }
}

/// Precomputed Shockley current table with linear interpolation.
#[derive(Debug, Clone)]
pub struct DiodeLut {
    table: Vec<f64>,
    chars: DiodeCharacteristics,
}

impl DiodeLut {
    pub const SIZE: usize = 512;
    pub const VOLTAGE_MIN: f64 = -10.0;
    pub const VOLTAGE_MAX: f64 = 0.7;

    pub fn new(chars: DiodeCharacteristics) -> Self {
        let mut table = Vec::with_capacity(Self::SIZE);
        for i in 0..Self::SIZE {
            let normalized = i as f64 / (Self::SIZE - 1) as f64;
            let v = Self::VOLTAGE_MIN + normalized * (Self::VOLTAGE_MAX - Self::VOLTAGE_MIN);
            table.push(chars.current(v));
        }
        Self { table, chars }
    }

    /// Interpolated diode current at a voltage, clamped to the window.
    pub fn current(&self, voltage: f64) -> f64 {
        let v = voltage.clamp(Self::VOLTAGE_MIN, Self::VOLTAGE_MAX);
        let normalized = (v - Self::VOLTAGE_MIN) / (Self::VOLTAGE_MAX - Self::VOLTAGE_MIN);
        let index_f = normalized * (Self::SIZE - 1) as f64;
        let i0 = index_f as usize;
        let i1 = (i0 + 1).min(Self::SIZE - 1);
        let frac = index_f - i0 as f64;
        self.table[i0] + frac * (self.table[i1] - self.table[i0])
    }

    /// Conductance is cheap enough to evaluate directly.
    pub fn conductance(&self, voltage: f64) -> f64 {
        let v = voltage.clamp(Self::VOLTAGE_MIN, Self::VOLTAGE_MAX);
        self.chars.conductance(v).clamp(1e-12, 1.0)
    }
}

/// Clipping-circuit shape around one diode model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipperTopology {
    Series,
    Parallel,
    BackToBack,
    Bridge,
}

/// Symmetric clip ceiling for the back-to-back topology.
pub const BACK_TO_BACK_CLIP_V: f64 = 0.6;

/// Hard ceiling for the bridge topology.
pub const BRIDGE_CLIP_V: f64 = 0.7;

/// Audio-rate diode clipping stage. Topology is fixed at construction.
#[derive(Debug, Clone)]
pub struct DiodeClippingStage {
    topology: ClipperTopology,
    solver: DiodeNewtonRaphson,
    config: SolverConfig,
}

impl DiodeClippingStage {
    pub fn new(chars: DiodeCharacteristics, topology: ClipperTopology) -> Self {
        Self {
            topology,
            solver: DiodeNewtonRaphson::new(chars, CLIPPER_LOAD_RESISTANCE),
            config: SolverConfig {
                max_iterations: 5,
                tolerance: 1e-5,
                initial_guess: 0.3,
            },
        }
    }

    /// Process one sample. Best effort: never returns an error, always
    /// returns a bounded value.
    pub fn process(&self, v_in: f64) -> f64 {
        let out = match self.topology {
            ClipperTopology::BackToBack => {
                // Symmetric conduction: solve on the magnitude, restore sign
                let sol = self.solver.solve(v_in.abs(), &self.config);
                (sol.v_diode * v_in.signum()).clamp(-BACK_TO_BACK_CLIP_V, BACK_TO_BACK_CLIP_V)
            }
            ClipperTopology::Series => self.solver.solve(v_in, &self.config).v_diode,
            ClipperTopology::Parallel => v_in * 0.5,
            ClipperTopology::Bridge => v_in.clamp(-BRIDGE_CLIP_V, BRIDGE_CLIP_V),
        };
        if out.abs() < DENORMAL_GUARD {
            0.0
        } else {
            out
        }
    }
}
