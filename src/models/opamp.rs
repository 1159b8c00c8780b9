//! Behavioral op-amp model: finite open-loop gain, rail clamping, and
//! slew-rate limiting.

use super::diode::DENORMAL_GUARD;

/// Parameters of one op-amp part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpAmpCharacteristics {
    /// Open-loop DC gain
    pub open_loop_gain: f64,
    /// Slew rate in V/µs; 0 means unlimited
    pub slew_rate: f64,
    /// Supply rail magnitude; output clamps 0.5 V inside the rails
    pub rail_voltage: f64,
}

impl OpAmpCharacteristics {
    /// Near-ideal device, numerically finite.
    pub fn ideal() -> Self {
        Self {
            open_loop_gain: 1e9,
            slew_rate: 0.0,
            rail_voltage: 15.0,
        }
    }

    /// TL072 JFET-input op-amp.
    pub fn tl072() -> Self {
        Self {
            open_loop_gain: 2e5,
            slew_rate: 13.0,
            rail_voltage: 15.0,
        }
    }

    /// UA741 general-purpose op-amp.
    pub fn ua741() -> Self {
        Self {
            open_loop_gain: 2e5,
            slew_rate: 0.5,
            rail_voltage: 15.0,
        }
    }
}

/// Stateful behavioral op-amp. `prepare` binds the sample rate before
/// processing; the previous output is kept for slew limiting.
#[derive(Debug, Clone)]
pub struct OpAmpModel {
    chars: OpAmpCharacteristics,
    dt: f64,
    v_out: f64,
}

impl OpAmpModel {
    pub fn new(chars: OpAmpCharacteristics) -> Self {
        Self {
            chars,
            dt: 0.0,
            v_out: 0.0,
        }
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        self.dt = 1.0 / sample_rate;
        self.v_out = 0.0;
    }

    /// Differential input to rail-clamped, slew-limited output.
    pub fn process(&mut self, v_pos: f64, v_neg: f64) -> f64 {
        let target = (self.chars.open_loop_gain * (v_pos - v_neg)).clamp(
            -(self.chars.rail_voltage - 0.5),
            self.chars.rail_voltage - 0.5,
        );

        if self.chars.slew_rate > 0.0 && self.dt > 0.0 {
            let max_step = self.chars.slew_rate * 1e6 * self.dt;
            let step = (target - self.v_out).clamp(-max_step, max_step);
            self.v_out += step;
        } else {
            self.v_out = target;
        }

        if self.v_out.abs() < DENORMAL_GUARD {
            self.v_out = 0.0;
        }
        self.v_out
    }

    pub fn output_voltage(&self) -> f64 {
        self.v_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rail_clamp() {
        let mut amp = OpAmpModel::new(OpAmpCharacteristics::ideal());
        amp.prepare(48_000.0);
        let out = amp.process(1.0, 0.0);
        assert_relative_eq!(out, 14.5, max_relative = 1e-12);
    }

    #[test]
    fn test_slew_limit_bounds_step() {
        let mut amp = OpAmpModel::new(OpAmpCharacteristics::ua741());
        amp.prepare(48_000.0);
        let out = amp.process(1.0, 0.0);
        // 0.5 V/µs at 48 kHz: at most 10.416 V in one sample
        let max_step = 0.5 * 1e6 / 48_000.0;
        assert!(out <= max_step + 1e-9);
        // Second sample keeps slewing toward the rail
        let out2 = amp.process(1.0, 0.0);
        assert!(out2 > out);
    }

    #[test]
    fn test_unity_input_settles() {
        let mut amp = OpAmpModel::new(OpAmpCharacteristics::tl072());
        amp.prepare(48_000.0);
        for _ in 0..100 {
            amp.process(1e-3, 0.0);
        }
        // Gain clamped at the rails for this large differential input
        assert_relative_eq!(amp.output_voltage(), 14.5, max_relative = 1e-9);
    }
}
