//! Ebers-Moll BJT model: operating-point solver and the tanh soft-clip
//! gain stage the emitted code uses for transistor stages.

use crate::THERMAL_VOLTAGE;

use super::diode::{DENORMAL_GUARD, EXP_ARG_MIN};

/// V_ce below which the device is considered saturated.
pub const VCE_SAT: f64 = 0.2;

/// Exponent clamp for the collector-current evaluation. Wider than the
/// diode window because the solver never integrates the result.
pub const BJT_EXP_MAX: f64 = 50.0;

/// Effective ideality applied to V_be in the simplified solve.
const VBE_IDEALITY: f64 = 1.2;

/// Physical parameters of one bipolar transistor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BjtCharacteristics {
    /// Forward current gain β_F
    pub beta_f: f64,
    /// Reverse current gain β_R
    pub beta_r: f64,
    /// Saturation current I_s
    pub saturation_current: f64,
    /// Early voltage V_AF
    pub early_voltage: f64,
    /// dV_be/dT in V/°C
    pub temp_coeff_vbe: f64,
    pub is_pnp: bool,
}

impl BjtCharacteristics {
    pub fn npn_2n3904() -> Self {
        Self {
            beta_f: 416.4,
            beta_r: 0.1,
            saturation_current: 5.84e-14,
            early_voltage: 74.03,
            temp_coeff_vbe: -0.002,
            is_pnp: false,
        }
    }

    pub fn npn_2n2222() -> Self {
        Self {
            beta_f: 255.9,
            beta_r: 0.1,
            saturation_current: 14.34e-14,
            early_voltage: 200.0,
            temp_coeff_vbe: -0.002,
            is_pnp: false,
        }
    }

    pub fn npn_bc107() -> Self {
        Self {
            beta_f: 312.6,
            beta_r: 0.1,
            saturation_current: 8.07e-14,
            early_voltage: 95.35,
            temp_coeff_vbe: -0.002,
            is_pnp: false,
        }
    }

    pub fn pnp_2n3906() -> Self {
        Self {
            beta_f: 408.8,
            beta_r: 0.1,
            saturation_current: 9.57e-14,
            early_voltage: 95.0,
            temp_coeff_vbe: -0.002,
            is_pnp: true,
        }
    }
}

/// DC operating point of one device in a resistively loaded stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BjtOperatingPoint {
    pub v_be: f64,
    pub v_ce: f64,
    pub v_bc: f64,
    pub i_c: f64,
    pub i_b: f64,
    /// Transconductance dI_c/dV_be
    pub g_m: f64,
    /// Output resistance from the Early effect
    pub r_ce: f64,
    pub is_saturated: bool,
}

/// Ebers-Moll large-signal model.
#[derive(Debug, Clone)]
pub struct BjtModel {
    chars: BjtCharacteristics,
}

impl BjtModel {
    pub fn new(chars: BjtCharacteristics) -> Self {
        Self { chars }
    }

    pub fn characteristics(&self) -> &BjtCharacteristics {
        &self.chars
    }

    /// Solve the operating point for a base bias, supply voltage, and
    /// collector resistor. Best effort: currents are clamped finite.
    pub fn operating_point(&self, v_be: f64, v_cc: f64, r_c: f64) -> BjtOperatingPoint {
        let n_vt = VBE_IDEALITY * THERMAL_VOLTAGE;
        let arg = (v_be / n_vt).clamp(EXP_ARG_MIN, BJT_EXP_MAX);
        let i_c = self.chars.saturation_current * (arg.exp() - 1.0);
        let v_ce = v_cc - i_c * r_c;
        let g_m = (self.chars.saturation_current / n_vt) * arg.exp();
        let r_ce = if i_c.abs() > DENORMAL_GUARD {
            self.chars.early_voltage / i_c
        } else {
            f64::INFINITY
        };

        BjtOperatingPoint {
            v_be,
            v_ce,
            v_bc: v_be - 0.5,
            i_c,
            i_b: i_c / self.chars.beta_f,
            g_m,
            r_ce,
            is_saturated: v_ce < VCE_SAT,
        }
    }
}

/// Per-sample transistor gain stage with tanh soft clipping.
#[derive(Debug, Clone)]
pub struct TransistorClippingStage {
    model: BjtModel,
    /// Small-signal gain derived from the bias point at `prepare`
    gain: f64,
}

impl TransistorClippingStage {
    /// Typical bias used when the schematic gives no operating point.
    pub const BIAS_VBE: f64 = 0.7;
    pub const BIAS_VCC: f64 = 5.0;
    pub const BIAS_RC: f64 = 1_000.0;

    pub fn new(chars: BjtCharacteristics) -> Self {
        let model = BjtModel::new(chars);
        let op = model.operating_point(Self::BIAS_VBE, Self::BIAS_VCC, Self::BIAS_RC);
        let gain = 10.0 * op.g_m * Self::BIAS_RC;
        Self { model, gain }
    }

    pub fn model(&self) -> &BjtModel {
        &self.model
    }

    /// One sample through the stage: linear gain into a tanh limiter.
    /// Output magnitude is bounded by 1.
    pub fn process(&self, x: f64) -> f64 {
        let polarity = if self.model.chars.is_pnp { -1.0 } else { 1.0 };
        let y = (polarity * x * self.gain).tanh();
        if y.abs() < DENORMAL_GUARD {
            0.0
        } else {
            y
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_operating_point_active_region() {
        let model = BjtModel::new(BjtCharacteristics::npn_2n3904());
        let op = model.operating_point(0.65, 9.0, 4_700.0);
        assert!(op.i_c > 0.0);
        assert!(op.i_b > 0.0);
        assert_relative_eq!(op.i_b, op.i_c / 416.4, max_relative = 1e-12);
        assert!(op.g_m > 0.0);
        assert!(op.r_ce.is_finite());
    }

    #[test]
    fn test_saturation_detected() {
        let model = BjtModel::new(BjtCharacteristics::npn_2n3904());
        // Hard overdrive: collector resistor drops nearly all of Vcc
        let op = model.operating_point(0.75, 5.0, 100_000.0);
        assert!(op.is_saturated);
        assert!(op.v_ce < VCE_SAT);
    }

    #[test]
    fn test_cutoff_region() {
        let model = BjtModel::new(BjtCharacteristics::npn_2n2222());
        let op = model.operating_point(0.0, 9.0, 1_000.0);
        assert!(op.i_c.abs() < 1e-12);
        assert!(!op.is_saturated);
    }

    #[test]
    fn test_soft_clip_bounded() {
        let stage = TransistorClippingStage::new(BjtCharacteristics::npn_2n3904());
        for x in [-1.0, -0.1, 0.0, 0.1, 1.0] {
            assert!(stage.process(x).abs() <= 1.0);
        }
    }

    #[test]
    fn test_pnp_inverts() {
        let npn = TransistorClippingStage::new(BjtCharacteristics::npn_2n3904());
        let pnp = TransistorClippingStage::new(BjtCharacteristics::pnp_2n3906());
        assert!(npn.process(0.1) > 0.0);
        assert!(pnp.process(0.1) < 0.0);
    }
}
