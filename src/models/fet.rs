//! Quadratic-law FET model with triode/saturation regions and
//! channel-length modulation. MOSFET and JFET families share it.

/// Physical parameters of one FET.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetCharacteristics {
    /// Transconductance parameter K_p
    pub kp: f64,
    /// Threshold voltage V_to (negative for P-channel)
    pub vto: f64,
    /// Channel-length modulation λ
    pub lambda: f64,
}

impl FetCharacteristics {
    pub fn nmos_2n7000() -> Self {
        Self {
            kp: 0.5e-3,
            vto: 1.5,
            lambda: 0.02,
        }
    }

    pub fn nmos_bs170() -> Self {
        Self {
            kp: 0.5e-3,
            vto: 1.5,
            lambda: 0.02,
        }
    }

    pub fn pmos_2n7002() -> Self {
        Self {
            kp: 0.5e-3,
            vto: -1.5,
            lambda: 0.02,
        }
    }

    /// N-channel JFET default used when only a part family is known.
    pub fn njfet_2n5457() -> Self {
        Self {
            kp: 1.0e-3,
            vto: -1.5,
            lambda: 0.01,
        }
    }
}

/// Conduction region of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetRegion {
    Cutoff,
    Triode,
    Saturation,
}

/// DC operating point of one FET.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetOperatingPoint {
    pub i_d: f64,
    pub v_gs: f64,
    pub v_ds: f64,
    pub g_m: f64,
    pub g_ds: f64,
    pub region: FetRegion,
}

/// Quadratic (square-law) FET model.
#[derive(Debug, Clone)]
pub struct FetModel {
    chars: FetCharacteristics,
}

impl FetModel {
    pub fn new(chars: FetCharacteristics) -> Self {
        Self { chars }
    }

    pub fn characteristics(&self) -> &FetCharacteristics {
        &self.chars
    }

    /// Solve the operating point for the given terminal voltages.
    pub fn operating_point(&self, v_gs: f64, v_ds: f64) -> FetOperatingPoint {
        let v_ov = v_gs - self.chars.vto;

        if v_ov <= 0.0 {
            return FetOperatingPoint {
                i_d: 1e-12,
                v_gs,
                v_ds,
                g_m: 0.0,
                g_ds: 0.0,
                region: FetRegion::Cutoff,
            };
        }

        let v_ds_sat = v_ov / 2.0;
        if v_ds >= v_ds_sat {
            let i_d = 0.5 * self.chars.kp * v_ov * v_ov * (1.0 + self.chars.lambda * v_ds);
            FetOperatingPoint {
                i_d,
                v_gs,
                v_ds,
                g_m: self.chars.kp * v_ov,
                g_ds: 0.5 * self.chars.kp * v_ov * v_ov * self.chars.lambda,
                region: FetRegion::Saturation,
            }
        } else {
            let i_d = self.chars.kp * (v_ov * v_ds - 0.5 * v_ds * v_ds);
            FetOperatingPoint {
                i_d,
                v_gs,
                v_ds,
                g_m: self.chars.kp * v_ds,
                g_ds: self.chars.kp * (v_ov - v_ds),
                region: FetRegion::Triode,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cutoff_below_threshold() {
        let model = FetModel::new(FetCharacteristics::nmos_2n7000());
        let op = model.operating_point(1.0, 5.0);
        assert_eq!(op.region, FetRegion::Cutoff);
        assert!(op.i_d < 1e-11);
    }

    #[test]
    fn test_saturation_current() {
        let model = FetModel::new(FetCharacteristics::nmos_2n7000());
        // Vov = 1.5, Vds = 5 well above Vds_sat = 0.75
        let op = model.operating_point(3.0, 5.0);
        assert_eq!(op.region, FetRegion::Saturation);
        let expected = 0.5 * 0.5e-3 * 1.5 * 1.5 * (1.0 + 0.02 * 5.0);
        assert_relative_eq!(op.i_d, expected, max_relative = 1e-12);
        assert_relative_eq!(op.g_m, 0.5e-3 * 1.5, max_relative = 1e-12);
    }

    #[test]
    fn test_triode_region() {
        let model = FetModel::new(FetCharacteristics::nmos_2n7000());
        // Vov = 1.5, Vds = 0.2 below Vds_sat
        let op = model.operating_point(3.0, 0.2);
        assert_eq!(op.region, FetRegion::Triode);
        let expected = 0.5e-3 * (1.5 * 0.2 - 0.5 * 0.2 * 0.2);
        assert_relative_eq!(op.i_d, expected, max_relative = 1e-12);
    }

    #[test]
    fn test_channel_length_modulation_increases_current() {
        let with = FetModel::new(FetCharacteristics::nmos_2n7000());
        let without = FetModel::new(FetCharacteristics {
            lambda: 0.0,
            ..FetCharacteristics::nmos_2n7000()
        });
        let a = with.operating_point(3.0, 10.0).i_d;
        let b = without.operating_point(3.0, 10.0).i_d;
        assert!(a > b);
    }
}
