//! The immutable part database: manufacturer part numbers mapped to
//! characteristic parameter blocks.
//!
//! Matching is case-sensitive against the curated list; callers
//! normalize before lookup. Unknown parts resolve to the family default
//! through the `*_or_default` accessors.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::bjt::BjtCharacteristics;
use super::diode::DiodeCharacteristics;
use super::fet::FetCharacteristics;
use super::opamp::OpAmpCharacteristics;

/// Minimal triode block; enough for the emitted tube-stage preamble.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriodeCharacteristics {
    /// Amplification factor µ
    pub mu: f64,
    /// Plate resistance in ohms
    pub plate_resistance: f64,
}

impl TriodeCharacteristics {
    pub fn t12ax7() -> Self {
        Self {
            mu: 100.0,
            plate_resistance: 62_500.0,
        }
    }
}

/// Process-wide immutable part catalog.
#[derive(Debug)]
pub struct PartDatabase {
    diodes: HashMap<&'static str, DiodeCharacteristics>,
    bjts: HashMap<&'static str, BjtCharacteristics>,
    fets: HashMap<&'static str, FetCharacteristics>,
    opamps: HashMap<&'static str, OpAmpCharacteristics>,
    triodes: HashMap<&'static str, TriodeCharacteristics>,
}

static DATABASE: Lazy<PartDatabase> = Lazy::new(|| {
    let mut diodes = HashMap::new();
    diodes.insert("1N4148", DiodeCharacteristics::si_1n4148());
    diodes.insert("1N914", DiodeCharacteristics::si_1n914());
    diodes.insert("OA90", DiodeCharacteristics::ge_oa90());
    diodes.insert("1N4007", DiodeCharacteristics::si_1n4007());

    let mut bjts = HashMap::new();
    bjts.insert("2N3904", BjtCharacteristics::npn_2n3904());
    bjts.insert("2N2222", BjtCharacteristics::npn_2n2222());
    bjts.insert("BC107", BjtCharacteristics::npn_bc107());
    bjts.insert("2N3906", BjtCharacteristics::pnp_2n3906());

    let mut fets = HashMap::new();
    fets.insert("2N7000", FetCharacteristics::nmos_2n7000());
    fets.insert("BS170", FetCharacteristics::nmos_bs170());
    fets.insert("2N7002", FetCharacteristics::pmos_2n7002());
    fets.insert("2N5457", FetCharacteristics::njfet_2n5457());

    let mut opamps = HashMap::new();
    opamps.insert("TL072", OpAmpCharacteristics::tl072());
    opamps.insert("UA741", OpAmpCharacteristics::ua741());

    let mut triodes = HashMap::new();
    triodes.insert("12AX7", TriodeCharacteristics::t12ax7());

    PartDatabase {
        diodes,
        bjts,
        fets,
        opamps,
        triodes,
    }
});

/// The lazily initialized singleton. Immutable after first access.
pub fn database() -> &'static PartDatabase {
    &DATABASE
}

impl PartDatabase {
    pub fn lookup_diode(&self, part: &str) -> Option<DiodeCharacteristics> {
        self.diodes.get(part).copied()
    }

    pub fn diode_or_default(&self, part: &str) -> DiodeCharacteristics {
        self.lookup_diode(part)
            .unwrap_or_else(DiodeCharacteristics::si_1n4148)
    }

    pub fn lookup_bjt(&self, part: &str) -> Option<BjtCharacteristics> {
        self.bjts.get(part).copied()
    }

    pub fn bjt_or_default(&self, part: &str) -> BjtCharacteristics {
        self.lookup_bjt(part)
            .unwrap_or_else(BjtCharacteristics::npn_2n3904)
    }

    pub fn lookup_fet(&self, part: &str) -> Option<FetCharacteristics> {
        self.fets.get(part).copied()
    }

    pub fn fet_or_default(&self, part: &str) -> FetCharacteristics {
        self.lookup_fet(part)
            .unwrap_or_else(FetCharacteristics::njfet_2n5457)
    }

    pub fn lookup_opamp(&self, part: &str) -> Option<OpAmpCharacteristics> {
        self.opamps.get(part).copied()
    }

    pub fn opamp_or_default(&self, part: &str) -> OpAmpCharacteristics {
        self.lookup_opamp(part)
            .unwrap_or_else(OpAmpCharacteristics::tl072)
    }

    pub fn lookup_triode(&self, part: &str) -> Option<TriodeCharacteristics> {
        self.triodes.get(part).copied()
    }

    pub fn triode_or_default(&self, part: &str) -> TriodeCharacteristics {
        self.lookup_triode(part)
            .unwrap_or_else(TriodeCharacteristics::t12ax7)
    }

    /// Whether a part number exists in any family.
    pub fn contains(&self, part: &str) -> bool {
        self.diodes.contains_key(part)
            || self.bjts.contains_key(part)
            || self.fets.contains_key(part)
            || self.opamps.contains_key(part)
            || self.triodes.contains_key(part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_parts() {
        let db = database();
        assert!(db.lookup_diode("1N4148").is_some());
        assert!(db.lookup_bjt("2N3904").is_some());
        assert!(db.lookup_fet("BS170").is_some());
        assert!(db.lookup_opamp("TL072").is_some());
        assert!(db.contains("12AX7"));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let db = database();
        assert!(db.lookup_diode("1n4148").is_none());
        assert!(!db.contains("tl072"));
    }

    #[test]
    fn test_unknown_part_yields_default() {
        let db = database();
        assert_eq!(
            db.diode_or_default("D9999"),
            DiodeCharacteristics::si_1n4148()
        );
        assert_eq!(db.bjt_or_default(""), BjtCharacteristics::npn_2n3904());
    }
}
