//! DSP model mapping: choose a numerical-model kind and a typed
//! parameter block for each schematic component.

use std::fmt;

use crate::schematic::{Component, ComponentKind, ComponentRef, Netlist};

/// Default component values applied when an attribute is absent or
/// fails to parse as a unit-suffixed number.
pub const DEFAULT_RESISTANCE: f64 = 1_000.0;
pub const DEFAULT_CAPACITANCE: f64 = 1e-6;
pub const DEFAULT_ESR: f64 = 0.1;
pub const DEFAULT_INDUCTANCE: f64 = 1e-3;
pub const DEFAULT_DC_RESISTANCE: f64 = 1.0;
pub const DEFAULT_TEMPERATURE_C: f64 = 25.0;

pub const DEFAULT_DIODE_PART: &str = "1N4148";
pub const DEFAULT_BJT_PART: &str = "2N3904";
pub const DEFAULT_JFET_PART: &str = "2N5457";
pub const DEFAULT_OPAMP_PART: &str = "TL072";
pub const DEFAULT_TRIODE_PART: &str = "12AX7";

/// The closed set of numerical-model kinds the emitter can instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Resistor,
    Capacitor,
    Inductor,
    Diode,
    Bjt,
    Jfet,
    OpAmp,
    Triode,
    Pentode,
    Transformer,
    SoftClipper,
    Unknown,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModelKind::Resistor => "Resistor",
            ModelKind::Capacitor => "Capacitor",
            ModelKind::Inductor => "Inductor",
            ModelKind::Diode => "Diode",
            ModelKind::Bjt => "BJT",
            ModelKind::Jfet => "JFET",
            ModelKind::OpAmp => "OpAmp",
            ModelKind::Triode => "Triode",
            ModelKind::Pentode => "Pentode",
            ModelKind::Transformer => "Transformer",
            ModelKind::SoftClipper => "SoftClipper",
            ModelKind::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// Typed per-instance parameters for one mapped component.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelParams {
    Resistor {
        resistance: f64,
    },
    Capacitor {
        capacitance: f64,
        esr: f64,
    },
    Inductor {
        inductance: f64,
        dc_resistance: f64,
    },
    Diode {
        part_number: String,
        temperature: f64,
    },
    Bjt {
        part_number: String,
        temperature: f64,
        is_pnp: bool,
    },
    Jfet {
        part_number: String,
    },
    OpAmp {
        part_number: String,
    },
    Triode {
        part_number: String,
    },
    None,
}

/// Reference to a nonlinear device inside a stage, carrying everything
/// the emitter needs to construct its model object.
#[derive(Debug, Clone)]
pub struct NonlinearRef {
    pub component: ComponentRef,
    pub source_name: String,
    pub kind: ModelKind,
    pub part_number: String,
    pub is_pnp: bool,
}

/// Tube part indicators checked before the FET table.
const TRIODE_MARKERS: &[&str] = &["12A", "EL", "6L6", "TRIODE"];

/// FET part indicators; MOSFET families are grouped under JFET.
const JFET_MARKERS: &[&str] = &[
    "JFET", "FET", "MOSFET", "NMOS", "PMOS", "2N7000", "BS170", "2N5",
];

/// PNP indicators for Ebers-Moll polarity.
const PNP_MARKERS: &[&str] = &["PNP", "2N3906", "BC557"];

/// The part-number-ish text of a component, read from the first present
/// of `PartNumber`, `Model`, `Type`.
pub fn part_text(component: &Component) -> String {
    component
        .attr("PartNumber")
        .or_else(|| component.attr("Model"))
        .or_else(|| component.attr("Type"))
        .unwrap_or("")
        .to_string()
}

/// Classify a transistor into BJT, JFET, or Triode.
///
/// Priority: an `M` name prefix wins (MOSFET drawing convention), then
/// tube markers in the part text, then FET markers, else BJT.
pub fn classify_transistor(name: &str, part: &str) -> ModelKind {
    if name.starts_with('M') {
        return ModelKind::Jfet;
    }
    let upper = part.to_uppercase();
    if TRIODE_MARKERS.iter().any(|m| upper.contains(m)) {
        return ModelKind::Triode;
    }
    if JFET_MARKERS.iter().any(|m| upper.contains(m)) {
        return ModelKind::Jfet;
    }
    ModelKind::Bjt
}

/// Whether a BJT's markings indicate a PNP device.
pub fn is_likely_pnp(part: &str) -> bool {
    let upper = part.to_uppercase();
    PNP_MARKERS.iter().any(|m| upper.contains(m))
}

/// Map one component to its model kind and parameter block.
pub fn map_component(component: &Component) -> (ModelKind, ModelParams) {
    match component.kind {
        ComponentKind::Resistor
        | ComponentKind::VariableResistor
        | ComponentKind::Potentiometer => {
            let resistance = component
                .attr_value(&["Resistance", "Value", "R"])
                .unwrap_or(DEFAULT_RESISTANCE);
            (ModelKind::Resistor, ModelParams::Resistor { resistance })
        }
        ComponentKind::Capacitor => {
            let capacitance = component
                .attr_value(&["Capacitance", "Value", "C"])
                .unwrap_or(DEFAULT_CAPACITANCE);
            let esr = component.attr_value(&["ESR"]).unwrap_or(DEFAULT_ESR);
            (ModelKind::Capacitor, ModelParams::Capacitor { capacitance, esr })
        }
        ComponentKind::Inductor => {
            let inductance = component
                .attr_value(&["Inductance", "Value", "L"])
                .unwrap_or(DEFAULT_INDUCTANCE);
            let dc_resistance = component
                .attr_value(&["DCR", "DCResistance"])
                .unwrap_or(DEFAULT_DC_RESISTANCE);
            (
                ModelKind::Inductor,
                ModelParams::Inductor {
                    inductance,
                    dc_resistance,
                },
            )
        }
        ComponentKind::Diode => {
            let part = part_text(component);
            let part_number = if part.is_empty() {
                DEFAULT_DIODE_PART.to_string()
            } else {
                part
            };
            (
                ModelKind::Diode,
                ModelParams::Diode {
                    part_number,
                    temperature: DEFAULT_TEMPERATURE_C,
                },
            )
        }
        ComponentKind::Transistor => {
            let part = part_text(component);
            let kind = classify_transistor(&component.name, &part);
            match kind {
                ModelKind::Jfet => {
                    let part_number = if part.is_empty() {
                        DEFAULT_JFET_PART.to_string()
                    } else {
                        part
                    };
                    (kind, ModelParams::Jfet { part_number })
                }
                ModelKind::Triode => {
                    let part_number = if part.is_empty() {
                        DEFAULT_TRIODE_PART.to_string()
                    } else {
                        part
                    };
                    (kind, ModelParams::Triode { part_number })
                }
                _ => {
                    let is_pnp = is_likely_pnp(&part);
                    let part_number = if part.is_empty() {
                        DEFAULT_BJT_PART.to_string()
                    } else {
                        part
                    };
                    (
                        ModelKind::Bjt,
                        ModelParams::Bjt {
                            part_number,
                            temperature: DEFAULT_TEMPERATURE_C,
                            is_pnp,
                        },
                    )
                }
            }
        }
        ComponentKind::OpAmp => {
            let part = part_text(component);
            let part_number = if part.is_empty() {
                DEFAULT_OPAMP_PART.to_string()
            } else {
                part
            };
            (ModelKind::OpAmp, ModelParams::OpAmp { part_number })
        }
        ComponentKind::Transformer => (ModelKind::Transformer, ModelParams::None),
        _ => (ModelKind::Unknown, ModelParams::None),
    }
}

/// A stage's primary model: the first active device in component order,
/// else the first passive, else Unknown.
pub fn primary_model(netlist: &Netlist, components: &[ComponentRef]) -> ModelKind {
    for &r in components {
        if let Some(c) = netlist.component(r) {
            if c.kind.is_active() {
                return map_component(c).0;
            }
        }
    }
    for &r in components {
        if let Some(c) = netlist.component(r) {
            if c.kind.is_passive() {
                return map_component(c).0;
            }
        }
    }
    ModelKind::Unknown
}

/// Collect the nonlinear device references of a stage, in component order.
pub fn nonlinear_refs(netlist: &Netlist, components: &[ComponentRef]) -> Vec<NonlinearRef> {
    let mut refs = Vec::new();
    for &r in components {
        let Some(c) = netlist.component(r) else { continue };
        match c.kind {
            ComponentKind::Diode => {
                let (kind, params) = map_component(c);
                if let ModelParams::Diode { part_number, .. } = params {
                    refs.push(NonlinearRef {
                        component: r,
                        source_name: c.name.clone(),
                        kind,
                        part_number,
                        is_pnp: false,
                    });
                }
            }
            ComponentKind::Transistor => {
                let (kind, params) = map_component(c);
                let (part_number, is_pnp) = match params {
                    ModelParams::Bjt {
                        part_number,
                        is_pnp,
                        ..
                    } => (part_number, is_pnp),
                    ModelParams::Jfet { part_number } | ModelParams::Triode { part_number } => {
                        (part_number, false)
                    }
                    _ => continue,
                };
                refs.push(NonlinearRef {
                    component: r,
                    source_name: c.name.clone(),
                    kind,
                    part_number,
                    is_pnp,
                });
            }
            _ => {}
        }
    }
    refs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schematic::{Attribute, Point};

    fn transistor(name: &str, part: &str) -> Component {
        Component {
            name: name.to_string(),
            kind: ComponentKind::Transistor,
            position: Point::new(0, 0),
            rotation: 0,
            flip: false,
            attributes: vec![Attribute {
                name: "PartNumber".to_string(),
                raw: part.to_string(),
            }],
            line: 1,
        }
    }

    #[test]
    fn test_name_prefix_selects_jfet() {
        assert_eq!(classify_transistor("M1", ""), ModelKind::Jfet);
    }

    #[test]
    fn test_tube_part_selects_triode() {
        assert_eq!(classify_transistor("Q1", "12AX7"), ModelKind::Triode);
        assert_eq!(classify_transistor("Q1", "EL34"), ModelKind::Triode);
        assert_eq!(classify_transistor("Q1", "6L6GC"), ModelKind::Triode);
    }

    #[test]
    fn test_fet_part_selects_jfet() {
        assert_eq!(classify_transistor("Q1", "2N7000"), ModelKind::Jfet);
        assert_eq!(classify_transistor("Q1", "BS170"), ModelKind::Jfet);
        assert_eq!(classify_transistor("Q1", "2N5457"), ModelKind::Jfet);
    }

    #[test]
    fn test_default_is_bjt() {
        assert_eq!(classify_transistor("Q2", "2N3904"), ModelKind::Bjt);
        assert_eq!(classify_transistor("Q1", ""), ModelKind::Bjt);
    }

    #[test]
    fn test_pnp_detection() {
        assert!(is_likely_pnp("2N3906"));
        assert!(is_likely_pnp("PNP"));
        assert!(!is_likely_pnp("2N3904"));
    }

    #[test]
    fn test_empty_bjt_part_falls_back_to_default() {
        let q = transistor("Q1", "");
        let (kind, params) = map_component(&q);
        assert_eq!(kind, ModelKind::Bjt);
        assert_eq!(
            params,
            ModelParams::Bjt {
                part_number: DEFAULT_BJT_PART.to_string(),
                temperature: DEFAULT_TEMPERATURE_C,
                is_pnp: false,
            }
        );
    }

    #[test]
    fn test_resistor_defaults() {
        let r = Component {
            name: "R1".to_string(),
            kind: ComponentKind::Resistor,
            position: Point::new(0, 0),
            rotation: 0,
            flip: false,
            attributes: vec![],
            line: 1,
        };
        assert_eq!(
            map_component(&r).1,
            ModelParams::Resistor {
                resistance: DEFAULT_RESISTANCE
            }
        );
    }
}
