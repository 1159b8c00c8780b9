//! Topology pattern catalog and scoring.
//!
//! Each pattern is data: a required multiset of component kinds, a DSP
//! strategy tag, and the parameter slots the strategy consumes. The
//! matcher scores every catalog entry against a stage's component
//! composition and attaches the best match.

use crate::schematic::{ComponentKind, Netlist};

use super::stages::Stage;

/// Confidence at or above which the emitter picks the optimized
/// strategy body instead of the stable fallback.
pub const OPTIMIZED_CONFIDENCE: f64 = 0.8;

/// One catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct Pattern {
    pub name: &'static str,
    /// Required component kinds as (kind, count) pairs
    pub required: &'static [(ComponentKind, usize)],
    pub strategy_tag: &'static str,
    /// Parameter slots the optimized body reads from `dsp_params`
    pub exposed_params: &'static [&'static str],
}

/// The match recorded on a stage.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatch {
    pub name: String,
    pub strategy_tag: String,
    pub confidence: f64,
}

/// The catalog, in declaration order. Ties in score resolve to the
/// earlier entry.
pub const CATALOG: &[Pattern] = &[
    // Declared before the low-pass so an input coupling stage (which
    // ties both at full confidence) annotates as the high-pass it is
    Pattern {
        name: "Passive RC High-Pass",
        required: &[
            (ComponentKind::Input, 1),
            (ComponentKind::Capacitor, 1),
            (ComponentKind::Resistor, 1),
        ],
        strategy_tag: "cascaded_biquad",
        exposed_params: &["highpass_frequency"],
    },
    Pattern {
        name: "Passive RC Low-Pass",
        required: &[(ComponentKind::Resistor, 1), (ComponentKind::Capacitor, 1)],
        strategy_tag: "cascaded_biquad",
        exposed_params: &["cutoff_frequency"],
    },
    Pattern {
        name: "LC Band-Pass",
        required: &[(ComponentKind::Inductor, 1), (ComponentKind::Capacitor, 1)],
        strategy_tag: "cascaded_biquad",
        exposed_params: &["center_frequency"],
    },
    Pattern {
        name: "Diode Clipping Stage",
        required: &[(ComponentKind::OpAmp, 1), (ComponentKind::Diode, 2)],
        strategy_tag: "nonlinear_clipper",
        exposed_params: &[],
    },
    Pattern {
        name: "Op-Amp Gain Stage",
        required: &[(ComponentKind::OpAmp, 1), (ComponentKind::Resistor, 2)],
        strategy_tag: "amplifier",
        exposed_params: &["gain_linear"],
    },
    Pattern {
        name: "Transistor Gain Stage",
        required: &[(ComponentKind::Transistor, 1), (ComponentKind::Resistor, 2)],
        strategy_tag: "amplifier",
        exposed_params: &[],
    },
    Pattern {
        name: "Three-Point Tone Stack",
        required: &[
            (ComponentKind::Potentiometer, 1),
            (ComponentKind::Resistor, 1),
            (ComponentKind::Capacitor, 1),
        ],
        strategy_tag: "tone_stack",
        exposed_params: &[],
    },
];

/// Multiset score of one pattern against a stage's kinds:
/// `|required ∩ present| / |required|`.
fn score(pattern: &Pattern, present: &[(ComponentKind, usize)]) -> f64 {
    let total: usize = pattern.required.iter().map(|&(_, n)| n).sum();
    if total == 0 {
        return 0.0;
    }
    let matched: usize = pattern
        .required
        .iter()
        .map(|&(kind, n)| {
            let have = present
                .iter()
                .find(|&&(k, _)| k == kind)
                .map(|&(_, c)| c)
                .unwrap_or(0);
            n.min(have)
        })
        .sum();
    matched as f64 / total as f64
}

/// Kind multiset of a stage's components.
fn composition(netlist: &Netlist, stage: &Stage) -> Vec<(ComponentKind, usize)> {
    let mut counts: Vec<(ComponentKind, usize)> = Vec::new();
    for &r in &stage.components {
        if let Some(c) = netlist.component(r) {
            match counts.iter_mut().find(|(k, _)| *k == c.kind) {
                Some((_, n)) => *n += 1,
                None => counts.push((c.kind, 1)),
            }
        }
    }
    counts
}

/// Score the catalog against every stage and attach the best non-zero
/// match. Earlier catalog entries win ties.
pub fn attach_patterns(netlist: &Netlist, stages: &mut [Stage]) {
    for stage in stages.iter_mut() {
        let present = composition(netlist, stage);
        let mut best: Option<(f64, &Pattern)> = None;
        for pattern in CATALOG {
            let s = score(pattern, &present);
            if s > 0.0 && best.map(|(b, _)| s > b).unwrap_or(true) {
                best = Some((s, pattern));
            }
        }
        if let Some((confidence, pattern)) = best {
            stage.pattern = Some(PatternMatch {
                name: pattern.name.to_string(),
                strategy_tag: pattern.strategy_tag.to_string(),
                confidence,
            });
        }
    }
}
