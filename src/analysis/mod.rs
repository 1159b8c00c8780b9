//! Circuit analysis: stage identification, topology pattern matching,
//! DSP model mapping, and plug-in parameter extraction.

pub mod dsp;
pub mod params;
pub mod patterns;
pub mod stages;

pub use dsp::{ModelKind, ModelParams, NonlinearRef};
pub use params::{ParamClass, ParamKind, PluginParameter, Scaling};
pub use patterns::{PatternMatch, OPTIMIZED_CONFIDENCE};
pub use stages::{Stage, StageKind};

use crate::error::SemanticWarning;
use crate::models::partdb;
use crate::schematic::Netlist;

/// The fully analyzed pipeline for one netlist.
#[derive(Debug)]
pub struct CircuitAnalysis {
    pub stages: Vec<Stage>,
    pub parameters: Vec<PluginParameter>,
    pub warnings: Vec<SemanticWarning>,
}

/// Run stage identification, pattern matching, and parameter extraction
/// over a parsed netlist.
pub fn analyze(netlist: &Netlist) -> CircuitAnalysis {
    let (mut stages, mut warnings) = stages::identify_stages(netlist);
    patterns::attach_patterns(netlist, &mut stages);
    let parameters = params::extract_parameters(netlist);

    // Flag part numbers the database will substitute defaults for
    let db = partdb::database();
    let mut flagged: Vec<&str> = Vec::new();
    for stage in &stages {
        for nl in &stage.nonlinear_refs {
            if flagged.contains(&nl.part_number.as_str()) {
                continue;
            }
            if !db.contains(&nl.part_number) {
                flagged.push(&nl.part_number);
                let fallback = match nl.kind {
                    ModelKind::Jfet => dsp::DEFAULT_JFET_PART,
                    ModelKind::Triode => dsp::DEFAULT_TRIODE_PART,
                    ModelKind::Bjt => dsp::DEFAULT_BJT_PART,
                    _ => dsp::DEFAULT_DIODE_PART,
                };
                warnings.push(SemanticWarning::UnknownPartNumber {
                    part: nl.part_number.clone(),
                    fallback: fallback.to_string(),
                });
            }
        }
    }

    CircuitAnalysis {
        stages,
        parameters,
        warnings,
    }
}
