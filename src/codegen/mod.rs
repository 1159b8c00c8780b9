//! Code emission: serialize the analyzed pipeline to a processor
//! header, a processor implementation, and a build script.
//!
//! Emission is deterministic by construction: stages and parameters are
//! iterated in analysis order, and every numeric literal goes through
//! the fixed-precision formatter in [`fmt`]. Given the same netlist the
//! three artifacts are byte-identical run to run.

pub mod fmt;

mod cmake;
mod header;
mod source;

pub(crate) use header::stage_comment;

use log::info;

use crate::analysis::{
    dsp, CircuitAnalysis, ModelKind, Stage, StageKind, OPTIMIZED_CONFIDENCE,
};
use crate::error::{ForgeError, Result};
use crate::schematic::{ComponentKind, Netlist};

/// Emission options from the command line.
#[derive(Debug, Clone, Copy)]
pub struct EmitOptions {
    /// Allow pattern-gated optimized strategy bodies (off by default)
    pub optimized: bool,
    /// Sample rate baked into the generated processor's initial state;
    /// the host renegotiates it at prepare time
    pub sample_rate: f64,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            optimized: false,
            sample_rate: crate::DEFAULT_SAMPLE_RATE,
        }
    }
}

/// The three generated text artifacts.
#[derive(Debug, Clone)]
pub struct GeneratedProject {
    /// Directory-safe project name derived from the circuit name
    pub project_name: String,
    pub header: String,
    pub source: String,
    pub cmake: String,
}

/// One nonlinear model member of a clipper stage.
#[derive(Debug, Clone)]
pub(crate) struct NonlinearMember {
    pub ident: String,
    pub kind: ModelKind,
    pub part_number: String,
}

/// The DSP members a stage contributes to the processor class.
#[derive(Debug, Clone)]
pub(crate) enum Members {
    /// `stageN_resistor` + `stageN_capacitor`
    RcFilter,
    /// `stageN_filter`, an IIR biquad (optimized branch)
    Biquad,
    /// `stageN_gain`, preceded in the sample loop by one model object
    /// per nonlinear ref (a transistor gain stage carries its device)
    Gain { nonlinear: Vec<NonlinearMember> },
    /// One model object per nonlinear ref plus `stageN_opamp`
    Clipper {
        nonlinear: Vec<NonlinearMember>,
        opamp_part: String,
    },
    /// `stageN_tone`
    Tone,
    /// No members; the body is a pass-through
    PassThrough,
}

/// Per-stage emission decision shared by the header and source writers.
#[derive(Debug)]
pub(crate) struct PlannedStage<'a> {
    pub index: usize,
    pub stage: &'a Stage,
    /// Strategy tag when the optimized branch was selected
    pub optimized_tag: Option<String>,
    pub members: Members,
}

/// Model members for a stage's nonlinear refs, with sanitized names.
fn nonlinear_members(stage: &Stage, index: usize) -> Result<Vec<NonlinearMember>> {
    let mut members = Vec::with_capacity(stage.nonlinear_refs.len());
    for nl in &stage.nonlinear_refs {
        let ident =
            fmt::identifier(&nl.source_name).ok_or_else(|| ForgeError::EmptyIdentifier {
                name: nl.source_name.clone(),
                stage_index: index,
            })?;
        members.push(NonlinearMember {
            ident: format!("{ident}_model"),
            kind: nl.kind,
            part_number: nl.part_number.clone(),
        });
    }
    Ok(members)
}

/// Decide strategy and members for every stage, validating internal
/// consistency on the way.
pub(crate) fn plan<'a>(
    netlist: &Netlist,
    analysis: &'a CircuitAnalysis,
    options: &EmitOptions,
) -> Result<Vec<PlannedStage<'a>>> {
    let mut plans = Vec::with_capacity(analysis.stages.len());

    for (index, stage) in analysis.stages.iter().enumerate() {
        for &r in &stage.components {
            if netlist.component(r).is_none() {
                return Err(ForgeError::MissingComponent {
                    stage_index: index,
                    component: r.0,
                });
            }
        }

        // The optimized branch needs confidence, the flag, and the data
        // the strategy consumes; anything missing falls back to stable.
        let mut optimized_tag = None;
        if options.optimized {
            if let Some(pattern) = &stage.pattern {
                if pattern.confidence >= OPTIMIZED_CONFIDENCE {
                    let usable = match pattern.strategy_tag.as_str() {
                        "cascaded_biquad" => biquad_frequency(stage).is_some(),
                        "nonlinear_clipper" => !stage.nonlinear_refs.is_empty(),
                        "amplifier" | "tone_stack" => true,
                        _ => false,
                    };
                    if usable {
                        optimized_tag = Some(pattern.strategy_tag.clone());
                    }
                }
            }
        }

        let members = match (stage.kind, optimized_tag.as_deref()) {
            (_, Some("cascaded_biquad")) => Members::Biquad,
            (StageKind::InputBuffer, _)
            | (StageKind::HighPassFilter, _)
            | (StageKind::LowPassFilter, _)
            | (StageKind::BandPassFilter, _) => Members::RcFilter,
            (StageKind::GainStage, _) | (StageKind::OutputBuffer, _) => Members::Gain {
                nonlinear: nonlinear_members(stage, index)?,
            },
            (StageKind::OpAmpClipping, _) | (StageKind::DiodeClipper, _) => Members::Clipper {
                nonlinear: nonlinear_members(stage, index)?,
                opamp_part: stage_opamp_part(netlist, stage),
            },
            (StageKind::ToneControl, _) => Members::Tone,
            (StageKind::Unknown, _) => Members::PassThrough,
        };

        plans.push(PlannedStage {
            index,
            stage,
            optimized_tag,
            members,
        });
    }

    Ok(plans)
}

/// The frequency a biquad strategy would be built from, if extracted.
pub(crate) fn biquad_frequency(stage: &Stage) -> Option<(f64, bool)> {
    if let Some(&f) = stage.dsp_params.get("cutoff_frequency") {
        return Some((f, false));
    }
    if let Some(&f) = stage.dsp_params.get("highpass_frequency") {
        return Some((f, true));
    }
    stage
        .dsp_params
        .get("center_frequency")
        .map(|&f| (f, false))
}

/// Part number of the first op-amp in a stage, defaulted.
fn stage_opamp_part(netlist: &Netlist, stage: &Stage) -> String {
    for &r in &stage.components {
        if let Some(c) = netlist.component(r) {
            if c.kind == ComponentKind::OpAmp {
                let part = dsp::part_text(c);
                if !part.is_empty() {
                    return part;
                }
            }
        }
    }
    dsp::DEFAULT_OPAMP_PART.to_string()
}

/// Emit the complete project for an analyzed netlist.
pub fn emit(
    netlist: &Netlist,
    analysis: &CircuitAnalysis,
    options: &EmitOptions,
) -> Result<GeneratedProject> {
    let project_name = fmt::filename(netlist.name.trim());
    if project_name.trim_matches(|c: char| c == '_' || c.is_whitespace()).is_empty() {
        return Err(ForgeError::EmptyProjectName {
            name: netlist.name.clone(),
        });
    }

    let plans = plan(netlist, analysis, options)?;
    let header = header::render(netlist, analysis, &plans, options);
    let source = source::render(netlist, analysis, &plans);
    let cmake = cmake::render(&project_name);

    info!(
        "emitted project '{}': {} stages, {} parameters",
        project_name,
        analysis.stages.len(),
        analysis.parameters.len()
    );

    Ok(GeneratedProject {
        project_name,
        header,
        source,
        cmake,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis;
    use crate::schematic::parse_source;

    fn compile(source: &str, optimized: bool) -> GeneratedProject {
        let parsed = parse_source(source, "UnitTest").unwrap();
        let analysis = analysis::analyze(&parsed.netlist);
        emit(
            &parsed.netlist,
            &analysis,
            &EmitOptions {
                optimized,
                ..EmitOptions::default()
            },
        )
        .unwrap()
    }

    const RC: &str = r#"<Schematic Name="RC Test">
<Element Type="Circuit.Resistor" Position="0,0">
  <Component Name="R1" Resistance="10k" />
</Element>
<Element Type="Circuit.Capacitor" Position="10,0">
  <Component Name="C1" Capacitance="10nF" />
</Element>
</Schematic>"#;

    #[test]
    fn test_emission_is_deterministic() {
        let a = compile(RC, false);
        let b = compile(RC, false);
        let c = compile(RC, false);
        assert_eq!(a.header, b.header);
        assert_eq!(b.header, c.header);
        assert_eq!(a.source, b.source);
        assert_eq!(b.source, c.source);
        assert_eq!(a.cmake, c.cmake);
    }

    #[test]
    fn test_optimized_branch_gated_by_flag() {
        let stable = compile(RC, false);
        let optimized = compile(RC, true);
        assert!(!stable.source.contains("makeLowPass"));
        assert!(optimized.source.contains("makeLowPass"));
        assert!(optimized.source.contains("confidence 1.00"));
    }

    #[test]
    fn test_transistor_gain_stage_carries_its_device() {
        let source = r#"<Schematic Name="CE Amp">
<Element Type="Circuit.Resistor" Position="0,0">
  <Component Name="R1" Resistance="10k" />
</Element>
<Element Type="Circuit.BJT" Position="10,0">
  <Component Name="Q1" PartNumber="2N3904" />
</Element>
<Element Type="Circuit.Capacitor" Position="20,0">
  <Component Name="C1" Capacitance="100nF" />
</Element>
</Schematic>"#;
        let project = compile(source, false);
        assert!(project.header.contains("circuitdsp::BjtProcessor Q1_model;"));
        assert!(project
            .source
            .contains("Q1_model.prepare(\"2N3904\", sampleRate);"));
        assert!(project
            .source
            .contains("signal = static_cast<float>(Q1_model.process(signal));"));
    }

    #[test]
    fn test_empty_project_name_rejected() {
        let parsed = parse_source("", "   ").unwrap();
        let analysis = analysis::analyze(&parsed.netlist);
        let err = emit(&parsed.netlist, &analysis, &EmitOptions::default());
        assert!(matches!(err, Err(ForgeError::EmptyProjectName { .. })));
    }

    #[test]
    fn test_artifacts_name_files() {
        let project = compile(RC, false);
        assert_eq!(project.project_name, "RC Test");
        assert!(project.cmake.contains("CircuitProcessor.h"));
        assert!(project.cmake.contains("CircuitProcessor.cpp"));
        assert!(project.header.contains("class CircuitProcessor"));
        assert!(project.source.contains("#include \"CircuitProcessor.h\""));
    }
}
