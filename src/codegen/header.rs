//! Emission of `CircuitProcessor.h`: the plug-in processor class with
//! its parameter layout, parameter pointers, and per-stage DSP members.

use crate::analysis::{CircuitAnalysis, ModelKind, ParamKind, Scaling};
use crate::schematic::Netlist;

use super::{fmt, EmitOptions, Members, PlannedStage};

/// C++ member type for a nonlinear model kind.
pub(crate) fn model_type(kind: ModelKind) -> &'static str {
    match kind {
        ModelKind::Bjt => "circuitdsp::BjtProcessor",
        ModelKind::Jfet => "circuitdsp::FetProcessor",
        ModelKind::Triode => "circuitdsp::TriodeProcessor",
        ModelKind::OpAmp => "circuitdsp::OpAmpProcessor",
        _ => "circuitdsp::DiodeProcessor",
    }
}

/// One-line annotation for a stage declaration block.
pub(crate) fn stage_comment(plan: &PlannedStage<'_>) -> String {
    let stage = plan.stage;
    let mut line = format!("// Stage {}: {}", plan.index + 1, stage.display_name);
    if let Some(pattern) = &stage.pattern {
        line.push_str(&format!(
            " (pattern \"{}\", confidence {:.2}, strategy {})",
            pattern.name,
            pattern.confidence,
            if plan.optimized_tag.is_some() {
                pattern.strategy_tag.as_str()
            } else {
                "stable"
            }
        ));
    }
    line
}

pub(crate) fn render(
    netlist: &Netlist,
    analysis: &CircuitAnalysis,
    plans: &[PlannedStage<'_>],
    options: &EmitOptions,
) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "// CircuitProcessor.h\n\
         // Generated by pedalforge from circuit \"{}\"\n\
         // Do not edit; regenerate from the schematic instead.\n\n",
        netlist.name
    ));
    out.push_str("#pragma once\n\n");
    out.push_str("#include <JuceHeader.h>\n");
    out.push_str("#include \"CircuitDspModels.h\"\n\n");

    out.push_str("class CircuitProcessor : public juce::AudioProcessor\n{\npublic:\n");
    out.push_str("    CircuitProcessor();\n");
    out.push_str("    ~CircuitProcessor() override = default;\n\n");
    out.push_str("    void prepareToPlay(double sampleRate, int samplesPerBlock) override;\n");
    out.push_str("    void releaseResources() override;\n");
    out.push_str(
        "    void processBlock(juce::AudioBuffer<float>&, juce::MidiBuffer&) override;\n\n",
    );
    out.push_str("    juce::AudioProcessorEditor* createEditor() override;\n");
    out.push_str("    bool hasEditor() const override;\n\n");
    out.push_str("    const juce::String getName() const override;\n");
    out.push_str("    bool acceptsMidi() const override;\n");
    out.push_str("    bool producesMidi() const override;\n");
    out.push_str("    bool isMidiEffect() const override;\n");
    out.push_str("    double getTailLengthSeconds() const override;\n\n");
    out.push_str("    int getNumPrograms() override;\n");
    out.push_str("    int getCurrentProgram() override;\n");
    out.push_str("    void setCurrentProgram(int index) override;\n");
    out.push_str("    const juce::String getProgramName(int index) override;\n");
    out.push_str("    void changeProgramName(int index, const juce::String& newName) override;\n\n");
    out.push_str("    void getStateInformation(juce::MemoryBlock& destData) override;\n");
    out.push_str("    void setStateInformation(const void* data, int sizeInBytes) override;\n\n");

    // Parameter layout, defined inline so the constructor can use it.
    out.push_str(
        "    static juce::AudioProcessorValueTreeState::ParameterLayout createParameterLayout()\n",
    );
    out.push_str("    {\n");
    out.push_str("        juce::AudioProcessorValueTreeState::ParameterLayout layout;\n\n");
    for param in &analysis.parameters {
        match param.kind {
            ParamKind::Boolean => {
                out.push_str(&format!(
                    "        layout.add(std::make_unique<juce::AudioParameterBool>(\n\
                     \x20           \"{}\", \"{}\", {}));\n",
                    param.id,
                    param.display_name,
                    if param.default >= 0.5 { "true" } else { "false" }
                ));
            }
            ParamKind::Continuous => {
                let range = match param.scaling {
                    Scaling::Linear => format!(
                        "juce::NormalisableRange<float>({}, {})",
                        fmt::float_literal_f(param.min),
                        fmt::float_literal_f(param.max)
                    ),
                    Scaling::Logarithmic => format!(
                        "juce::NormalisableRange<float>({}, {}, 0.000100f, 0.300000f)",
                        fmt::float_literal_f(param.min),
                        fmt::float_literal_f(param.max)
                    ),
                    Scaling::Exponential => format!(
                        "juce::NormalisableRange<float>({}, {}, 0.000100f, 2.000000f)",
                        fmt::float_literal_f(param.min),
                        fmt::float_literal_f(param.max)
                    ),
                };
                out.push_str(&format!(
                    "        layout.add(std::make_unique<juce::AudioParameterFloat>(\n\
                     \x20           \"{}\", \"{}\",\n\
                     \x20           {},\n\
                     \x20           {}));\n",
                    param.id,
                    param.display_name,
                    range,
                    fmt::float_literal_f(param.default)
                ));
            }
        }
    }
    out.push_str("\n        return layout;\n    }\n\n");

    out.push_str("private:\n");
    out.push_str("    juce::AudioProcessorValueTreeState apvts;\n\n");

    for param in &analysis.parameters {
        out.push_str(&format!(
            "    std::atomic<float>* {}Param = nullptr;\n",
            param.id
        ));
    }
    out.push('\n');

    for plan in plans {
        let n = plan.index + 1;
        out.push_str(&format!("    {}\n", stage_comment(plan)));
        match &plan.members {
            Members::RcFilter => {
                out.push_str(&format!(
                    "    circuitdsp::ResistorProcessor stage{n}_resistor;\n\
                     \x20   circuitdsp::CapacitorProcessor stage{n}_capacitor;\n"
                ));
            }
            Members::Biquad => {
                out.push_str(&format!(
                    "    juce::dsp::IIR::Filter<float> stage{n}_filter;\n"
                ));
            }
            Members::Gain { nonlinear } => {
                for member in nonlinear {
                    out.push_str(&format!(
                        "    {} {};\n",
                        model_type(member.kind),
                        member.ident
                    ));
                }
                out.push_str(&format!("    juce::dsp::Gain<float> stage{n}_gain;\n"));
            }
            Members::Clipper { nonlinear, .. } => {
                for member in nonlinear {
                    out.push_str(&format!(
                        "    {} {};\n",
                        model_type(member.kind),
                        member.ident
                    ));
                }
                out.push_str(&format!(
                    "    circuitdsp::OpAmpProcessor stage{n}_opamp;\n"
                ));
            }
            Members::Tone => {
                out.push_str(&format!(
                    "    juce::dsp::StateVariableTPTFilter<float> stage{n}_tone;\n"
                ));
            }
            Members::PassThrough => {
                out.push_str("    // pass-through, no state\n");
            }
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "    double currentSampleRate = {};\n\n",
        fmt::float_literal(options.sample_rate)
    ));
    out.push_str("    JUCE_DECLARE_NON_COPYABLE_WITH_LEAK_DETECTOR(CircuitProcessor)\n");
    out.push_str("};\n");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis;
    use crate::codegen::{plan, EmitOptions};
    use crate::schematic::parse_source;

    const CLIPPER: &str = r#"<Schematic Name="Clip">
<Element Type="Circuit.IdealOpAmp" Position="0,0">
  <Component Name="U1" PartNumber="TL072" />
</Element>
<Element Type="Circuit.Diode" Position="10,0">
  <Component Name="D1" PartNumber="1N4148" />
</Element>
<Element Type="Circuit.Diode" Position="20,0">
  <Component Name="D2" PartNumber="1N914" />
</Element>
<Element Type="Circuit.Potentiometer" Position="30,0">
  <Component Name="Drive" Wipe="0.5" />
</Element>
</Schematic>"#;

    #[test]
    fn test_header_declares_parameters_and_members() {
        let parsed = parse_source(CLIPPER, "Clip").unwrap();
        let analysis = analysis::analyze(&parsed.netlist);
        let options = EmitOptions::default();
        let plans = plan(&parsed.netlist, &analysis, &options).unwrap();
        let header = render(&parsed.netlist, &analysis, &plans, &options);

        assert!(header.contains("std::atomic<float>* driveParam = nullptr;"));
        assert!(header.contains("double currentSampleRate = 48000.000000;"));
        assert!(header.contains("std::atomic<float>* bypassParam = nullptr;"));
        assert!(header.contains("circuitdsp::DiodeProcessor D1_model;"));
        assert!(header.contains("circuitdsp::DiodeProcessor D2_model;"));
        assert!(header.contains("juce::AudioProcessorValueTreeState apvts;"));
        assert!(header.contains("std::make_unique<juce::AudioParameterBool>"));
    }

    #[test]
    fn test_stage_comment_names_pattern() {
        let parsed = parse_source(CLIPPER, "Clip").unwrap();
        let analysis = analysis::analyze(&parsed.netlist);
        let options = EmitOptions::default();
        let plans = plan(&parsed.netlist, &analysis, &options).unwrap();
        let header = render(&parsed.netlist, &analysis, &plans, &options);
        assert!(header.contains("pattern \"Diode Clipping Stage\""));
        assert!(header.contains("strategy stable"));
    }
}
