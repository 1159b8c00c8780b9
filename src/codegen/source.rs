//! Emission of `CircuitProcessor.cpp`: constructor, lifecycle
//! boilerplate, per-stage `prepareToPlay` initialization, and the
//! per-sample `processBlock` body.

use crate::analysis::{dsp, CircuitAnalysis, ModelKind, ModelParams, ParamClass, StageKind};
use crate::schematic::Netlist;

use super::{biquad_frequency, fmt, stage_comment, Members, PlannedStage};

/// First resistor and capacitor values mapped from a stage's parts,
/// defaulted where the stage has none.
fn stage_rc(netlist: &Netlist, plan: &PlannedStage<'_>) -> (f64, f64, f64) {
    let mut resistance = None;
    let mut cap = None;
    for &r in &plan.stage.components {
        if let Some(c) = netlist.component(r) {
            match dsp::map_component(c).1 {
                ModelParams::Resistor { resistance: v } if resistance.is_none() => {
                    resistance = Some(v);
                }
                ModelParams::Capacitor { capacitance, esr } if cap.is_none() => {
                    cap = Some((capacitance, esr));
                }
                _ => {}
            }
        }
    }
    let (capacitance, esr) = cap.unwrap_or((dsp::DEFAULT_CAPACITANCE, dsp::DEFAULT_ESR));
    (
        resistance.unwrap_or(dsp::DEFAULT_RESISTANCE),
        capacitance,
        esr,
    )
}

/// First parameter id of a class, if one was extracted.
fn param_of_class(analysis: &CircuitAnalysis, class: ParamClass) -> Option<&str> {
    analysis
        .parameters
        .iter()
        .find(|p| p.class == class)
        .map(|p| p.id.as_str())
}

fn confidence_note(plan: &PlannedStage<'_>) -> String {
    match (&plan.optimized_tag, &plan.stage.pattern) {
        (Some(tag), Some(pattern)) => {
            format!("  // {} path (confidence {:.2})", tag, pattern.confidence)
        }
        _ => String::new(),
    }
}

fn render_prepare(netlist: &Netlist, plans: &[PlannedStage<'_>], out: &mut String) {
    out.push_str(
        "void CircuitProcessor::prepareToPlay(double sampleRate, int samplesPerBlock)\n{\n",
    );
    out.push_str("    currentSampleRate = sampleRate;\n\n");
    out.push_str("    juce::dsp::ProcessSpec spec;\n");
    out.push_str("    spec.sampleRate = sampleRate;\n");
    out.push_str("    spec.maximumBlockSize = static_cast<juce::uint32>(samplesPerBlock);\n");
    out.push_str("    spec.numChannels = static_cast<juce::uint32>(getTotalNumOutputChannels());\n");

    for plan in plans {
        let n = plan.index + 1;
        out.push_str(&format!("\n    {}\n", stage_comment(plan)));
        match &plan.members {
            Members::RcFilter => {
                let (resistance, capacitance, esr) = stage_rc(netlist, plan);
                out.push_str(&format!(
                    "    stage{n}_resistor.prepare({});\n\
                     \x20   stage{n}_capacitor.prepare({}, {}, sampleRate);\n",
                    fmt::float_literal(resistance),
                    fmt::float_literal(capacitance),
                    fmt::float_literal(esr)
                ));
            }
            Members::Biquad => {
                let (frequency, highpass) =
                    biquad_frequency(plan.stage).unwrap_or((1_000.0, false));
                let maker = if highpass { "makeHighPass" } else { "makeLowPass" };
                out.push_str(&format!(
                    "    stage{n}_filter.prepare(spec);\n\
                     \x20   stage{n}_filter.coefficients = juce::dsp::IIR::Coefficients<float>::{maker}(\n\
                     \x20       sampleRate, {});{}\n",
                    fmt::float_literal_f(frequency),
                    confidence_note(plan)
                ));
            }
            Members::Gain { nonlinear } => {
                for member in nonlinear {
                    out.push_str(&format!(
                        "    {}.prepare(\"{}\", sampleRate);\n",
                        member.ident, member.part_number
                    ));
                }
                let gain = match plan.stage.kind {
                    StageKind::OutputBuffer => 0.5,
                    _ => plan
                        .stage
                        .dsp_params
                        .get("gain_linear")
                        .copied()
                        .unwrap_or(1.0),
                };
                out.push_str(&format!(
                    "    stage{n}_gain.prepare(spec);\n\
                     \x20   stage{n}_gain.setGainLinear({});\n",
                    fmt::float_literal_f(gain)
                ));
            }
            Members::Clipper {
                nonlinear,
                opamp_part,
            } => {
                for member in nonlinear {
                    out.push_str(&format!(
                        "    {}.prepare(\"{}\", {});\n",
                        member.ident,
                        member.part_number,
                        fmt::float_literal(dsp::DEFAULT_TEMPERATURE_C)
                    ));
                    if plan.optimized_tag.is_some() && member.kind == ModelKind::Diode {
                        out.push_str(&format!(
                            "    {}.enableLookupTable();{}\n",
                            member.ident,
                            confidence_note(plan)
                        ));
                    }
                }
                out.push_str(&format!(
                    "    stage{n}_opamp.prepare(\"{opamp_part}\", sampleRate);\n"
                ));
            }
            Members::Tone => {
                out.push_str(&format!(
                    "    stage{n}_tone.prepare(spec);\n\
                     \x20   stage{n}_tone.setType(juce::dsp::StateVariableTPTFilterType::lowpass);\n\
                     \x20   stage{n}_tone.setCutoffFrequency(1000.000000f);\n"
                ));
            }
            Members::PassThrough => {
                out.push_str("    // nothing to prepare\n");
            }
        }
    }

    out.push_str("}\n\n");
}

fn render_process_block(
    analysis: &CircuitAnalysis,
    plans: &[PlannedStage<'_>],
    out: &mut String,
) {
    out.push_str(
        "void CircuitProcessor::processBlock(juce::AudioBuffer<float>& buffer, juce::MidiBuffer&)\n{\n",
    );
    out.push_str("    juce::ScopedNoDenormals noDenormals;\n\n");
    out.push_str("    if (bypassParam->load() >= 0.5f)\n        return;\n\n");

    for param in &analysis.parameters {
        if param.id == "bypass" {
            continue;
        }
        out.push_str(&format!(
            "    float {id}Value = {id}Param->load();\n",
            id = param.id
        ));
    }

    // Block-rate control updates
    let tone_param = param_of_class(analysis, ParamClass::Tone);
    for plan in plans {
        if let Members::Tone = plan.members {
            let n = plan.index + 1;
            if let Some(id) = tone_param {
                out.push_str(&format!(
                    "\n    stage{n}_tone.setCutoffFrequency(200.000000f + {id}Value * 4800.000000f);\n"
                ));
            }
        }
    }

    out.push_str("\n    for (int channel = 0; channel < buffer.getNumChannels(); ++channel)\n");
    out.push_str("    {\n");
    out.push_str("        float* channelData = buffer.getWritePointer(channel);\n");
    out.push_str("        for (int i = 0; i < buffer.getNumSamples(); ++i)\n");
    out.push_str("        {\n");
    out.push_str("            float signal = channelData[i];\n");

    for plan in plans {
        let n = plan.index + 1;
        out.push_str(&format!("\n            {}\n", stage_comment(plan)));
        match &plan.members {
            Members::RcFilter => {
                out.push_str(&format!(
                    "            signal = static_cast<float>(\n\
                     \x20               stage{n}_capacitor.process(stage{n}_resistor.process(signal)));\n"
                ));
            }
            Members::Biquad => {
                out.push_str(&format!(
                    "            signal = stage{n}_filter.processSample(signal);\n"
                ));
            }
            Members::Gain { nonlinear } => {
                for member in nonlinear {
                    out.push_str(&format!(
                        "            signal = static_cast<float>({}.process(signal));\n",
                        member.ident
                    ));
                }
                if nonlinear.is_empty() {
                    out.push_str("            // gain applied after the sample loop\n");
                }
            }
            Members::Clipper { nonlinear, .. } => {
                let process = if plan.optimized_tag.is_some() {
                    "processFast"
                } else {
                    "process"
                };
                let diodes: Vec<_> = nonlinear
                    .iter()
                    .filter(|m| m.kind == ModelKind::Diode)
                    .collect();
                for member in nonlinear.iter().filter(|m| m.kind != ModelKind::Diode) {
                    out.push_str(&format!(
                        "            signal = static_cast<float>({}.process(signal));\n",
                        member.ident
                    ));
                }
                if diodes.is_empty() {
                    out.push_str(&format!(
                        "            signal = static_cast<float>(stage{n}_opamp.process(signal, signal));\n"
                    ));
                } else {
                    out.push_str(&format!("            double stage{n}_drive = 0.0;\n"));
                    for (i, member) in diodes.iter().enumerate() {
                        // Back-to-back pairs alternate polarity
                        if i % 2 == 0 {
                            out.push_str(&format!(
                                "            stage{n}_drive += {}.{process}(signal);{}\n",
                                member.ident,
                                confidence_note(plan)
                            ));
                        } else {
                            out.push_str(&format!(
                                "            stage{n}_drive -= {}.{process}(-signal);\n",
                                member.ident
                            ));
                        }
                    }
                    out.push_str(&format!(
                        "            signal = static_cast<float>(stage{n}_opamp.process(signal, stage{n}_drive));\n"
                    ));
                }
            }
            Members::Tone => {
                out.push_str(&format!(
                    "            signal = stage{n}_tone.processSample(channel, signal);\n"
                ));
            }
            Members::PassThrough => {
                out.push_str(
                    "            // TODO: no DSP mapping for this stage yet; passes through\n",
                );
            }
        }
    }

    out.push_str("\n            channelData[i] = signal;\n");
    out.push_str("        }\n");
    out.push_str("    }\n");

    let gain_stages: Vec<_> = plans
        .iter()
        .filter(|p| matches!(p.members, Members::Gain { .. }))
        .collect();
    if !gain_stages.is_empty() {
        out.push_str("\n    juce::dsp::AudioBlock<float> block(buffer);\n");
        out.push_str("    juce::dsp::ProcessContextReplacing<float> context(block);\n");
        let gain_param = param_of_class(analysis, ParamClass::Gain);
        for plan in &gain_stages {
            let n = plan.index + 1;
            out.push_str(&format!("\n    {}\n", stage_comment(plan)));
            if plan.stage.kind == StageKind::GainStage {
                if let Some(id) = gain_param {
                    let base = plan
                        .stage
                        .dsp_params
                        .get("gain_linear")
                        .copied()
                        .unwrap_or(2.0);
                    out.push_str(&format!(
                        "    stage{n}_gain.setGainLinear({id}Value * {});\n",
                        fmt::float_literal_f(base)
                    ));
                }
            }
            out.push_str(&format!("    stage{n}_gain.process(context);\n"));
        }
    }

    out.push_str("}\n\n");
}

pub(crate) fn render(
    netlist: &Netlist,
    analysis: &CircuitAnalysis,
    plans: &[PlannedStage<'_>],
) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "// CircuitProcessor.cpp\n\
         // Generated by pedalforge from circuit \"{}\"\n\
         // Do not edit; regenerate from the schematic instead.\n\n",
        netlist.name
    ));
    out.push_str("#include \"CircuitProcessor.h\"\n\n");

    // Constructor wires the value tree and caches the raw pointers.
    out.push_str("CircuitProcessor::CircuitProcessor()\n");
    out.push_str("    : AudioProcessor(BusesProperties()\n");
    out.push_str(
        "                         .withInput(\"Input\", juce::AudioChannelSet::stereo(), true)\n",
    );
    out.push_str(
        "                         .withOutput(\"Output\", juce::AudioChannelSet::stereo(), true)),\n",
    );
    out.push_str("      apvts(*this, nullptr, \"Parameters\", createParameterLayout())\n{\n");
    for param in &analysis.parameters {
        out.push_str(&format!(
            "    {id}Param = apvts.getRawParameterValue(\"{id}\");\n",
            id = param.id
        ));
    }
    out.push_str("}\n\n");

    render_prepare(netlist, plans, &mut out);

    out.push_str("void CircuitProcessor::releaseResources() {}\n\n");

    render_process_block(analysis, plans, &mut out);

    out.push_str("juce::AudioProcessorEditor* CircuitProcessor::createEditor()\n{\n");
    out.push_str("    return new juce::GenericAudioProcessorEditor(*this);\n}\n\n");
    out.push_str("bool CircuitProcessor::hasEditor() const { return true; }\n\n");
    out.push_str(&format!(
        "const juce::String CircuitProcessor::getName() const {{ return \"{}\"; }}\n\n",
        netlist.name
    ));
    out.push_str("bool CircuitProcessor::acceptsMidi() const { return false; }\n");
    out.push_str("bool CircuitProcessor::producesMidi() const { return false; }\n");
    out.push_str("bool CircuitProcessor::isMidiEffect() const { return false; }\n");
    out.push_str("double CircuitProcessor::getTailLengthSeconds() const { return 0.0; }\n\n");
    out.push_str("int CircuitProcessor::getNumPrograms() { return 1; }\n");
    out.push_str("int CircuitProcessor::getCurrentProgram() { return 0; }\n");
    out.push_str("void CircuitProcessor::setCurrentProgram(int) {}\n");
    out.push_str("const juce::String CircuitProcessor::getProgramName(int) { return {}; }\n");
    out.push_str("void CircuitProcessor::changeProgramName(int, const juce::String&) {}\n\n");

    out.push_str("void CircuitProcessor::getStateInformation(juce::MemoryBlock& destData)\n{\n");
    out.push_str("    auto state = apvts.copyState();\n");
    out.push_str("    std::unique_ptr<juce::XmlElement> xml(state.createXml());\n");
    out.push_str("    if (xml != nullptr)\n        copyXmlToBinary(*xml, destData);\n}\n\n");

    out.push_str(
        "void CircuitProcessor::setStateInformation(const void* data, int sizeInBytes)\n{\n",
    );
    out.push_str(
        "    std::unique_ptr<juce::XmlElement> xml(getXmlFromBinary(data, sizeInBytes));\n",
    );
    out.push_str("    if (xml != nullptr && xml->hasTagName(apvts.state.getType()))\n");
    out.push_str("        apvts.replaceState(juce::ValueTree::fromXml(*xml));\n}\n\n");

    out.push_str("juce::AudioProcessor* JUCE_CALLTYPE createPluginFilter()\n{\n");
    out.push_str("    return new CircuitProcessor();\n}\n");

    out
}
