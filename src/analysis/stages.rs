//! Signal-flow stage identification.
//!
//! The heuristic emits stages in a fixed pipeline order driven by
//! component-type counts rather than a topological walk of the node
//! graph; the pattern matcher afterwards supplies a confidence signal
//! that tells the emitter how far to trust each stage.

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::f64::consts::PI;
use std::fmt;

use log::debug;

use crate::error::SemanticWarning;
use crate::schematic::{ComponentKind, ComponentRef, Netlist};

use super::dsp::{
    self, ModelKind, NonlinearRef, DEFAULT_CAPACITANCE, DEFAULT_RESISTANCE,
};
use super::patterns::PatternMatch;

/// The closed set of stage kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    InputBuffer,
    GainStage,
    HighPassFilter,
    LowPassFilter,
    BandPassFilter,
    OpAmpClipping,
    DiodeClipper,
    ToneControl,
    OutputBuffer,
    Unknown,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StageKind::InputBuffer => "InputBuffer",
            StageKind::GainStage => "GainStage",
            StageKind::HighPassFilter => "HighPassFilter",
            StageKind::LowPassFilter => "LowPassFilter",
            StageKind::BandPassFilter => "BandPassFilter",
            StageKind::OpAmpClipping => "OpAmpClipping",
            StageKind::DiodeClipper => "DiodeClipper",
            StageKind::ToneControl => "ToneControl",
            StageKind::OutputBuffer => "OutputBuffer",
            StageKind::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// One analyzed pipeline stage. Holds indices into the netlist, never
/// owned component data.
#[derive(Debug, Clone)]
pub struct Stage {
    pub kind: StageKind,
    pub display_name: String,
    pub components: Vec<ComponentRef>,
    /// Named numeric parameters, deterministically ordered
    pub dsp_params: BTreeMap<String, f64>,
    pub primary_model: ModelKind,
    pub pattern: Option<PatternMatch>,
    pub nonlinear_refs: Vec<NonlinearRef>,
}

impl Stage {
    fn build(
        netlist: &Netlist,
        kind: StageKind,
        display_name: impl Into<String>,
        components: Vec<ComponentRef>,
        dsp_params: BTreeMap<String, f64>,
    ) -> Self {
        let primary_model = dsp::primary_model(netlist, &components);
        let nonlinear_refs = dsp::nonlinear_refs(netlist, &components);
        Stage {
            kind,
            display_name: display_name.into(),
            components,
            dsp_params,
            primary_model,
            pattern: None,
            nonlinear_refs,
        }
    }
}

fn resistance(netlist: &Netlist, r: ComponentRef) -> f64 {
    netlist
        .component(r)
        .and_then(|c| c.attr_value(&["Resistance", "Value", "R"]))
        .unwrap_or(DEFAULT_RESISTANCE)
}

fn capacitance(netlist: &Netlist, r: ComponentRef) -> f64 {
    netlist
        .component(r)
        .and_then(|c| c.attr_value(&["Capacitance", "Value", "C"]))
        .unwrap_or(DEFAULT_CAPACITANCE)
}

fn all_of(netlist: &Netlist, kind: ComponentKind) -> Vec<ComponentRef> {
    netlist.of_kind(kind).map(|(r, _)| r).collect()
}

/// Identify stages in fixed pipeline order. Never fails; an empty
/// result is reported as a warning and generation continues with a
/// pass-through body.
pub fn identify_stages(netlist: &Netlist) -> (Vec<Stage>, Vec<SemanticWarning>) {
    let mut stages = Vec::new();
    let mut warnings = Vec::new();

    let resistors = all_of(netlist, ComponentKind::Resistor);
    let capacitors = all_of(netlist, ComponentKind::Capacitor);
    let opamps = all_of(netlist, ComponentKind::OpAmp);
    let diodes = all_of(netlist, ComponentKind::Diode);
    let transistors = all_of(netlist, ComponentKind::Transistor);
    let inputs = all_of(netlist, ComponentKind::Input);
    let outputs = all_of(netlist, ComponentKind::Output);
    let mut controls = all_of(netlist, ComponentKind::Potentiometer);
    controls.extend(all_of(netlist, ComponentKind::VariableResistor));

    // The low-pass rule prefers components no earlier stage consumed,
    // falling back to the first of each kind when everything is taken.
    let mut covered: HashSet<ComponentRef> = HashSet::new();

    // 1. Input buffer: input jack + coupling capacitor + input resistor
    if let Some(&input) = inputs.first() {
        let mut components = vec![input];
        let mut params = BTreeMap::new();
        let coupling = capacitors.first().copied();
        let series_r = resistors.first().copied();
        match coupling {
            Some(c) => {
                components.push(c);
                covered.insert(c);
                params.insert("coupling_capacitance".to_string(), capacitance(netlist, c));
            }
            None => warnings.push(SemanticWarning::MissingCouplingCapacitor),
        }
        if let Some(r) = series_r {
            components.push(r);
            covered.insert(r);
        }
        if let (Some(c), Some(r)) = (coupling, series_r) {
            let f = 1.0 / (2.0 * PI * resistance(netlist, r) * capacitance(netlist, c));
            params.insert("highpass_frequency".to_string(), f);
        }
        stages.push(Stage::build(
            netlist,
            StageKind::InputBuffer,
            "Input Buffer",
            components,
            params,
        ));
    }

    // 2. Op-amp clipping: op-amp with diodes in the feedback path
    if !opamps.is_empty() && !diodes.is_empty() {
        let mut components = opamps.clone();
        components.extend(diodes.iter().copied());
        let mut params = BTreeMap::new();
        params.insert("diode_count".to_string(), diodes.len() as f64);
        stages.push(Stage::build(
            netlist,
            StageKind::OpAmpClipping,
            "Op-Amp Clipping",
            components,
            params,
        ));
    }

    // 3. Op-amp gain stage (no diodes): non-inverting gain 1 + R2/R1
    if !opamps.is_empty() && diodes.is_empty() {
        let mut components = opamps.clone();
        let mut params = BTreeMap::new();
        if resistors.len() >= 2 {
            let r1 = resistance(netlist, resistors[0]);
            let r2 = resistance(netlist, resistors[1]);
            components.push(resistors[0]);
            components.push(resistors[1]);
            if r1 > 0.0 {
                let gain = 1.0 + r2 / r1;
                params.insert("gain_linear".to_string(), gain);
                params.insert("gain_db".to_string(), 20.0 * gain.log10());
            }
        }
        stages.push(Stage::build(
            netlist,
            StageKind::GainStage,
            "Op-Amp Gain Stage",
            components,
            params,
        ));
    }

    // 4. Transistor gain stage, with a nearby R and C as bias context
    if !transistors.is_empty() {
        let mut components = transistors.clone();
        if let Some(&r) = resistors.iter().find(|r| !covered.contains(*r)) {
            components.push(r);
        }
        if let Some(&c) = capacitors.iter().find(|c| !covered.contains(*c)) {
            components.push(c);
        }
        stages.push(Stage::build(
            netlist,
            StageKind::GainStage,
            "Transistor Gain Stage",
            components,
            BTreeMap::new(),
        ));
    }

    // 5. Tone control: any user-adjustable resistive control
    if !controls.is_empty() {
        let mut components = controls.clone();
        if let Some(&c) = capacitors.iter().find(|c| !covered.contains(*c)) {
            components.push(c);
        }
        let mut params = BTreeMap::new();
        params.insert("control_count".to_string(), controls.len() as f64);
        stages.push(Stage::build(
            netlist,
            StageKind::ToneControl,
            "Tone Control",
            components,
            params,
        ));
    }

    // 6. Low-pass filter whenever a resistor and a capacitor coexist;
    //    an uncovered part is preferred, otherwise the first of each
    //    kind is reused (a series R can both terminate the input
    //    coupling and form the post-clipping roll-off)
    let free_r = resistors
        .iter()
        .find(|r| !covered.contains(*r))
        .or(resistors.first())
        .copied();
    let free_c = capacitors
        .iter()
        .find(|c| !covered.contains(*c))
        .or(capacitors.first())
        .copied();
    if let (Some(r), Some(c)) = (free_r, free_c) {
        let cutoff = 1.0 / (2.0 * PI * resistance(netlist, r) * capacitance(netlist, c));
        let mut params = BTreeMap::new();
        params.insert("cutoff_frequency".to_string(), cutoff);
        stages.push(Stage::build(
            netlist,
            StageKind::LowPassFilter,
            "Low-Pass Filter",
            vec![r, c],
            params,
        ));
    }

    // 7. Output buffer
    if let Some(&output) = outputs.first() {
        stages.push(Stage::build(
            netlist,
            StageKind::OutputBuffer,
            "Output Buffer",
            vec![output],
            BTreeMap::new(),
        ));
    }

    if stages.is_empty() {
        warnings.push(SemanticWarning::EmptyStageList);
    }

    debug!("identified {} stages", stages.len());
    (stages, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schematic::parse_source;
    use approx::assert_relative_eq;

    fn netlist(source: &str) -> Netlist {
        parse_source(source, "test").unwrap().netlist
    }

    #[test]
    fn test_rc_lowpass_single_stage() {
        let net = netlist(
            r#"<Element Type="Circuit.Resistor" Position="0,0">
  <Component Name="R1" Resistance="10k" />
</Element>
<Element Type="Circuit.Capacitor" Position="10,0">
  <Component Name="C1" Capacitance="10nF" />
</Element>"#,
        );
        let (stages, _) = identify_stages(&net);
        assert_eq!(stages.len(), 1);
        assert_eq!(stages[0].kind, StageKind::LowPassFilter);
        let cutoff = stages[0].dsp_params["cutoff_frequency"];
        assert_relative_eq!(cutoff, 1591.549, max_relative = 1e-4);
        assert_eq!(stages[0].primary_model, ModelKind::Resistor);
    }

    #[test]
    fn test_opamp_with_diodes_is_clipping_stage() {
        let net = netlist(
            r#"<Element Type="Circuit.OpAmp" Position="0,0">
  <Component Name="U1" PartNumber="TL072" />
</Element>
<Element Type="Circuit.Diode" Position="5,0">
  <Component Name="D1" PartNumber="1N4148" />
</Element>
<Element Type="Circuit.Diode" Position="5,5">
  <Component Name="D2" PartNumber="1N4148" />
</Element>"#,
        );
        let (stages, _) = identify_stages(&net);
        let clip = stages
            .iter()
            .find(|s| s.kind == StageKind::OpAmpClipping)
            .unwrap();
        assert_eq!(clip.primary_model, ModelKind::OpAmp);
        assert_eq!(clip.nonlinear_refs.len(), 2);
        assert_eq!(clip.nonlinear_refs[0].part_number, "1N4148");
    }

    #[test]
    fn test_opamp_gain_formula() {
        let net = netlist(
            r#"<Element Type="Circuit.OpAmp" Position="0,0">
  <Component Name="U1" />
</Element>
<Element Type="Circuit.Resistor" Position="5,0">
  <Component Name="R1" Resistance="1k" />
</Element>
<Element Type="Circuit.Resistor" Position="5,5">
  <Component Name="R2" Resistance="9k" />
</Element>"#,
        );
        let (stages, _) = identify_stages(&net);
        let gain = stages.iter().find(|s| s.kind == StageKind::GainStage).unwrap();
        assert_relative_eq!(gain.dsp_params["gain_linear"], 10.0, max_relative = 1e-12);
        assert_relative_eq!(gain.dsp_params["gain_db"], 20.0, max_relative = 1e-9);
    }

    #[test]
    fn test_input_first_output_last() {
        let net = netlist(
            r#"<Element Type="Circuit.Input" Position="0,0">
  <Component Name="In" />
</Element>
<Element Type="Circuit.Capacitor" Position="2,0">
  <Component Name="C1" Capacitance="100nF" />
</Element>
<Element Type="Circuit.Resistor" Position="4,0">
  <Component Name="R1" Resistance="1M" />
</Element>
<Element Type="Circuit.Potentiometer" Position="6,0">
  <Component Name="Volume" Resistance="100k" />
</Element>
<Element Type="Circuit.Output" Position="8,0">
  <Component Name="Out" />
</Element>"#,
        );
        let (stages, _) = identify_stages(&net);
        assert_eq!(stages.first().unwrap().kind, StageKind::InputBuffer);
        assert_eq!(stages.last().unwrap().kind, StageKind::OutputBuffer);
    }

    #[test]
    fn test_input_without_cap_warns() {
        let net = netlist(
            r#"<Element Type="Circuit.Input" Position="0,0">
  <Component Name="In" />
</Element>"#,
        );
        let (_, warnings) = identify_stages(&net);
        assert!(warnings.contains(&SemanticWarning::MissingCouplingCapacitor));
    }

    #[test]
    fn test_empty_netlist_warns_empty_stage_list() {
        let net = Netlist::new("empty");
        let (stages, warnings) = identify_stages(&net);
        assert!(stages.is_empty());
        assert!(warnings.contains(&SemanticWarning::EmptyStageList));
    }

    #[test]
    fn test_filter_reuses_consumed_resistor() {
        // One R total, consumed by the input buffer; the low-pass rule
        // still fires, pairing it with the free capacitor
        let net = netlist(
            r#"<Element Type="Circuit.Input" Position="0,0">
  <Component Name="In" />
</Element>
<Element Type="Circuit.Capacitor" Position="2,0">
  <Component Name="C1" Capacitance="100nF" />
</Element>
<Element Type="Circuit.Resistor" Position="4,0">
  <Component Name="R1" Resistance="10k" />
</Element>
<Element Type="Circuit.Capacitor" Position="6,0">
  <Component Name="C2" Capacitance="10nF" />
</Element>"#,
        );
        let (stages, _) = identify_stages(&net);
        let lp = stages
            .iter()
            .find(|s| s.kind == StageKind::LowPassFilter)
            .unwrap();
        // 10k against the uncovered 10nF cap
        assert_relative_eq!(
            lp.dsp_params["cutoff_frequency"],
            1591.549,
            max_relative = 1e-4
        );
    }
}
