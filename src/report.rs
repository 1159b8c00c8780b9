//! Human-readable analysis report, printed to stdout and written next
//! to the generated project.
//!
//! Everything here iterates collections in their stored (already
//! deterministic) order, so repeated runs print identical text.

use std::fmt::Write;

use crate::analysis::{CircuitAnalysis, ParamKind};
use crate::connectivity::Connectivity;
use crate::error::SemanticWarning;
use crate::schematic::{ComponentKind, Netlist};

const RULE: &str = "----------------------------------------------------------------";

/// Component-kind breakdown in a fixed display order.
fn component_summary(netlist: &Netlist) -> Vec<(ComponentKind, usize)> {
    const ORDER: &[ComponentKind] = &[
        ComponentKind::Resistor,
        ComponentKind::Potentiometer,
        ComponentKind::VariableResistor,
        ComponentKind::Capacitor,
        ComponentKind::Inductor,
        ComponentKind::Diode,
        ComponentKind::Transistor,
        ComponentKind::OpAmp,
        ComponentKind::Transformer,
        ComponentKind::Speaker,
        ComponentKind::Input,
        ComponentKind::Output,
        ComponentKind::Ground,
        ComponentKind::Rail,
        ComponentKind::Label,
        ComponentKind::Unknown,
    ];
    ORDER
        .iter()
        .map(|&kind| (kind, netlist.count_kind(kind)))
        .filter(|&(_, n)| n > 0)
        .collect()
}

/// Render the full analysis report for one compiled circuit.
pub fn render(
    netlist: &Netlist,
    connectivity: &Connectivity,
    analysis: &CircuitAnalysis,
    warnings: &[SemanticWarning],
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Circuit: {}", netlist.name);
    if !netlist.description.is_empty() {
        let _ = writeln!(out, "         {}", netlist.description);
    }
    let _ = writeln!(out, "{RULE}");

    let _ = writeln!(out, "\nComponents ({}):", netlist.len());
    for (kind, n) in component_summary(netlist) {
        let _ = writeln!(out, "  {kind:<18} {n}");
    }

    let _ = writeln!(
        out,
        "\nConnectivity: {} nodes, {} junctions",
        connectivity.nodes().len(),
        connectivity.junctions.len()
    );
    for node in connectivity.nodes() {
        let names: Vec<&str> = node
            .components
            .iter()
            .filter_map(|&r| netlist.component(r).map(|c| c.name.as_str()))
            .collect();
        let _ = writeln!(
            out,
            "  node {}: {} points, components [{}]",
            node.id,
            node.points.len(),
            names.join(", ")
        );
    }

    let _ = writeln!(out, "\nSignal chain ({} stages):", analysis.stages.len());
    for (i, stage) in analysis.stages.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, stage.display_name);
        if let Some(pattern) = &stage.pattern {
            let _ = writeln!(
                out,
                "     pattern: {} (confidence {:.2}, strategy {})",
                pattern.name, pattern.confidence, pattern.strategy_tag
            );
        }
        for (key, value) in &stage.dsp_params {
            let _ = writeln!(out, "     {key} = {value:.6}");
        }
        for nl in &stage.nonlinear_refs {
            let _ = writeln!(out, "     model: {} ({})", nl.source_name, nl.part_number);
        }
    }

    let _ = writeln!(out, "\nParameters ({}):", analysis.parameters.len());
    for p in &analysis.parameters {
        match p.kind {
            ParamKind::Boolean => {
                let _ = writeln!(
                    out,
                    "  {:<20} \"{}\" bool, default {}",
                    p.id,
                    p.display_name,
                    p.default >= 0.5
                );
            }
            ParamKind::Continuous => {
                let _ = writeln!(
                    out,
                    "  {:<20} \"{}\" [{:.3} .. {:.3}], default {:.3} ({})",
                    p.id, p.display_name, p.min, p.max, p.default, p.class
                );
            }
        }
    }

    if !warnings.is_empty() {
        let _ = writeln!(out, "\nWarnings ({}):", warnings.len());
        for w in warnings {
            let _ = writeln!(out, "  - {w}");
        }
    }

    let _ = writeln!(out, "{RULE}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::connectivity::resolve;
    use crate::schematic::parse_source;

    const SCHEMATIC: &str = r#"<Schematic Name="Report Test" Description="One RC section">
<Element Type="Circuit.Resistor" Position="0,0">
  <Component Name="R1" Resistance="10k" />
</Element>
<Element Type="Circuit.Capacitor" Position="10,0">
  <Component Name="C1" Capacitance="10nF" />
</Element>
<Element Type="Wire" A="0,0" B="10,0" />
</Schematic>"#;

    #[test]
    fn test_report_sections_present() {
        let parsed = parse_source(SCHEMATIC, "Report Test").unwrap();
        let connectivity = resolve(&parsed.netlist);
        let analysis = analyze(&parsed.netlist);
        let mut warnings = parsed.warnings.clone();
        warnings.extend(connectivity.warnings.clone());
        warnings.extend(analysis.warnings.clone());

        let text = render(&parsed.netlist, &connectivity, &analysis, &warnings);
        assert!(text.contains("Circuit: Report Test"));
        assert!(text.contains("One RC section"));
        assert!(text.contains("Components (2):"));
        assert!(text.contains("Resistor"));
        assert!(text.contains("Signal chain"));
        assert!(text.contains("Parameters"));
        assert!(text.contains("bypass"));
    }

    #[test]
    fn test_report_is_deterministic() {
        let parsed = parse_source(SCHEMATIC, "Report Test").unwrap();
        let connectivity = resolve(&parsed.netlist);
        let analysis = analyze(&parsed.netlist);
        let a = render(&parsed.netlist, &connectivity, &analysis, &[]);
        let b = render(&parsed.netlist, &connectivity, &analysis, &[]);
        assert_eq!(a, b);
    }
}
