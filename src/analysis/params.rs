//! Plug-in parameter extraction from user-adjustable controls.

use std::fmt;

use crate::schematic::{ComponentKind, Netlist};

/// Parameter value shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Continuous,
    Boolean,
}

/// Taper applied by the host UI. This release maps everything linearly
/// but the semantic class is retained for future taper selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scaling {
    Linear,
    Logarithmic,
    Exponential,
}

/// Coarse semantic class derived from the control's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamClass {
    Gain,
    Tone,
    Generic,
    Bypass,
}

impl fmt::Display for ParamClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParamClass::Gain => "gain",
            ParamClass::Tone => "tone",
            ParamClass::Generic => "generic",
            ParamClass::Bypass => "bypass",
        };
        f.write_str(s)
    }
}

/// A normalized user-facing plug-in control.
#[derive(Debug, Clone)]
pub struct PluginParameter {
    /// Slug identifier, unique within the plug-in
    pub id: String,
    pub display_name: String,
    pub kind: ParamKind,
    pub default: f64,
    pub min: f64,
    pub max: f64,
    /// Name of the schematic component this control came from;
    /// `None` for the synthesized bypass switch
    pub source_component: Option<String>,
    pub scaling: Scaling,
    pub class: ParamClass,
}

const GAIN_MARKERS: &[&str] = &["drive", "gain", "level", "volume"];
const TONE_MARKERS: &[&str] = &["tone", "treble", "bass", "mid"];

/// Lowercase the name and collapse every run of non-alphanumeric
/// characters to a single underscore. An empty result becomes `param`;
/// a leading digit gets a `_` prefix so the id embeds directly into the
/// generated member names.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    if slug.is_empty() {
        "param".to_string()
    } else if slug.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{slug}")
    } else {
        slug
    }
}

fn classify(name: &str) -> ParamClass {
    let lower = name.to_lowercase();
    if GAIN_MARKERS.iter().any(|m| lower.contains(m)) {
        ParamClass::Gain
    } else if TONE_MARKERS.iter().any(|m| lower.contains(m)) {
        ParamClass::Tone
    } else {
        ParamClass::Generic
    }
}

fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Extract the ordered parameter list: one continuous `[0, 1]` control
/// per potentiometer or variable resistor, then exactly one synthesized
/// boolean bypass. Duplicate slugs are disambiguated with a numeric
/// suffix; `bypass` is reserved for the synthesized switch.
pub fn extract_parameters(netlist: &Netlist) -> Vec<PluginParameter> {
    let mut params = Vec::new();
    let mut used: Vec<String> = vec!["bypass".to_string()];

    for component in netlist.components() {
        if !matches!(
            component.kind,
            ComponentKind::Potentiometer | ComponentKind::VariableResistor
        ) {
            continue;
        }

        let base = slugify(&component.name);
        let mut id = base.clone();
        let mut suffix = 2usize;
        while used.contains(&id) {
            id = format!("{base}_{suffix}");
            suffix += 1;
        }
        used.push(id.clone());

        let default = component
            .attr("Wipe")
            .and_then(crate::schematic::units::parse_value)
            .map(|w| w.clamp(0.0, 1.0))
            .unwrap_or(0.5);

        params.push(PluginParameter {
            id,
            display_name: display_name(&component.name),
            kind: ParamKind::Continuous,
            default,
            min: 0.0,
            max: 1.0,
            source_component: Some(component.name.clone()),
            scaling: Scaling::Linear,
            class: classify(&component.name),
        });
    }

    params.push(PluginParameter {
        id: "bypass".to_string(),
        display_name: "Bypass".to_string(),
        kind: ParamKind::Boolean,
        default: 0.0,
        min: 0.0,
        max: 1.0,
        source_component: None,
        scaling: Scaling::Linear,
        class: ParamClass::Bypass,
    });

    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schematic::parse_source;

    fn pot(name: &str, extra: &str) -> String {
        format!(
            "<Element Type=\"Circuit.Potentiometer\" Position=\"0,{}\">\n  <Component Name=\"{}\" Resistance=\"100k\" {} />\n</Element>\n",
            name.len(),
            name,
            extra
        )
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Drive"), "drive");
        assert_eq!(slugify("Tone Knob #2"), "tone_knob_2");
        assert_eq!(slugify("***"), "param");
        assert_eq!(slugify("  Level  "), "level");
        assert_eq!(slugify("2Tone"), "_2tone");
    }

    #[test]
    fn test_three_knobs_plus_bypass() {
        let source = pot("Drive", "") + &pot("Level", "") + &pot("Tone", "");
        let net = parse_source(&source, "x").unwrap().netlist;
        let params = extract_parameters(&net);
        let ids: Vec<&str> = params.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["drive", "level", "tone", "bypass"]);
        assert_eq!(params[0].class, ParamClass::Gain);
        assert_eq!(params[2].class, ParamClass::Tone);
        assert_eq!(params[3].kind, ParamKind::Boolean);
        assert_eq!(params[3].default, 0.0);
    }

    #[test]
    fn test_wipe_attribute_sets_default() {
        let source = pot("Drive", "Wipe=\"0.75\"");
        let net = parse_source(&source, "x").unwrap().netlist;
        let params = extract_parameters(&net);
        assert_eq!(params[0].default, 0.75);
    }

    #[test]
    fn test_wipe_clamped() {
        let source = pot("Drive", "Wipe=\"1.5\"");
        let net = parse_source(&source, "x").unwrap().netlist;
        assert_eq!(extract_parameters(&net)[0].default, 1.0);
    }

    #[test]
    fn test_duplicate_slugs_disambiguated() {
        // "Tone!" and "Tone?" both slug to "tone"
        let source = pot("Tone!", "") + &pot("Tone?", "");
        let net = parse_source(&source, "x").unwrap().netlist;
        let params = extract_parameters(&net);
        let ids: Vec<&str> = params.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["tone", "tone_2", "bypass"]);
    }

    #[test]
    fn test_bypass_slug_reserved() {
        let source = pot("Bypass", "");
        let net = parse_source(&source, "x").unwrap().netlist;
        let params = extract_parameters(&net);
        let ids: Vec<&str> = params.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["bypass_2", "bypass"]);
        // Exactly one boolean bypass
        assert_eq!(
            params.iter().filter(|p| p.kind == ParamKind::Boolean).count(),
            1
        );
    }
}
