//! Forgiving line-oriented reader for the schematic capture format.
//!
//! The format is XML-shaped but the files in the wild are regular enough
//! that a line scanner handles them: a top-level `Schematic` tag, one
//! `Element` tag per placed part with a nested `Component` record for its
//! attributes, and self-closing `Element Type="Wire"` tags carrying the
//! two endpoints. Unknown tags and unknown attributes are ignored.

use std::fs;
use std::path::Path;

use log::{debug, warn};

use crate::error::{ForgeError, Result, SemanticWarning};

use super::types::{Attribute, Component, ComponentKind, Netlist, Point, WireSegment};

/// A parsed schematic plus the non-fatal diagnostics collected on the way.
#[derive(Debug)]
pub struct ParsedSchematic {
    pub netlist: Netlist,
    pub warnings: Vec<SemanticWarning>,
}

/// Read and parse a schematic file. The file stem becomes the circuit
/// name when the `Schematic` tag carries none.
pub fn parse_file(path: &Path) -> Result<ParsedSchematic> {
    let text = fs::read_to_string(path)
        .map_err(|e| ForgeError::file_read(path.display().to_string(), e))?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Circuit".to_string());
    parse_source(&text, &stem)
}

/// Parse schematic text. `default_name` is used when the top-level tag
/// has no `Name` attribute.
pub fn parse_source(text: &str, default_name: &str) -> Result<ParsedSchematic> {
    let mut netlist = Netlist::new(default_name);
    let mut warnings = Vec::new();
    let mut pending: Option<PendingElement> = None;

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();

        if line.starts_with("<Schematic") {
            let attrs = tag_attributes(line);
            if let Some(name) = attr_of(&attrs, "Name") {
                if !name.is_empty() {
                    netlist.name = name.to_string();
                }
            }
            if let Some(desc) = attr_of(&attrs, "Description") {
                netlist.description = desc.to_string();
            }
        } else if line.starts_with("<Element") {
            let attrs = tag_attributes(line);
            let type_str = attr_of(&attrs, "Type").unwrap_or("");
            let kind = ComponentKind::from_type_str(type_str);

            if kind == ComponentKind::Wire {
                let a = parse_point(require_attr(&attrs, "A", line_no)?, line_no)?;
                let b = parse_point(require_attr(&attrs, "B", line_no)?, line_no)?;
                netlist.push_wire(WireSegment { a, b });
                continue;
            }

            let position = parse_point(require_attr(&attrs, "Position", line_no)?, line_no)?;
            let rotation = match attr_of(&attrs, "Rotation") {
                Some(r) => r
                    .parse::<i32>()
                    .map_err(|e| ForgeError::invalid_number(r, line_no, e.to_string()))?,
                None => 0,
            };
            let flip = attr_of(&attrs, "Flip")
                .map(|f| f.eq_ignore_ascii_case("true"))
                .unwrap_or(false);

            let element = PendingElement {
                kind,
                position,
                rotation,
                flip,
                line: line_no,
                name: None,
                attributes: Vec::new(),
            };

            // Self-closing elements carry no nested component record
            if line.ends_with("/>") {
                finalize(element, &mut netlist, &mut warnings);
            } else {
                if pending.is_some() {
                    return Err(ForgeError::parse(line_no, "nested <Element> tags"));
                }
                pending = Some(element);
            }
        } else if line.starts_with("<Component") {
            let Some(element) = pending.as_mut() else {
                // Stray component record outside an element; skip it
                warn!("line {}: <Component> outside <Element>, ignored", line_no);
                continue;
            };
            for (key, value) in tag_attributes(line) {
                match key.as_str() {
                    "Name" => element.name = Some(value),
                    "_Type" => {
                        let refined = ComponentKind::from_type_str(&value);
                        if refined != ComponentKind::Unknown {
                            element.kind = refined;
                        }
                    }
                    _ => element.attributes.push(Attribute { name: key, raw: value }),
                }
            }
            if line.ends_with("/>") {
                if let Some(element) = pending.take() {
                    finalize(element, &mut netlist, &mut warnings);
                }
            }
        } else if line.starts_with("</Element") {
            if let Some(element) = pending.take() {
                finalize(element, &mut netlist, &mut warnings);
            }
        }
        // Every other tag is ignored by design
    }

    if let Some(element) = pending.take() {
        finalize(element, &mut netlist, &mut warnings);
    }

    debug!(
        "parsed schematic '{}': {} components, {} wires",
        netlist.name,
        netlist.len(),
        netlist.wires.len()
    );

    Ok(ParsedSchematic { netlist, warnings })
}

struct PendingElement {
    kind: ComponentKind,
    position: Point,
    rotation: i32,
    flip: bool,
    line: usize,
    name: Option<String>,
    attributes: Vec<Attribute>,
}

fn finalize(element: PendingElement, netlist: &mut Netlist, warnings: &mut Vec<SemanticWarning>) {
    let mut name = match element.name {
        Some(n) if !n.is_empty() => n,
        _ => format!("Unnamed_{}", element.line),
    };

    if netlist.contains_name(&name) {
        let original = name.clone();
        let mut suffix = 2usize;
        while netlist.contains_name(&format!("{name}_{suffix}")) {
            suffix += 1;
        }
        name = format!("{name}_{suffix}");
        warnings.push(SemanticWarning::DuplicateName {
            name: original,
            line: element.line,
            renamed: name.clone(),
        });
    }

    netlist.push_component(Component {
        name,
        kind: element.kind,
        position: element.position,
        rotation: element.rotation,
        flip: element.flip,
        attributes: element.attributes,
        line: element.line,
    });
}

/// Extract `key="value"` pairs from one tag line. No escape handling;
/// the format never quotes quotes.
fn tag_attributes(line: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let bytes = line.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        // Find the start of an identifier
        if !(bytes[i] as char).is_ascii_alphabetic() && bytes[i] != b'_' {
            i += 1;
            continue;
        }
        let key_start = i;
        while i < bytes.len()
            && ((bytes[i] as char).is_ascii_alphanumeric() || bytes[i] == b'_')
        {
            i += 1;
        }
        let key_end = i;
        while i < bytes.len() && bytes[i] == b' ' {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b'=' {
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i] == b' ' {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b'"' {
            continue;
        }
        i += 1;
        let value_start = i;
        while i < bytes.len() && bytes[i] != b'"' {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }
        attrs.push((
            line[key_start..key_end].to_string(),
            line[value_start..i].to_string(),
        ));
        i += 1;
    }

    attrs
}

fn attr_of<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn require_attr<'a>(
    attrs: &'a [(String, String)],
    name: &str,
    line: usize,
) -> Result<&'a str> {
    attr_of(attrs, name).ok_or_else(|| ForgeError::parse(line, format!("missing {name} attribute")))
}

/// Parse an `"x,y"` coordinate pair.
fn parse_point(value: &str, line: usize) -> Result<Point> {
    let mut parts = value.splitn(2, ',');
    let (Some(xs), Some(ys)) = (parts.next(), parts.next()) else {
        return Err(ForgeError::InvalidCoordinate {
            value: value.to_string(),
            line,
        });
    };
    let x = xs.trim().parse::<i32>().map_err(|_| ForgeError::InvalidCoordinate {
        value: value.to_string(),
        line,
    })?;
    let y = ys.trim().parse::<i32>().map_err(|_| ForgeError::InvalidCoordinate {
        value: value.to_string(),
        line,
    })?;
    Ok(Point::new(x, y))
}
