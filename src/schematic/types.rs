//! Core types for the schematic netlist.

use std::collections::HashMap;
use std::fmt;

/// An integer point in the schematic authoring tool's grid space.
///
/// Coordinates are never scaled; connectivity is endpoint-exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A unique index of a component within its [`Netlist`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentRef(pub usize);

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

/// The closed set of schematic component kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Resistor,
    Capacitor,
    Inductor,
    VariableResistor,
    Potentiometer,
    Diode,
    Transformer,
    OpAmp,
    Transistor,
    Speaker,
    Input,
    Output,
    Ground,
    Rail,
    Wire,
    Label,
    Unknown,
}

impl ComponentKind {
    /// Map an element/component type string onto a kind.
    ///
    /// Matching is by substring in priority order: variable-resistor
    /// families are tested before plain resistors so that
    /// "VariableResistor" never falls into the Resistor arm, op-amp
    /// ideal and behavioral forms both map to [`ComponentKind::OpAmp`],
    /// and BJT plus generic transistor strings both map to
    /// [`ComponentKind::Transistor`].
    pub fn from_type_str(type_str: &str) -> Self {
        let t = type_str;
        if t.contains("Wire") {
            ComponentKind::Wire
        } else if t.contains("Potentiometer") {
            ComponentKind::Potentiometer
        } else if t.contains("VariableResistor") || t.contains("Rheostat") {
            ComponentKind::VariableResistor
        } else if t.contains("Resistor") {
            ComponentKind::Resistor
        } else if t.contains("Capacitor") {
            ComponentKind::Capacitor
        } else if t.contains("Inductor") {
            ComponentKind::Inductor
        } else if t.contains("Diode") {
            ComponentKind::Diode
        } else if t.contains("Transformer") {
            ComponentKind::Transformer
        } else if t.contains("IdealOpAmp") || t.contains("OpAmp") {
            ComponentKind::OpAmp
        } else if t.contains("BJT") || t.contains("Transistor") || t.contains("JFET") {
            ComponentKind::Transistor
        } else if t.contains("Speaker") {
            ComponentKind::Speaker
        } else if t.contains("Input") {
            ComponentKind::Input
        } else if t.contains("Output") {
            ComponentKind::Output
        } else if t.contains("Ground") {
            ComponentKind::Ground
        } else if t.contains("Rail") || t.contains("VoltageSource") || t.contains("Battery") {
            ComponentKind::Rail
        } else if t.contains("Label") || t.contains("Text") {
            ComponentKind::Label
        } else {
            ComponentKind::Unknown
        }
    }

    /// True for devices that shape the signal nonlinearly or actively.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ComponentKind::OpAmp | ComponentKind::Diode | ComponentKind::Transistor
        )
    }

    /// True for the linear passives.
    pub fn is_passive(&self) -> bool {
        matches!(
            self,
            ComponentKind::Resistor | ComponentKind::Capacitor | ComponentKind::Inductor
        )
    }

    /// True for user-adjustable resistive controls.
    pub fn is_control(&self) -> bool {
        matches!(
            self,
            ComponentKind::Potentiometer | ComponentKind::VariableResistor
        )
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComponentKind::Resistor => "Resistor",
            ComponentKind::Capacitor => "Capacitor",
            ComponentKind::Inductor => "Inductor",
            ComponentKind::VariableResistor => "VariableResistor",
            ComponentKind::Potentiometer => "Potentiometer",
            ComponentKind::Diode => "Diode",
            ComponentKind::Transformer => "Transformer",
            ComponentKind::OpAmp => "OpAmp",
            ComponentKind::Transistor => "Transistor",
            ComponentKind::Speaker => "Speaker",
            ComponentKind::Input => "Input",
            ComponentKind::Output => "Output",
            ComponentKind::Ground => "Ground",
            ComponentKind::Rail => "Rail",
            ComponentKind::Wire => "Wire",
            ComponentKind::Label => "Label",
            ComponentKind::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// One attribute as authored in the schematic: raw text, parsed lazily.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub raw: String,
}

/// A single schematic element. Immutable after parsing.
#[derive(Debug, Clone)]
pub struct Component {
    /// Unique textual name within one schematic
    pub name: String,
    pub kind: ComponentKind,
    pub position: Point,
    /// Rotation in degrees, a multiple of 90
    pub rotation: i32,
    pub flip: bool,
    /// Attributes in authoring order
    pub attributes: Vec<Attribute>,
    /// Source line of the opening element tag
    pub line: usize,
}

impl Component {
    /// Look up an attribute's raw text by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.raw.as_str())
    }

    /// Read the first present attribute from a list of synonyms as a
    /// unit-suffixed number. Non-numeric or absent values yield `None`;
    /// the caller supplies the schema default.
    pub fn attr_value(&self, names: &[&str]) -> Option<f64> {
        names
            .iter()
            .find_map(|n| self.attr(n))
            .and_then(super::units::parse_value)
    }
}

/// An undirected wire segment. No name, no attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireSegment {
    pub a: Point,
    pub b: Point,
}

/// The authoritative electrical description of one schematic:
/// insertion-ordered components plus wire segments.
///
/// The netlist uniquely owns its components; every derived artifact
/// (nodes, stages, parameters) holds [`ComponentRef`] indices back into
/// it and never mutates it.
#[derive(Debug, Default)]
pub struct Netlist {
    /// Circuit name from the top-level tag (or the file stem)
    pub name: String,
    pub description: String,
    components: Vec<Component>,
    name_index: HashMap<String, usize>,
    pub wires: Vec<WireSegment>,
}

impl Netlist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Append a component, returning its reference. The caller must have
    /// ensured the name is unique.
    pub fn push_component(&mut self, component: Component) -> ComponentRef {
        let idx = self.components.len();
        self.name_index.insert(component.name.clone(), idx);
        self.components.push(component);
        ComponentRef(idx)
    }

    pub fn push_wire(&mut self, wire: WireSegment) {
        self.wires.push(wire);
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, r: ComponentRef) -> Option<&Component> {
        self.components.get(r.0)
    }

    pub fn by_name(&self, name: &str) -> Option<&Component> {
        self.name_index.get(name).map(|&i| &self.components[i])
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.name_index.contains_key(name)
    }

    /// Components of a given kind, in insertion order.
    pub fn of_kind(&self, kind: ComponentKind) -> impl Iterator<Item = (ComponentRef, &Component)> {
        self.components
            .iter()
            .enumerate()
            .filter(move |(_, c)| c.kind == kind)
            .map(|(i, c)| (ComponentRef(i), c))
    }

    /// Count components of a given kind.
    pub fn count_kind(&self, kind: ComponentKind) -> usize {
        self.components.iter().filter(|c| c.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_priority_order() {
        assert_eq!(
            ComponentKind::from_type_str("Circuit.VariableResistor"),
            ComponentKind::VariableResistor
        );
        assert_eq!(
            ComponentKind::from_type_str("Circuit.Potentiometer"),
            ComponentKind::Potentiometer
        );
        assert_eq!(
            ComponentKind::from_type_str("Circuit.Resistor"),
            ComponentKind::Resistor
        );
        assert_eq!(
            ComponentKind::from_type_str("Circuit.IdealOpAmp"),
            ComponentKind::OpAmp
        );
        assert_eq!(
            ComponentKind::from_type_str("Circuit.OpAmp"),
            ComponentKind::OpAmp
        );
        assert_eq!(
            ComponentKind::from_type_str("Circuit.BJT"),
            ComponentKind::Transistor
        );
        assert_eq!(
            ComponentKind::from_type_str("Circuit.Transistor"),
            ComponentKind::Transistor
        );
        assert_eq!(
            ComponentKind::from_type_str("Circuit.Mystery"),
            ComponentKind::Unknown
        );
    }

    #[test]
    fn test_netlist_ordering_and_lookup() {
        let mut net = Netlist::new("test");
        net.push_component(Component {
            name: "R1".to_string(),
            kind: ComponentKind::Resistor,
            position: Point::new(0, 0),
            rotation: 0,
            flip: false,
            attributes: vec![],
            line: 1,
        });
        net.push_component(Component {
            name: "C1".to_string(),
            kind: ComponentKind::Capacitor,
            position: Point::new(10, 0),
            rotation: 0,
            flip: false,
            attributes: vec![],
            line: 2,
        });
        assert_eq!(net.len(), 2);
        assert!(net.by_name("R1").is_some());
        assert_eq!(net.count_kind(ComponentKind::Capacitor), 1);
        let kinds: Vec<_> = net.components().iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ComponentKind::Resistor, ComponentKind::Capacitor]);
    }
}
