//! Electrical connectivity resolution.
//!
//! Wires join grid points; a union-find over every distinct point that
//! appears as a wire endpoint or component position yields the
//! electrical-node partition. Incidence is endpoint-exact: a component
//! sitting on the middle of a wire segment without an endpoint there is
//! not connected, matching the authoring tool's rule.

use std::collections::HashMap;

use log::debug;

use crate::error::SemanticWarning;
use crate::schematic::{ComponentRef, Netlist, Point};

/// One electrical node: an equivalence class of grid points plus the
/// components sitting on them.
#[derive(Debug, Clone)]
pub struct ElectricalNode {
    /// Stable identifier, assigned in order of each class's smallest point
    pub id: usize,
    /// Member points, sorted
    pub points: Vec<Point>,
    /// Components whose position lies in this class, in netlist order
    pub components: Vec<ComponentRef>,
}

/// The resolved connectivity of one netlist.
#[derive(Debug)]
pub struct Connectivity {
    nodes: Vec<ElectricalNode>,
    node_of_point: HashMap<Point, usize>,
    /// Points where two or more wires/components meet, sorted
    pub junctions: Vec<Point>,
    pub warnings: Vec<SemanticWarning>,
}

impl Connectivity {
    pub fn nodes(&self) -> &[ElectricalNode] {
        &self.nodes
    }

    /// Node id for a grid point, if any wire or component touches it.
    pub fn node_at(&self, point: Point) -> Option<usize> {
        self.node_of_point.get(&point).copied()
    }

    /// Node id for a component (by its position).
    pub fn node_of(&self, netlist: &Netlist, component: ComponentRef) -> Option<usize> {
        netlist
            .component(component)
            .and_then(|c| self.node_at(c.position))
    }

    /// Whether two components share an electrical node.
    pub fn connected(&self, netlist: &Netlist, a: ComponentRef, b: ComponentRef) -> bool {
        match (self.node_of(netlist, a), self.node_of(netlist, b)) {
            (Some(na), Some(nb)) => na == nb,
            _ => false,
        }
    }
}

/// Resolve the node partition, junction set, and connectivity warnings.
pub fn resolve(netlist: &Netlist) -> Connectivity {
    // Collect distinct points and per-point incidence counts
    let mut incidence: HashMap<Point, usize> = HashMap::new();
    for wire in &netlist.wires {
        *incidence.entry(wire.a).or_insert(0) += 1;
        *incidence.entry(wire.b).or_insert(0) += 1;
    }
    let wire_touch = incidence.clone();
    for comp in netlist.components() {
        *incidence.entry(comp.position).or_insert(0) += 1;
    }

    // Deterministic point indexing: sorted order
    let mut points: Vec<Point> = incidence.keys().copied().collect();
    points.sort();
    let index_of: HashMap<Point, usize> =
        points.iter().enumerate().map(|(i, &p)| (p, i)).collect();

    let mut uf = UnionFind::new(points.len());
    for wire in &netlist.wires {
        uf.union(index_of[&wire.a], index_of[&wire.b]);
    }

    // Group points by root; the sorted point list makes the smallest
    // member of each class the first one encountered, so class order is
    // independent of wire declaration order.
    let mut class_of_root: HashMap<usize, usize> = HashMap::new();
    let mut nodes: Vec<ElectricalNode> = Vec::new();
    for (i, &p) in points.iter().enumerate() {
        let root = uf.find(i);
        let class = *class_of_root.entry(root).or_insert_with(|| {
            nodes.push(ElectricalNode {
                id: nodes.len(),
                points: Vec::new(),
                components: Vec::new(),
            });
            nodes.len() - 1
        });
        nodes[class].points.push(p);
    }

    let mut node_of_point = HashMap::new();
    for node in &nodes {
        for &p in &node.points {
            node_of_point.insert(p, node.id);
        }
    }

    let mut warnings = Vec::new();
    for (idx, comp) in netlist.components().iter().enumerate() {
        let node = node_of_point[&comp.position];
        nodes[node].components.push(ComponentRef(idx));
        if !wire_touch.contains_key(&comp.position) && !netlist.wires.is_empty() {
            warnings.push(SemanticWarning::UnconnectedComponent {
                name: comp.name.clone(),
            });
        }
    }
    if netlist.wires.is_empty() && !netlist.is_empty() {
        // Zero wires: every component is its own singleton node
        for comp in netlist.components() {
            warnings.push(SemanticWarning::UnconnectedComponent {
                name: comp.name.clone(),
            });
        }
    }

    // Junctions: two or more incidences at one point
    let mut junctions: Vec<Point> = incidence
        .iter()
        .filter(|&(_, &count)| count >= 2)
        .map(|(&p, _)| p)
        .collect();
    junctions.sort();

    // Dangling wires: a wire endpoint nothing else touches
    let mut dangling: Vec<Point> = wire_touch
        .iter()
        .filter(|&(p, &wires)| wires == 1 && incidence[p] == 1)
        .map(|(&p, _)| p)
        .collect();
    dangling.sort();
    for p in dangling {
        warnings.push(SemanticWarning::DanglingWire { x: p.x, y: p.y });
    }

    debug!(
        "connectivity: {} nodes, {} junctions, {} warnings",
        nodes.len(),
        junctions.len(),
        warnings.len()
    );

    Connectivity {
        nodes,
        node_of_point,
        junctions,
        warnings,
    }
}

/// Union-find with path halving and union by size.
struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schematic::parse_source;

    fn netlist(source: &str) -> Netlist {
        parse_source(source, "test").unwrap().netlist
    }

    const CHAIN: &str = r#"<Element Type="Circuit.Resistor" Position="0,0">
  <Component Name="R1" Resistance="1k" />
</Element>
<Element Type="Circuit.Capacitor" Position="30,0">
  <Component Name="C1" Capacitance="10n" />
</Element>
<Element Type="Wire" A="0,0" B="10,0" />
<Element Type="Wire" A="10,0" B="30,0" />"#;

    #[test]
    fn test_wire_chain_joins_components() {
        let net = netlist(CHAIN);
        let conn = resolve(&net);
        assert!(conn.connected(&net, ComponentRef(0), ComponentRef(1)));
    }

    #[test]
    fn test_partition_stable_under_wire_permutation() {
        let net_a = netlist(CHAIN);
        let reversed = r#"<Element Type="Circuit.Resistor" Position="0,0">
  <Component Name="R1" Resistance="1k" />
</Element>
<Element Type="Circuit.Capacitor" Position="30,0">
  <Component Name="C1" Capacitance="10n" />
</Element>
<Element Type="Wire" A="10,0" B="30,0" />
<Element Type="Wire" A="0,0" B="10,0" />"#;
        let net_b = netlist(reversed);

        let conn_a = resolve(&net_a);
        let conn_b = resolve(&net_b);
        let classes_a: Vec<Vec<Point>> =
            conn_a.nodes().iter().map(|n| n.points.clone()).collect();
        let classes_b: Vec<Vec<Point>> =
            conn_b.nodes().iter().map(|n| n.points.clone()).collect();
        assert_eq!(classes_a, classes_b);
    }

    #[test]
    fn test_endpoint_exact_no_midspan_connection() {
        // C1 sits at (5,0), mid-span of the wire, with no endpoint there
        let source = r#"<Element Type="Circuit.Resistor" Position="0,0">
  <Component Name="R1" Resistance="1k" />
</Element>
<Element Type="Circuit.Capacitor" Position="5,0">
  <Component Name="C1" Capacitance="10n" />
</Element>
<Element Type="Wire" A="0,0" B="10,0" />"#;
        let net = netlist(source);
        let conn = resolve(&net);
        assert!(!conn.connected(&net, ComponentRef(0), ComponentRef(1)));
    }

    #[test]
    fn test_zero_wires_singleton_nodes() {
        let source = r#"<Element Type="Circuit.Resistor" Position="0,0">
  <Component Name="R1" Resistance="1k" />
</Element>
<Element Type="Circuit.Capacitor" Position="10,0">
  <Component Name="C1" Capacitance="10n" />
</Element>"#;
        let net = netlist(source);
        let conn = resolve(&net);
        assert_eq!(conn.nodes().len(), 2);
        assert!(conn
            .warnings
            .iter()
            .any(|w| matches!(w, SemanticWarning::UnconnectedComponent { name } if name == "R1")));
    }

    #[test]
    fn test_dangling_wire_warning() {
        let source = r#"<Element Type="Circuit.Resistor" Position="0,0">
  <Component Name="R1" Resistance="1k" />
</Element>
<Element Type="Wire" A="0,0" B="50,50" />"#;
        let net = netlist(source);
        let conn = resolve(&net);
        assert!(conn
            .warnings
            .iter()
            .any(|w| matches!(w, SemanticWarning::DanglingWire { x: 50, y: 50 })));
    }

    #[test]
    fn test_junction_at_shared_endpoint() {
        let source = r#"<Element Type="Wire" A="0,0" B="10,0" />
<Element Type="Wire" A="10,0" B="10,10" />
<Element Type="Wire" A="10,0" B="20,0" />"#;
        let net = netlist(source);
        let conn = resolve(&net);
        assert!(conn.junctions.contains(&Point::new(10, 0)));
        assert!(!conn.junctions.contains(&Point::new(20, 0)));
    }
}
