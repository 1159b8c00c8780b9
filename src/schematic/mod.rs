//! Schematic parsing: file format reader, netlist data model, and
//! unit-suffixed value parsing.

mod reader;
mod types;
pub mod units;

pub use reader::{parse_file, parse_source, ParsedSchematic};
pub use types::{
    Attribute, Component, ComponentKind, ComponentRef, Netlist, Point, WireSegment,
};
