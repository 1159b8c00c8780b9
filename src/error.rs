//! Error types for the Pedalforge compiler.
//!
//! This module provides a unified error type [`ForgeError`] covering all
//! fatal conditions across schematic parsing, analysis, and code emission,
//! plus the non-fatal [`SemanticWarning`] diagnostics that the pipeline
//! accumulates and surfaces in reports without aborting generation.

use thiserror::Error;

/// Result type alias using [`ForgeError`].
pub type Result<T> = std::result::Result<T, ForgeError>;

/// Unified error type for all Pedalforge operations.
#[derive(Error, Debug)]
pub enum ForgeError {
    // ============ Schematic Parsing Errors ============
    /// Structural error in the schematic file
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// A structural numeric field (position, wire endpoint) failed to parse
    #[error("Invalid number '{value}' at line {line}: {message}")]
    InvalidNumber {
        value: String,
        line: usize,
        message: String,
    },

    /// Malformed coordinate pair, expected "x,y"
    #[error("Invalid coordinate '{value}' at line {line}")]
    InvalidCoordinate { value: String, line: usize },

    // ============ Code Emission Errors ============
    /// A stage references a component index outside the netlist
    #[error("Stage {stage_index} references missing component #{component}")]
    MissingComponent {
        stage_index: usize,
        component: usize,
    },

    /// A source name sanitized down to an empty identifier
    #[error("Component '{name}' in stage {stage_index} yields an empty identifier")]
    EmptyIdentifier { name: String, stage_index: usize },

    /// The circuit name sanitized down to an empty project name
    #[error("Circuit name '{name}' yields an empty project name")]
    EmptyProjectName { name: String },

    // ============ I/O Errors ============
    /// Error reading the schematic file
    #[error("Failed to read schematic file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing a generated artifact
    #[error("Failed to write '{path}': {source}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ForgeError {
    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid-number error
    pub fn invalid_number(value: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::InvalidNumber {
            value: value.into(),
            line,
            message: message.into(),
        }
    }

    /// Create a file-read error
    pub fn file_read(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileReadError {
            path: path.into(),
            source,
        }
    }

    /// Create a file-write error
    pub fn file_write(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileWriteError {
            path: path.into(),
            source,
        }
    }
}

/// Non-fatal diagnostics collected while compiling a schematic.
///
/// Warnings never abort the pipeline; they are rendered into the analysis
/// report and the generator emits conservative fallbacks around them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SemanticWarning {
    /// No stage could be identified from the component mix
    #[error("No processing stages identified; generated code is a pass-through")]
    EmptyStageList,

    /// A wire endpoint has no mate (no other wire or component touches it)
    #[error("Dangling wire endpoint at ({x}, {y})")]
    DanglingWire { x: i32, y: i32 },

    /// A component has no incident wire at its position
    #[error("Component '{name}' has no incident wire")]
    UnconnectedComponent { name: String },

    /// The input buffer stage found no coupling capacitor
    #[error("Input buffer has no coupling capacitor; DC offset may pass through")]
    MissingCouplingCapacitor,

    /// A part number was not in the database and a default was substituted
    #[error("Unknown part number '{part}'; using '{fallback}' parameters")]
    UnknownPartNumber { part: String, fallback: String },

    /// Two elements carried the same name; the later one was renamed
    #[error("Duplicate component name '{name}' at line {line}; renamed to '{renamed}'")]
    DuplicateName {
        name: String,
        line: usize,
        renamed: String,
    },
}
