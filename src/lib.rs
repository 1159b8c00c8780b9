//! # Pedalforge Core
//!
//! A schematic-to-DSP compiler for guitar pedal circuits: it reads a
//! LiveSpice-style `.schx` schematic and emits a complete JUCE plug-in
//! project that approximates the circuit with per-stage DSP models.
//!
//! ## Pipeline
//!
//! 1. [`schematic`] - forgiving line-oriented reader for the XML-ish
//!    netlist format, plus the component-value unit table
//! 2. [`connectivity`] - union-find over wire endpoints and component
//!    positions, yielding electrical nodes and junctions
//! 3. [`analysis`] - stage identification, topology pattern matching,
//!    DSP model mapping, and plug-in parameter extraction
//! 4. [`codegen`] - deterministic emission of `CircuitProcessor.h`,
//!    `CircuitProcessor.cpp`, and `CMakeLists.txt`
//!
//! The [`models`] module carries the reference implementations of the
//! numerical models the generated code instantiates (Shockley diode
//! with Newton-Raphson and LUT solvers, Ebers-Moll BJT, quadratic FET,
//! behavioral op-amp, and the part database).
//!
//! ## Usage
//!
//! ```bash
//! pedalforge my_pedal.schx --optimized
//! ```
//!
//! Or as a library:
//!
//! ```no_run
//! use pedalforge_core::{compile_source, codegen::EmitOptions};
//!
//! let source = std::fs::read_to_string("my_pedal.schx")?;
//! let output = compile_source(&source, "my_pedal", &EmitOptions::default())?;
//! println!("{}", output.project.header);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Emission is deterministic: the same schematic produces byte-identical
//! artifacts on every run.

pub mod analysis;
pub mod codegen;
pub mod connectivity;
pub mod error;
pub mod models;
pub mod report;
pub mod schematic;

// Re-export main types for convenience
pub use analysis::{analyze, CircuitAnalysis};
pub use codegen::{emit, EmitOptions, GeneratedProject};
pub use connectivity::{resolve, Connectivity};
pub use error::{ForgeError, Result, SemanticWarning};
pub use schematic::{parse_file, parse_source, Netlist};

/// Default sample rate in Hz
pub const DEFAULT_SAMPLE_RATE: f64 = 48000.0;

/// Thermal voltage at room temperature (approximately 26mV)
pub const THERMAL_VOLTAGE: f64 = 0.026;

/// Everything one compilation produces.
#[derive(Debug)]
pub struct CompileOutput {
    pub netlist: Netlist,
    pub connectivity: Connectivity,
    pub analysis: CircuitAnalysis,
    pub project: GeneratedProject,
    /// Parse, connectivity, and analysis warnings, in pipeline order
    pub warnings: Vec<SemanticWarning>,
}

/// Run the whole pipeline over schematic text.
pub fn compile_source(
    source: &str,
    default_name: &str,
    options: &EmitOptions,
) -> Result<CompileOutput> {
    let parsed = parse_source(source, default_name)?;
    let connectivity = resolve(&parsed.netlist);
    let analysis = analyze(&parsed.netlist);
    let project = emit(&parsed.netlist, &analysis, options)?;

    let mut warnings = parsed.warnings;
    warnings.extend(connectivity.warnings.iter().cloned());
    warnings.extend(analysis.warnings.iter().cloned());

    Ok(CompileOutput {
        netlist: parsed.netlist,
        connectivity,
        analysis,
        project,
        warnings,
    })
}
