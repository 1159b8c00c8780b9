//! Pedalforge - Schematic to JUCE Plug-in Compiler
//!
//! Reads a LiveSpice-style `.schx` schematic and writes a ready-to-build
//! JUCE plug-in project next to it.
//!
//! # Usage
//!
//! ```bash
//! pedalforge my_pedal.schx --optimized --out-dir build/
//! ```

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use log::{info, warn};
use pedalforge_core::{
    analysis, codegen, connectivity,
    error::{ForgeError, Result},
    report, schematic,
};

/// Guitar pedal schematic compiler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the schematic file (.schx)
    #[arg(value_name = "SCHEMATIC_FILE")]
    schematic_file: PathBuf,

    /// Enable pattern-gated optimized DSP strategies
    #[arg(long)]
    optimized: bool,

    /// Output directory; defaults to a directory named after the
    /// circuit, next to the schematic
    #[arg(short, long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Initial sample rate baked into the generated processor
    #[arg(short, long, default_value_t = pedalforge_core::DEFAULT_SAMPLE_RATE)]
    sample_rate: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // Parse the schematic
    let parsed = schematic::parse_file(&args.schematic_file)?;

    // Resolve connectivity and analyze the signal chain
    let connectivity = connectivity::resolve(&parsed.netlist);
    let analysis = analysis::analyze(&parsed.netlist);

    // Emit the plug-in project
    let options = codegen::EmitOptions {
        optimized: args.optimized,
        sample_rate: args.sample_rate,
    };
    let project = codegen::emit(&parsed.netlist, &analysis, &options)?;

    let mut warnings = parsed.warnings;
    warnings.extend(connectivity.warnings.iter().cloned());
    warnings.extend(analysis.warnings.iter().cloned());
    for w in &warnings {
        warn!("{w}");
    }

    let text = report::render(&parsed.netlist, &connectivity, &analysis, &warnings);
    print!("{text}");

    // Write the project directory
    let out_dir = args.out_dir.unwrap_or_else(|| {
        let parent = args
            .schematic_file
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default();
        parent.join(&project.project_name)
    });
    fs::create_dir_all(&out_dir)
        .map_err(|e| ForgeError::file_write(out_dir.display().to_string(), e))?;

    let write = |name: &str, contents: &str| -> Result<()> {
        let path = out_dir.join(name);
        fs::write(&path, contents)
            .map_err(|e| ForgeError::file_write(path.display().to_string(), e))
    };
    write("CircuitProcessor.h", &project.header)?;
    write("CircuitProcessor.cpp", &project.source)?;
    write("CMakeLists.txt", &project.cmake)?;
    if !warnings.is_empty() {
        write("analysis_report.txt", &text)?;
    }

    info!(
        "wrote project '{}' to {}",
        project.project_name,
        out_dir.display()
    );
    Ok(())
}
