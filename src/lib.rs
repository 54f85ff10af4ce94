//! # PCBDrill
//!
//! Turns a directory of PCB fabrication files into a drilling G-code program:
//! - Classifies Gerber layers and Excellon drill files by extension
//! - Parses drill hits and normalizes them to millimeters
//! - Emits a fixed drill cycle program for a CNC machine
//!
//! ## Architecture
//!
//! PCBDrill is organized as a workspace with multiple crates:
//!
//! 1. **pcbdrill-core** - Data model, unit conversion, errors
//! 2. **pcbdrill-camtools** - Layer scan, Excellon parsing, drill G-code
//! 3. **pcbdrill-settings** - Configuration files
//! 4. **pcbdrill** - Command-line front end that integrates all crates

pub mod cli;

pub use cli::{Cli, Command};

pub use pcbdrill_core::{Error, ExcellonError, HoleRecord, LayerKind, Result};

pub use pcbdrill_camtools::{
    parse_drill_file, scan_directory, synthesize_toolpath, DrillCycleParameters, DrillExport,
    GerberFailurePolicy, LayerPayload, LayerRecord, Session,
};

pub use pcbdrill_settings::{Config, DrillSettings, ScanSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Version string shown by `--version`
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("BUILD_DATE"),
    ")"
);

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output on stderr
/// - RUST_LOG environment variable support
/// - `default_level` when RUST_LOG does not say otherwise
pub fn init_logging(default_level: tracing::Level) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
