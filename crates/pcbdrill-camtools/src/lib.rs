//! # PCBDrill CAM Tools
//!
//! This crate turns a directory of PCB fabrication files into a drilling program.
//!
//! ## Pipeline
//!
//! - **Layer Scan**: Sorts a directory's files by name and tags each one as a decoded
//!   Gerber layer or an unparsed drill/text file
//! - **Excellon**: Decodes NC drill files (tool table, hits, unit mode)
//! - **Drill Parser**: Normalizes a drill file to millimeters and keeps the plunge hits
//! - **Drill Press**: Emits a fixed drill cycle G-Code program for a hole list
//!
//! ## Supporting Infrastructure
//!
//! - **Gerber**: Narrow decoder interface plus a `gerber_parser` implementation
//! - **Session**: Caller-owned state tying the stages together

pub mod drill_parser;
pub mod drill_press;
pub mod excellon;
pub mod gerber;
pub mod layer_scan;
pub mod session;

// Re-export commonly used items
pub use drill_parser::{parse_drill_file, parse_drill_file_with};
pub use drill_press::{synthesize_toolpath, DrillCycleGenerator, DrillCycleParameters};
pub use excellon::{DrillFile, DrillHit, DrillTool, ExcellonDecoder, ExcellonReader};
pub use gerber::{GerberArtifact, GerberDecoder, GerberFileDecoder, LayerKindHint};
pub use layer_scan::{
    scan_directory, scan_directory_with, GerberFailurePolicy, LayerPayload, LayerRecord,
};
pub use session::{DrillExport, LayerRenderer, Session};
