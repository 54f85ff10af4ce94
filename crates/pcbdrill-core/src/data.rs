//! Data models shared across the drill pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Layer classification for a fabrication file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// Copper artwork (top, bottom, or inner)
    Copper,
    /// Solder mask
    SolderMask,
    /// Silkscreen / legend
    Silkscreen,
    /// Solder paste stencil
    Paste,
    /// Board outline / profile
    Outline,
    /// Drill and plain-text files, and Gerber files of another declared function
    Other,
    /// A Gerber file whose function could not be inferred
    Unknown,
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copper => write!(f, "COPPER"),
            Self::SolderMask => write!(f, "SOLDERMASK"),
            Self::Silkscreen => write!(f, "SILKSCREEN"),
            Self::Paste => write!(f, "PASTE"),
            Self::Outline => write!(f, "OUTLINE"),
            Self::Other => write!(f, "OTHER"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// One drilled hole, in millimeters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoleRecord {
    /// X position (mm)
    pub x: f64,
    /// Y position (mm)
    pub y: f64,
    /// Tool diameter (mm)
    pub diameter: f64,
}

impl HoleRecord {
    /// Create a new hole record
    pub fn new(x: f64, y: f64, diameter: f64) -> Self {
        Self { x, y, diameter }
    }
}
