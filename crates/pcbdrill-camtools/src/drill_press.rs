use pcbdrill_core::{HoleRecord, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Default plunge depth below the top surface (mm)
pub const DEFAULT_PLUNGE_DEPTH: f64 = -1.0;
/// Default retract height (mm)
pub const DEFAULT_SAFE_Z: f64 = 5.0;
/// Default plunge feed rate (mm/min)
pub const DEFAULT_PLUNGE_FEED_RATE: f64 = 200.0;

/// Parameters for the fixed drill cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrillCycleParameters {
    /// Z of the bottom of each plunge (mm, negative is below the surface)
    pub plunge_depth: f64,
    /// Height for safe travel between holes (mm)
    pub safe_z: f64,
    /// Feed rate for the plunge (mm/min)
    pub plunge_feed_rate: f64,
}

impl Default for DrillCycleParameters {
    fn default() -> Self {
        Self {
            plunge_depth: DEFAULT_PLUNGE_DEPTH,
            safe_z: DEFAULT_SAFE_Z,
            plunge_feed_rate: DEFAULT_PLUNGE_FEED_RATE,
        }
    }
}

impl DrillCycleParameters {
    pub fn with_plunge_depth(plunge_depth: f64) -> Self {
        Self {
            plunge_depth,
            ..Self::default()
        }
    }
}

/// Generator for drill cycle G-Code
///
/// Every hole gets the same plunge: the hole diameter is carried on the
/// records but does not select a tool or depth.
pub struct DrillCycleGenerator {
    params: DrillCycleParameters,
}

impl DrillCycleGenerator {
    /// Create a new DrillCycleGenerator with the given parameters
    pub fn new(params: DrillCycleParameters) -> Self {
        Self { params }
    }

    /// Generate the program for `holes`, visited in the given order
    pub fn generate(&self, holes: &[HoleRecord]) -> String {
        let p = &self.params;
        let safe_z = format!("{}", p.safe_z);
        let mut gcode = String::new();

        gcode.push_str("G90\n");
        gcode.push_str("G21\n");
        gcode.push_str(&format!("G0 Z{}\n", safe_z));
        gcode.push_str("M3\n");

        for hole in holes {
            gcode.push_str(&format!("G0 X{:.4} Y{:.4}\n", hole.x, hole.y));
            gcode.push_str(&format!(
                "G1 Z{} F{}\n",
                format_depth(p.plunge_depth),
                p.plunge_feed_rate
            ));
            gcode.push_str(&format!("G0 Z{}\n", safe_z));
        }

        gcode.push_str("M5\n");
        gcode.push_str("M30\n");
        gcode
    }

    /// Generate the program and write it to `out_path`, replacing any existing file
    pub fn write_to_file(&self, holes: &[HoleRecord], out_path: &Path) -> Result<()> {
        let gcode = self.generate(holes);
        fs::write(out_path, gcode)?;
        info!(
            "Wrote drill program for {} holes to {}",
            holes.len(),
            out_path.display()
        );
        Ok(())
    }
}

/// Write a drill program for `holes` to `out_path` with the default cycle and the given depth
pub fn synthesize_toolpath(holes: &[HoleRecord], out_path: &Path, plunge_depth: f64) -> Result<()> {
    DrillCycleGenerator::new(DrillCycleParameters::with_plunge_depth(plunge_depth))
        .write_to_file(holes, out_path)
}

/// Whole-number depths keep one decimal (`-1.0`); others use the shortest exact form.
fn format_depth(depth: f64) -> String {
    if depth.is_finite() && depth.fract() == 0.0 {
        format!("{:.1}", depth)
    } else {
        format!("{}", depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_depth() {
        assert_eq!(format_depth(-1.0), "-1.0");
        assert_eq!(format_depth(-2.0), "-2.0");
        assert_eq!(format_depth(-0.5), "-0.5");
        assert_eq!(format_depth(-1.75), "-1.75");
    }

    #[test]
    fn test_custom_parameters() {
        let generator = DrillCycleGenerator::new(DrillCycleParameters {
            plunge_depth: -1.6,
            safe_z: 2.5,
            plunge_feed_rate: 120.0,
        });
        let gcode = generator.generate(&[HoleRecord::new(1.0, 2.0, 0.8)]);
        assert!(gcode.contains("G0 Z2.5\n"));
        assert!(gcode.contains("G1 Z-1.6 F120\n"));
    }
}
