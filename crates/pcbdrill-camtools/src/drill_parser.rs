//! Drill file to hole list.
//!
//! Decodes an Excellon file, normalizes it to millimeters, and keeps only the
//! plunge hits, in the order they appear in the file.

use crate::excellon::{DrillFile, ExcellonDecoder, ExcellonReader};
use pcbdrill_core::{HoleRecord, Result};
use std::path::Path;
use tracing::{debug, info};

/// Parse a drill file with the default [`ExcellonReader`]
pub fn parse_drill_file(path: &Path) -> Result<Vec<HoleRecord>> {
    parse_drill_file_with(path, &ExcellonReader)
}

/// Parse a drill file with any [`ExcellonDecoder`]
pub fn parse_drill_file_with(path: &Path, decoder: &dyn ExcellonDecoder) -> Result<Vec<HoleRecord>> {
    let mut drill_file = decoder.decode(path)?;
    debug!(
        "{}: {} units, {} tools, {} hits",
        path.display(),
        drill_file.units,
        drill_file.tools.len(),
        drill_file.hits.len()
    );

    drill_file.to_metric();
    let holes = holes_from_metric(&drill_file);

    info!("Parsed {} holes from {}", holes.len(), path.display());
    Ok(holes)
}

/// Hole records for the plunge hits of an already metric drill file
fn holes_from_metric(drill_file: &DrillFile) -> Vec<HoleRecord> {
    drill_file
        .drill_hits()
        .map(|(tool, (x, y))| HoleRecord::new(x, y, tool.diameter))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::excellon::{CoordinateFormat, DrillHit, DrillTool, ZeroSuppression};
    use pcbdrill_core::MeasurementSystem;
    use std::collections::BTreeMap;

    struct FixedDecoder(DrillFile);

    impl ExcellonDecoder for FixedDecoder {
        fn decode(&self, _path: &Path) -> Result<DrillFile> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_parse_with_custom_decoder_normalizes_units() {
        let tool = DrillTool {
            number: 1,
            diameter: 0.04,
        };
        let drill_file = DrillFile {
            units: MeasurementSystem::Imperial,
            zero_suppression: ZeroSuppression::Leading,
            format: CoordinateFormat::default_for(MeasurementSystem::Imperial),
            tools: BTreeMap::from([(1, tool)]),
            hits: vec![
                DrillHit::Drill {
                    tool,
                    position: (2.0, 1.0),
                },
                DrillHit::Slot {
                    tool,
                    start: (0.0, 0.0),
                    end: (1.0, 0.0),
                },
            ],
        };

        let holes = parse_drill_file_with(Path::new("board.drl"), &FixedDecoder(drill_file))
            .unwrap();
        assert_eq!(holes.len(), 1);
        approx::assert_relative_eq!(holes[0].x, 50.8, epsilon = 1e-9);
        approx::assert_relative_eq!(holes[0].y, 25.4, epsilon = 1e-9);
        approx::assert_relative_eq!(holes[0].diameter, 1.016, epsilon = 1e-9);
    }
}
