//! Excellon drill file decoding.
//!
//! Decodes NC drill files into a unit-tagged [`DrillFile`]: the tool table plus
//! every hit in file order. Positions and diameters are expressed in the last
//! unit mode the file declares (earlier values are rescaled on a switch) until
//! [`DrillFile::to_metric`] is called.

use pcbdrill_core::{Error, ExcellonError, MeasurementSystem, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

static RE_COORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([XY])([-+]?[0-9.]*)").expect("invalid regex pattern"));
static RE_TOOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^T(\d+)(.*)$").expect("invalid regex pattern"));
static RE_TOOL_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z])([-+]?[0-9.]*)").expect("invalid regex pattern"));

/// Which zeros are omitted from coordinates written without a decimal point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZeroSuppression {
    /// Leading zeros omitted (`TZ`): digits are right-aligned
    Leading,
    /// Trailing zeros omitted (`LZ`): digits are left-aligned
    Trailing,
}

/// Digits before and after the implied decimal point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateFormat {
    pub integer: usize,
    pub decimal: usize,
}

impl CoordinateFormat {
    /// Conventional default for the unit mode: 2.4 for inch, 3.3 for metric
    pub fn default_for(units: MeasurementSystem) -> Self {
        match units {
            MeasurementSystem::Imperial => Self {
                integer: 2,
                decimal: 4,
            },
            MeasurementSystem::Metric => Self {
                integer: 3,
                decimal: 3,
            },
        }
    }
}

/// A tool table entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrillTool {
    pub number: u32,
    pub diameter: f64,
}

/// One entry of the hit list
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DrillHit {
    /// Plunge at a single position
    Drill {
        tool: DrillTool,
        position: (f64, f64),
    },
    /// `G85` canned slot
    Slot {
        tool: DrillTool,
        start: (f64, f64),
        end: (f64, f64),
    },
    /// Linear move with the router down (`M15` .. `M16`)
    Route {
        tool: DrillTool,
        start: (f64, f64),
        end: (f64, f64),
    },
}

impl DrillHit {
    pub fn tool(&self) -> DrillTool {
        match self {
            DrillHit::Drill { tool, .. }
            | DrillHit::Slot { tool, .. }
            | DrillHit::Route { tool, .. } => *tool,
        }
    }

    fn scaled(self, factor: f64) -> Self {
        let scale_tool = |t: DrillTool| DrillTool {
            number: t.number,
            diameter: t.diameter * factor,
        };
        let scale_pt = |p: (f64, f64)| (p.0 * factor, p.1 * factor);
        match self {
            DrillHit::Drill { tool, position } => DrillHit::Drill {
                tool: scale_tool(tool),
                position: scale_pt(position),
            },
            DrillHit::Slot { tool, start, end } => DrillHit::Slot {
                tool: scale_tool(tool),
                start: scale_pt(start),
                end: scale_pt(end),
            },
            DrillHit::Route { tool, start, end } => DrillHit::Route {
                tool: scale_tool(tool),
                start: scale_pt(start),
                end: scale_pt(end),
            },
        }
    }
}

/// Decoded Excellon file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillFile {
    pub units: MeasurementSystem,
    pub zero_suppression: ZeroSuppression,
    pub format: CoordinateFormat,
    pub tools: BTreeMap<u32, DrillTool>,
    pub hits: Vec<DrillHit>,
}

impl DrillFile {
    /// Convert the tool table and every hit to millimeters.
    ///
    /// The unit tag is updated with the values, so calling this on a metric
    /// file does nothing.
    pub fn to_metric(&mut self) {
        if self.units == MeasurementSystem::Metric {
            return;
        }
        let units = self.units;
        for tool in self.tools.values_mut() {
            tool.diameter = units.to_mm(tool.diameter);
        }
        self.hits = self.hits.iter().map(|h| h.scaled(units.mm_scale())).collect();
        self.units = MeasurementSystem::Metric;
    }

    /// Plunge hits only, in file order
    pub fn drill_hits(&self) -> impl Iterator<Item = (&DrillTool, (f64, f64))> {
        self.hits.iter().filter_map(|hit| match hit {
            DrillHit::Drill { tool, position } => Some((tool, *position)),
            _ => None,
        })
    }
}

/// Excellon decoding capability consumed by the drill parser
pub trait ExcellonDecoder {
    fn decode(&self, path: &Path) -> Result<DrillFile>;
}

/// Default [`ExcellonDecoder`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ExcellonReader;

impl ExcellonDecoder for ExcellonReader {
    fn decode(&self, path: &Path) -> Result<DrillFile> {
        let content = fs::read_to_string(path)?;
        debug!("Decoding Excellon file {}", path.display());
        ExcellonReader::decode_str(&content)
    }
}

struct ReaderState {
    units: MeasurementSystem,
    zero_suppression: ZeroSuppression,
    format: Option<CoordinateFormat>,
    tools: BTreeMap<u32, DrillTool>,
    hits: Vec<DrillHit>,
    in_header: bool,
    current_tool: Option<DrillTool>,
    position: (f64, f64),
    incremental: bool,
    route_mode: bool,
    router_down: bool,
}

impl ExcellonReader {
    pub fn new() -> Self {
        Self
    }

    /// Decode Excellon source text
    pub fn decode_str(content: &str) -> Result<DrillFile> {
        let mut state = ReaderState {
            units: MeasurementSystem::Imperial,
            zero_suppression: ZeroSuppression::Leading,
            format: None,
            tools: BTreeMap::new(),
            hits: Vec::new(),
            in_header: false,
            current_tool: None,
            position: (0.0, 0.0),
            incremental: false,
            route_mode: false,
            router_down: false,
        };

        for (idx, raw) in content.lines().enumerate() {
            let line_number = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') {
                continue;
            }
            if !state.process_line(line, line_number)? {
                break;
            }
        }

        let format = state
            .format
            .unwrap_or_else(|| CoordinateFormat::default_for(state.units));
        Ok(DrillFile {
            units: state.units,
            zero_suppression: state.zero_suppression,
            format,
            tools: state.tools,
            hits: state.hits,
        })
    }
}

impl ReaderState {
    /// Returns `false` once the end-of-program directive is reached.
    fn process_line(&mut self, line: &str, line_number: usize) -> Result<bool> {
        match line {
            "M48" => self.in_header = true,
            "%" | "M95" => self.in_header = false,
            "M30" | "M00" => return Ok(false),
            "M71" => self.set_units(MeasurementSystem::Metric),
            "M72" => self.set_units(MeasurementSystem::Imperial),
            "G90" => self.incremental = false,
            "G91" => self.incremental = true,
            "G05" | "G5" => {
                self.route_mode = false;
                self.router_down = false;
            }
            "M15" => self.router_down = true,
            "M16" | "M17" => self.router_down = false,
            _ if line.starts_with("METRIC") || line.starts_with("INCH") => {
                self.unit_statement(line)
            }
            _ if RE_TOOL.is_match(line) => self.tool_statement(line, line_number)?,
            _ if line.contains("G85") => self.slot_statement(line, line_number)?,
            _ if line.starts_with("G00") || line.starts_with("G0X") || line.starts_with("G0Y") => {
                self.route_mode = true;
                self.router_down = false;
                let target = self.coordinates(&line[2..], line_number)?;
                self.position = target;
            }
            _ if line.starts_with("G01") || line.starts_with("G1X") || line.starts_with("G1Y") => {
                let target = self.coordinates(&line[2..], line_number)?;
                self.route_to(target, line_number)?;
            }
            _ if line.starts_with('X') || line.starts_with('Y') => {
                let target = self.coordinates(line, line_number)?;
                if self.route_mode {
                    self.route_to(target, line_number)?;
                } else {
                    let tool = self.require_tool(line_number)?;
                    self.position = target;
                    self.hits.push(DrillHit::Drill {
                        tool,
                        position: target,
                    });
                }
            }
            _ => debug!("Ignoring Excellon directive at line {}: {}", line_number, line),
        }
        Ok(true)
    }

    /// Switch unit mode. Tools, hits, and the modal position read so far are
    /// re-expressed in the new unit so the file stays single-unit.
    fn set_units(&mut self, units: MeasurementSystem) {
        if units == self.units {
            return;
        }
        let factor = self.units.mm_scale() / units.mm_scale();
        for tool in self.tools.values_mut() {
            tool.diameter *= factor;
        }
        for hit in &mut self.hits {
            *hit = hit.scaled(factor);
        }
        if let Some(tool) = self.current_tool.as_mut() {
            tool.diameter *= factor;
        }
        self.position = (self.position.0 * factor, self.position.1 * factor);
        self.units = units;
    }

    fn unit_statement(&mut self, line: &str) {
        let mut fields = line.split(',');
        let units = match fields.next() {
            Some("METRIC") => MeasurementSystem::Metric,
            _ => MeasurementSystem::Imperial,
        };
        self.set_units(units);
        for field in fields {
            match field.trim() {
                "LZ" => self.zero_suppression = ZeroSuppression::Trailing,
                "TZ" => self.zero_suppression = ZeroSuppression::Leading,
                f if f.contains('.') && f.chars().all(|c| c == '0' || c == '.') => {
                    let (int, dec) = f.split_once('.').unwrap_or((f, ""));
                    self.format = Some(CoordinateFormat {
                        integer: int.len(),
                        decimal: dec.len(),
                    });
                }
                _ => {}
            }
        }
    }

    fn tool_statement(&mut self, line: &str, line_number: usize) -> Result<()> {
        let caps = RE_TOOL
            .captures(line)
            .ok_or_else(|| ExcellonError::MalformedToolDefinition {
                line_number,
                text: line.to_string(),
            })?;
        let number: u32 = caps[1].parse().map_err(|_| ExcellonError::InvalidNumber {
            line_number,
            value: caps[1].to_string(),
        })?;
        let rest = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

        let diameter = RE_TOOL_FIELD
            .captures_iter(rest)
            .find(|c| &c[1] == "C")
            .map(|c| c[2].to_string());

        match diameter {
            Some(raw) => {
                let diameter: f64 = raw.parse().map_err(|_| {
                    Error::from(ExcellonError::MalformedToolDefinition {
                        line_number,
                        text: line.to_string(),
                    })
                })?;
                let tool = DrillTool { number, diameter };
                self.tools.insert(number, tool);
                if !self.in_header {
                    self.current_tool = Some(tool);
                }
            }
            None if self.in_header => {
                return Err(ExcellonError::MalformedToolDefinition {
                    line_number,
                    text: line.to_string(),
                }
                .into());
            }
            None if number == 0 => self.current_tool = None,
            None => {
                let tool = self
                    .tools
                    .get(&number)
                    .copied()
                    .ok_or(ExcellonError::UndefinedTool {
                        tool: number,
                        line_number,
                    })?;
                self.current_tool = Some(tool);
            }
        }
        Ok(())
    }

    fn slot_statement(&mut self, line: &str, line_number: usize) -> Result<()> {
        let tool = self.require_tool(line_number)?;
        let (start_text, end_text) = line.split_once("G85").unwrap_or((line, ""));
        let start = self.coordinates(start_text, line_number)?;
        self.position = start;
        let end = self.coordinates(end_text, line_number)?;
        self.position = end;
        self.hits.push(DrillHit::Slot { tool, start, end });
        Ok(())
    }

    fn route_to(&mut self, target: (f64, f64), line_number: usize) -> Result<()> {
        if self.router_down {
            let tool = self.require_tool(line_number)?;
            self.hits.push(DrillHit::Route {
                tool,
                start: self.position,
                end: target,
            });
        }
        self.position = target;
        Ok(())
    }

    fn require_tool(&self, line_number: usize) -> Result<DrillTool> {
        self.current_tool
            .ok_or_else(|| ExcellonError::NoToolSelected { line_number }.into())
    }

    /// Resolve the X/Y words of `text` against the modal position.
    fn coordinates(&self, text: &str, line_number: usize) -> Result<(f64, f64)> {
        let (mut x, mut y) = if self.incremental {
            (0.0, 0.0)
        } else {
            self.position
        };

        for caps in RE_COORD.captures_iter(text) {
            let raw = &caps[2];
            if !raw.chars().any(|c| c.is_ascii_digit()) {
                return Err(ExcellonError::TruncatedCoordinate {
                    line_number,
                    text: text.to_string(),
                }
                .into());
            }
            let value = self.coordinate_value(raw, line_number)?;
            match &caps[1] {
                "X" => x = value,
                _ => y = value,
            }
        }

        if self.incremental {
            Ok((self.position.0 + x, self.position.1 + y))
        } else {
            Ok((x, y))
        }
    }

    fn coordinate_value(&self, raw: &str, line_number: usize) -> Result<f64> {
        let invalid = || {
            Error::from(ExcellonError::InvalidNumber {
                line_number,
                value: raw.to_string(),
            })
        };

        if raw.contains('.') {
            return raw.parse().map_err(|_| invalid());
        }

        let (sign, digits) = match raw.strip_prefix('-') {
            Some(d) => (-1.0, d),
            None => (1.0, raw.trim_start_matches('+')),
        };
        let format = self
            .format
            .unwrap_or_else(|| CoordinateFormat::default_for(self.units));
        let padded = match self.zero_suppression {
            ZeroSuppression::Leading => digits.to_string(),
            ZeroSuppression::Trailing => {
                format!("{:0<width$}", digits, width = format.integer + format.decimal)
            }
        };
        let value: f64 = padded.parse().map_err(|_| invalid())?;
        Ok(sign * value / 10f64.powi(format.decimal as i32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_header_units_and_tools() {
        let file = ExcellonReader::decode_str(
            "M48\nMETRIC,TZ,000.000\nT1C0.800\nT2F200S30C1.000\n%\nM30\n",
        )
        .unwrap();
        assert_eq!(file.units, MeasurementSystem::Metric);
        assert_eq!(file.zero_suppression, ZeroSuppression::Leading);
        assert_eq!(
            file.format,
            CoordinateFormat {
                integer: 3,
                decimal: 3
            }
        );
        assert_eq!(file.tools.len(), 2);
        assert_relative_eq!(file.tools[&2].diameter, 1.0);
    }

    #[test]
    fn test_implied_decimal_leading_suppression() {
        let file =
            ExcellonReader::decode_str("M48\nINCH,TZ\nT1C0.035\n%\nT1\nX10000Y-5000\nM30\n")
                .unwrap();
        let hits: Vec<_> = file.drill_hits().collect();
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].1 .0, 1.0);
        assert_relative_eq!(hits[0].1 .1, -0.5);
    }

    #[test]
    fn test_implied_decimal_trailing_suppression() {
        let file =
            ExcellonReader::decode_str("M48\nMETRIC,LZ\nT1C0.8\n%\nT1\nX0125Y005\nM30\n").unwrap();
        let (_, (x, y)) = file.drill_hits().next().unwrap();
        assert_relative_eq!(x, 12.5);
        assert_relative_eq!(y, 5.0);
    }

    #[test]
    fn test_modal_coordinates() {
        let file =
            ExcellonReader::decode_str("M48\nMETRIC\nT1C0.8\n%\nT1\nX1.0Y2.0\nX3.0\nY4.0\nM30\n")
                .unwrap();
        let positions: Vec<_> = file.drill_hits().map(|(_, p)| p).collect();
        assert_eq!(positions, vec![(1.0, 2.0), (3.0, 2.0), (3.0, 4.0)]);
    }

    #[test]
    fn test_slots_and_routes_are_not_drill_hits() {
        let content = "M48\nMETRIC\nT1C1.0\n%\nT1\nX1.0Y1.0\nX2.0Y2.0G85X4.0Y2.0\n\
                       G00X5.0Y5.0\nM15\nG01X6.0Y5.0\nM16\nG05\nX7.0Y7.0\nM30\n";
        let file = ExcellonReader::decode_str(content).unwrap();
        assert_eq!(file.hits.len(), 4);
        assert!(matches!(file.hits[1], DrillHit::Slot { .. }));
        assert!(matches!(file.hits[2], DrillHit::Route { .. }));
        let positions: Vec<_> = file.drill_hits().map(|(_, p)| p).collect();
        assert_eq!(positions, vec![(1.0, 1.0), (7.0, 7.0)]);
    }

    #[test]
    fn test_to_metric_converts_once() {
        let mut file =
            ExcellonReader::decode_str("M48\nINCH\nT1C0.1\n%\nT1\nX1.0Y0.5\nM30\n").unwrap();
        file.to_metric();
        file.to_metric();
        assert_eq!(file.units, MeasurementSystem::Metric);
        assert_relative_eq!(file.tools[&1].diameter, 2.54, epsilon = 1e-9);
        let (tool, (x, y)) = file.drill_hits().next().unwrap();
        assert_relative_eq!(tool.diameter, 2.54, epsilon = 1e-9);
        assert_relative_eq!(x, 25.4, epsilon = 1e-9);
        assert_relative_eq!(y, 12.7, epsilon = 1e-9);
    }

    #[test]
    fn test_unit_switch_mid_file() {
        let file = ExcellonReader::decode_str(
            "M48\nINCH\nT1C0.035\n%\nT1\nX1.0Y1.0\nM71\nX25.4Y25.4\nM30\n",
        )
        .unwrap();
        assert_eq!(file.units, MeasurementSystem::Metric);
        assert_relative_eq!(file.tools[&1].diameter, 0.889, epsilon = 1e-9);

        let hits: Vec<_> = file.drill_hits().collect();
        assert_eq!(hits.len(), 2);
        for (tool, (x, y)) in hits {
            assert_relative_eq!(tool.diameter, 0.889, epsilon = 1e-9);
            assert_relative_eq!(x, 25.4, epsilon = 1e-9);
            assert_relative_eq!(y, 25.4, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_unit_switch_keeps_modal_position() {
        let file = ExcellonReader::decode_str(
            "M48\nMETRIC\nT1C1.0\n%\nT1\nX25.4Y50.8\nM72\nX2.0\nM30\n",
        )
        .unwrap();
        assert_eq!(file.units, MeasurementSystem::Imperial);
        let positions: Vec<_> = file.drill_hits().map(|(_, p)| p).collect();
        assert_relative_eq!(positions[0].0, 1.0, epsilon = 1e-9);
        assert_relative_eq!(positions[1].0, 2.0, epsilon = 1e-9);
        assert_relative_eq!(positions[1].1, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_body_tool_definition() {
        let file = ExcellonReader::decode_str("METRIC\nT3C0.5\nX1.0Y1.0\nM30\n").unwrap();
        let (tool, _) = file.drill_hits().next().unwrap();
        assert_eq!(tool.number, 3);
    }

    #[test]
    fn test_hits_after_end_are_ignored() {
        let file =
            ExcellonReader::decode_str("M48\nMETRIC\nT1C0.8\n%\nT1\nX1.0Y1.0\nM30\nX2.0Y2.0\n")
                .unwrap();
        assert_eq!(file.hits.len(), 1);
    }

    #[test]
    fn test_undefined_tool() {
        let err = ExcellonReader::decode_str("M48\nMETRIC\nT1C0.8\n%\nT2\nX1.0Y1.0\nM30\n")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(ExcellonError::UndefinedTool {
                tool: 2,
                line_number: 5
            })
        ));
    }

    #[test]
    fn test_hit_without_tool() {
        let err = ExcellonReader::decode_str("M48\nMETRIC\nT1C0.8\n%\nX1.0Y1.0\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(ExcellonError::NoToolSelected { line_number: 5 })
        ));
    }

    #[test]
    fn test_malformed_tool_definition() {
        let err = ExcellonReader::decode_str("M48\nMETRIC\nT1F200\n%\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(ExcellonError::MalformedToolDefinition { line_number: 3, .. })
        ));

        let err = ExcellonReader::decode_str("M48\nMETRIC\nT1C0.8.1\n%\n").unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_truncated_coordinate() {
        let err = ExcellonReader::decode_str("M48\nMETRIC\nT1C0.8\n%\nT1\nX1.0Y\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(ExcellonError::TruncatedCoordinate { line_number: 6, .. })
        ));
    }
}
