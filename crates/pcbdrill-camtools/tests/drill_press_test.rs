use pcbdrill_camtools::drill_press::{
    synthesize_toolpath, DrillCycleGenerator, DrillCycleParameters,
};
use pcbdrill_core::HoleRecord;
use std::fs;
use tempfile::TempDir;

const TWO_HOLE_PROGRAM: &str = "G90\nG21\nG0 Z5\nM3\n\
G0 X10.0000 Y20.0000\nG1 Z-1.0 F200\nG0 Z5\n\
G0 X15.5000 Y22.2500\nG1 Z-1.0 F200\nG0 Z5\n\
M5\nM30\n";

fn two_holes() -> Vec<HoleRecord> {
    vec![
        HoleRecord::new(10.0, 20.0, 0.3),
        HoleRecord::new(15.5, 22.25, 0.3),
    ]
}

#[test]
fn test_two_hole_program() {
    let generator = DrillCycleGenerator::new(DrillCycleParameters::default());
    assert_eq!(generator.generate(&two_holes()), TWO_HOLE_PROGRAM);
}

#[test]
fn test_empty_program_has_only_preamble_and_postamble() {
    let generator = DrillCycleGenerator::new(DrillCycleParameters::default());
    let gcode = generator.generate(&[]);
    let lines: Vec<&str> = gcode.lines().collect();
    assert_eq!(lines, vec!["G90", "G21", "G0 Z5", "M3", "M5", "M30"]);
}

#[test]
fn test_coordinates_use_four_decimals() {
    let generator = DrillCycleGenerator::new(DrillCycleParameters::default());
    let gcode = generator.generate(&[HoleRecord::new(1.23456, -0.00004, 0.8)]);
    assert!(gcode.contains("G0 X1.2346 Y-0.0000\n"));
}

#[test]
fn test_diameter_does_not_change_the_cycle() {
    let generator = DrillCycleGenerator::new(DrillCycleParameters::default());
    let small = generator.generate(&[HoleRecord::new(1.0, 1.0, 0.3)]);
    let large = generator.generate(&[HoleRecord::new(1.0, 1.0, 3.0)]);
    assert_eq!(small, large);
}

#[test]
fn test_synthesize_writes_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("drill.gcode");

    synthesize_toolpath(&two_holes(), &out, -1.0).unwrap();
    assert_eq!(fs::read_to_string(&out).unwrap(), TWO_HOLE_PROGRAM);
}

#[test]
fn test_synthesize_is_deterministic_and_overwrites() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("drill.gcode");
    fs::write(&out, "stale content that is longer than nothing\n").unwrap();

    synthesize_toolpath(&two_holes(), &out, -1.0).unwrap();
    let first = fs::read(&out).unwrap();
    synthesize_toolpath(&two_holes(), &out, -1.0).unwrap();
    let second = fs::read(&out).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, TWO_HOLE_PROGRAM.as_bytes());
}

#[test]
fn test_custom_plunge_depth() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("deep.gcode");

    synthesize_toolpath(&two_holes(), &out, -2.5).unwrap();
    let gcode = fs::read_to_string(&out).unwrap();
    assert_eq!(gcode.matches("G1 Z-2.5 F200\n").count(), 2);
}

#[test]
fn test_unwritable_destination() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("missing").join("drill.gcode");

    let err = synthesize_toolpath(&two_holes(), &out, -1.0).unwrap_err();
    assert!(err.is_io_error());
    assert!(!out.exists());
}
