use crate::{LONG_VERSION, VERSION};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pcbdrill")]
#[command(version = VERSION, long_version = LONG_VERSION)]
#[command(about = "Classify PCB fabrication files and export drill G-code")]
#[command(after_help = "EXAMPLES:\n  \
    pcbdrill scan ./gerbers\n  \
    pcbdrill drill ./gerbers --output drill.gcode --depth -1.6")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Configuration file (.toml or .json)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip Gerber files that fail to decode instead of aborting
    #[arg(long, global = true)]
    pub skip_bad_gerbers: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the recognized files in a directory with their layer kinds
    Scan {
        /// Directory containing Gerber and drill files
        directory: PathBuf,
    },
    /// Export the drill hits of every drill file in a directory as G-code
    Drill {
        /// Directory containing Gerber and drill files
        directory: PathBuf,

        /// Destination program
        #[arg(short, long, default_value = "drill.gcode")]
        output: PathBuf,

        /// Plunge depth in mm (overrides the config file)
        #[arg(long, allow_hyphen_values = true)]
        depth: Option<f64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BUILD_DATE;

    #[test]
    fn test_parse_drill_command() {
        let cli = Cli::parse_from([
            "pcbdrill", "drill", "gerbers", "--output", "out.gcode", "--depth", "-1.6",
        ]);
        match cli.command {
            Command::Drill {
                directory,
                output,
                depth,
            } => {
                assert_eq!(directory, PathBuf::from("gerbers"));
                assert_eq!(output, PathBuf::from("out.gcode"));
                assert_eq!(depth, Some(-1.6));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_scan_with_globals() {
        let cli = Cli::parse_from(["pcbdrill", "scan", "gerbers", "--verbose"]);
        assert!(cli.verbose);
        assert!(!cli.skip_bad_gerbers);
        assert!(matches!(cli.command, Command::Scan { .. }));
    }

    #[test]
    fn test_long_version_includes_build_date() {
        let command = <Cli as clap::CommandFactory>::command();
        assert_eq!(command.get_version(), Some(VERSION));
        let long_version = command.get_long_version().unwrap_or_default();
        assert!(long_version.starts_with(VERSION));
        assert!(long_version.contains(BUILD_DATE));
    }

    #[test]
    fn test_default_output() {
        let cli = Cli::parse_from(["pcbdrill", "drill", "gerbers"]);
        let Command::Drill { output, depth, .. } = cli.command else {
            panic!("expected drill command");
        };
        assert_eq!(output, PathBuf::from("drill.gcode"));
        assert_eq!(depth, None);
    }
}
