use anyhow::Context;
use clap::Parser;
use pcbdrill::{init_logging, Cli, Command, Config, DrillExport, GerberFailurePolicy, Session};
use std::path::Path;
use tracing::warn;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    init_logging(level)?;

    let mut config = match &cli.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load_or_default().context("Failed to load default config")?,
    };
    if cli.skip_bad_gerbers {
        config.scan.gerber_failure_policy = GerberFailurePolicy::Skip;
    }

    let mut session = Session::new();
    session.set_failure_policy(config.scan.gerber_failure_policy);

    match cli.command {
        Command::Scan { directory } => {
            open(&mut session, &directory)?;
            for label in session.layer_listing() {
                println!("{}", label);
            }
            println!("Detected {} files", session.layers().len());
        }
        Command::Drill {
            directory,
            output,
            depth,
        } => {
            open(&mut session, &directory)?;
            let mut params = config.drill.cycle_parameters();
            if let Some(depth) = depth {
                params.plunge_depth = depth;
            }

            match session
                .export_drill_gcode(&output, params)
                .with_context(|| format!("Failed to export {}", output.display()))?
            {
                DrillExport::NoDrillFiles => warn!("No drill files found"),
                DrillExport::Written { drill_files, holes } => println!(
                    "G-code exported: {} holes from {} drill files to {}",
                    holes,
                    drill_files,
                    output.display()
                ),
            }
        }
    }

    Ok(())
}

fn open(session: &mut Session, directory: &Path) -> anyhow::Result<()> {
    session
        .open_directory(directory)
        .with_context(|| format!("Failed to load {}", directory.display()))?;
    Ok(())
}
