mod cli;

use anyhow::{bail, Result};
use clap::Parser;
use steptrace::{commands, init_logging, Config};

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format)?;
    tracing::debug!(version = steptrace::VERSION, built = steptrace::BUILD_DATE, "starting");

    let mut config = Config::load_or_default(cli.config.as_deref())?;
    config.apply_assignments(cli.overrides().iter().map(String::as_str))?;

    match &cli.command {
        Commands::Forward(args) => {
            let summary = commands::forward(&config, &args.peaks, &args.output)?;
            println!(
                "{} points written to {} ({} travel steps dropped)",
                summary.extruded_points,
                args.output.display(),
                summary.travel_steps
            );
        }
        Commands::Inverse(args) => {
            let summary = commands::inverse(&config, &args.input, &args.output)?;
            println!(
                "{} point pairs quantized into {}",
                summary.pairs,
                args.output.display()
            );
        }
        Commands::Gcode(args) => {
            let points = commands::gcode(&config, &args.input, &args.output)?;
            println!("{} points written to {}", points, args.output.display());
        }
        Commands::Selftest(args) => {
            let report = commands::selftest(&config, args.output_dir.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.passed {
                bail!("self-test failed");
            }
        }
    }

    Ok(())
}
