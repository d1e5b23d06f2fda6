//! Command-line definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use steptrace::LogFormat;

#[derive(Debug, Parser)]
#[command(name = "steptrace")]
#[command(about = "Stepper peak events to point clouds and back")]
#[command(version)]
pub struct Cli {
    /// Config file (.toml or .json); defaults to the platform config directory
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override one setting, e.g. `--set steps_per_mm.z=400` (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE", global = true)]
    pub set: Vec<String>,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Integrate a peak file into a point cloud
    Forward(ForwardArgs),
    /// Quantize a point cloud into approximate peaks
    Inverse(InverseArgs),
    /// Convert G0/G1 moves of a G-code file into a point cloud
    Gcode(GcodeArgs),
    /// Run the synthetic square round trip
    Selftest(SelftestArgs),
}

#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Fractional digits per coordinate
    #[arg(long)]
    pub precision: Option<usize>,
    /// Caption line of the point-cloud file
    #[arg(long)]
    pub caption: Option<String>,
}

#[derive(Debug, Args)]
pub struct ForwardArgs {
    /// Peak file (JSON)
    #[arg(long)]
    pub peaks: PathBuf,
    /// Point-cloud file to write
    #[arg(long)]
    pub output: PathBuf,
    #[command(flatten)]
    pub format: OutputArgs,
}

#[derive(Debug, Args)]
pub struct InverseArgs {
    /// Point-cloud file to read
    #[arg(long)]
    pub input: PathBuf,
    /// Peak file (JSON) to write
    #[arg(long)]
    pub output: PathBuf,
    /// Seconds between synthetic events
    #[arg(long)]
    pub time_step: Option<f64>,
    /// Running timestamp before the first synthetic event
    #[arg(long)]
    pub start_timestamp: Option<f64>,
}

#[derive(Debug, Args)]
pub struct GcodeArgs {
    /// G-code file to read
    #[arg(long)]
    pub input: PathBuf,
    /// Point-cloud file to write
    #[arg(long)]
    pub output: PathBuf,
    #[command(flatten)]
    pub format: OutputArgs,
}

#[derive(Debug, Args)]
pub struct SelftestArgs {
    /// Directory for the intermediate files and report
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

impl OutputArgs {
    fn assignments(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(precision) = self.precision {
            out.push(format!("output.precision={}", precision));
        }
        if let Some(caption) = &self.caption {
            out.push(format!("output.caption={}", caption));
        }
        out
    }
}

impl Cli {
    /// `--set` values followed by the subcommand's own flags
    pub fn overrides(&self) -> Vec<String> {
        let mut out = self.set.clone();
        match &self.command {
            Commands::Forward(args) => out.extend(args.format.assignments()),
            Commands::Gcode(args) => out.extend(args.format.assignments()),
            Commands::Inverse(args) => {
                if let Some(step) = args.time_step {
                    out.push(format!("time_step={}", step));
                }
                if let Some(start) = args.start_timestamp {
                    out.push(format!("start_timestamp={}", start));
                }
            }
            Commands::Selftest(_) => {}
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_overrides_order() {
        let cli = Cli::parse_from([
            "steptrace",
            "--set",
            "time_step=0.5",
            "inverse",
            "--input",
            "in.xyz",
            "--output",
            "out.json",
            "--time-step",
            "0.25",
        ]);
        assert_eq!(cli.overrides(), vec!["time_step=0.5", "time_step=0.25"]);
    }

    #[test]
    fn test_forward_output_flags() {
        let cli = Cli::parse_from([
            "steptrace",
            "forward",
            "--peaks",
            "p.json",
            "--output",
            "c.xyz",
            "--precision",
            "5",
            "--log-format",
            "json",
        ]);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.overrides(), vec!["output.precision=5"]);
    }
}
