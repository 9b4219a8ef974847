use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "chembox CLI - a headless driver for the chembox particle chemistry sandbox: load a scenario, run it for a number of ticks, and report the resulting molecules.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a scenario file through the sandbox and summarize the outcome.
    Run(RunArgs),
    /// Run the built-in demo scenario (water formation plus a decaying NaO pair).
    Demo(DemoArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the scenario file (TOML) listing atom and group spawns.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub scenario: PathBuf,

    /// Path to a simulation configuration file (TOML); overrides the preset.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to an additional group-template file (TOML), merged over the
    /// built-in templates.
    #[arg(long, value_name = "PATH")]
    pub templates: Option<PathBuf>,

    /// Path to a composition-rules file (TOML); replaces the configured
    /// stability rules.
    #[arg(long, value_name = "PATH")]
    pub rules: Option<PathBuf>,

    /// Start from the charge-aware preset instead of the neutral one.
    #[arg(long)]
    pub charged: bool,

    /// Number of ticks to simulate.
    #[arg(short, long, default_value_t = 600, value_name = "N")]
    pub ticks: u64,

    /// Simulated seconds per tick.
    #[arg(long, default_value_t = 1.0 / 60.0, value_name = "SECONDS")]
    pub dt: f64,

    /// RNG seed for a reproducible trajectory.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Log an intermediate molecule summary every N ticks.
    #[arg(long, value_name = "N")]
    pub report_every: Option<u64>,
}

/// Arguments for the `demo` subcommand.
#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Number of ticks to simulate.
    #[arg(short, long, default_value_t = 600, value_name = "N")]
    pub ticks: u64,

    /// Simulated seconds per tick.
    #[arg(long, default_value_t = 1.0 / 60.0, value_name = "SECONDS")]
    pub dt: f64,

    /// RNG seed for a reproducible trajectory.
    #[arg(long, default_value_t = 7, value_name = "N")]
    pub seed: u64,
}
