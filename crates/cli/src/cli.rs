//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::OutboundKind;
use std::path::PathBuf;

/// Tilty - tilt table and rotary encoder gesture server
#[derive(Parser, Debug)]
#[command(
    name = "tilty-server",
    author,
    version,
    about = "Tilt table gesture server",
    long_about = "Turns accelerometer tilt and rotary encoder turns into pan and zoom gestures.\n\n\
                  Binds the devices by serial, keeps a sliding window of recent samples per \n\
                  axis and emits a pan or zoom message every sample period."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "TILTY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "TILTY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the gesture server
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display the effective configuration
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); defaults apply when omitted
    #[arg(short, long, env = "TILTY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Accelerometer window length
    #[arg(long, env = "TILTY_ACCELEROMETER_QUEUE_LENGTH")]
    pub accelerometer_queue_length: Option<usize>,

    /// Encoder window length
    #[arg(long, env = "TILTY_ENCODER_QUEUE_LENGTH")]
    pub encoder_queue_length: Option<usize>,

    /// Seconds between gesture messages
    #[arg(long, env = "TILTY_TILT_SAMPLE_RATE")]
    pub tilt_sample_rate: Option<f64>,

    /// Minimum tilt (g) before a pan is sent
    #[arg(long, env = "TILTY_TILT_THRESHOLD")]
    pub tilt_threshold: Option<f64>,

    /// Swap the X and Y accelerometer axes
    #[arg(long, env = "TILTY_SWAP_XY")]
    pub swap_xy: bool,

    /// Direction of the X axis (1 or -1)
    #[arg(long, allow_negative_numbers = true, env = "TILTY_FLIP_X")]
    pub flip_x: Option<i8>,

    /// Direction of the Y axis (1 or -1)
    #[arg(long, allow_negative_numbers = true, env = "TILTY_FLIP_Y")]
    pub flip_y: Option<i8>,

    /// Direction of the encoder (1 or -1)
    #[arg(long, allow_negative_numbers = true, env = "TILTY_FLIP_Z")]
    pub flip_z: Option<i8>,

    /// Bind the accelerometer with this serial
    #[arg(long, env = "TILTY_ACCELEROMETER_SERIAL")]
    pub accelerometer_serial: Option<i32>,

    /// Bind the encoder with this serial
    #[arg(long, env = "TILTY_ENCODER_SERIAL")]
    pub encoder_serial: Option<i32>,

    /// Add the scripted test harness processor
    #[arg(long, env = "TILTY_TEST_HARNESS")]
    pub test_harness: bool,

    /// Drive the frames from simulated devices
    #[arg(long, env = "TILTY_SIMULATE")]
    pub simulate: bool,

    /// Override the outbound channel
    #[arg(long, value_enum, env = "TILTY_OUTBOUND")]
    pub outbound: Option<OutboundArg>,

    /// Session timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "TILTY_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "TILTY_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "tilty.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "tilty.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show the resolved axis routing
    #[arg(long)]
    pub orientation: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

/// Outbound channel selection
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutboundArg {
    /// Log every gesture
    Log,
    /// JSON lines on stdout
    Stdout,
}

impl From<OutboundArg> for OutboundKind {
    fn from(arg: OutboundArg) -> Self {
        match arg {
            OutboundArg::Log => OutboundKind::Log,
            OutboundArg::Stdout => OutboundKind::Stdout,
        }
    }
}
