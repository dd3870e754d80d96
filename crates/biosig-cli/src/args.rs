//! Command-line argument parsing.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "biosig")]
#[command(about = "Streaming ECG/EEG plots and the Doppler siren demo in the terminal")]
#[command(version)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Animate a recording in the terminal dashboard
    View(ViewArgs),
    /// Synthesize a Doppler siren pass and write it as WAV
    Doppler(DopplerArgs),
    /// Track the dominant frequency of a WAV clip
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Recording JSON file (`samplingRate`, `leads` or `channels`, `signals` or `data`)
    pub file: Option<PathBuf>,

    /// Play a generated 6-lead ECG instead of a file
    #[arg(long, conflicts_with = "file")]
    pub demo: bool,

    /// Visible window in seconds
    #[arg(short, long)]
    pub window: Option<f64>,

    /// Playback speed multiplier
    #[arg(short, long)]
    pub speed: Option<f64>,

    /// Channel names to plot, comma separated
    #[arg(short, long, value_delimiter = ',')]
    pub channels: Vec<String>,

    /// Matrix rows are channels instead of samples
    #[arg(long)]
    pub channel_major: bool,

    /// Dashboard config file (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DopplerArgs {
    /// Siren base frequency in Hz
    #[arg(short, long, default_value_t = 650.0)]
    pub frequency: f64,

    /// Source velocity in m/s
    #[arg(short, long, default_value_t = 20.0)]
    pub velocity: f64,

    /// Pass duration in seconds
    #[arg(short, long, default_value_t = 10.0)]
    pub duration: f64,

    /// Output WAV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Play the pass on the default audio device
    #[arg(long)]
    pub play: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Dashboard config file (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// WAV clip to analyze
    pub file: PathBuf,

    /// Channel to analyze
    #[arg(short, long, default_value_t = 0, conflicts_with = "mix")]
    pub channel: usize,

    /// Average all channels instead of analyzing one
    #[arg(long)]
    pub mix: bool,

    /// Print the full analysis as JSON
    #[arg(long)]
    pub json: bool,
}

impl CliArgs {
    /// Parse process arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
