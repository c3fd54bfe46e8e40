use clap::{Parser, Subcommand};
use image_filter::{FilterDescriptor, export::ExportFormat};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "instafilter", version, about = "Apply a photo filter with one intensity knob")]
pub struct Cli {
    /// TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Filter a photo and export the result
    Apply {
        input: PathBuf,
        output: PathBuf,

        /// Filter name, e.g. "sepia-tone", "motion-blur"
        #[arg(short, long)]
        filter: Option<FilterDescriptor>,

        /// Normalized strength, clamped to 0.0 - 1.0
        #[arg(short, long, allow_negative_numbers = true)]
        intensity: Option<f32>,

        /// Output format, defaults to the output extension
        #[arg(long)]
        format: Option<ExportFormat>,
    },

    /// List the filters and the parameters each one accepts
    Filters,

    /// Render evenly spaced intensities of one filter into a directory
    Sweep {
        input: PathBuf,
        out_dir: PathBuf,

        #[arg(short, long)]
        filter: Option<FilterDescriptor>,

        #[arg(short, long, default_value_t = 4)]
        steps: usize,
    },

    /// Replay slider positions through a live session and keep the last frame
    Preview {
        input: PathBuf,
        output: PathBuf,

        #[arg(short, long)]
        filter: Option<FilterDescriptor>,

        /// Comma separated slider positions, e.g. 0.1,0.4,0.8
        #[arg(long, value_delimiter = ',', required = true, allow_negative_numbers = true)]
        intensities: Vec<f32>,
    },
}
