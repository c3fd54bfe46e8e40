mod cli;
mod config;
mod logic;

pub use cli::{Cli, Command};
pub use config::Config;

use anyhow::Result;

/// Initializes the logger.
///
/// Sets up a custom logger format with timestamp, log level, file name, line number,
/// and log message. `RUST_LOG` still overrides the level chosen here.
pub fn init_logger(verbose: bool) {
    use std::io::Write;

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::builder()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            let ts = chrono::Local::now().format("%H:%M:%S");

            writeln!(
                buf,
                "[{} {style}{}{style:#} {} {}] {}",
                ts,
                record.level(),
                record
                    .file()
                    .unwrap_or("None")
                    .split('/')
                    .next_back()
                    .unwrap_or("None"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();
}

pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Apply {
            input,
            output,
            filter,
            intensity,
            format,
        } => logic::apply(&config, &input, &output, filter, intensity, format),
        Command::Filters => {
            print!("{}", logic::filters_table());
            Ok(())
        }
        Command::Sweep {
            input,
            out_dir,
            filter,
            steps,
        } => logic::sweep(&config, &input, &out_dir, filter, steps).map(|_| ()),
        Command::Preview {
            input,
            output,
            filter,
            intensities,
        } => logic::preview(&config, &input, &output, filter, &intensities),
    }
}
