use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use mailbox_filters::convert::{ConvertConfig, DEFAULT_INPUT, DEFAULT_OUTPUT, convert};

#[derive(Parser, Debug)]
#[command(name = "mailbox2gmail")]
#[command(
    version,
    about = "Convert an exported CSV of Mailbox autoswipe patterns to a Gmail-compatible XML filters file.",
    long_about = None
)]
struct Cli {
    /// Path to the Mailbox CSV file
    #[arg(default_value = DEFAULT_INPUT)]
    input_filename: PathBuf,

    /// Output path for the Gmail XML filters file
    #[arg(short = 'o', long = "output-filename", default_value = DEFAULT_OUTPUT)]
    output_filename: PathBuf,
}

impl From<Cli> for ConvertConfig {
    fn from(cli: Cli) -> Self {
        Self {
            input: cli.input_filename,
            output: cli.output_filename,
            ..Self::default()
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = ConvertConfig::from(cli);

    let report = convert(&config).with_context(|| {
        format!(
            "Failed to convert '{}' to '{}'",
            config.input.display(),
            config.output.display()
        )
    })?;

    info!(
        "{} filters written to '{}'",
        report.filter_count,
        config.output.display()
    );
    Ok(())
}
