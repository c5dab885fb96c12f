mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::error;

use crate::cli::{Cli, Mode};
use ozon_labels::config::Config;
use ozon_labels::logging;
use ozon_labels::output::OutputFormatter;
use ozon_labels::pipeline::Pipeline;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.to_config();
    let output = OutputFormatter::from_config(&config);

    match run(&cli, &config, &output).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!(target: logging::FILE_ONLY_TARGET, "run failed: {err:#}");
            output.error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, config: &Config, output: &OutputFormatter) -> Result<bool> {
    let log_path = logging::init(config).context("failed to set up logging")?;
    output.detail("Log file", &log_path.display().to_string());

    let errors = config.validate();
    if !errors.is_empty() {
        output.display_config_errors(&errors);
        output.info("Set the missing values via flags or environment and try again.");
        return Ok(false);
    }

    let pipeline = Pipeline::from_config(config)?;

    match cli.mode()? {
        Mode::Validate => {
            output.success("Configuration is valid");
            output.info("Checking API credentials...");

            if pipeline.resolver().validate_credentials().await {
                output.success("API credentials are valid");
                Ok(true)
            } else {
                output.error("API credentials were rejected or the API is unreachable");
                Ok(false)
            }
        }
        Mode::Run(request) => {
            let reference = request.target.reference();
            output.info(&format!("Processing {reference}..."));
            output.detail("Archive", &request.zip_path.display().to_string());

            let outcome = pipeline
                .run(&request)
                .await
                .with_context(|| format!("failed to build labels for {reference}"))?;

            output.display_order_summary(&outcome.order);
            output.display_merge_report(&outcome.report, &outcome.output_path, outcome.file_size);

            match outcome.printed {
                Some(true) => output.success("Sent to printer"),
                Some(false) => output.warning("Printing failed; the PDF is saved and can be printed manually"),
                None => {}
            }

            Ok(true)
        }
    }
}
