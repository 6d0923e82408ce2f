use anyhow::Context;
use clap::Parser;
use skitter::cli::Cli;
use skitter::logging::{self, LogConfig};
use skitter::output;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::print_error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = cli.load_settings().context("failed to load settings")?;

    logging::init(&LogConfig::from_verbosity(
        cli.verbose,
        cli.quiet,
        &settings.log_level,
    ))
    .context("failed to initialise logging")?;

    cli.execute(&settings)
        .await
        .with_context(|| format!("scan of {} failed", cli.host))
}
