use std::process::ExitCode;

use clap::Parser;
use dotenvy::dotenv;

use gas_fee_estimator::cli::Cli;
use gas_fee_estimator::config::Config;
use gas_fee_estimator::error::AppError;
use gas_fee_estimator::estimator::FeeEstimationEngine;
use gas_fee_estimator::logging::init_logging;
use gas_fee_estimator::report::render_report;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    let cli = Cli::parse();
    init_logging();

    match run(cli).await {
        Ok(table) => {
            print!("{}", table);
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::from(err.exit_code())
        }
    }
}

/// One fetch-and-estimate cycle, rendered as text.
async fn run(cli: Cli) -> Result<String, AppError> {
    let mut config = Config::from_env().map_err(AppError::Config)?;
    config.apply_cli(&cli).map_err(AppError::Config)?;

    let engine = FeeEstimationEngine::connect(config.estimator.clone())?;
    let history = &engine.config().history;
    tracing::info!(
        "Sampling {} blocks from {} at percentiles {:?}",
        history.block_count,
        engine.config().rpc.url,
        history.reward_percentiles
    );

    let report = engine.estimate(Some(&config.requested_tier)).await?;

    Ok(render_report(&report, config.transfer_gas_limit))
}
