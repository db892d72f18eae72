use std::process::ExitCode;

use clap::Parser;

use vocabforge::cli::Cli;
use vocabforge::commands;
use vocabforge::config::Config;
use vocabforge::logging::{error_report, init_tracing};

const EXIT_ERR_CODE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return ExitCode::from(EXIT_ERR_CODE);
        }
    };
    cli.apply_overrides(&mut config);

    let _file_log_guard = init_tracing(&config.log);
    tracing::debug!(
        database = %config.database_path.display(),
        log_format = config.log.format.as_str(),
        "configuration loaded"
    );

    tokio::select! {
        result = commands::run(cli.command, &config) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                tracing::error!(error = %error_report(&err), "command failed");
                ExitCode::from(EXIT_ERR_CODE)
            }
        },
        _ = shutdown_signal() => {
            tracing::warn!("interrupted");
            ExitCode::from(EXIT_ERR_CODE)
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}
