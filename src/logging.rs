use std::error::Error as StdError;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LogConfig;

const LOG_FILE_PREFIX: &str = "vocabforge.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

/// Keeps the background file writer alive; drop it last.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

fn format_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .flatten_event(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Text => fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
    }
}

pub fn init_tracing(config: &LogConfig) -> Option<FileLogGuard> {
    let env_filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(format_layer(config.format));

    if let Some(log_dir) = &config.dir {
        if let Err(err) = std::fs::create_dir_all(log_dir) {
            eprintln!("failed to create log directory {}: {err}", log_dir.display());
        } else {
            let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            let file_layer = fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(true);

            if let Err(err) = registry.with(file_layer).try_init() {
                eprintln!("failed to install tracing subscriber: {err}");
            }
            return Some(FileLogGuard { _guard: guard });
        }
    }

    if let Err(err) = registry.try_init() {
        eprintln!("failed to install tracing subscriber: {err}");
    }
    None
}

/// Renders an error followed by its full source chain.
pub fn error_report(err: &(dyn StdError + 'static)) -> String {
    let mut report = err.to_string();
    let mut current = err.source();
    let mut index = 1usize;
    while let Some(source) = current {
        report.push_str(&format!("\ncaused by ({index}): {source}"));
        current = source.source();
        index += 1;
    }
    report
}
