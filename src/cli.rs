use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::logging::LogFormat;
use crate::models::{Language, UserId};

#[derive(Parser, Debug)]
#[command(name = "vocabforge", about = "Vocabulary trainer with generated practice sentences", version)]
pub struct Cli {
    #[arg(long, global = true, value_name = "PATH")]
    /// SQLite database file
    pub database: Option<PathBuf>,

    #[arg(long, global = true, value_name = "FILTER")]
    /// Log filter, e.g. `info` or `vocabforge=debug`
    pub log_level: Option<String>,

    #[arg(long, global = true, value_parser = parse_log_format)]
    /// `text` or `json`
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a user and print its id
    CreateUser,
    /// Add a word, generating practice sentences unless given
    AddWord(AddWordArgs),
    /// Print the exercise to practice next
    NextExercise(UserArgs),
    /// Print pending and in-progress word counts
    Stats(UserArgs),
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct UserArgs {
    #[arg(long)]
    pub user_id: UserId,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct AddWordArgs {
    #[arg(long)]
    pub user_id: UserId,

    #[arg(long)]
    pub spelling: String,

    #[arg(long)]
    pub definition: String,

    #[arg(long)]
    /// Language of spelling and definition, e.g. `en_US`
    pub language: Option<Language>,

    #[arg(long, default_value = "")]
    pub lexical_category: String,

    #[arg(long = "sentence", value_name = "TEXT")]
    /// Practice sentence; repeat to add several
    pub sentences: Vec<String>,
}

impl Cli {
    /// Command line flags win over environment and defaults.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(path) = &self.database {
            config.database_path = path.clone();
        }
        if let Some(level) = &self.log_level {
            config.log.level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.log.format = format;
        }
    }
}

fn parse_log_format(raw: &str) -> Result<LogFormat, String> {
    LogFormat::parse(raw).ok_or_else(|| format!("unknown log format `{raw}`"))
}
