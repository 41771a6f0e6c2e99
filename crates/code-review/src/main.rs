use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use code_review_logging::{init_tracing, LogFormat, Logger};

mod config;
mod review;
mod set;

use review::{handle_review, ReviewArgs};
use set::{handle_set, SetArgs};

#[derive(Parser, Debug)]
#[command(
    name = "code-review",
    about = "Send the changes on the current branch to a language model for review",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty", global = true)]
    log_format: LogFormatChoice,

    /// Minimum level for diagnostic logs (RUST_LOG takes precedence)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Also append events as JSON lines to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Save the OpenAI API key, model, or token limit to ~/.code-review.toml
    #[command(alias = "s")]
    Set(SetArgs),

    /// Review the changes on the current branch
    #[command(alias = "r")]
    Review(ReviewArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_format: LogFormat = cli.log_format.into();
    // Pretty output writes the comparison line to stdout, which would corrupt JSON output
    if let Commands::Review(ref args) = cli.command {
        if args.json && log_format == LogFormat::Pretty {
            log_format = LogFormat::Compact;
        }
    }

    init_tracing(&cli.log_level, log_format);

    let logger = match cli.log_file {
        Some(ref path) => Logger::with_file(log_format, path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => Logger::new(log_format),
    };

    match cli.command {
        Commands::Set(ref args) => handle_set(args),
        Commands::Review(ref args) => {
            let code = handle_review(args, Arc::new(logger)).await?;
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_alias_and_flags() {
        let cli = Cli::try_parse_from([
            "code-review",
            "r",
            "-i",
            "*.yaml,*.json",
            "--dry-run",
            "--log-format",
            "compact",
        ])
        .unwrap();

        match cli.command {
            Commands::Review(args) => {
                assert_eq!(args.ignore, "*.yaml,*.json");
                assert!(args.dry_run);
                assert!(!args.json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(matches!(cli.log_format, LogFormatChoice::Compact));
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn test_set_requires_a_value() {
        assert!(Cli::try_parse_from(["code-review", "set"]).is_err());

        let cli = Cli::try_parse_from(["code-review", "s", "--openai-model", "gpt-4o"]).unwrap();
        match cli.command {
            Commands::Set(args) => {
                assert_eq!(args.openai_model.as_deref(), Some("gpt-4o"));
                assert!(args.openai_api_key.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_ignore_defaults_to_empty() {
        let cli = Cli::try_parse_from(["code-review", "review"]).unwrap();
        match cli.command {
            Commands::Review(args) => assert_eq!(args.ignore, ""),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
