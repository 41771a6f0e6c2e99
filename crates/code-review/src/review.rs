use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tracing::debug;

use code_review_core::{ReviewOutcome, ReviewRequest, ReviewRunner};
use code_review_diff::IgnoreMatcher;
use code_review_git::GitClient;
use code_review_gpt::{OpenAiReviewer, ReviewerConfig};
use code_review_logging::Logger;

use crate::config::{UserConfig, API_KEY_ENV};

#[derive(Args, Debug)]
pub struct ReviewArgs {
    /// Comma-separated files or patterns to leave out (e.g. '*.yaml,*.json,docs.go')
    #[arg(short, long, default_value = "")]
    pub ignore: String,

    /// Repository to review (default: current directory)
    #[arg(short = 'd', long)]
    pub working_dir: Option<PathBuf>,

    /// Model for this run only
    #[arg(long)]
    pub model: Option<String>,

    /// Print the review document instead of sending it
    #[arg(long)]
    pub dry_run: bool,

    /// Output the outcome as JSON
    #[arg(long)]
    pub json: bool,

    /// Seconds to wait for each git command
    #[arg(long, value_name = "SECS")]
    pub git_timeout: Option<u64>,

    /// Seconds to wait for the review
    #[arg(long, value_name = "SECS")]
    pub review_timeout: Option<u64>,
}

pub async fn handle_review(args: &ReviewArgs, logger: Arc<Logger>) -> Result<i32> {
    let working_dir = match args.working_dir {
        Some(ref dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let git = GitClient::in_dir(
        working_dir.clone(),
        args.git_timeout.map(Duration::from_secs),
    );
    let request =
        ReviewRequest::new(working_dir).with_ignore(IgnoreMatcher::parse(&args.ignore));

    let outcome = if args.dry_run {
        ReviewRunner::new(&git, logger).run(request).await?
    } else {
        let reviewer = build_reviewer(args)?;
        ReviewRunner::new(&git, logger)
            .with_reviewer(&reviewer)
            .run(request)
            .await?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    Ok(outcome.exit_code())
}

fn build_reviewer(args: &ReviewArgs) -> Result<OpenAiReviewer> {
    if let Err(e) = dotenvy::dotenv() {
        debug!(error = %e, "No .env file loaded");
    }

    let config = UserConfig::load_from(&UserConfig::default_path()?)?;
    let api_key = config
        .resolve_api_key(std::env::var(API_KEY_ENV).ok())
        .with_context(|| {
            format!(
                "{} is not set. Set it with 'code-review set --openai-api-key YOUR_API_KEY' or as an environment variable.",
                API_KEY_ENV
            )
        })?;

    let mut reviewer_config = ReviewerConfig::new(api_key);
    if let Some(ref model) = config.openai_model {
        reviewer_config = reviewer_config.with_model(model.clone());
    }
    if let Some(max_tokens) = config.max_tokens {
        reviewer_config = reviewer_config.with_max_tokens(max_tokens);
    }
    if let Some(ref base_url) = config.api_base_url {
        reviewer_config = reviewer_config.with_base_url(base_url.clone());
    }
    if let Some(secs) = args.review_timeout {
        reviewer_config = reviewer_config.with_timeout(Duration::from_secs(secs));
    }

    let reviewer = OpenAiReviewer::new(reviewer_config)?;
    let reviewer = match args.model {
        Some(ref model) => reviewer.with_model(model.clone()),
        None => reviewer,
    };
    debug!(config = ?reviewer.config(), "Reviewer configured");
    Ok(reviewer)
}

fn print_outcome(outcome: &ReviewOutcome) {
    print_warnings(outcome.warnings());

    match outcome {
        ReviewOutcome::NoChanges { .. } => {
            println!("No changes detected in the current branch.");
        }
        ReviewOutcome::NothingToReview { .. } => {
            println!("No changes to review after applying ignore patterns.");
        }
        ReviewOutcome::DryRun { document, .. } => {
            println!("{}", document);
        }
        ReviewOutcome::Reviewed { model, review, .. } => {
            println!("{}", format!("Review ({}):", model).bold());
            println!("{}", review);
        }
    }
}

fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }

    eprintln!(
        "{}",
        "Encountered errors while processing some files:".bright_yellow()
    );
    for warning in warnings {
        eprintln!("- {}", warning);
    }
    eprintln!("Continuing with the files that were processed successfully.");
}
