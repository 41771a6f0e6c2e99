use anyhow::Result;
use clap::{ArgGroup, Args};
use colored::Colorize;

use crate::config::UserConfig;

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("settings")
        .required(true)
        .multiple(true)
        .args(["openai_api_key", "openai_model", "max_tokens"])
))]
pub struct SetArgs {
    /// OpenAI API key
    #[arg(long)]
    pub openai_api_key: Option<String>,

    /// Model used for reviews
    #[arg(long)]
    pub openai_model: Option<String>,

    /// Upper bound on the length of the review
    #[arg(long)]
    pub max_tokens: Option<u32>,
}

impl SetArgs {
    /// Overwrite only the settings that were given
    fn apply(&self, config: &mut UserConfig) {
        if let Some(ref key) = self.openai_api_key {
            config.openai_api_key = Some(key.clone());
        }
        if let Some(ref model) = self.openai_model {
            config.openai_model = Some(model.clone());
        }
        if let Some(max_tokens) = self.max_tokens {
            config.max_tokens = Some(max_tokens);
        }
    }
}

pub fn handle_set(args: &SetArgs) -> Result<()> {
    let path = UserConfig::default_path()?;
    let mut config = UserConfig::load_from(&path)?;

    args.apply(&mut config);
    config.save_to(&path)?;

    eprintln!(
        "{} Configuration has been saved to {}",
        "✓".bright_green(),
        path.display()
    );
    Ok(())
}
