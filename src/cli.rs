// CLI module for argument parsing and configuration

use crate::config::UserConfig;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Largest deck a single round may hold
pub const MAX_DECK_SIZE: usize = 100;

/// Catswp - swipe through a deck of cats in your terminal
///
/// Drag a card right (or press →) to keep it, left (or press ←) to pass.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "catswp")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Number of cards in the deck
    #[arg(short = 'c', long = "count")]
    pub count: Option<usize>,

    /// Image source URL; a unique query is appended per card
    #[arg(long = "source")]
    pub source: Option<String>,

    /// Image used when a card's fetch fails
    #[arg(long = "fallback")]
    pub fallback: Option<String>,

    /// Use placeholder images instead of fetching over the network
    #[arg(long = "offline", action = ArgAction::SetTrue)]
    pub offline: bool,

    /// Print the final summary as JSON
    #[arg(long = "json", action = ArgAction::SetTrue)]
    pub json: bool,

    /// Store the effective deck size and URLs as the new defaults
    #[arg(long = "save-config", action = ArgAction::SetTrue)]
    pub save_config: bool,

    /// Write logs to this file
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Validate the arguments and return any errors
    pub fn validate(&self) -> Result<(), String> {
        if let Some(count) = self.count {
            if count == 0 || count > MAX_DECK_SIZE {
                return Err(format!(
                    "Invalid count: {}. Use a value between 1 and {}",
                    count, MAX_DECK_SIZE
                ));
            }
        }

        for (name, url) in [("source", &self.source), ("fallback", &self.fallback)] {
            if let Some(url) = url {
                if !is_http_url(url) {
                    return Err(format!(
                        "Invalid {} URL: '{}'. It must start with http:// or https://",
                        name, url
                    ));
                }
            }
        }

        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Configuration derived from CLI arguments layered over the user config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub deck_size: usize,
    pub source_url: String,
    pub fallback_url: String,
    pub offline: bool,
    pub json: bool,
    pub save_config: bool,
    pub log_file: Option<PathBuf>,
    pub verbose: u8,
}

impl AppConfig {
    /// Command line values win over the config file
    pub fn merge(args: Args, user: UserConfig) -> Self {
        AppConfig {
            deck_size: args.count.unwrap_or(user.deck_size).clamp(1, MAX_DECK_SIZE),
            source_url: args.source.unwrap_or(user.source_url),
            fallback_url: args.fallback.unwrap_or(user.fallback_url),
            offline: args.offline,
            json: args.json,
            save_config: args.save_config,
            log_file: args.log_file,
            verbose: args.verbose,
        }
    }
}

impl From<&AppConfig> for UserConfig {
    fn from(config: &AppConfig) -> Self {
        UserConfig {
            deck_size: config.deck_size,
            source_url: config.source_url.clone(),
            fallback_url: config.fallback_url.clone(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::merge(Args::default(), UserConfig::default())
    }
}
