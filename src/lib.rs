use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

pub mod config;
pub mod error;
pub mod run;
pub mod state;
pub mod tsr;
pub mod webhook;

pub use config::{load_creators, Creator, CreatorEntry};
pub use run::{run, RunSummary, Settings};
pub use state::{NotifiedLog, ReviewEntry, ReviewList, ReviewReason};
pub use tsr::{HttpPageSource, Item, PageSource};
pub use webhook::{DiscordWebhook, DryRunNotifier, Notifier};

#[derive(Parser, Debug)]
#[clap(about, version)]
pub struct Args {
    /// JSON array of {"name", "url"} creator records
    #[clap(short, long, default_value = "creators.json")]
    pub creators: PathBuf,

    /// Links already posted to the webhook
    #[clap(short, long, default_value = "sent_log.json")]
    pub sent_log: PathBuf,

    /// Creators waiting for a manual look
    #[clap(short, long, default_value = "review_list.json")]
    pub review_log: PathBuf,

    #[clap(short, long, env = "DISCORD_WEBHOOK_URL", hide_env_values = true)]
    pub webhook_url: String,

    #[clap(short, long, default_value = tsr::DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Seconds to wait for a creator page
    #[clap(long, default_value = "20")]
    pub fetch_timeout: u64,

    /// Seconds to wait for the webhook
    #[clap(long, default_value = "10")]
    pub notify_timeout: u64,

    /// Seconds to pause after each posted message
    #[clap(long, default_value = "2")]
    pub notify_delay: u64,

    /// Log what would be posted; write no state
    #[clap(long)]
    pub dry_run: bool,

    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn settings(&self) -> Settings {
        Settings {
            base_url: self.base_url.clone(),
            notify_delay: Duration::from_secs(self.notify_delay),
            persist: !self.dry_run,
        }
    }

    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
