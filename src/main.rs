use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tsr_notifier::{
    load_creators, run, Args, DiscordWebhook, DryRunNotifier, HttpPageSource, Notifier,
    NotifiedLog, ReviewList,
};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tsr_notifier={}", args.log_level())));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    ExitCode::from(finish(check(&args).await))
}

/// Logs a failed run once and turns it into the process exit status.
fn finish(result: Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            error!("{e:#}");
            1
        }
    }
}

async fn check(args: &Args) -> Result<()> {
    let creators = load_creators(&args.creators)?;
    info!(count = creators.len(), path = %args.creators.display(), "loaded creator list");

    let source = HttpPageSource::new(Duration::from_secs(args.fetch_timeout))
        .context("building page client")?;
    let notifier: Box<dyn Notifier> = if args.dry_run {
        Box::new(DryRunNotifier)
    } else {
        Box::new(
            DiscordWebhook::new(&args.webhook_url, Duration::from_secs(args.notify_timeout))
                .context("building webhook client")?,
        )
    };

    let mut notified = NotifiedLog::load(&args.sent_log);
    let mut reviews = ReviewList::load(&args.review_log);

    run(
        &creators,
        &source,
        notifier.as_ref(),
        &mut notified,
        &mut reviews,
        &args.settings(),
    )
    .await
    .context("saving state")?;

    Ok(())
}
