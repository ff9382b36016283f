//! One pass over the creator list: fetch, parse and notify, one creator and
//! one item at a time.

use std::time::Duration;

use tracing::{error, info, warn};

use crate::config::{Creator, CreatorEntry};
use crate::error::StateError;
use crate::state::{NotifiedLog, ReviewEntry, ReviewList, ReviewReason};
use crate::tsr::{classify_status, parse_items, PageSource, PageStatus};
use crate::webhook::Notifier;

#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    /// Pause after every delivered message.
    pub notify_delay: Duration,
    /// Write the state files. Off for dry runs.
    pub persist: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub checked: usize,
    pub skipped_invalid: usize,
    pub skipped_flagged: usize,
    pub flagged: usize,
    pub sent: usize,
    pub failed: usize,
}

enum Outcome {
    Done { sent: usize, failed: usize },
    Flagged(ReviewEntry),
}

/// Processes every creator in order and writes both state files at the end.
/// Only a failed state write makes this return an error.
pub async fn run<S, N>(
    creators: &[CreatorEntry],
    source: &S,
    notifier: &N,
    notified: &mut NotifiedLog,
    reviews: &mut ReviewList,
    settings: &Settings,
) -> Result<RunSummary, StateError>
where
    S: PageSource + ?Sized,
    N: Notifier + ?Sized,
{
    let mut summary = RunSummary::default();

    for entry in creators {
        let Some(creator) = entry.validate() else {
            warn!(name = %entry.name, url = %entry.url, "skipping creator with missing name or url");
            summary.skipped_invalid += 1;
            continue;
        };

        if reviews.is_flagged(&creator.url) {
            info!(creator = %creator.name, url = %creator.url, "on the review list, skipping");
            summary.skipped_flagged += 1;
            continue;
        }

        summary.checked += 1;
        match process_creator(&creator, source, notifier, notified, settings).await? {
            Outcome::Done { sent, failed } => {
                summary.sent += sent;
                summary.failed += failed;
            }
            Outcome::Flagged(review) => {
                warn!(
                    creator = %creator.name,
                    url = %creator.url,
                    reason = review.reason.as_str(),
                    status = ?review.status,
                    "flagged for review"
                );
                summary.flagged += 1;
                reviews.push(review);
            }
        }
    }

    reviews.dedup_by_url();
    if settings.persist {
        notified.persist()?;
        reviews.persist()?;
    }

    info!(
        checked = summary.checked,
        sent = summary.sent,
        failed = summary.failed,
        flagged = summary.flagged,
        skipped_flagged = summary.skipped_flagged,
        skipped_invalid = summary.skipped_invalid,
        "run finished"
    );
    Ok(summary)
}

async fn process_creator<S, N>(
    creator: &Creator,
    source: &S,
    notifier: &N,
    notified: &mut NotifiedLog,
    settings: &Settings,
) -> Result<Outcome, StateError>
where
    S: PageSource + ?Sized,
    N: Notifier + ?Sized,
{
    info!(creator = %creator.name, url = %creator.url, "checking");

    let page = match source.fetch(&creator.url).await {
        Ok(page) => page,
        Err(err) => {
            error!(creator = %creator.name, error = %err, "fetch failed");
            return Ok(Outcome::Flagged(ReviewEntry::new(
                creator,
                None,
                ReviewReason::NetworkError,
            )));
        }
    };

    match classify_status(Some(page.status)) {
        PageStatus::Ok => {}
        PageStatus::Redirect => {
            return Ok(Outcome::Flagged(ReviewEntry::new(
                creator,
                Some(page.status),
                ReviewReason::Redirect,
            )));
        }
        PageStatus::HttpError => {
            return Ok(Outcome::Flagged(ReviewEntry::new(
                creator,
                Some(page.status),
                ReviewReason::HttpError,
            )));
        }
    }

    let items = match parse_items(&page.body, &settings.base_url) {
        Ok(items) => items,
        Err(err) => {
            error!(creator = %creator.name, error = %err, "can't parse page");
            return Ok(Outcome::Flagged(ReviewEntry::new(
                creator,
                Some(page.status),
                ReviewReason::ParseError,
            )));
        }
    };

    let (mut sent, mut failed) = (0, 0);
    for item in items {
        if notified.contains(&item.link) {
            continue;
        }

        match notifier
            .notify(&creator.name, &item.link, item.image.as_deref())
            .await
        {
            Ok(()) => {
                info!(creator = %creator.name, item = %item.link, "notified");
                notified.insert(item.link);
                if settings.persist {
                    notified.persist()?;
                }
                sent += 1;
                tokio::time::sleep(settings.notify_delay).await;
            }
            Err(err) => {
                error!(
                    creator = %creator.name,
                    item = %item.link,
                    error = %err,
                    "notification failed, will retry next run"
                );
                failed += 1;
            }
        }
    }

    Ok(Outcome::Done { sent, failed })
}
