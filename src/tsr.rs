//! Everything that knows about The Sims Resource: how to ask for a creator
//! page and where the items sit in its markup.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::redirect::Policy;
use scraper::{Html, Selector};
use tracing::warn;
use url::Url;

use crate::error::{FetchError, ParseError};

pub const DEFAULT_BASE_URL: &str = "https://www.thesimsresource.com";

lazy_static! {
    static ref ITEM_WRAPPER: Selector = Selector::parse("div.browse-file").expect("wrapper selector");
    static ref ITEM_LINK: Selector = Selector::parse("a.browse-file-link").expect("link selector");
    static ref ITEM_IMAGE: Selector = Selector::parse(".browse-file-image").expect("image selector");
    static ref BACKGROUND_URL: Regex =
        Regex::new(r#"url\(\s*(?:'([^']*)'|"([^"]*)"|([^'")\s]+))\s*\)"#)
            .expect("background url pattern");
    static ref SCHEME: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("scheme pattern");
}

fn build_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Safari/537.36 tsr-notifier",
        ),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.8"));
    headers
}

/// Raw answer for a creator page. Redirects are not followed, so `status`
/// may be a 3xx.
#[derive(Debug, Clone)]
pub struct Page {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    Ok,
    Redirect,
    HttpError,
}

/// 2xx is ok, 3xx is a redirect, anything else (or no status at all) is an
/// http error.
pub fn classify_status(status: Option<u16>) -> PageStatus {
    match status {
        Some(200..=299) => PageStatus::Ok,
        Some(300..=399) => PageStatus::Redirect,
        _ => PageStatus::HttpError,
    }
}

#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError>;
}

pub struct HttpPageSource {
    client: reqwest::Client,
}

impl HttpPageSource {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .timeout(timeout)
            .default_headers(build_headers())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(Page { status, body })
    }
}

/// One item found on a creator page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub link: String,
    pub image: Option<String>,
}

/// Extracts the items of a creator page in document order. Wrappers without
/// a link are skipped, a link listed twice is returned once. An image that
/// can't be made absolute is dropped; a link that can't fails the page.
pub fn parse_items(html: &str, base_url: &str) -> Result<Vec<Item>, ParseError> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut items = vec![];

    for element in document.select(&ITEM_WRAPPER) {
        let Some(href) = element
            .select(&ITEM_LINK)
            .find_map(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
        else {
            continue;
        };
        let link = absolutize(href, base_url)?;

        let image = element
            .select(&ITEM_IMAGE)
            .find_map(|e| e.value().attr("style"))
            .and_then(background_url)
            .and_then(|raw| match absolutize(raw, base_url) {
                Ok(image) => Some(image),
                Err(err) => {
                    warn!(item = %link, error = %err, "ignoring unusable image url");
                    None
                }
            });

        if seen.insert(link.clone()) {
            items.push(Item { link, image });
        }
    }

    Ok(items)
}

/// Pulls the address out of a `background-image: url(...)` declaration.
fn background_url(style: &str) -> Option<&str> {
    let caps = BACKGROUND_URL.captures(style)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}

/// Leaves absolute urls alone and joins everything else onto `base_url`.
pub fn absolutize(raw: &str, base_url: &str) -> Result<String, ParseError> {
    let joined = if SCHEME.is_match(raw) {
        raw.to_string()
    } else if let Some(rest) = raw.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            raw.trim_start_matches('/')
        )
    };

    Url::parse(&joined).map_err(|source| ParseError::Url {
        raw: raw.to_string(),
        source,
    })?;
    Ok(joined)
}
