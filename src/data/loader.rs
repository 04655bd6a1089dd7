// ============================================================
// Layer 4 - Context Loader
// ============================================================
// Builds the context string a question is answered against.
//
// Each source is either literal text or an http(s) URL:
//
//   "Paris is the capital of France."   -> one paragraph as-is
//   "https://en.wikipedia.org/wiki/..." -> GET the page, take the
//                                          text of every <p> element
//
// Every paragraph is cleaned and empty ones are dropped; the
// context is the paragraphs joined with "\n". Fetch errors are
// returned to the caller as they are, nothing is retried.

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

use crate::data::preprocessor::Preprocessor;
use crate::domain::traits::{ContextSource, PageFetcher};

const USER_AGENT: &str = concat!("extractive-qa/", env!("CARGO_PKG_VERSION"));

/// One entry of the context: literal text or a page to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Text(String),
    Url(Url),
}

impl Source {
    /// Anything that parses as an http(s) URL is fetched; everything
    /// else is taken literally.
    pub fn parse(raw: &str) -> Self {
        match Url::parse(raw.trim()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Url(url),
            _ => Self::Text(raw.to_string()),
        }
    }
}

// --- HTTP ----------------------------------------------------------------------

/// Blocking HTTP fetcher; the interactive flow is synchronous anyway.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<String> {
        tracing::debug!(%url, "fetching page");
        self.client
            .get(url.clone())
            .send()
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("{url}: request failed"))?
            .text()
            .with_context(|| format!("{url}: body read failed"))
    }
}

/// Text content of every `<p>` element, in document order.
pub fn extract_paragraphs(html: &str) -> Result<Vec<String>> {
    let doc = Html::parse_document(html);
    let p = Selector::parse("p").map_err(|e| anyhow!("invalid selector: {e:?}"))?;
    Ok(doc.select(&p).map(|el| el.text().collect::<String>()).collect())
}

// --- ContextLoader -------------------------------------------------------------

pub struct ContextLoader<F: PageFetcher> {
    sources:      Vec<Source>,
    fetcher:      F,
    preprocessor: Preprocessor,
}

impl<F: PageFetcher> ContextLoader<F> {
    pub fn new(sources: Vec<Source>, fetcher: F) -> Self {
        Self { sources, fetcher, preprocessor: Preprocessor::new() }
    }
}

impl<F: PageFetcher> ContextSource for ContextLoader<F> {
    fn load_paragraphs(&self) -> Result<Vec<String>> {
        let mut paragraphs = Vec::new();

        for source in &self.sources {
            let raw = match source {
                Source::Text(text) => vec![text.clone()],
                Source::Url(url) => {
                    let html = self.fetcher.fetch(url)?;
                    let found = extract_paragraphs(&html)?;
                    tracing::info!("{} paragraphs from {}", found.len(), url);
                    found
                }
            };
            paragraphs.extend(
                raw.iter()
                    .map(|p| self.preprocessor.clean(p))
                    .filter(|p| !p.is_empty()),
            );
        }

        if paragraphs.is_empty() {
            tracing::warn!("No paragraphs found in {} sources", self.sources.len());
        }
        Ok(paragraphs)
    }
}
