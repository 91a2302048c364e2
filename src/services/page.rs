use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use super::CrawlError;

#[async_trait]
pub trait Page: Send + Sync {
    fn url(&self) -> &str;

    async fn source(&self) -> Result<String, CrawlError>;

    async fn is_visible(&self, selector: &str) -> Result<bool, CrawlError>;

    async fn wait_for_visible(&self, selector: &str, timeout: Duration)
        -> Result<bool, CrawlError>;

    /// Clicks the first displayed match. Returns false when nothing matched.
    async fn click(&self, selector: &str) -> Result<bool, CrawlError>;

    async fn settle(&self);
}

#[async_trait]
pub trait Browser: Send + Sync {
    async fn open<'a>(&'a self, url: &str) -> Result<Box<dyn Page + 'a>, CrawlError>;
}

pub fn parse_selector(selector: &str) -> Result<Selector, CrawlError> {
    Selector::parse(selector).map_err(|e| CrawlError::Selector(format!("{selector}: {e:?}")))
}

pub fn element_text(element: ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

pub fn select_texts(document: &Html, selector: &str) -> Result<Vec<String>, CrawlError> {
    let selector = parse_selector(selector)?;

    Ok(document
        .select(&selector)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect())
}

pub fn select_first_text(document: &Html, selector: &str) -> Result<Option<String>, CrawlError> {
    let selector = parse_selector(selector)?;

    Ok(document
        .select(&selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty()))
}

pub fn require_text(document: &Html, selector: &str, url: &str) -> Result<String, CrawlError> {
    select_first_text(document, selector)?.ok_or_else(|| CrawlError::MissingElement {
        selector: selector.to_string(),
        url: url.to_string(),
    })
}

pub fn select_attribute(
    document: &Html,
    selector: &str,
    attribute: &str,
) -> Result<Option<String>, CrawlError> {
    let selector = parse_selector(selector)?;

    Ok(document
        .select(&selector)
        .find_map(|element| element.value().attr(attribute))
        .map(|value| value.trim().to_string()))
}

pub fn page_title(document: &Html) -> String {
    select_first_text(document, "title")
        .ok()
        .flatten()
        .unwrap_or_default()
}
