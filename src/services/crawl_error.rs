use std::time::Duration;

use thirtyfour::error::WebDriverError;

#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("webdriver error: {0}")]
    WebDriver(#[from] WebDriverError),

    #[error("navigation to {url} failed: {source}")]
    Navigation {
        url: String,
        #[source]
        source: WebDriverError,
    },

    #[error("required element `{selector}` missing on {url}")]
    MissingElement { selector: String, url: String },

    #[error("invalid selector `{0}`")]
    Selector(String),

    #[error("companion request failed: {0}")]
    Companion(#[from] reqwest::Error),

    #[error("request handler exceeded {0:?}")]
    Timeout(Duration),
}

impl CrawlError {
    // Missing required elements are final for a URL.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CrawlError::WebDriver(_) | CrawlError::Navigation { .. } | CrawlError::Timeout(_)
        )
    }
}
