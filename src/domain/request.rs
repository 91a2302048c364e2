use std::fmt;

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Default,
    Zapier,
    PaDetail,
    Workato,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Default => "default",
            Label::Zapier => "zapier",
            Label::PaDetail => "pa-detail",
            Label::Workato => "workato",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub label: Label,
    pub retry_count: u32,
}

impl Request {
    pub fn new(url: impl Into<String>, label: Label) -> Self {
        Request {
            url: url.into(),
            label,
            retry_count: 0,
        }
    }

    /// Dedup key: the URL without fragment and trailing slash.
    pub fn unique_key(&self) -> String {
        match Url::parse(&self.url) {
            Ok(mut parsed) => {
                parsed.set_fragment(None);
                parsed.as_str().trim_end_matches('/').to_string()
            }
            Err(_) => self.url.trim_end_matches('/').to_string(),
        }
    }
}

pub fn last_path_segment(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;

    parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(|segment| segment.to_string())
}
