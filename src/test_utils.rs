use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use scraper::Html;

use crate::{
    configuration::PaginationSettings,
    routes::RouteContext,
    services::{
        parse_selector, Browser, CompanionApi, CrawlError, Page, PowerAutomateTemplate,
        WorkatoAdapters, WorkatoTemplate,
    },
};

struct FakeState {
    html: String,
    on_click: HashMap<String, VecDeque<String>>,
    clicks: HashMap<String, usize>,
}

/// Scripted page: a selector is "visible" when it matches the current HTML,
/// and clicking it moves to the next HTML queued for that selector.
pub struct FakePage {
    url: String,
    state: Mutex<FakeState>,
}

impl FakePage {
    pub fn new(url: &str, html: impl Into<String>) -> Self {
        FakePage {
            url: url.to_string(),
            state: Mutex::new(FakeState {
                html: html.into(),
                on_click: HashMap::new(),
                clicks: HashMap::new(),
            }),
        }
    }

    pub fn on_click(mut self, selector: &str, next_html: impl Into<String>) -> Self {
        self.state
            .get_mut()
            .unwrap()
            .on_click
            .entry(selector.to_string())
            .or_default()
            .push_back(next_html.into());
        self
    }

    pub fn clicks(&self, selector: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .clicks
            .get(selector)
            .copied()
            .unwrap_or(0)
    }

    pub fn current_source(&self) -> String {
        self.state.lock().unwrap().html.clone()
    }

    fn matches(&self, selector: &str) -> Result<bool, CrawlError> {
        let selector = parse_selector(selector)?;
        let document = Html::parse_document(&self.state.lock().unwrap().html);
        let found = document.select(&selector).next().is_some();
        Ok(found)
    }
}

#[async_trait]
impl Page for FakePage {
    fn url(&self) -> &str {
        &self.url
    }

    async fn source(&self) -> Result<String, CrawlError> {
        Ok(self.current_source())
    }

    async fn is_visible(&self, selector: &str) -> Result<bool, CrawlError> {
        self.matches(selector)
    }

    async fn wait_for_visible(
        &self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<bool, CrawlError> {
        self.matches(selector)
    }

    async fn click(&self, selector: &str) -> Result<bool, CrawlError> {
        if !self.matches(selector)? {
            return Ok(false);
        }

        let mut state = self.state.lock().unwrap();
        *state.clicks.entry(selector.to_string()).or_default() += 1;
        if let Some(next) = state
            .on_click
            .get_mut(selector)
            .and_then(|queue| queue.pop_front())
        {
            state.html = next;
        }
        Ok(true)
    }

    async fn settle(&self) {}
}

/// Serves canned HTML per URL; unknown URLs fail like a dead navigation.
#[derive(Default)]
pub struct FakeBrowser {
    pages: HashMap<String, String>,
    panics_on: Option<String>,
    opened: Mutex<Vec<String>>,
}

impl FakeBrowser {
    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    pub fn panicking_on(mut self, url: &str) -> Self {
        self.panics_on = Some(url.to_string());
        self
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn open<'a>(&'a self, url: &str) -> Result<Box<dyn Page + 'a>, CrawlError> {
        self.opened.lock().unwrap().push(url.to_string());
        if self.panics_on.as_deref() == Some(url) {
            panic!("browser crashed on {}", url);
        }

        match self.pages.get(url) {
            Some(html) => Ok(Box::new(FakePage::new(url, html.clone()))),
            None => Err(CrawlError::Timeout(Duration::from_secs(1))),
        }
    }
}

/// Companion API with canned answers. `None` makes the call fail.
pub struct FakeCompanion {
    pub power_automate: Option<Vec<PowerAutomateTemplate>>,
    pub workato: Option<Vec<WorkatoTemplate>>,
    pub queries: Mutex<Vec<String>>,
}

impl Default for FakeCompanion {
    fn default() -> Self {
        FakeCompanion {
            power_automate: Some(Vec::new()),
            workato: Some(Vec::new()),
            queries: Mutex::new(Vec::new()),
        }
    }
}

impl FakeCompanion {
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn failing() -> Self {
        FakeCompanion {
            power_automate: None,
            workato: None,
            queries: Mutex::new(Vec::new()),
        }
    }
}

fn companion_error() -> CrawlError {
    let error = reqwest::Client::new()
        .get("not a url")
        .build()
        .unwrap_err();
    CrawlError::Companion(error)
}

#[async_trait]
impl CompanionApi for FakeCompanion {
    async fn power_automate_templates(
        &self,
        connector: &str,
    ) -> Result<Vec<PowerAutomateTemplate>, CrawlError> {
        self.queries.lock().unwrap().push(connector.to_string());
        self.power_automate.clone().ok_or_else(companion_error)
    }

    async fn workato_templates(&self, app_name: &str) -> Result<Vec<WorkatoTemplate>, CrawlError> {
        self.queries.lock().unwrap().push(app_name.to_string());
        self.workato.clone().ok_or_else(companion_error)
    }
}

pub fn pagination_settings() -> PaginationSettings {
    PaginationSettings {
        zapier_catalog_clicks: 41,
        zapier_template_pages: 3,
        trigger_action_safety_cap: 200,
        control_wait_millis: 0,
        catalog_wait_millis: 0,
        settle_millis: 0,
    }
}

/// Pass an `Arc<FakeCompanion>` to keep a handle on the recorded queries.
pub fn route_context(
    companion: impl Into<Arc<FakeCompanion>>,
    adapters: WorkatoAdapters,
) -> RouteContext {
    let companion: Arc<FakeCompanion> = companion.into();

    RouteContext {
        pagination: pagination_settings(),
        adapters: Arc::new(adapters),
        companion,
    }
}
