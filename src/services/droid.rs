use std::time::{Duration, Instant};

use async_trait::async_trait;
use thirtyfour::{
    By, CapabilitiesHelper, ChromiumLikeCapabilities, DesiredCapabilities, Proxy, WebDriver,
    WebElement,
};

use crate::configuration::WebdriverSettings;

use super::{Browser, CrawlError, Page};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct Droid {
    pub driver: WebDriver,
    settle_delay: Duration,
}

impl Droid {
    pub async fn new(
        settings: &WebdriverSettings,
        navigation_timeout: Duration,
        settle_delay: Duration,
    ) -> Result<Self, CrawlError> {
        let mut caps = DesiredCapabilities::chrome();
        if settings.headless {
            caps.set_headless()?;
        }
        caps.add_arg(&format!(
            "--window-size={},{}",
            settings.window_width, settings.window_height
        ))?;
        caps.add_arg("--disable-dev-shm-usage")?;

        if let Some(proxy_url) = &settings.proxy {
            let proxy = Proxy::Manual {
                ftp_proxy: None,
                http_proxy: Some(proxy_url.clone()),
                ssl_proxy: Some(proxy_url.clone()),
                socks_proxy: None,
                socks_version: None,
                socks_username: None,
                socks_password: None,
                no_proxy: None,
            };
            caps.set_proxy(proxy)?;
        }

        // http://chrome:4444/wd/hub in docker, a local chromedriver otherwise
        let driver = WebDriver::new(settings.url.as_str(), caps).await?;
        driver.set_page_load_timeout(navigation_timeout).await?;

        Ok(Droid {
            driver,
            settle_delay,
        })
    }

    pub async fn quit(self) -> Result<(), CrawlError> {
        self.driver.quit().await?;
        Ok(())
    }
}

#[async_trait]
impl Browser for Droid {
    async fn open<'a>(&'a self, url: &str) -> Result<Box<dyn Page + 'a>, CrawlError> {
        self.driver
            .goto(url)
            .await
            .map_err(|source| CrawlError::Navigation {
                url: url.to_string(),
                source,
            })?;

        let loaded_url = match self.driver.current_url().await {
            Ok(current) => current.to_string(),
            Err(_) => url.to_string(),
        };

        Ok(Box::new(BrowserPage {
            driver: &self.driver,
            url: loaded_url,
            settle_delay: self.settle_delay,
        }))
    }
}

pub struct BrowserPage<'a> {
    driver: &'a WebDriver,
    url: String,
    settle_delay: Duration,
}

impl BrowserPage<'_> {
    async fn first_displayed(&self, selector: &str) -> Result<Option<WebElement>, CrawlError> {
        for element in self.driver.find_all(By::Css(selector)).await? {
            // Elements can detach between lookup and the display check.
            if element.is_displayed().await.unwrap_or(false) {
                return Ok(Some(element));
            }
        }

        Ok(None)
    }
}

#[async_trait]
impl Page for BrowserPage<'_> {
    fn url(&self) -> &str {
        &self.url
    }

    async fn source(&self) -> Result<String, CrawlError> {
        Ok(self.driver.source().await?)
    }

    async fn is_visible(&self, selector: &str) -> Result<bool, CrawlError> {
        Ok(self.first_displayed(selector).await?.is_some())
    }

    async fn wait_for_visible(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, CrawlError> {
        let deadline = Instant::now() + timeout;

        loop {
            if self.is_visible(selector).await? {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn click(&self, selector: &str) -> Result<bool, CrawlError> {
        match self.first_displayed(selector).await? {
            Some(element) => {
                element.scroll_into_view().await?;
                element.click().await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn settle(&self) {
        tokio::time::sleep(self.settle_delay).await;
    }
}
