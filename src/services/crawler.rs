use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use crate::{
    configuration::CrawlerSettings,
    dal::Datasets,
    domain::request::Request,
    routes::{route, HandlerOutput, RouteContext},
};

use super::{Browser, CrawlError, Frontier};

#[derive(Debug, Default)]
pub struct CrawlStats {
    handled: AtomicUsize,
    failed: AtomicUsize,
    retried: AtomicUsize,
}

impl CrawlStats {
    pub fn handled(&self) -> usize {
        self.handled.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn retried(&self) -> usize {
        self.retried.load(Ordering::Relaxed)
    }
}

#[derive(Clone)]
pub struct Crawler {
    frontier: Arc<Frontier>,
    datasets: Arc<Datasets>,
    context: RouteContext,
    stats: Arc<CrawlStats>,
    max_request_retries: u32,
    request_handler_timeout: Duration,
}

impl Crawler {
    pub fn new(context: RouteContext, datasets: Arc<Datasets>, settings: &CrawlerSettings) -> Self {
        Crawler {
            frontier: Arc::new(Frontier::new()),
            datasets,
            context,
            stats: Arc::new(CrawlStats::default()),
            max_request_retries: settings.max_request_retries,
            request_handler_timeout: settings.request_handler_timeout(),
        }
    }

    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    // Browsers come back so the caller can shut them down.
    pub async fn run<B>(&self, browsers: Vec<B>, start: impl IntoIterator<Item = Request>) -> Vec<B>
    where
        B: Browser + 'static,
    {
        let seeded = self.frontier.enqueue(start);
        log::info!("Starting crawl of {} URLs with {} workers", seeded, browsers.len());

        let workers: Vec<_> = browsers
            .into_iter()
            .enumerate()
            .map(|(id, browser)| {
                let crawler = self.clone();
                tokio::spawn(async move { crawler.work(id, browser).await })
            })
            .collect();

        let mut browsers = Vec::with_capacity(workers.len());
        for worker in workers {
            match worker.await {
                Ok(browser) => browsers.push(browser),
                Err(e) => log::error!("Crawl worker died: {:?}", e),
            }
        }

        log::info!(
            "Crawl finished: {} handled, {} failed, {} retried",
            self.stats.handled(),
            self.stats.failed(),
            self.stats.retried()
        );
        browsers
    }

    async fn work<B: Browser>(&self, id: usize, browser: B) -> B {
        log::debug!("Worker {} started", id);

        while let Some(request) = self.frontier.next().await {
            let _in_flight = self.frontier.in_flight();
            self.handle(&browser, request).await;
        }

        log::debug!("Worker {} done", id);
        browser
    }

    async fn handle(&self, browser: &dyn Browser, request: Request) {
        let outcome =
            match tokio::time::timeout(self.request_handler_timeout, self.visit(browser, &request))
                .await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(CrawlError::Timeout(self.request_handler_timeout)),
            };

        match outcome {
            Ok(output) => {
                let added = self.frontier.enqueue(output.enqueue);
                if added > 0 {
                    log::debug!("{} new URLs from {}", added, request.url);
                }
                self.datasets.commit(output.batch);
                self.stats.handled.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) if e.is_retryable() && request.retry_count < self.max_request_retries => {
                log::warn!(
                    "Retrying {} ({}/{}): {}",
                    request.url,
                    request.retry_count + 1,
                    self.max_request_retries,
                    e
                );
                self.stats.retried.fetch_add(1, Ordering::Relaxed);
                self.frontier.retry(request);
            }
            Err(e) => {
                log::error!("Abandoning {} [{}]: {}", request.url, request.label, e);
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    async fn visit(
        &self,
        browser: &dyn Browser,
        request: &Request,
    ) -> Result<HandlerOutput, CrawlError> {
        let page = browser.open(&request.url).await?;
        route(request.label, page.as_ref(), &self.context).await
    }
}
