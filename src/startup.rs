use std::{path::Path, sync::Arc};

use anyhow::Context;

use crate::{
    configuration::Settings,
    dal::Datasets,
    domain::request::{Label, Request},
    routes::RouteContext,
    services::{CompanionClient, Crawler, Droid, WorkatoAdapters},
};

pub async fn run(configuration: Settings) -> anyhow::Result<()> {
    let companion = CompanionClient::new(&configuration.sources)
        .context("Failed to build the companion HTTP client")?;

    let adapters = match companion.fetch_workato_adapters().await {
        Ok(adapters) => adapters,
        Err(e) => {
            log::error!("Failed to fetch workato adapters, crawling without them: {}", e);
            WorkatoAdapters::default()
        }
    };

    let context = RouteContext {
        pagination: configuration.pagination.clone(),
        adapters: Arc::new(adapters),
        companion: Arc::new(companion),
    };

    let droids = start_droids(&configuration).await?;

    let datasets = Arc::new(Datasets::open(&configuration.output));
    let crawler = Crawler::new(context, datasets.clone(), &configuration.crawler);
    let start_urls = configuration
        .crawler
        .start_urls
        .iter()
        .map(|url| Request::new(url.as_str(), Label::Default));

    let droids = crawler.run(droids, start_urls).await;
    if droids.is_empty() {
        anyhow::bail!("Every browser session crashed, nothing will be exported");
    }
    for droid in droids {
        if let Err(e) = droid.quit().await {
            log::warn!("Failed to close browser session: {}", e);
        }
    }

    log::info!(
        "Collected {} integrations, {} connectors, {} templates",
        datasets.service.len(),
        datasets.connectors.len(),
        datasets.templates.len()
    );
    datasets.export_all(Path::new(&configuration.output.directory))?;

    Ok(())
}

async fn start_droids(configuration: &Settings) -> anyhow::Result<Vec<Droid>> {
    let count = configuration.crawler.max_concurrency.max(1);
    let mut droids = Vec::with_capacity(count);

    for _ in 0..count {
        let droid = Droid::new(
            &configuration.webdriver,
            configuration.crawler.navigation_timeout(),
            configuration.pagination.settle_delay(),
        )
        .await;

        match droid {
            Ok(droid) => droids.push(droid),
            Err(e) => {
                for droid in droids {
                    let _ = droid.quit().await;
                }
                return Err(e).with_context(|| {
                    format!(
                        "Failed to start a browser session at {}",
                        configuration.webdriver.url
                    )
                });
            }
        }
    }

    log::info!("Started {} browser sessions", droids.len());
    Ok(droids)
}
