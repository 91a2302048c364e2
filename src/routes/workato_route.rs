use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;

use crate::{
    domain::{
        records::{ConnectorRecord, ConnectorType, IntegrationIdentity, Service, TemplateRecord},
        request::last_path_segment,
    },
    services::{
        page_title, require_text, select_attribute, CrawlError, Operation, Page, WorkatoTemplate,
    },
};

use super::{PageBatch, RouteContext};

const APP_NAME: &str = "h1.apps-page__head-title";
const APP_NAME_SUFFIX: &str = " integrations and automations";
const META_DESCRIPTION: &str = r#"meta[name="description"]"#;

static MARKUP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<([^>]+)>").unwrap());

struct AppPage {
    title: String,
    name: String,
    description: String,
}

pub async fn extract(page: &dyn Page, ctx: &RouteContext) -> Result<PageBatch, CrawlError> {
    let app = read_app_page(&page.source().await?, page.url())?;
    log::info!("{} {}", app.title, page.url());

    let mut identity = IntegrationIdentity::new(Service::Workato, &app.name);
    identity.is_builtin = app.name.contains("Workato") || app.name.contains("Workbot");

    let mut batch = PageBatch {
        services: vec![identity.integration(Vec::new(), app.description, page.url())],
        ..PageBatch::default()
    };

    let operations = last_path_segment(page.url())
        .and_then(|segment| ctx.adapters.operations(&segment));
    match operations {
        Some(operations) => {
            let triggers = operations
                .triggers
                .iter()
                .map(|op| connector(&identity, ConnectorType::Triggers, op));
            let actions = operations
                .actions
                .iter()
                .map(|op| connector(&identity, ConnectorType::Steps, op));
            batch.connectors = triggers.chain(actions).collect();
        }
        None => log::debug!("No adapter operations for {}", page.url()),
    }
    log::info!("{} num_connectors: {}", identity.name, batch.connectors.len());

    match ctx.companion.workato_templates(&app.name).await {
        Ok(templates) => {
            batch.templates = templates.into_iter().map(template_record).collect();
            log::info!("{} num_templates: {}", identity.name, batch.templates.len());
        }
        Err(e) => log::error!("Skipping templates for {}: {}", page.url(), e),
    }

    Ok(batch)
}

fn read_app_page(source: &str, url: &str) -> Result<AppPage, CrawlError> {
    let document = Html::parse_document(source);
    let heading = require_text(&document, APP_NAME, url)?;

    Ok(AppPage {
        title: page_title(&document),
        name: heading.replacen(APP_NAME_SUFFIX, "", 1).trim().to_string(),
        description: select_attribute(&document, META_DESCRIPTION, "content")?
            .unwrap_or_default(),
    })
}

pub fn strip_markup(text: &str) -> String {
    MARKUP_RE.replace_all(text.trim(), "").into_owned()
}

fn connector(
    identity: &IntegrationIdentity,
    kind: ConnectorType,
    operation: &Operation,
) -> ConnectorRecord {
    let description = strip_markup(&operation.description);

    identity.connector(
        kind,
        strip_markup(&operation.title),
        Some(description).filter(|d| !d.is_empty()),
    )
}

fn template_record(template: WorkatoTemplate) -> TemplateRecord {
    let mut record = TemplateRecord::new(
        Service::Workato,
        template.name.trim().to_string(),
        template.user_id,
        &template.applications,
    );
    record.description = template.description.map(|d| d.trim().to_string());
    record.count = template.copy_count;
    record
}
