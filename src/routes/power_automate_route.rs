use scraper::{ElementRef, Html};

use crate::{
    domain::{
        name::normalize_name,
        records::{ConnectorType, IntegrationIdentity, Service, TemplateRecord},
        request::last_path_segment,
    },
    services::{
        page_title, parse_selector, require_text, select_first_text, CrawlError, Page,
        PowerAutomateTemplate,
    },
};

use super::{PageBatch, RouteContext};

const CONNECTOR_NAME: &str = "h1";
const SUMMARY: &str = r#"div[class="summary"]"#;
const SECTION_HEADINGS: &str = r#"div[data-heading-level="h2"]"#;
const TIER_TABLES: &str = "table[aria-label]";
const TIER_CELL_INDEX: usize = 4;

#[derive(Debug, PartialEq)]
struct OperationRow {
    title: String,
    description: Option<String>,
}

struct ConnectorPage {
    title: String,
    name: String,
    tier: Option<String>,
    summary: String,
    actions: Vec<OperationRow>,
    triggers: Vec<OperationRow>,
}

pub async fn extract(page: &dyn Page, ctx: &RouteContext) -> Result<PageBatch, CrawlError> {
    let connector = read_connector_page(&page.source().await?, page.url())?;
    log::info!("{} {}", connector.title, page.url());

    let mut identity = IntegrationIdentity::new(Service::PowerAutomate, &connector.name);
    if connector.tier.as_deref() == Some("Premium") {
        identity.annotate("Premium");
    }
    identity.is_premium = identity.name.contains("Premium");

    let mut batch = PageBatch {
        services: vec![identity.integration(Vec::new(), connector.summary, page.url())],
        ..PageBatch::default()
    };

    log::info!(
        "{} num_actions: {} num_triggers: {}",
        identity.name,
        connector.actions.len(),
        connector.triggers.len()
    );
    let actions = connector
        .actions
        .into_iter()
        .map(|row| identity.connector(ConnectorType::Steps, row.title, row.description));
    let triggers = connector
        .triggers
        .into_iter()
        .map(|row| identity.connector(ConnectorType::Triggers, row.title, row.description));
    batch.connectors = actions.chain(triggers).collect();

    let Some(segment) = last_path_segment(page.url()) else {
        log::warn!("No connector segment in {}", page.url());
        return Ok(batch);
    };
    match ctx.companion.power_automate_templates(&segment).await {
        Ok(templates) => {
            batch.templates = templates.into_iter().map(template_record).collect();
            log::info!("{} num_templates: {}", identity.name, batch.templates.len());
        }
        Err(e) => log::error!("Skipping templates for {}: {}", page.url(), e),
    }

    Ok(batch)
}

fn read_connector_page(source: &str, url: &str) -> Result<ConnectorPage, CrawlError> {
    let document = Html::parse_document(source);
    let name = require_text(&document, CONNECTOR_NAME, url)?;

    Ok(ConnectorPage {
        title: page_title(&document),
        tier: read_tier(&document, &name)?,
        summary: select_first_text(&document, SUMMARY)?.unwrap_or_default(),
        actions: read_section(&document, "Actions")?,
        triggers: read_section(&document, "Triggers")?,
        name,
    })
}

fn read_tier(document: &Html, name: &str) -> Result<Option<String>, CrawlError> {
    let tables = parse_selector(TIER_TABLES)?;
    let cells = parse_selector("td")?;

    Ok(document
        .select(&tables)
        .find(|table| table.value().attr("aria-label") == Some(name))
        .and_then(|table| table.select(&cells).nth(TIER_CELL_INDEX))
        .map(|cell| cell.text().collect::<String>().trim().to_string()))
}

fn read_section(document: &Html, heading: &str) -> Result<Vec<OperationRow>, CrawlError> {
    let headings = parse_selector(SECTION_HEADINGS)?;
    let rows = parse_selector("tbody tr")?;

    let table = document
        .select(&headings)
        .find(|element| element.text().collect::<String>().trim() == heading)
        .and_then(|element| element.next_siblings().find_map(ElementRef::wrap))
        .filter(|sibling| sibling.value().name() == "table");

    let Some(table) = table else {
        return Ok(Vec::new());
    };

    Ok(table.select(&rows).filter_map(operation_row).collect())
}

fn operation_row(row: ElementRef) -> Option<OperationRow> {
    let mut lines = row
        .children()
        .filter_map(ElementRef::wrap)
        .flat_map(|cell| {
            cell.text()
                .collect::<String>()
                .split('\n')
                .map(|line| line.trim().to_string())
                .filter(|line| !line.is_empty())
                .collect::<Vec<String>>()
        });

    Some(OperationRow {
        title: lines.next()?,
        description: lines.next(),
    })
}

fn template_record(template: PowerAutomateTemplate) -> TemplateRecord {
    let trimmed = |field: Option<String>| field.map(|value| value.trim().to_string());

    TemplateRecord {
        service: Service::PowerAutomate,
        title: trimmed(template.title).unwrap_or_default(),
        description: trimmed(template.description),
        author: trimmed(template.author).unwrap_or_default(),
        kind: trimmed(template.template_type),
        count: template.usage_count,
        integrations: template
            .icons
            .into_iter()
            .filter_map(|icon| icon.name)
            .map(|name| normalize_name(&name))
            .collect(),
    }
}
