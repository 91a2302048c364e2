use scraper::Html;

use crate::{
    domain::records::{ConnectorType, IntegrationIdentity, Service, TemplateRecord},
    services::{
        drain_load_more, element_text, parse_selector, require_text, select_first_text,
        select_texts, CrawlError, LoadMore, Page,
    },
};

use super::{PageBatch, RouteContext};

const APP_NAME: &str = r#"h1[class$="Heading-AppHeader__appNames"]"#;
const APP_TAG: &str = r#"[data-testid="explore-app-header__tags"]"#;
const APP_CATEGORIES: &str = r#"span[data-testid="v3-app-container__categories"] a"#;
const APP_DESCRIPTION: &str = r#"div[class$="-AppDetails__appDescription"]"#;

const TEMPLATE_LOAD_MORE: &str = r#"div[class$="-ZapTemplateList__loadMore"] button"#;
const TEMPLATE_CARD: &str = r#"div[data-testid="ZapCard__inner"]"#;
const TEMPLATE_TITLE: &str = "h1";
const TEMPLATE_APPS: &str = r#"div[class$="-ZapCard__metaInfoArea"]"#;
const TEMPLATE_APPS_DELIMITER: &str = " + ";

const TRIGGERS_TAB: &str = r#"button[aria-label="Triggers"]"#;
const ACTIONS_TAB: &str = r#"button[aria-label="Actions"]"#;
const CONNECTOR_LOAD_MORE: &str = r#"div[class$="TriggerActionList__loadMore"] button"#;
const CONNECTOR_TITLES: &str = r#"div[class$="-TriggerActionList__appActionGrid"] h2"#;

struct AppDetails {
    name: String,
    tag: Option<String>,
    categories: Vec<String>,
    description: String,
}

pub async fn extract(page: &dyn Page, ctx: &RouteContext) -> Result<PageBatch, CrawlError> {
    let details = read_app_details(&page.source().await?, page.url())?;

    let mut identity = IntegrationIdentity::new(Service::Zapier, &details.name);
    identity.is_builtin = details.name.contains("Zapier");
    match &details.tag {
        Some(tag) => identity.annotate(tag),
        None => log::debug!("No tag on {}", page.url()),
    }
    identity.is_premium = identity.name.contains("Premium");
    log::info!("{} {}", identity.name, page.url());

    drain_load_more(
        page,
        LoadMore {
            control: TEMPLATE_LOAD_MORE,
            max_clicks: ctx.pagination.zapier_template_pages,
            wait: ctx.pagination.control_wait(),
        },
    )
    .await?;
    let templates = read_templates(&page.source().await?)?;
    log::info!("{} num_templates: {}", identity.name, templates.len());

    let triggers = read_connector_tab(page, ctx, TRIGGERS_TAB).await?;
    log::info!("{} num_triggers: {}", identity.name, triggers.len());
    let actions = read_connector_tab(page, ctx, ACTIONS_TAB).await?;
    log::info!("{} num_actions: {}", identity.name, actions.len());

    let connectors = triggers
        .into_iter()
        .map(|title| identity.connector(ConnectorType::Triggers, title, None))
        .chain(
            actions
                .into_iter()
                .map(|title| identity.connector(ConnectorType::Steps, title, None)),
        )
        .collect();

    Ok(PageBatch {
        services: vec![identity.integration(details.categories, details.description, page.url())],
        connectors,
        templates,
    })
}

fn read_app_details(source: &str, url: &str) -> Result<AppDetails, CrawlError> {
    let document = Html::parse_document(source);

    Ok(AppDetails {
        name: require_text(&document, APP_NAME, url)?,
        tag: select_first_text(&document, APP_TAG)?,
        categories: select_texts(&document, APP_CATEGORIES)?,
        description: require_text(&document, APP_DESCRIPTION, url)?,
    })
}

fn read_templates(source: &str) -> Result<Vec<TemplateRecord>, CrawlError> {
    let document = Html::parse_document(source);
    let card_selector = parse_selector(TEMPLATE_CARD)?;
    let title_selector = parse_selector(TEMPLATE_TITLE)?;
    let apps_selector = parse_selector(TEMPLATE_APPS)?;

    let templates = document
        .select(&card_selector)
        .filter_map(|card| {
            let title = card
                .select(&title_selector)
                .next()
                .map(element_text)
                .filter(|title| !title.is_empty())?;
            let apps = card
                .select(&apps_selector)
                .next()
                .map(element_text)
                .unwrap_or_default();

            Some(TemplateRecord::new(
                Service::Zapier,
                title,
                "Zapier".to_string(),
                apps.split(TEMPLATE_APPS_DELIMITER)
                    .filter(|app| !app.trim().is_empty()),
            ))
        })
        .collect();

    Ok(templates)
}

async fn read_connector_tab(
    page: &dyn Page,
    ctx: &RouteContext,
    tab: &str,
) -> Result<Vec<String>, CrawlError> {
    if !page.click(tab).await? {
        log::debug!("No {} tab on {}", tab, page.url());
        return Ok(Vec::new());
    }
    page.settle().await;

    drain_load_more(
        page,
        LoadMore {
            control: CONNECTOR_LOAD_MORE,
            max_clicks: ctx.pagination.trigger_action_safety_cap,
            wait: ctx.pagination.control_wait(),
        },
    )
    .await?;

    let source = page.source().await?;
    select_texts(&Html::parse_document(&source), CONNECTOR_TITLES)
}
