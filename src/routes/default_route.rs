use itertools::Itertools;
use scraper::Html;
use url::Url;

use crate::{
    domain::{
        records::Service,
        request::{Label, Request},
    },
    services::{drain_load_more, parse_selector, CrawlError, LoadMore, Page},
};

use super::RouteContext;

const PA_CONNECTOR_LINKS: &str = r#"table[aria-label="Table 1"] a"#;
const ZAPIER_CATALOG_LOAD_MORE: &str = r#"div[class$="-CategoryAppTable__loadMore"] button"#;
const ZAPIER_APP_CARD_LINKS: &str = r#"a[data-testid="category-app-card--item"]"#;
const ZAPIER_APP_ROW_LINKS: &str = r#"a[data-testid="category-app-row--item"]"#;
const WORKATO_ADAPTER_LINKS: &str = r#"a[class="adapter-list__item-link"]"#;

pub const ZAPIER_PREMIUM_APPS: [&str; 58] = [
    "https://zapier.com/apps/webhook/integrations",
    "https://zapier.com/apps/facebook-lead-ads/integrations",
    "https://zapier.com/apps/salesforce/integrations",
    "https://zapier.com/apps/twitter/integrations",
    "https://zapier.com/apps/shopify/integrations",
    "https://zapier.com/apps/quickbooks/integrations",
    "https://zapier.com/apps/zoho-crm/integrations",
    "https://zapier.com/apps/linkedin-ads/integrations",
    "https://zapier.com/apps/zendesk/integrations",
    "https://zapier.com/apps/xero/integrations",
    "https://zapier.com/apps/keap-max-classic/integrations",
    "https://zapier.com/apps/paypal/integrations",
    "https://zapier.com/apps/mysql/integrations",
    "https://zapier.com/apps/facebook-custom-audiences/integrations",
    "https://zapier.com/apps/postgresql/integrations",
    "https://zapier.com/apps/pinterest/integrations",
    "https://zapier.com/apps/sql-server/integrations",
    "https://zapier.com/apps/pardot/integrations",
    "https://zapier.com/apps/bamboohr/integrations",
    "https://zapier.com/apps/amazon-s3/integrations",
    "https://zapier.com/apps/microsoft-dynamics-crm/integrations",
    "https://zapier.com/apps/marketo/integrations",
    "https://zapier.com/apps/gotowebinar/integrations",
    "https://zapier.com/apps/google-bigquery/integrations",
    "https://zapier.com/apps/amazon-seller-central/integrations",
    "https://zapier.com/apps/quickbase/integrations",
    "https://zapier.com/apps/bigcommerce/integrations",
    "https://zapier.com/apps/magento-v2/integrations",
    "https://zapier.com/apps/google-groups/integrations",
    "https://zapier.com/apps/aws-lambda/integrations",
    "https://zapier.com/apps/ai/integrations",
    "https://zapier.com/apps/sharepoint/integrations",
    "https://zapier.com/apps/amazon-sns/integrations",
    "https://zapier.com/apps/sugarcrm7/integrations",
    "https://zapier.com/apps/chargify/integrations",
    "https://zapier.com/apps/amazon-ses/integrations",
    "https://zapier.com/apps/instagram-lead-ads/integrations",
    "https://zapier.com/apps/greenhouse/integrations",
    "https://zapier.com/apps/amazon-sqs/integrations",
    "https://zapier.com/apps/sugarcrm/integrations",
    "https://zapier.com/apps/magento/integrations",
    "https://zapier.com/apps/snowflake/integrations",
    "https://zapier.com/apps/servicenow/integrations",
    "https://zapier.com/apps/dynamodb/integrations",
    "https://zapier.com/apps/expensify/integrations",
    "https://zapier.com/apps/solve360/integrations",
    "https://zapier.com/apps/evernote-business/integrations",
    "https://zapier.com/apps/moodle/integrations",
    "https://zapier.com/apps/amazon-cloudwatch/integrations",
    "https://zapier.com/apps/amazon-ec2/integrations",
    "https://zapier.com/apps/whmcs/integrations",
    "https://zapier.com/apps/upwork/integrations",
    "https://zapier.com/apps/amazon-polly/integrations",
    "https://zapier.com/apps/namely/integrations",
    "https://zapier.com/apps/call-drip/integrations",
    "https://zapier.com/apps/amazon-redshift/integrations",
    "https://zapier.com/apps/azure-active-directory/integrations",
    "https://zapier.com/apps/instagram-custom-audiences/integrations",
];

pub async fn discover(page: &dyn Page, ctx: &RouteContext) -> Result<Vec<Request>, CrawlError> {
    log::info!("Enqueueing new URLs from {}", page.url());

    let requests = match Service::from_url(page.url()) {
        Some(Service::PowerAutomate) => {
            let source = page.source().await?;
            discover_links(&source, page.url(), &[PA_CONNECTOR_LINKS], Label::PaDetail)?
        }
        Some(Service::Zapier) => discover_zapier(page, ctx).await?,
        Some(Service::Workato) => {
            let source = page.source().await?;
            discover_links(&source, page.url(), &[WORKATO_ADAPTER_LINKS], Label::Workato)?
        }
        None => {
            log::warn!("No catalog handler for {}", page.url());
            Vec::new()
        }
    };

    log::info!("Discovered {} URLs on {}", requests.len(), page.url());
    Ok(requests)
}

async fn discover_zapier(page: &dyn Page, ctx: &RouteContext) -> Result<Vec<Request>, CrawlError> {
    let mut requests: Vec<Request> = ZAPIER_PREMIUM_APPS
        .iter()
        .map(|url| Request::new(*url, Label::Zapier))
        .collect();

    let clicks = drain_load_more(
        page,
        LoadMore {
            control: ZAPIER_CATALOG_LOAD_MORE,
            max_clicks: ctx.pagination.zapier_catalog_clicks,
            wait: ctx.pagination.catalog_wait(),
        },
    )
    .await?;
    log::info!("Expanded the zapier catalog {} times", clicks);

    let source = page.source().await?;
    requests.extend(discover_links(
        &source,
        page.url(),
        &[ZAPIER_APP_CARD_LINKS, ZAPIER_APP_ROW_LINKS],
        Label::Zapier,
    )?);

    Ok(requests)
}

fn discover_links(
    source: &str,
    page_url: &str,
    selectors: &[&str],
    label: Label,
) -> Result<Vec<Request>, CrawlError> {
    let base = match Url::parse(page_url) {
        Ok(base) => base,
        Err(e) => {
            log::warn!("Cannot resolve links against {}: {}", page_url, e);
            return Ok(Vec::new());
        }
    };
    let document = Html::parse_document(source);

    let mut urls = Vec::new();
    for selector in selectors {
        let selector = parse_selector(selector)?;
        urls.extend(
            document
                .select(&selector)
                .filter_map(|anchor| anchor.value().attr("href"))
                .filter_map(|href| base.join(href.trim()).ok())
                .filter(|url| matches!(url.scheme(), "http" | "https"))
                .filter(|url| url.host_str() == base.host_str())
                .map(|mut url| {
                    url.set_fragment(None);
                    url.to_string()
                }),
        );
    }

    Ok(urls
        .into_iter()
        .unique()
        .map(|url| Request::new(url, label))
        .collect())
}
