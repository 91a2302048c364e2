use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_aux::field_attributes::deserialize_default_from_null;
use serde_json::Value;

use crate::configuration::SourceSettings;

use super::CrawlError;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Operation {
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AdapterOperations {
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub triggers: Vec<Operation>,
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub actions: Vec<Operation>,
}

// Keyed by the URL path segment of each integration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct WorkatoAdapters(HashMap<String, AdapterOperations>);

impl WorkatoAdapters {
    pub fn operations(&self, segment: &str) -> Option<&AdapterOperations> {
        self.0.get(segment)
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(String, AdapterOperations)> for WorkatoAdapters {
    fn from_iter<I: IntoIterator<Item = (String, AdapterOperations)>>(iter: I) -> Self {
        WorkatoAdapters(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PowerAutomateIcon {
    #[serde(rename = "Name")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PowerAutomateTemplate {
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Author", default)]
    pub author: Option<String>,
    #[serde(rename = "TemplateType", default)]
    pub template_type: Option<String>,
    #[serde(
        rename = "UsageCount",
        default,
        deserialize_with = "deserialize_default_from_null"
    )]
    pub usage_count: u64,
    #[serde(
        rename = "Icons",
        default,
        deserialize_with = "deserialize_default_from_null"
    )]
    pub icons: Vec<PowerAutomateIcon>,
}

#[derive(Deserialize)]
struct PowerAutomateTemplates {
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    value: Vec<PowerAutomateTemplate>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WorkatoTemplate {
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_user_id")]
    pub user_id: String,
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub copy_count: u64,
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub applications: Vec<String>,
}

// Null or missing authors become empty cells.
fn deserialize_user_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let user_id = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    Ok(user_id)
}

#[derive(Deserialize)]
struct WorkatoTemplates {
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    items: Vec<WorkatoTemplate>,
}

#[async_trait]
pub trait CompanionApi: Send + Sync {
    async fn power_automate_templates(
        &self,
        connector: &str,
    ) -> Result<Vec<PowerAutomateTemplate>, CrawlError>;

    async fn workato_templates(&self, app_name: &str) -> Result<Vec<WorkatoTemplate>, CrawlError>;
}

pub struct CompanionClient {
    client: Client,
    workato_adapters_url: String,
    power_automate_templates_url: String,
    workato_templates_url: String,
    workato_templates_per_page: u32,
}

#[derive(Serialize)]
struct PowerAutomateQuery {
    #[serde(rename = "connectorName")]
    connector_name: String,
}

#[derive(Serialize)]
struct WorkatoSearchQuery {
    page: u32,
    per_page: u32,
    context: &'static str,
    context_id: String,
}

impl CompanionClient {
    pub fn new(settings: &SourceSettings) -> Result<Self, CrawlError> {
        let client = Client::builder()
            .user_agent(fake_user_agent::get_rua())
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(CompanionClient {
            client,
            workato_adapters_url: settings.workato_adapters_url.clone(),
            power_automate_templates_url: settings.power_automate_templates_url.clone(),
            workato_templates_url: settings.workato_templates_url.clone(),
            workato_templates_per_page: settings.workato_templates_per_page,
        })
    }

    pub async fn fetch_workato_adapters(&self) -> Result<WorkatoAdapters, CrawlError> {
        let adapters = self
            .client
            .get(&self.workato_adapters_url)
            .send()
            .await?
            .error_for_status()?
            .json::<WorkatoAdapters>()
            .await?;

        log::info!("Fetched {} workato adapters", adapters.len());
        Ok(adapters)
    }
}

#[async_trait]
impl CompanionApi for CompanionClient {
    async fn power_automate_templates(
        &self,
        connector: &str,
    ) -> Result<Vec<PowerAutomateTemplate>, CrawlError> {
        let response = self
            .client
            .get(&self.power_automate_templates_url)
            .query(&PowerAutomateQuery {
                connector_name: format!("shared_{}", connector),
            })
            .send()
            .await?
            .error_for_status()?
            .json::<PowerAutomateTemplates>()
            .await?;

        Ok(response.value)
    }

    async fn workato_templates(&self, app_name: &str) -> Result<Vec<WorkatoTemplate>, CrawlError> {
        let response = self
            .client
            .get(&self.workato_templates_url)
            .query(&WorkatoSearchQuery {
                page: 1,
                per_page: self.workato_templates_per_page,
                context: "search_flows",
                context_id: format!(r#"app:"{}""#, app_name),
            })
            .send()
            .await?
            .error_for_status()?
            .json::<WorkatoTemplates>()
            .await?;

        Ok(response.items)
    }
}
