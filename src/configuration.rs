use std::time::Duration;

use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub webdriver: WebdriverSettings,
    pub crawler: CrawlerSettings,
    pub pagination: PaginationSettings,
    pub sources: SourceSettings,
    pub output: OutputSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct WebdriverSettings {
    pub url: String,
    pub headless: bool,
    pub proxy: Option<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub window_width: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub window_height: u32,
}

#[derive(Deserialize, Clone, Debug)]
pub struct CrawlerSettings {
    pub start_urls: Vec<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_concurrency: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_request_retries: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub navigation_timeout_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub request_handler_timeout_secs: u64,
}

impl CrawlerSettings {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn request_handler_timeout(&self) -> Duration {
        Duration::from_secs(self.request_handler_timeout_secs)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct PaginationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub zapier_catalog_clicks: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub zapier_template_pages: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub trigger_action_safety_cap: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub control_wait_millis: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub catalog_wait_millis: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub settle_millis: u64,
}

impl PaginationSettings {
    pub fn control_wait(&self) -> Duration {
        Duration::from_millis(self.control_wait_millis)
    }

    pub fn catalog_wait(&self) -> Duration {
        Duration::from_millis(self.catalog_wait_millis)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_millis)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct SourceSettings {
    pub workato_adapters_url: String,
    pub power_automate_templates_url: String,
    pub workato_templates_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub workato_templates_per_page: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub request_timeout_secs: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct OutputSettings {
    pub directory: String,
    pub service_dataset: String,
    pub templates_dataset: String,
    pub connectors_dataset: String,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .expect("Failed to parse APP_ENVIRONMENT.");
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // APP_CRAWLER__MAX_CONCURRENCY=4 sets crawler.max_concurrency
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

#[derive(Debug, PartialEq)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Environment, Settings};

    #[test]
    fn environment_parses_case_insensitively() {
        assert_eq!(
            Environment::try_from("Production".to_string()),
            Ok(Environment::Production)
        );
        assert!(Environment::try_from("staging".to_string()).is_err());
    }

    #[test]
    fn base_configuration_deserializes() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../configuration/base.yaml"),
                config::FileFormat::Yaml,
            ))
            .build()
            .unwrap()
            .try_deserialize::<Settings>()
            .unwrap();

        assert_eq!(settings.crawler.start_urls.len(), 3);
        assert_eq!(settings.pagination.zapier_template_pages, 3);
        assert_eq!(settings.pagination.zapier_catalog_clicks, 41);
        assert_eq!(settings.output.connectors_dataset, "triggers_actions");
    }
}
