use std::fmt;

use serde::Serialize;

use super::{conglomerate::resolve_parent, name::normalize_name};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Service {
    #[serde(rename = "zapier")]
    Zapier,
    #[serde(rename = "power-automate")]
    PowerAutomate,
    #[serde(rename = "workato")]
    Workato,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Zapier => "zapier",
            Service::PowerAutomate => "power-automate",
            Service::Workato => "workato",
        }
    }

    pub fn from_url(url: &str) -> Option<Service> {
        let parsed = url::Url::parse(url).ok()?;
        let host = parsed.host_str()?;

        match host {
            h if h == "zapier.com" || h.ends_with(".zapier.com") => Some(Service::Zapier),
            "learn.microsoft.com" | "powerautomate.microsoft.com" => Some(Service::PowerAutomate),
            h if h == "workato.com" || h.ends_with(".workato.com") => Some(Service::Workato),
            _ => None,
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectorType {
    #[serde(rename = "triggers")]
    Triggers,
    #[serde(rename = "steps")]
    Steps,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegrationRecord {
    pub partner: String,
    pub normalized_name: String,
    pub service: Service,
    pub is_builtin: bool,
    pub is_premium: bool,
    pub name: String,
    pub categories: Vec<String>,
    pub description: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorRecord {
    pub partner: String,
    pub normalized_name: String,
    pub service: Service,
    pub is_builtin: bool,
    pub is_premium: bool,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ConnectorType,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateRecord {
    pub service: Service,
    pub title: String,
    pub description: Option<String>,
    pub author: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub count: u64,
    pub integrations: Vec<String>,
}

impl TemplateRecord {
    pub fn new<I, S>(service: Service, title: String, author: String, apps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        TemplateRecord {
            service,
            title,
            description: None,
            author,
            kind: None,
            count: 0,
            integrations: apps
                .into_iter()
                .map(|app| normalize_name(app.as_ref()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationIdentity {
    pub partner: String,
    pub normalized_name: String,
    pub service: Service,
    pub is_builtin: bool,
    pub is_premium: bool,
    pub name: String,
}

impl IntegrationIdentity {
    pub fn new(service: Service, raw_name: &str) -> Self {
        let raw_name = raw_name.trim();
        let normalized_name = match normalize_name(raw_name) {
            n if n.is_empty() => raw_name.to_lowercase(),
            n => n,
        };
        let partner = match resolve_parent(raw_name) {
            p if p.is_empty() => normalized_name.clone(),
            p => p,
        };

        IntegrationIdentity {
            partner,
            normalized_name,
            service,
            is_builtin: false,
            is_premium: false,
            name: raw_name.to_string(),
        }
    }

    pub fn annotate(&mut self, tag: &str) {
        self.name = format!("{} ({})", self.name, tag);
    }

    pub fn integration(
        &self,
        categories: Vec<String>,
        description: String,
        url: &str,
    ) -> IntegrationRecord {
        IntegrationRecord {
            partner: self.partner.clone(),
            normalized_name: self.normalized_name.clone(),
            service: self.service,
            is_builtin: self.is_builtin,
            is_premium: self.is_premium,
            name: self.name.clone(),
            categories,
            description,
            url: url.to_string(),
        }
    }

    pub fn connector(
        &self,
        kind: ConnectorType,
        title: String,
        description: Option<String>,
    ) -> ConnectorRecord {
        ConnectorRecord {
            partner: self.partner.clone(),
            normalized_name: self.normalized_name.clone(),
            service: self.service,
            is_builtin: self.is_builtin,
            is_premium: self.is_premium,
            name: self.name.clone(),
            kind,
            title,
            description,
        }
    }
}
