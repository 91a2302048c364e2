use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::{
    configuration::OutputSettings,
    domain::records::{ConnectorRecord, IntegrationRecord, TemplateRecord},
    routes::PageBatch,
};

pub trait DatasetRecord: Serialize {
    const COLUMNS: &'static [&'static str];
}

impl DatasetRecord for IntegrationRecord {
    const COLUMNS: &'static [&'static str] = &[
        "partner",
        "normalized_name",
        "service",
        "is_builtin",
        "is_premium",
        "name",
        "categories",
        "description",
        "url",
    ];
}

impl DatasetRecord for ConnectorRecord {
    const COLUMNS: &'static [&'static str] = &[
        "partner",
        "normalized_name",
        "service",
        "is_builtin",
        "is_premium",
        "name",
        "type",
        "title",
        "description",
    ];
}

impl DatasetRecord for TemplateRecord {
    const COLUMNS: &'static [&'static str] = &[
        "service",
        "title",
        "description",
        "author",
        "type",
        "count",
        "integrations",
    ];
}

pub struct Dataset<T> {
    name: String,
    records: Mutex<Vec<T>>,
}

impl<T: DatasetRecord + Clone> Dataset<T> {
    pub fn open(name: &str) -> Self {
        Dataset {
            name: name.to_string(),
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, record: T) {
        self.lock().push(record);
    }

    pub fn push_all(&self, records: impl IntoIterator<Item = T>) {
        self.lock().extend(records);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn records(&self) -> Vec<T> {
        self.lock().clone()
    }

    pub fn export_to_csv(&self, directory: &Path) -> Result<PathBuf> {
        fs::create_dir_all(directory)
            .with_context(|| format!("Failed to create {}", directory.display()))?;
        let path = directory.join(format!("{}.csv", self.name));
        let file =
            File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;

        self.write_csv(file)?;
        log::info!("Exported {} rows to {}", self.len(), path.display());
        Ok(path)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(T::COLUMNS)?;

        for record in self.lock().iter() {
            let value = serde_json::to_value(record)?;
            let row: Vec<String> = T::COLUMNS
                .iter()
                .map(|column| csv_cell(value.get(*column)))
                .collect();
            writer.write_record(&row)?;
        }

        writer.flush()?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn csv_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub struct Datasets {
    pub service: Dataset<IntegrationRecord>,
    pub templates: Dataset<TemplateRecord>,
    pub connectors: Dataset<ConnectorRecord>,
}

impl Datasets {
    pub fn open(settings: &OutputSettings) -> Self {
        Datasets {
            service: Dataset::open(&settings.service_dataset),
            templates: Dataset::open(&settings.templates_dataset),
            connectors: Dataset::open(&settings.connectors_dataset),
        }
    }

    /// Pushes one page's records: the integration before its connectors,
    /// then the templates.
    pub fn commit(&self, batch: PageBatch) {
        self.service.push_all(batch.services);
        self.connectors.push_all(batch.connectors);
        self.templates.push_all(batch.templates);
    }

    pub fn export_all(&self, directory: &Path) -> Result<Vec<PathBuf>> {
        Ok(vec![
            self.service.export_to_csv(directory)?,
            self.templates.export_to_csv(directory)?,
            self.connectors.export_to_csv(directory)?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;
    use crate::domain::records::{ConnectorType, IntegrationIdentity, Service};

    fn output_settings() -> OutputSettings {
        OutputSettings {
            directory: "unused".to_string(),
            service_dataset: "integrations".to_string(),
            templates_dataset: "templates".to_string(),
            connectors_dataset: "triggers_actions".to_string(),
        }
    }

    fn csv_lines<T: DatasetRecord + Clone>(dataset: &Dataset<T>) -> Vec<String> {
        let mut buffer = Vec::new();
        dataset.write_csv(&mut buffer).unwrap();
        String::from_utf8(buffer)
            .unwrap()
            .lines()
            .map(|line| line.to_string())
            .collect()
    }

    #[test]
    fn integration_csv_follows_record_field_order() {
        let dataset = Dataset::open("integrations");
        let mut identity = IntegrationIdentity::new(Service::Zapier, "Salesforce");
        identity.is_premium = true;
        dataset.push(identity.integration(
            vec!["CRM".to_string(), "Sales".to_string()],
            "Cloud CRM".to_string(),
            "https://zapier.com/apps/salesforce/integrations",
        ));

        let lines = csv_lines(&dataset);

        assert_eq!(
            lines[0],
            "partner,normalized_name,service,is_builtin,is_premium,name,categories,description,url"
        );
        assert_eq!(
            lines[1],
            r#"salesforce,salesforce,zapier,false,true,Salesforce,"[""CRM"",""Sales""]",Cloud CRM,https://zapier.com/apps/salesforce/integrations"#
        );
    }

    #[test]
    fn null_descriptions_are_empty_cells() {
        let dataset = Dataset::open("triggers_actions");
        let identity = IntegrationIdentity::new(Service::Zapier, "Slack");
        dataset.push(identity.connector(ConnectorType::Triggers, "New Message".to_string(), None));

        let lines = csv_lines(&dataset);

        assert_eq!(lines[1], "slack,slack,zapier,false,false,Slack,triggers,New Message,");
    }

    #[test]
    fn empty_dataset_still_has_a_header() {
        let dataset: Dataset<TemplateRecord> = Dataset::open("templates");

        assert_eq!(
            csv_lines(&dataset),
            vec!["service,title,description,author,type,count,integrations"]
        );
    }

    #[test]
    fn commit_keeps_integration_ahead_of_connectors() {
        let datasets = Datasets::open(&output_settings());
        let identity = IntegrationIdentity::new(Service::Workato, "Jira");
        let batch = PageBatch {
            services: vec![identity.integration(vec![], String::new(), "https://www.workato.com/integrations/jira")],
            connectors: vec![
                identity.connector(ConnectorType::Triggers, "New issue".to_string(), None),
                identity.connector(ConnectorType::Steps, "Create issue".to_string(), None),
            ],
            templates: vec![],
        };

        datasets.commit(batch);

        assert_eq!(datasets.service.len(), 1);
        assert_eq!(datasets.connectors.records()[1].title, "Create issue");
        assert!(datasets.templates.is_empty());
    }

    #[test]
    fn concurrent_pushes_are_all_kept() {
        let dataset = Arc::new(Dataset::open("triggers_actions"));
        let identity = IntegrationIdentity::new(Service::Zapier, "Slack");

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let dataset = dataset.clone();
                let identity = identity.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        dataset.push(identity.connector(
                            ConnectorType::Steps,
                            format!("{worker}-{i}"),
                            None,
                        ));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(dataset.len(), 400);
    }

    #[test]
    fn exports_one_file_per_dataset() {
        let directory = std::env::temp_dir().join(format!("audit-export-{}", std::process::id()));
        let datasets = Datasets::open(&output_settings());

        let paths = datasets.export_all(&directory).unwrap();

        let names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["integrations.csv", "templates.csv", "triggers_actions.csv"]);
        fs::remove_dir_all(directory).unwrap();
    }
}
