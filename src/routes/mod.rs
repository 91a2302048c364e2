use std::sync::Arc;

use crate::{
    configuration::PaginationSettings,
    domain::{
        records::{ConnectorRecord, IntegrationRecord, TemplateRecord},
        request::{Label, Request},
    },
    services::{CompanionApi, CrawlError, Page, WorkatoAdapters},
};

pub mod default_route;
pub mod power_automate_route;
pub mod workato_route;
pub mod zapier_route;

#[derive(Clone)]
pub struct RouteContext {
    pub pagination: PaginationSettings,
    pub adapters: Arc<WorkatoAdapters>,
    pub companion: Arc<dyn CompanionApi>,
}

/// Records extracted from one page, committed together once the handler
/// succeeds.
#[derive(Debug, Default)]
pub struct PageBatch {
    pub services: Vec<IntegrationRecord>,
    pub connectors: Vec<ConnectorRecord>,
    pub templates: Vec<TemplateRecord>,
}

#[derive(Debug, Default)]
pub struct HandlerOutput {
    pub batch: PageBatch,
    pub enqueue: Vec<Request>,
}

impl From<PageBatch> for HandlerOutput {
    fn from(batch: PageBatch) -> Self {
        HandlerOutput {
            batch,
            enqueue: Vec::new(),
        }
    }
}

pub async fn route(
    label: Label,
    page: &dyn Page,
    ctx: &RouteContext,
) -> Result<HandlerOutput, CrawlError> {
    match label {
        Label::Default => Ok(HandlerOutput {
            batch: PageBatch::default(),
            enqueue: default_route::discover(page, ctx).await?,
        }),
        Label::Zapier => zapier_route::extract(page, ctx).await.map(HandlerOutput::from),
        Label::PaDetail => power_automate_route::extract(page, ctx)
            .await
            .map(HandlerOutput::from),
        Label::Workato => workato_route::extract(page, ctx).await.map(HandlerOutput::from),
    }
}

#[cfg(test)]
mod tests {
    use super::route;
    use crate::{
        domain::request::Label,
        services::WorkatoAdapters,
        test_utils::{route_context, FakeCompanion, FakePage},
    };

    #[tokio::test]
    async fn default_label_only_discovers_links() {
        let page = FakePage::new(
            "https://www.workato.com/integrations",
            r#"<a class="adapter-list__item-link" href="/integrations/slack">Slack</a>"#,
        );
        let ctx = route_context(FakeCompanion::default(), WorkatoAdapters::default());

        let output = route(Label::Default, &page, &ctx).await.unwrap();

        assert!(output.batch.services.is_empty());
        assert!(output.batch.connectors.is_empty());
        assert!(output.batch.templates.is_empty());
        assert_eq!(output.enqueue.len(), 1);
        assert_eq!(output.enqueue[0].label, Label::Workato);
    }

    #[tokio::test]
    async fn labeled_handlers_never_enqueue() {
        let page = FakePage::new(
            "https://www.workato.com/integrations/slack",
            r#"<h1 class="apps-page__head-title">Slack integrations and automations</h1>
               <a class="adapter-list__item-link" href="/integrations/jira">Jira</a>"#,
        );
        let ctx = route_context(FakeCompanion::default(), WorkatoAdapters::default());

        let output = route(Label::Workato, &page, &ctx).await.unwrap();

        assert!(output.enqueue.is_empty());
        assert_eq!(output.batch.services.len(), 1);
    }
}
