use std::time::Duration;

use super::{CrawlError, Page};

#[derive(Debug, Clone, Copy)]
pub struct LoadMore<'a> {
    pub control: &'a str,
    pub max_clicks: usize,
    pub wait: Duration,
}

pub async fn drain_load_more(page: &dyn Page, load_more: LoadMore<'_>) -> Result<usize, CrawlError> {
    let mut clicks = 0;

    while clicks < load_more.max_clicks {
        if !page.wait_for_visible(load_more.control, load_more.wait).await? {
            break;
        }
        if !page.click(load_more.control).await? {
            break;
        }
        page.settle().await;
        clicks += 1;
    }

    if clicks == load_more.max_clicks && page.is_visible(load_more.control).await? {
        log::debug!(
            "Stopped after {} clicks on {} with more results left on {}",
            clicks,
            load_more.control,
            page.url()
        );
    }

    Ok(clicks)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{drain_load_more, LoadMore};
    use crate::test_utils::FakePage;

    const CONTROL: &str = "div.loadMore button";

    fn list(items: usize, more: bool) -> String {
        let rows: String = (0..items).map(|i| format!("<li>item {i}</li>")).collect();
        let control = if more {
            r#"<div class="loadMore"><button>Load more</button></div>"#
        } else {
            ""
        };
        format!("<html><body><ul>{rows}</ul>{control}</body></html>")
    }

    fn load_more(max_clicks: usize) -> LoadMore<'static> {
        LoadMore {
            control: CONTROL,
            max_clicks,
            wait: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn stops_when_control_disappears() {
        let page = FakePage::new("https://zapier.com/apps/slack/integrations", list(2, true))
            .on_click(CONTROL, list(4, true))
            .on_click(CONTROL, list(6, false));

        let clicks = drain_load_more(&page, load_more(100)).await.unwrap();

        assert_eq!(clicks, 2);
        assert!(page.current_source().contains("item 5"));
    }

    #[tokio::test]
    async fn stops_at_the_cap() {
        let mut page = FakePage::new("https://zapier.com/apps/slack/integrations", list(1, true));
        for i in 2..10 {
            page = page.on_click(CONTROL, list(i, true));
        }

        let clicks = drain_load_more(&page, load_more(3)).await.unwrap();

        assert_eq!(clicks, 3);
        assert_eq!(page.clicks(CONTROL), 3);
        assert!(page.current_source().contains("item 3"));
        assert!(!page.current_source().contains("item 4"));
    }

    #[tokio::test]
    async fn no_control_means_no_clicks() {
        let page = FakePage::new("https://zapier.com/apps/slack/integrations", list(3, false));

        assert_eq!(drain_load_more(&page, load_more(3)).await.unwrap(), 0);
    }
}
