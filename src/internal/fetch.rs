//! Fetch policy on top of the content API: what to retrieve for a page or a topic,
//! and which comments to keep.
//!
//! Every operation is all-or-nothing. A failed request aborts the call and nothing
//! fetched before it is committed.

use thiserror::Error;

use crate::api::{ContentApi, TransportError};
use crate::internal::models::{Item, TopMenu};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to load the top stories list")]
    TopStories(#[source] TransportError),
    #[error("failed to load story {id} for page {page}")]
    PageItem {
        id: u32,
        page: usize,
        #[source]
        source: TransportError,
    },
    #[error("failed to load item {id}")]
    Topic {
        id: u32,
        #[source]
        source: TransportError,
    },
    #[error("failed to load comment {id} of item {topic}")]
    Comment {
        id: u32,
        topic: u32,
        #[source]
        source: TransportError,
    },
}

/// Whether a reply is shown under its topic.
///
/// Empty text means deleted or dead upstream; a leading `[` marks `[dead]`,
/// `[flagged]`, `[dupe]` and similar placeholders.
pub fn accepts_comment(item: &Item) -> bool {
    let text = item.raw_text();
    !text.is_empty() && !text.trim_start().starts_with('[')
}

pub struct Orchestrator<C> {
    api: C,
}

impl<C: ContentApi> Orchestrator<C> {
    pub fn new(api: C) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &C {
        &self.api
    }

    /// Fresh listing snapshot with every entry still a stub.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_top_page(&self) -> Result<TopMenu, FetchError> {
        let ids = self
            .api
            .get_top_stories()
            .await
            .map_err(FetchError::TopStories)?;
        tracing::info!(count = ids.len(), "top stories loaded");
        Ok(TopMenu::from_ids(ids))
    }

    /// Fetch every stub inside the window of `page`. Loaded entries are not re-fetched.
    #[tracing::instrument(skip(self, menu), fields(len = menu.len()))]
    pub async fn enrich_page(
        &self,
        menu: &mut TopMenu,
        page: usize,
        page_size: usize,
    ) -> Result<(), FetchError> {
        let missing = menu.missing_in_window(page, page_size);
        let mut fetched = Vec::with_capacity(missing.len());
        for (index, id) in missing {
            let item = self
                .api
                .get_item(id)
                .await
                .map_err(|source| FetchError::PageItem { id, page, source })?;
            fetched.push((index, item));
        }

        tracing::debug!(enriched = fetched.len(), "page window enriched");
        for (index, item) in fetched {
            menu.fill(index, item);
        }
        Ok(())
    }

    /// Top stories list plus the items of `page`, as one operation.
    pub async fn load_top_menu(&self, page: usize, page_size: usize) -> Result<TopMenu, FetchError> {
        let mut menu = self.fetch_top_page().await?;
        self.enrich_page(&mut menu, page, page_size).await?;
        Ok(menu)
    }

    /// Fetch `id` and up to `max_comments` accepted replies, in `kids` order.
    ///
    /// Rejected replies do not count towards the cap, so more than `max_comments`
    /// comment requests can be issued.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_topic_with_comments(
        &self,
        id: u32,
        max_comments: usize,
    ) -> Result<Item, FetchError> {
        let mut topic = self
            .api
            .get_item(id)
            .await
            .map_err(|source| FetchError::Topic { id, source })?;

        let mut children = Vec::new();
        let mut rejected = 0usize;
        for &kid in &topic.kids {
            if children.len() >= max_comments {
                break;
            }
            let comment = self
                .api
                .get_item(kid)
                .await
                .map_err(|source| FetchError::Comment {
                    id: kid,
                    topic: id,
                    source,
                })?;
            if accepts_comment(&comment) {
                children.push(comment);
            } else {
                rejected += 1;
            }
        }

        tracing::info!(accepted = children.len(), rejected, "topic loaded");
        topic.children = children;
        Ok(topic)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use super::*;
    use crate::internal::models::MenuEntry;

    #[derive(Default)]
    struct FakeApi {
        top: Vec<u32>,
        items: HashMap<u32, Item>,
        failing: HashSet<u32>,
        fail_top: bool,
        calls: Mutex<Vec<u32>>,
    }

    impl FakeApi {
        fn with_item(mut self, item: Item) -> Self {
            self.items.insert(item.id, item);
            self
        }

        fn calls(&self) -> Vec<u32> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn transport_error(id: u32) -> TransportError {
        TransportError::Status {
            url: format!("item/{id}.json"),
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    impl ContentApi for FakeApi {
        async fn get_top_stories(&self) -> Result<Vec<u32>, TransportError> {
            if self.fail_top {
                return Err(transport_error(0));
            }
            Ok(self.top.clone())
        }

        async fn get_item(&self, id: u32) -> Result<Item, TransportError> {
            self.calls.lock().unwrap().push(id);
            if self.failing.contains(&id) {
                return Err(transport_error(id));
            }
            Ok(self.items.get(&id).cloned().unwrap_or(Item {
                id,
                ..Default::default()
            }))
        }
    }

    fn story(id: u32, kids: Vec<u32>) -> Item {
        Item {
            id,
            title: Some(format!("story {id}")),
            kids,
            ..Default::default()
        }
    }

    fn comment(id: u32, text: &str) -> Item {
        Item {
            id,
            by: Some(format!("user{id}")),
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn filter_rejects_empty_and_bracketed_text() {
        assert!(accepts_comment(&comment(1, "hello")));
        assert!(accepts_comment(&comment(1, "see [1]")));
        assert!(!accepts_comment(&comment(1, "")));
        assert!(!accepts_comment(&comment(1, "[dead]")));
        assert!(!accepts_comment(&comment(1, "  [flagged]")));
        assert!(!accepts_comment(&Item::default()));
    }

    #[tokio::test]
    async fn fetch_top_page_returns_stubs_in_rank_order() {
        let api = FakeApi {
            top: vec![30, 10, 20],
            ..Default::default()
        };
        let menu = Orchestrator::new(api).fetch_top_page().await.unwrap();

        assert_eq!(menu.len(), 3);
        assert_eq!(menu.get(0), Some(&MenuEntry::Stub(30)));
        assert_eq!(menu.get(2), Some(&MenuEntry::Stub(20)));
    }

    #[tokio::test]
    async fn fetch_top_page_failure_is_reported() {
        let api = FakeApi {
            fail_top: true,
            ..Default::default()
        };
        let err = Orchestrator::new(api).fetch_top_page().await.unwrap_err();
        assert!(matches!(err, FetchError::TopStories(_)));
    }

    #[tokio::test]
    async fn enrich_page_only_fetches_the_active_window() {
        let orchestrator = Orchestrator::new(FakeApi::default());
        let mut menu = TopMenu::from_ids(1..=12);

        orchestrator.enrich_page(&mut menu, 2, 5).await.unwrap();

        assert_eq!(orchestrator.api.calls(), vec![6, 7, 8, 9, 10]);
        assert!(menu.is_window_loaded(2, 5));
        assert!(!menu.is_window_loaded(1, 5));
    }

    #[tokio::test]
    async fn enrich_page_skips_loaded_entries() {
        let orchestrator = Orchestrator::new(FakeApi::default());
        let mut menu = TopMenu::from_ids(1..=5);
        menu.fill(1, story(2, vec![]));

        orchestrator.enrich_page(&mut menu, 1, 5).await.unwrap();
        orchestrator.enrich_page(&mut menu, 1, 5).await.unwrap();

        assert_eq!(orchestrator.api.calls(), vec![1, 3, 4, 5]);
    }

    #[tokio::test]
    async fn enrich_page_is_atomic() {
        let api = FakeApi {
            failing: HashSet::from([4]),
            ..Default::default()
        };
        let orchestrator = Orchestrator::new(api);
        let mut menu = TopMenu::from_ids(1..=5);
        let before = menu.clone();

        let err = orchestrator.enrich_page(&mut menu, 1, 5).await.unwrap_err();

        assert!(matches!(err, FetchError::PageItem { id: 4, page: 1, .. }));
        assert_eq!(menu, before);
    }

    #[tokio::test]
    async fn topic_comments_are_filtered_in_order() {
        let api = FakeApi::default()
            .with_item(story(100, vec![1, 2, 3, 4, 5]))
            .with_item(comment(1, "first"))
            .with_item(comment(2, "[dead]"))
            .with_item(comment(3, ""))
            .with_item(comment(4, "<p>fourth"))
            .with_item(comment(5, " [flagged]"));

        let topic = Orchestrator::new(api)
            .fetch_topic_with_comments(100, 10)
            .await
            .unwrap();

        let ids: Vec<u32> = topic.children.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 4]);
        assert_eq!(topic.kids, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn topic_cap_counts_accepted_comments_only() {
        let api = FakeApi::default()
            .with_item(story(100, vec![1, 2, 3, 4, 5, 6]))
            .with_item(comment(1, "[dupe]"))
            .with_item(comment(2, "a"))
            .with_item(comment(3, "[dead]"))
            .with_item(comment(4, "b"))
            .with_item(comment(5, "c"))
            .with_item(comment(6, "d"));
        let orchestrator = Orchestrator::new(api);

        let topic = orchestrator.fetch_topic_with_comments(100, 2).await.unwrap();

        let ids: Vec<u32> = topic.children.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 4]);
        assert_eq!(orchestrator.api.calls(), vec![100, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn topic_comment_failure_aborts_whole_fetch() {
        let api = FakeApi {
            failing: HashSet::from([3]),
            ..Default::default()
        }
        .with_item(story(100, vec![1, 2, 3]))
        .with_item(comment(1, "a"))
        .with_item(comment(2, "b"));

        let err = Orchestrator::new(api)
            .fetch_topic_with_comments(100, 10)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Comment { id: 3, topic: 100, .. }));
    }

    #[tokio::test]
    async fn topic_without_kids_has_no_children() {
        let api = FakeApi::default().with_item(story(7, vec![]));
        let orchestrator = Orchestrator::new(api);

        let topic = orchestrator.fetch_topic_with_comments(7, 10).await.unwrap();

        assert!(topic.children.is_empty());
        assert_eq!(orchestrator.api.calls(), vec![7]);
    }
}
