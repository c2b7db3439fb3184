use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use super::reshape::{
    fold_rows, link_types, merge_over_fallback, ContentScope, ContentTree, LinkTypes,
};
use super::row::ContentRow;
use crate::events::{EventBus, Notification};
use crate::store::{ContentStore, StoreError};

/// How often and how patiently a failed fetch is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Base delay; the wait before retry `n` is `delay * n`.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// No retries at all.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Wait before the given 1-based retry.
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.delay.saturating_mul(retry)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    /// Stored rows were read (possibly none) and merged over the fallback.
    Fetched,
    /// Every attempt failed; the fallback is served alone.
    Fallback,
}

/// What a page gets back from the loader. `content` always has at least
/// the fallback's shape.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadOutcome {
    pub content: ContentTree,
    /// Link types of the fetched rows; empty for the fallback.
    #[serde(skip_serializing_if = "LinkTypes::is_empty")]
    pub links: LinkTypes,
    pub source: ContentSource,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoadOutcome {
    pub fn is_fallback(&self) -> bool {
        self.source == ContentSource::Fallback
    }
}

/// Reads page content, reshapes it and falls back to literal defaults.
#[derive(Clone)]
pub struct ContentLoader {
    store: Arc<dyn ContentStore>,
    events: EventBus,
    policy: RetryPolicy,
}

impl ContentLoader {
    pub fn new(store: Arc<dyn ContentStore>, events: EventBus, policy: RetryPolicy) -> Self {
        Self {
            store,
            events,
            policy,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Load with the loader's own retry policy.
    pub async fn load(
        &self,
        page: &str,
        scope: &ContentScope,
        fallback: &ContentTree,
    ) -> LoadOutcome {
        self.load_with(page, scope, fallback, self.policy).await
    }

    pub async fn load_with(
        &self,
        page: &str,
        scope: &ContentScope,
        fallback: &ContentTree,
        policy: RetryPolicy,
    ) -> LoadOutcome {
        match self.fetch_with_retry(page, scope.section(), policy).await {
            Ok((rows, attempts)) => {
                let fetched = fold_rows(&rows, scope);
                tracing::debug!(page, rows = rows.len(), attempts, "content loaded");
                LoadOutcome {
                    content: merge_over_fallback(fetched, fallback, scope),
                    links: link_types(&rows),
                    source: ContentSource::Fetched,
                    attempts,
                    error: None,
                }
            }
            Err((err, attempts)) => {
                tracing::warn!(page, attempts, error = %err, "serving fallback content");
                self.events.notify(Notification::warning(format!(
                    "Could not load content for '{page}' after {attempts} attempts; showing defaults."
                )));
                LoadOutcome {
                    content: fallback.clone(),
                    links: LinkTypes::new(),
                    source: ContentSource::Fallback,
                    attempts,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    /// Fetch raw rows, retrying sequentially with a linearly growing delay.
    ///
    /// Returns the rows and the number of attempts made, or the last error
    /// once the budget is spent.
    pub async fn fetch_with_retry(
        &self,
        page: &str,
        section: Option<&str>,
        policy: RetryPolicy,
    ) -> Result<(Vec<ContentRow>, u32), (StoreError, u32)> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.store.fetch_rows(page, section).await {
                Ok(rows) => return Ok((rows, attempt)),
                Err(err) if attempt <= policy.max_retries => {
                    let wait = policy.delay_for(attempt);
                    tracing::info!(
                        page,
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        error = %err,
                        "content fetch failed, retrying"
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(err) => return Err((err, attempt)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::LinkType;
    use crate::events::SiteEvent;
    use crate::store::MemoryStore;
    use serde_json::{json, Value};

    fn tree(value: Value) -> ContentTree {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn fast(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(1))
    }

    fn loader(store: Arc<MemoryStore>, max_retries: u32) -> (ContentLoader, EventBus) {
        let bus = EventBus::new(16);
        (ContentLoader::new(store, bus.clone(), fast(max_retries)), bus)
    }

    fn rules_fallback() -> ContentTree {
        tree(json!({
            "importantNote": { "importantNote": "Please be courteous." },
            "parkRules": { "categories": [{ "id": "quiet", "title": "Quiet hours", "rules": [] }] },
            "faqs": { "faqs": [{ "id": "pets", "question": "Pets?", "answer": "Leashed." }] }
        }))
    }

    #[test]
    fn delay_grows_linearly() {
        let policy = RetryPolicy::new(3, Duration::from_millis(500));
        assert_eq!(policy.delay_for(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn no_rows_returns_fallback() {
        let store = Arc::new(MemoryStore::new());
        let (loader, _) = loader(store, 3);
        let fallback = rules_fallback();

        let outcome = loader.load("rules-faqs", &ContentScope::Page, &fallback).await;
        assert_eq!(outcome.source, ContentSource::Fetched);
        assert_eq!(outcome.content, fallback);
    }

    #[tokio::test]
    async fn stored_row_overrides_only_its_key() {
        let store = Arc::new(MemoryStore::with_rows(vec![ContentRow::text(
            "rules-faqs",
            "importantNote",
            "importantNote",
            "Be kind",
        )]));
        let (loader, _) = loader(store, 3);
        let fallback = rules_fallback();

        let outcome = loader.load("rules-faqs", &ContentScope::Page, &fallback).await;
        assert_eq!(outcome.content["importantNote"]["importantNote"], "Be kind");
        assert_eq!(outcome.content["parkRules"], fallback["parkRules"]);
        assert_eq!(outcome.content["faqs"], fallback["faqs"]);
    }

    #[tokio::test]
    async fn section_scope_is_flat() {
        let store = Arc::new(MemoryStore::with_rows(vec![ContentRow::text(
            "rules-faqs",
            "importantNote",
            "importantNote",
            "Be kind",
        )]));
        let (loader, _) = loader(store, 0);
        let fallback = tree(json!({ "importantNote": "Default" }));

        let outcome = loader
            .load(
                "rules-faqs",
                &ContentScope::Section("importantNote".into()),
                &fallback,
            )
            .await;
        assert_eq!(Value::Object(outcome.content), json!({ "importantNote": "Be kind" }));
    }

    #[tokio::test]
    async fn recovers_within_retry_budget() {
        let store = Arc::new(MemoryStore::with_rows(vec![ContentRow::text(
            "home", "hero", "title", "Hello",
        )]));
        store.fail_next_fetches(2);
        let (loader, _) = loader(store.clone(), 3);

        let outcome = loader
            .load("home", &ContentScope::Page, &ContentTree::new())
            .await;
        assert_eq!(outcome.source, ContentSource::Fetched);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.content["hero"]["title"], "Hello");
        assert_eq!(store.fetch_calls(), 3);
    }

    #[tokio::test]
    async fn exhausted_budget_serves_fallback_and_notifies() {
        let store = Arc::new(MemoryStore::new());
        store.fail_next_fetches(10);
        let (loader, bus) = loader(store.clone(), 2);
        let mut rx = bus.subscribe();
        let fallback = rules_fallback();

        let outcome = loader.load("rules-faqs", &ContentScope::Page, &fallback).await;
        assert!(outcome.is_fallback());
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.content, fallback);
        assert!(outcome.error.is_some());
        assert_eq!(store.fetch_calls(), 3);

        match rx.recv().await.unwrap() {
            SiteEvent::Notification(n) => assert!(n.message.contains("rules-faqs")),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn stored_link_types_come_back_with_the_content() {
        let store = Arc::new(MemoryStore::with_rows(vec![
            ContentRow::text("home", "hero", "ctaLink", "https://pineridge.example/book")
                .with_link_type(LinkType::Internal),
            ContentRow::text("home", "hero", "title", "Hello"),
        ]));
        let (loader, _) = loader(store, 0);

        let outcome = loader
            .load("home", &ContentScope::Page, &ContentTree::new())
            .await;
        assert_eq!(outcome.links.len(), 1);
        assert_eq!(outcome.links.get("hero.ctaLink"), Some(&LinkType::Internal));

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["links"]["hero.ctaLink"], "internal");
    }

    #[tokio::test(start_paused = true)]
    async fn retries_wait_linearly_between_attempts() {
        let store = Arc::new(MemoryStore::new());
        store.fail_next_fetches(3);
        let bus = EventBus::new(16);
        let policy = RetryPolicy::new(3, Duration::from_millis(500));
        let loader = ContentLoader::new(store.clone(), bus, policy);

        let started = tokio::time::Instant::now();
        let (_, attempts) = loader.fetch_with_retry("home", None, policy).await.unwrap();
        assert_eq!(attempts, 4);
        // Waits of 500, 1000 and 1500 ms before retries 1 to 3.
        assert_eq!(started.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn no_wait_after_the_last_attempt() {
        let store = Arc::new(MemoryStore::new());
        store.fail_next_fetches(10);
        let bus = EventBus::new(16);
        let policy = RetryPolicy::new(2, Duration::from_millis(1000));
        let loader = ContentLoader::new(store.clone(), bus, policy);

        let started = tokio::time::Instant::now();
        let outcome = loader
            .load("home", &ContentScope::Page, &ContentTree::new())
            .await;
        assert!(outcome.is_fallback());
        assert_eq!(outcome.attempts, 3);
        assert_eq!(started.elapsed(), Duration::from_millis(1000 + 2000));
        assert_eq!(store.fetch_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn first_success_does_not_wait() {
        let store = Arc::new(MemoryStore::new());
        let (loader, _) = loader(store, 3);

        let started = tokio::time::Instant::now();
        let outcome = loader
            .load("home", &ContentScope::Page, &ContentTree::new())
            .await;
        assert_eq!(outcome.attempts, 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
