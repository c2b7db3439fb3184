use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use super::{ActivityImageStore, ContentStore, StoreError};
use crate::activity::{ActivityImage, ActivityImageUpdate, NewActivityImage};
use crate::content::ContentRow;

/// In-process store used for tests and for running without a database.
///
/// Failures can be injected to exercise retry and partial-save paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<ContentRow>>,
    images: Mutex<Vec<ActivityImage>>,
    failing_fetches: AtomicU32,
    fetch_calls: AtomicU32,
    fail_inserts: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<ContentRow>) -> Self {
        let store = Self::new();
        *lock(&store.rows) = rows;
        store
    }

    /// Make the next `n` fetches fail as if the backend were unreachable.
    pub fn fail_next_fetches(&self, n: u32) {
        self.failing_fetches.store(n, Ordering::SeqCst);
    }

    pub fn set_fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Total number of fetch calls, failed ones included.
    pub fn fetch_calls(&self) -> u32 {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn all_rows(&self) -> Vec<ContentRow> {
        lock(&self.rows).clone()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn fetch_rows(
        &self,
        page: &str,
        section: Option<&str>,
    ) -> Result<Vec<ContentRow>, StoreError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        let remaining = self.failing_fetches.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_fetches.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Unavailable("injected fetch failure".into()));
        }

        let mut rows: Vec<ContentRow> = lock(&self.rows)
            .iter()
            .filter(|r| r.page == page && section.is_none_or(|s| r.section == s))
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.display_order);
        Ok(rows)
    }

    async fn delete_page(&self, page: &str) -> Result<u64, StoreError> {
        let mut rows = lock(&self.rows);
        let before = rows.len();
        rows.retain(|r| r.page != page);
        Ok((before - rows.len()) as u64)
    }

    async fn insert_rows(&self, new_rows: &[ContentRow]) -> Result<u64, StoreError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected insert failure".into()));
        }

        // All or nothing, like a multi-row INSERT.
        let mut rows = lock(&self.rows);
        for (i, row) in new_rows.iter().enumerate() {
            let same_key = |r: &ContentRow| {
                r.page == row.page && r.section == row.section && r.content_key == row.content_key
            };
            if rows.iter().any(same_key) || new_rows[..i].iter().any(same_key) {
                return Err(StoreError::Conflict(format!(
                    "{}/{}/{} already exists",
                    row.page, row.section, row.content_key
                )));
            }
        }
        rows.extend_from_slice(new_rows);
        Ok(new_rows.len() as u64)
    }

    async fn page_counts(&self) -> Result<Vec<(String, i64)>, StoreError> {
        let mut counts: BTreeMap<String, i64> = BTreeMap::new();
        for row in lock(&self.rows).iter() {
            *counts.entry(row.page.clone()).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl ActivityImageStore for MemoryStore {
    async fn list_images(&self, category: Option<&str>) -> Result<Vec<ActivityImage>, StoreError> {
        let mut images: Vec<ActivityImage> = lock(&self.images)
            .iter()
            .filter(|i| category.is_none_or(|c| i.category == c))
            .cloned()
            .collect();
        images.sort_by_key(|i| i.display_order);
        Ok(images)
    }

    async fn create_image(&self, new: NewActivityImage) -> Result<ActivityImage, StoreError> {
        let mut images = lock(&self.images);
        if images.iter().any(|i| i.key == new.key) {
            return Err(StoreError::Conflict(format!("image key '{}' exists", new.key)));
        }
        let next_order = images
            .iter()
            .filter(|i| i.category == new.category)
            .map(|i| i.display_order + 1)
            .max()
            .unwrap_or(0);
        let image = ActivityImage::from_new(new, next_order);
        images.push(image.clone());
        Ok(image)
    }

    async fn update_image(
        &self,
        id: Uuid,
        update: ActivityImageUpdate,
    ) -> Result<ActivityImage, StoreError> {
        let mut images = lock(&self.images);
        let image = images
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("activity image {id}")))?;
        image.apply(update);
        Ok(image.clone())
    }

    async fn delete_image(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut images = lock(&self.images);
        let before = images.len();
        images.retain(|i| i.id != id);
        Ok(images.len() != before)
    }

    async fn reorder_images(&self, ids: &[Uuid]) -> Result<(), StoreError> {
        let mut images = lock(&self.images);
        for (order, id) in ids.iter().enumerate() {
            if let Some(image) = images.iter_mut().find(|i| i.id == *id) {
                image.display_order = order as i32;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_filters_and_orders() {
        let store = MemoryStore::with_rows(vec![
            ContentRow::text("home", "hero", "subtitle", "b").with_order(2),
            ContentRow::text("home", "hero", "title", "a").with_order(1),
            ContentRow::text("home", "welcome", "heading", "c").with_order(0),
            ContentRow::text("about", "hero", "title", "d"),
        ]);

        let page = store.fetch_rows("home", None).await.unwrap();
        assert_eq!(page.len(), 3);
        assert_eq!(page[0].content_key, "heading");

        let section = store.fetch_rows("home", Some("hero")).await.unwrap();
        let keys: Vec<_> = section.iter().map(|r| r.content_key.as_str()).collect();
        assert_eq!(keys, ["title", "subtitle"]);
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_keys() {
        let store = MemoryStore::with_rows(vec![ContentRow::text("home", "hero", "title", "a")]);
        let err = store
            .insert_rows(&[ContentRow::text("home", "hero", "title", "b")])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn rejected_insert_writes_nothing() {
        let store = MemoryStore::with_rows(vec![ContentRow::text("home", "hero", "title", "a")]);
        let err = store
            .insert_rows(&[
                ContentRow::text("home", "hero", "subtitle", "new"),
                ContentRow::text("home", "hero", "title", "b"),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.all_rows().len(), 1);

        let err = store
            .insert_rows(&[
                ContentRow::text("about", "hero", "title", "x"),
                ContentRow::text("about", "hero", "title", "y"),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert!(store.fetch_rows("about", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replace_page_reports_partial_failure() {
        let store = MemoryStore::with_rows(vec![ContentRow::text("home", "hero", "title", "a")]);
        store.set_fail_inserts(true);

        let err = store
            .replace_page("home", &[ContentRow::text("home", "hero", "title", "b")])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::PartialReplace { ref page, .. } if page == "home"));
        assert!(store.fetch_rows("home", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reorder_rewrites_display_order() {
        let store = MemoryStore::new();
        let mut ids = Vec::new();
        for key in ["a", "b", "c"] {
            let image = store
                .create_image(NewActivityImage {
                    key: key.into(),
                    image_url: format!("/media/{key}.jpg"),
                    title: key.to_uppercase(),
                    description: String::new(),
                    learn_more: None,
                    category: "attraction".into(),
                    display_order: None,
                })
                .await
                .unwrap();
            ids.push(image.id);
        }

        ids.reverse();
        store.reorder_images(&ids).await.unwrap();

        let keys: Vec<_> = store
            .list_images(Some("attraction"))
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.key)
            .collect();
        assert_eq!(keys, ["c", "b", "a"]);
    }
}
