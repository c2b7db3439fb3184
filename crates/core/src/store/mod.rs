//! Row storage for page content and activity images.

mod memory;
mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::activity::{ActivityImage, ActivityImageUpdate, NewActivityImage};
use crate::content::ContentRow;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("content store unavailable: {0}")]
    Unavailable(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    /// The delete of a page replace went through but the insert did not;
    /// the page now has no stored content.
    #[error("page '{page}' was cleared but its new rows were not written: {message}")]
    PartialReplace { page: String, message: String },
}

/// The `page_content` table.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Rows of a page, optionally narrowed to one section, ordered by
    /// `display_order`.
    async fn fetch_rows(
        &self,
        page: &str,
        section: Option<&str>,
    ) -> Result<Vec<ContentRow>, StoreError>;

    /// Delete every row of a page. Returns the number of rows removed.
    async fn delete_page(&self, page: &str) -> Result<u64, StoreError>;

    /// Insert rows as given. Returns the number of rows written.
    async fn insert_rows(&self, rows: &[ContentRow]) -> Result<u64, StoreError>;

    /// Pages that currently have stored rows, with their row counts.
    async fn page_counts(&self) -> Result<Vec<(String, i64)>, StoreError>;

    /// Cheap reachability check.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Replace the whole row set of a page: delete, then insert.
    ///
    /// The two steps are separate calls with no transaction around them.
    /// An insert failure after a successful delete is reported as
    /// [`StoreError::PartialReplace`].
    async fn replace_page(&self, page: &str, rows: &[ContentRow]) -> Result<u64, StoreError> {
        let deleted = self.delete_page(page).await?;
        tracing::debug!(page, deleted, "cleared page content");

        if rows.is_empty() {
            return Ok(0);
        }

        self.insert_rows(rows).await.map_err(|err| {
            tracing::error!(page, deleted, error = %err, "insert failed after delete");
            StoreError::PartialReplace {
                page: page.to_string(),
                message: err.to_string(),
            }
        })
    }
}

/// The `activity_images` table.
#[async_trait]
pub trait ActivityImageStore: Send + Sync {
    async fn list_images(&self, category: Option<&str>) -> Result<Vec<ActivityImage>, StoreError>;

    async fn create_image(&self, image: NewActivityImage) -> Result<ActivityImage, StoreError>;

    async fn update_image(
        &self,
        id: Uuid,
        update: ActivityImageUpdate,
    ) -> Result<ActivityImage, StoreError>;

    /// Returns `true` if the image existed.
    async fn delete_image(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Rewrite `display_order` to follow the order of `ids`.
    async fn reorder_images(&self, ids: &[Uuid]) -> Result<(), StoreError>;
}
