use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};

use super::{Draft, DraftError, DraftOp};
use crate::content::validate::validate_page_rows;
use crate::content::ContentLoader;
use crate::events::{EventBus, Notification, SiteEvent};
use crate::pages::Page;
use crate::store::{ContentStore, StoreError};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReport {
    pub page: String,
    pub rows: u64,
}

/// Drafts currently being edited, one per page.
///
/// Shared by every admin session; the last save of a page wins.
pub struct DraftRegistry {
    drafts: Mutex<HashMap<Page, Draft>>,
    loader: ContentLoader,
    store: Arc<dyn ContentStore>,
    events: EventBus,
}

impl DraftRegistry {
    pub fn new(loader: ContentLoader, store: Arc<dyn ContentStore>, events: EventBus) -> Self {
        Self {
            drafts: Mutex::new(HashMap::new()),
            loader,
            store,
            events,
        }
    }

    /// The open draft of a page, seeding it from the store when needed.
    ///
    /// When the store cannot be read the draft starts from the defaults and
    /// a warning is published, since saving it would overwrite stored rows.
    pub async fn open(&self, page: Page) -> Draft {
        self.draft_mut(page).await.clone()
    }

    /// Lock the registry and borrow the draft of `page`.
    ///
    /// The store is read without the lock held; if another task opened the
    /// same page meanwhile, its draft wins.
    async fn draft_mut(&self, page: Page) -> MappedMutexGuard<'_, Draft> {
        let drafts = self.drafts.lock().await;
        match MutexGuard::try_map(drafts, |d| d.get_mut(&page)) {
            Ok(draft) => return draft,
            Err(drafts) => drop(drafts),
        }

        let seeded = self.seed(page).await;
        MutexGuard::map(self.drafts.lock().await, |d| d.entry(page).or_insert(seeded))
    }

    async fn seed(&self, page: Page) -> Draft {
        let defaults = page.defaults();
        match self
            .loader
            .fetch_with_retry(page.id(), None, self.loader.policy())
            .await
        {
            Ok((rows, _)) => Draft::from_rows(page.id(), &defaults, &rows),
            Err((err, attempts)) => {
                tracing::warn!(page = %page, attempts, error = %err, "draft seeded from defaults");
                self.events.notify(Notification::warning(format!(
                    "Stored content for '{page}' could not be loaded; the editor shows defaults. \
                     Saving will replace whatever is stored."
                )));
                Draft::new(page.id(), defaults)
            }
        }
    }

    /// Apply operations in order. Either all of them apply or none do.
    ///
    /// The registry stays locked from read to write-back, so overlapping
    /// batches on the same page serialize.
    ///
    /// Returns the updated draft and, per operation, the id of an added item.
    pub async fn apply(
        &self,
        page: Page,
        ops: Vec<DraftOp>,
    ) -> Result<(Draft, Vec<Option<String>>), DraftError> {
        let mut draft = self.draft_mut(page).await;
        let mut working = draft.clone();
        let mut added = Vec::with_capacity(ops.len());
        for op in ops {
            added.push(working.apply(op)?);
        }

        *draft = working;
        Ok((draft.clone(), added))
    }

    /// Replace the page's stored rows with the draft.
    ///
    /// The draft is only marked clean if nothing changed it while the rows
    /// were being written.
    pub async fn save(&self, page: Page) -> Result<SaveReport, DraftError> {
        let snapshot = self.open(page).await;
        let rows = snapshot.to_rows();
        validate_page_rows(page.id(), &rows)?;

        match self.store.replace_page(page.id(), &rows).await {
            Ok(written) => {
                match self.drafts.lock().await.get_mut(&page) {
                    Some(open) if *open == snapshot => open.mark_clean(),
                    Some(_) => tracing::debug!(page = %page, "draft changed during save; kept dirty"),
                    None => {}
                }
                tracing::info!(page = %page, rows = written, "page content saved");
                self.events.publish(SiteEvent::ContentSaved {
                    page: page.id().to_string(),
                    rows: rows.len(),
                });
                self.events
                    .notify(Notification::info(format!("Saved {written} rows for '{page}'.")));
                Ok(SaveReport {
                    page: page.id().to_string(),
                    rows: written,
                })
            }
            Err(err @ StoreError::PartialReplace { .. }) => {
                self.events.notify(Notification::error(format!(
                    "Saving '{page}' failed after its old content was removed. \
                     The page is empty until it is saved again."
                )));
                Err(err.into())
            }
            Err(err) => {
                self.events
                    .notify(Notification::error(format!("Saving '{page}' failed: {err}")));
                Err(err.into())
            }
        }
    }

    /// Drop the draft of a page. Returns `true` if one was open.
    pub async fn discard(&self, page: Page) -> bool {
        self.drafts.lock().await.remove(&page).is_some()
    }

    /// Open drafts with their dirty flag.
    pub async fn open_drafts(&self) -> Vec<(Page, bool)> {
        let drafts = self.drafts.lock().await;
        let mut open: Vec<_> = drafts.iter().map(|(p, d)| (*p, d.is_dirty())).collect();
        open.sort_by_key(|(p, _)| p.id());
        open
    }
}
