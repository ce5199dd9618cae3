//! Binds a settings page to a store: the submit and render lifecycle.

use std::sync::Arc;

use settingsgen_fields::{RequestContext, SettingsPage, SettingsRecord, Submission};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::store::PersistenceStore;

/// A settings page backed by a [`PersistenceStore`].
///
/// Saves are read, merge, write with no locking between them; concurrent
/// submissions resolve as last writer wins.
pub struct PageService<S: PersistenceStore + ?Sized = dyn PersistenceStore> {
    page: SettingsPage,
    store: Arc<S>,
}

impl<S: PersistenceStore + ?Sized> PageService<S> {
    pub fn new(page: SettingsPage, store: Arc<S>) -> Self {
        Self { page, store }
    }

    pub fn page(&self) -> &SettingsPage {
        &self.page
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn authorize(&self, request: &RequestContext) -> Result<()> {
        let capability = &self.page.config().capability;
        if request.can(capability) {
            Ok(())
        } else {
            Err(StoreError::Unauthorized {
                page: self.page.id().to_string(),
                capability: capability.clone(),
            })
        }
    }

    /// Current record, empty if the page was never saved.
    pub async fn record(&self) -> Result<SettingsRecord> {
        Ok(self.store.get(self.page.id()).await?.unwrap_or_default())
    }

    /// The stored record as seen by `request`.
    pub async fn read(&self, request: &RequestContext) -> Result<SettingsRecord> {
        self.authorize(request)?;
        self.record().await
    }

    /// Validate `submission`, merge it over the stored record and persist.
    pub async fn submit(
        &self,
        request: &RequestContext,
        submission: &Submission,
    ) -> Result<SettingsRecord> {
        self.authorize(request)?;
        let existing = self.store.get(self.page.id()).await?;
        let record = self.page.validate(submission, existing.as_ref());
        self.store.set(self.page.id(), &record).await?;
        info!(
            page = %self.page.id(),
            submitted = submission.len(),
            first_save = existing.is_none(),
            "saved settings"
        );
        Ok(record)
    }

    /// Render the page for `request` from the stored record.
    pub async fn render(&self, request: &RequestContext) -> Result<String> {
        self.authorize(request)?;
        let record = self.record().await?;
        debug!(page = %self.page.id(), tab = ?self.page.active_tab(request), "rendering settings page");
        Ok(self.page.render_page(&record, request))
    }
}
