//! Record set API endpoints.

use crate::ControlPlaneClient;
use shardreg_core::{
    ChangeBatch, ChangeInfo, RecordSetDescriptor, RecordSetPage, RegistryError, Result,
};
use std::collections::HashSet;
use tracing::debug;

/// Upper bound on pages followed by a single listing
pub const MAX_PAGES: u32 = 1000;

/// Record set API endpoints
pub struct RecordSetsApi<'a> {
    client: &'a ControlPlaneClient,
}

impl<'a> RecordSetsApi<'a> {
    pub(crate) const fn new(client: &'a ControlPlaneClient) -> Self {
        Self { client }
    }

    /// Fetch one page of a zone's record sets
    pub async fn page(&self, zone_id: &str, page_token: Option<&str>) -> Result<RecordSetPage> {
        let params: Vec<(&str, &str)> = page_token
            .map(|token| vec![("page_token", token)])
            .unwrap_or_default();

        self.client
            .get_with_query(&["zones", zone_id, "rrsets"], &params)
            .await
    }

    /// Fetch every record set in a zone, following continuation tokens.
    ///
    /// A token that repeats, or a listing longer than [`MAX_PAGES`], fails
    /// with [`RegistryError::InvalidResponse`].
    pub async fn list(&self, zone_id: &str) -> Result<Vec<RecordSetDescriptor>> {
        let mut record_sets = Vec::new();
        let mut seen = HashSet::new();
        let mut token: Option<String> = None;
        let mut pages = 0u32;

        loop {
            let page = self.page(zone_id, token.as_deref()).await?;
            pages += 1;
            record_sets.extend(page.record_sets);

            let next = match page.next_page_token {
                Some(next) if !next.is_empty() => next,
                _ => break,
            };
            if !seen.insert(next.clone()) {
                return Err(RegistryError::InvalidResponse(format!(
                    "listing of zone {zone_id} repeated page token {next:?}"
                )));
            }
            if pages >= MAX_PAGES {
                return Err(RegistryError::InvalidResponse(format!(
                    "listing of zone {zone_id} exceeded {MAX_PAGES} pages"
                )));
            }
            token = Some(next);
        }

        debug!(zone = zone_id, pages, record_sets = record_sets.len(), "listed zone");
        Ok(record_sets)
    }

    /// Submit a change batch to a zone
    pub async fn submit(&self, zone_id: &str, batch: &ChangeBatch) -> Result<ChangeInfo> {
        self.client.post(&["zones", zone_id, "changes"], batch).await
    }

    /// Look up the propagation status of a submitted change
    pub async fn change(&self, change_id: &str) -> Result<ChangeInfo> {
        self.client.get_with_query(&["changes", change_id], &[]).await
    }
}
