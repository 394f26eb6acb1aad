//! Entity hierarchy resolution and entity listing reports.
//!
//! Child levels can only be listed once the ids of their parent level are
//! known. Parent ids are taken from the run's [`EntityIdCache`] when present
//! and discovered otherwise, root first, with identifier-only listings.
//!
//! [`EntityIdCache`]: crate::EntityIdCache

use crate::SearchAdsReporter;
use heathcliff_core::{
    Granularity, Query, ReportResult, ReportTable, ReportTableBuilder, SearchAdsTransport,
};

impl<T: SearchAdsTransport> SearchAdsReporter<T> {
    /// Parent ids needed to list `granularity`.
    ///
    /// Returns `None` when the level is listed without parent ids (the root,
    /// and organization-scoped levels). Explicit ids are returned unchanged.
    /// An empty list means there is nothing to fetch, not a failure.
    pub async fn resolve_parent_ids(
        &mut self,
        granularity: Granularity,
        explicit_parent_ids: Option<Vec<String>>,
    ) -> ReportResult<Option<Vec<String>>> {
        if let Some(ids) = explicit_parent_ids {
            return Ok(Some(ids));
        }
        if !granularity.requires_parent_ids() {
            return Ok(None);
        }
        let Some(parent) = granularity.parent() else {
            return Ok(None);
        };

        if !self.cache.contains(parent) {
            // Walk up to the nearest level that can be listed with what we know.
            let mut pending = vec![parent];
            let mut level = parent;
            while level.requires_parent_ids() {
                match level.parent() {
                    Some(next) if !self.cache.contains(next) => {
                        pending.push(next);
                        level = next;
                    }
                    _ => break,
                }
            }
            for level in pending.into_iter().rev() {
                self.discover_ids(level).await?;
            }
        }

        let ids = self.cache.get(parent).map(<[String]>::to_vec).unwrap_or_default();
        self.check_parents(parent, &ids)?;
        Ok(Some(ids))
    }

    /// Fetch an identifier-only listing of `granularity` and cache its ids.
    async fn discover_ids(&mut self, granularity: Granularity) -> ReportResult<()> {
        let parent_ids = match granularity.parent() {
            Some(parent) if granularity.requires_parent_ids() => {
                self.cache.get(parent).map(<[String]>::to_vec).unwrap_or_default()
            }
            _ => Vec::new(),
        };
        let id_columns = vec!["id".to_string(), granularity.id_column().to_string()];
        let listing = self
            .fetch_listing(granularity, &parent_ids, Some(&id_columns))
            .await?;

        let mut ids = listing.unique_ids("id");
        for id in listing.unique_ids(granularity.id_column()) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        tracing::debug!(
            granularity = %granularity,
            count = ids.len(),
            "Discovered entity ids"
        );
        self.cache.record(granularity, ids);
        Ok(())
    }

    /// Entity listing report for `granularity`.
    ///
    /// `ids` restricts the result to those entities. `parent_ids` overrides
    /// parent discovery. `columns` is a column allow-list.
    pub async fn entity_report(
        &mut self,
        granularity: Granularity,
        ids: Option<&[String]>,
        parent_ids: Option<Vec<String>>,
        columns: Option<&[String]>,
    ) -> ReportResult<ReportTable> {
        let parents = self
            .resolve_parent_ids(granularity, parent_ids)
            .await?
            .unwrap_or_default();
        let mut report = self.fetch_listing(granularity, &parents, columns).await?;

        if let Some(ids) = ids {
            let id_column = granularity.id_column();
            report.retain_rows(|row| {
                row.id("id")
                    .or_else(|| row.id(id_column))
                    .is_some_and(|id| ids.contains(&id))
            });
        }
        Ok(report)
    }

    /// GET every listing endpoint of `granularity` and flatten the results.
    async fn fetch_listing(
        &self,
        granularity: Granularity,
        parent_ids: &[String],
        columns: Option<&[String]>,
    ) -> ReportResult<ReportTable> {
        let query: Query = vec![(
            "limit".to_string(),
            self.settings.entity_page_limit.to_string(),
        )];
        let mut table = ReportTableBuilder::for_columns(columns, &[]);
        for endpoint in granularity.entity_endpoints(parent_ids) {
            let response = self.transport.get(&endpoint, &query).await?;
            let rows = self.flattener.flatten(&response, columns, true)?;
            tracing::debug!(endpoint = %endpoint, rows = rows.len(), "Fetched entity listing");
            table.append(rows)?;
        }
        Ok(table.finish())
    }
}
