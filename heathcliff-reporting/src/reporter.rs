//! The reporter: one transport, one id cache, one run at a time.

use heathcliff_core::{
    Granularity, ReportError, ReportRequestBuilder, ReportResult, ResponseFlattener,
    SearchAdsTransport, DEFAULT_PAGINATION_LIMIT,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Page size requested from entity listing endpoints.
pub const DEFAULT_ENTITY_PAGE_LIMIT: u32 = 1000;

// ============================================================================
// SETTINGS
// ============================================================================

/// What to do when a child report has no parent entities to fan out over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmptyParentPolicy {
    /// Return an empty table without comment.
    Silent,
    /// Return an empty table and log a warning.
    #[default]
    Warn,
    /// Fail with [`ReportError::NoParentEntities`].
    Fail,
}

/// Reporter tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReporterSettings {
    pub empty_parent_policy: EmptyParentPolicy,
    pub entity_page_limit: u32,
    pub report_page_limit: u32,
    pub time_zone: String,
}

impl Default for ReporterSettings {
    fn default() -> Self {
        Self {
            empty_parent_policy: EmptyParentPolicy::default(),
            entity_page_limit: DEFAULT_ENTITY_PAGE_LIMIT,
            report_page_limit: DEFAULT_PAGINATION_LIMIT,
            time_zone: "UTC".to_string(),
        }
    }
}

// ============================================================================
// ENTITY ID CACHE
// ============================================================================

/// Identifiers observed per granularity within one run.
///
/// Each entry is an ordered set: insertion order, no duplicates. An entry
/// holding no ids is still known; it means the level has no entities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityIdCache {
    ids: HashMap<Granularity, Vec<String>>,
}

impl EntityIdCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, granularity: Granularity) -> Option<&[String]> {
        self.ids.get(&granularity).map(Vec::as_slice)
    }

    pub fn contains(&self, granularity: Granularity) -> bool {
        self.ids.contains_key(&granularity)
    }

    /// Replace the ids known for `granularity`.
    pub fn record(&mut self, granularity: Granularity, ids: impl IntoIterator<Item = String>) {
        let mut unique: Vec<String> = Vec::new();
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        self.ids.insert(granularity, unique);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

// ============================================================================
// REPORTER
// ============================================================================

/// Fetches and flattens Search Ads reports over a [`SearchAdsTransport`].
///
/// Requests are issued strictly one after another. Entity discovery state
/// lives in the reporter's [`EntityIdCache`]; reset it with
/// [`clear_cache`](Self::clear_cache) before reusing the reporter for another
/// organization.
pub struct SearchAdsReporter<T> {
    pub(crate) transport: T,
    pub(crate) cache: EntityIdCache,
    pub(crate) settings: ReporterSettings,
    pub(crate) requests: ReportRequestBuilder,
    pub(crate) flattener: ResponseFlattener,
}

impl<T: SearchAdsTransport> SearchAdsReporter<T> {
    pub fn new(transport: T) -> Self {
        Self::with_settings(transport, ReporterSettings::default())
    }

    pub fn with_settings(transport: T, settings: ReporterSettings) -> Self {
        let requests = ReportRequestBuilder::new()
            .with_time_zone(settings.time_zone.clone())
            .with_pagination_limit(settings.report_page_limit);
        Self {
            transport,
            cache: EntityIdCache::new(),
            settings,
            requests,
            flattener: ResponseFlattener::new(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    pub fn settings(&self) -> &ReporterSettings {
        &self.settings
    }

    pub fn cache(&self) -> &EntityIdCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut EntityIdCache {
        &mut self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Apply the empty-parent policy to a resolved parent id list.
    pub(crate) fn check_parents(&self, parent: Granularity, ids: &[String]) -> ReportResult<()> {
        if !ids.is_empty() {
            return Ok(());
        }
        match self.settings.empty_parent_policy {
            EmptyParentPolicy::Silent => Ok(()),
            EmptyParentPolicy::Warn => {
                tracing::warn!(
                    parent = %parent,
                    org_id = ?self.transport.org_id(),
                    "No parent entities found, child report will be empty"
                );
                Ok(())
            }
            EmptyParentPolicy::Fail => Err(ReportError::NoParentEntities {
                granularity: parent,
            }),
        }
    }
}

impl<T> std::fmt::Debug for SearchAdsReporter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchAdsReporter")
            .field("cache", &self.cache)
            .field("settings", &self.settings)
            .finish()
    }
}
