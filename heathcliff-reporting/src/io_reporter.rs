//! Organization sweep producing a channel-neutral entity report.

use crate::io_mapping::{
    io_column, EntityAttribute, EntityGranularity, IoChannelMapping, SearchAdsMapping,
    GRANULARITY_COLUMN,
};
use crate::{org_ids, SearchAdsReporter};
use heathcliff_core::{
    ReportResult, ReportRow, ReportTable, ReportTableBuilder, SearchAdsTransport,
};
use serde_json::Value;
use std::collections::BTreeSet;

/// Sweeps organizations and lists their entities in neutral columns.
pub struct IoReporter<T, M = SearchAdsMapping> {
    reporter: SearchAdsReporter<T>,
    mapping: M,
    granularities: BTreeSet<EntityGranularity>,
    attributes: Vec<EntityAttribute>,
}

impl<T: SearchAdsTransport> IoReporter<T, SearchAdsMapping> {
    pub fn new(reporter: SearchAdsReporter<T>) -> Self {
        Self::with_mapping(reporter, SearchAdsMapping)
    }
}

impl<T: SearchAdsTransport, M: IoChannelMapping> IoReporter<T, M> {
    pub fn with_mapping(reporter: SearchAdsReporter<T>, mapping: M) -> Self {
        Self {
            reporter,
            mapping,
            granularities: EntityGranularity::ALL.into_iter().collect(),
            attributes: EntityAttribute::ALL.to_vec(),
        }
    }

    /// Restrict the sweep to these levels.
    pub fn with_granularities(
        mut self,
        granularities: impl IntoIterator<Item = EntityGranularity>,
    ) -> Self {
        self.granularities = granularities.into_iter().collect();
        self
    }

    /// Restrict output to these attributes.
    pub fn with_attributes(mut self, attributes: impl IntoIterator<Item = EntityAttribute>) -> Self {
        self.attributes = attributes.into_iter().collect();
        self
    }

    pub fn reporter(&self) -> &SearchAdsReporter<T> {
        &self.reporter
    }

    pub fn into_reporter(self) -> SearchAdsReporter<T> {
        self.reporter
    }

    /// Run the sweep.
    ///
    /// Sweeps the transport's organization when one is selected, otherwise
    /// every visible organization. The id cache is empty and the transport's
    /// organization selection restored when this returns, on success or error.
    pub async fn run(&mut self) -> ReportResult<ReportTable> {
        let selected = self.reporter.transport().org_id();
        self.reporter.clear_cache();
        let result = self.sweep(selected).await;
        self.reporter.clear_cache();
        self.reporter.transport_mut().set_org_id(selected);
        result
    }

    async fn sweep(&mut self, selected: Option<u64>) -> ReportResult<ReportTable> {
        let orgs = match selected {
            Some(org_id) => vec![org_id],
            None => org_ids(self.reporter.transport()).await?,
        };

        let mut table = ReportTableBuilder::for_columns(None, &[GRANULARITY_COLUMN]);
        let granularities: Vec<EntityGranularity> = self.granularities.iter().copied().collect();
        for org_id in orgs {
            self.reporter.transport_mut().set_org_id(Some(org_id));
            self.reporter.clear_cache();
            for granularity in &granularities {
                let api_report = self.fetch_entity_report(*granularity, org_id).await?;
                let mut io_rows = self.api_report_to_io(&api_report, *granularity);
                self.fill_ancestor_identifiers(&api_report, &mut io_rows, *granularity);
                tracing::info!(
                    org_id,
                    granularity = %granularity,
                    rows = io_rows.len(),
                    "Swept entity level"
                );
                table.append(io_rows)?;
            }
        }
        Ok(table.finish())
    }

    /// Entity listing for one neutral level with its id column named the
    /// API way. Discovered ids are recorded for child levels.
    pub async fn fetch_entity_report(
        &mut self,
        granularity: EntityGranularity,
        org_id: u64,
    ) -> ReportResult<ReportTable> {
        let Some(api_granularity) = self.mapping.granularity_to_api(granularity) else {
            tracing::debug!(granularity = %granularity, "No API level, skipping");
            return Ok(ReportTable::default());
        };
        let id_column = self
            .mapping
            .attribute_to_api(EntityAttribute::Id, granularity)
            .unwrap_or_else(|| api_granularity.id_column().to_string());

        let org_filter = [org_id.to_string()];
        let ids = match granularity {
            EntityGranularity::Account => Some(&org_filter[..]),
            _ => None,
        };
        let mut report = self
            .reporter
            .entity_report(api_granularity, ids, None, None)
            .await?;

        report.rename_column("id", &id_column);
        if report.columns.contains(&id_column) {
            let ids = report.unique_ids(&id_column);
            self.reporter.cache_mut().record(api_granularity, ids);
        }
        Ok(report)
    }

    /// Translate API rows into neutral `{granularity}_{attribute}` columns.
    pub fn api_report_to_io(
        &self,
        api_report: &ReportTable,
        granularity: EntityGranularity,
    ) -> Vec<ReportRow> {
        let columns: Vec<(String, EntityAttribute, String)> = self
            .attributes
            .iter()
            .filter_map(|attribute| {
                self.mapping
                    .attribute_to_api(*attribute, granularity)
                    .filter(|field| api_report.columns.contains(field))
                    .map(|field| (io_column(granularity, *attribute), *attribute, field))
            })
            .collect();

        api_report
            .rows
            .iter()
            .map(|api_row| {
                let mut row = ReportRow::new();
                row.insert(GRANULARITY_COLUMN, Value::String(granularity.to_string()));
                for (io_name, attribute, field) in &columns {
                    let value = api_row.get(field).unwrap_or(&Value::Null);
                    row.insert(io_name.clone(), self.mapping.api_value_to_io(*attribute, value));
                }
                row
            })
            .collect()
    }

    /// Copy ancestor ids (`account_id`, `campaign_id`) from the API rows.
    pub fn fill_ancestor_identifiers(
        &self,
        api_report: &ReportTable,
        io_rows: &mut [ReportRow],
        granularity: EntityGranularity,
    ) {
        for ancestor in granularity.ancestors() {
            let Some(field) = self.mapping.attribute_to_api(EntityAttribute::Id, *ancestor) else {
                continue;
            };
            if !api_report.columns.contains(&field) {
                continue;
            }
            let io_name = io_column(*ancestor, EntityAttribute::Id);
            for (io_row, api_row) in io_rows.iter_mut().zip(&api_report.rows) {
                let value = api_row.get(&field).unwrap_or(&Value::Null);
                io_row.insert(
                    io_name.clone(),
                    self.mapping.api_value_to_io(EntityAttribute::Id, value),
                );
            }
        }
    }
}

impl<T, M> std::fmt::Debug for IoReporter<T, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IoReporter")
            .field("reporter", &self.reporter)
            .field("granularities", &self.granularities)
            .field("attributes", &self.attributes)
            .finish()
    }
}
