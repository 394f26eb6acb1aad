//! Metric report aggregation.
//!
//! Campaign-scoped reports are fetched once per parent campaign and stamped
//! with the parent's attributes from the campaigns report of the same run.

use crate::SearchAdsReporter;
use heathcliff_core::{
    Granularity, MetricReport, ReportResult, ReportRow, ReportTable, ReportTableBuilder,
    ReportWindow, RequestOverrides, SearchAdsTransport, Selector,
};
use serde_json::Value;

/// Columns inherited from the parent campaign row.
pub const ANCESTOR_COLUMNS: [&str; 5] = [
    "campaignId",
    "campaignName",
    "campaignStatus",
    "adamId",
    "appName",
];

/// Request overrides a report kind applies before the caller's overrides.
pub fn default_overrides(report: MetricReport, page_limit: u32) -> RequestOverrides {
    match report {
        MetricReport::SearchTerms => RequestOverrides {
            return_records_with_no_metrics: Some(false),
            selector: Some(Selector::descending("keywordId", page_limit)),
            ..Default::default()
        },
        _ => RequestOverrides::default(),
    }
}

impl<T: SearchAdsTransport> SearchAdsReporter<T> {
    /// Campaign-level metric report.
    pub async fn campaigns_report(
        &mut self,
        window: &ReportWindow,
        columns: Option<&[String]>,
        overrides: &RequestOverrides,
    ) -> ReportResult<ReportTable> {
        let rows = self
            .fetch_metric_rows(MetricReport::Campaigns, "", window, columns, overrides)
            .await?;
        let mut table = ReportTableBuilder::for_columns(columns, &[]);
        table.append(rows)?;
        Ok(table.finish())
    }

    /// Metric report of `report` kind, fanned out over every campaign.
    ///
    /// `MetricReport::Campaigns` is fetched directly.
    pub async fn campaign_child_report(
        &mut self,
        report: MetricReport,
        window: &ReportWindow,
        columns: Option<&[String]>,
        overrides: &RequestOverrides,
    ) -> ReportResult<ReportTable> {
        if !report.is_campaign_scoped() {
            return self.campaigns_report(window, columns, overrides).await;
        }

        let parent_report = self
            .campaigns_report(window, None, &RequestOverrides::default())
            .await?;
        let parents = parent_rows(&parent_report);
        self.cache.record(
            Granularity::Campaign,
            parents.iter().map(|(id, _)| id.clone()),
        );

        let mut table = ReportTableBuilder::for_columns(columns, &ANCESTOR_COLUMNS);
        let campaign_ids = self
            .resolve_parent_ids(Granularity::AdGroup, None)
            .await?
            .unwrap_or_default();

        for campaign_id in campaign_ids {
            let mut rows = self
                .fetch_metric_rows(report, &campaign_id, window, columns, overrides)
                .await?;
            if let Some((_, parent)) = parents.iter().find(|(id, _)| *id == campaign_id) {
                for row in rows.iter_mut() {
                    stamp_ancestors(row, parent);
                }
            }
            table.append(rows)?;
        }

        tracing::info!(
            report = ?report,
            rows = table.len(),
            "Aggregated campaign-scoped report"
        );
        Ok(table.finish())
    }

    pub async fn adgroups_report(
        &mut self,
        window: &ReportWindow,
        columns: Option<&[String]>,
        overrides: &RequestOverrides,
    ) -> ReportResult<ReportTable> {
        self.campaign_child_report(MetricReport::AdGroups, window, columns, overrides)
            .await
    }

    pub async fn keywords_report(
        &mut self,
        window: &ReportWindow,
        columns: Option<&[String]>,
        overrides: &RequestOverrides,
    ) -> ReportResult<ReportTable> {
        self.campaign_child_report(MetricReport::Keywords, window, columns, overrides)
            .await
    }

    pub async fn searchterms_report(
        &mut self,
        window: &ReportWindow,
        columns: Option<&[String]>,
        overrides: &RequestOverrides,
    ) -> ReportResult<ReportTable> {
        self.campaign_child_report(MetricReport::SearchTerms, window, columns, overrides)
            .await
    }

    pub async fn creative_sets_report(
        &mut self,
        window: &ReportWindow,
        columns: Option<&[String]>,
        overrides: &RequestOverrides,
    ) -> ReportResult<ReportTable> {
        self.campaign_child_report(MetricReport::CreativeSets, window, columns, overrides)
            .await
    }

    async fn fetch_metric_rows(
        &self,
        report: MetricReport,
        campaign_id: &str,
        window: &ReportWindow,
        columns: Option<&[String]>,
        overrides: &RequestOverrides,
    ) -> ReportResult<Vec<ReportRow>> {
        let overrides =
            default_overrides(report, self.requests.pagination_limit()).merged_with(overrides);
        let body = self.requests.build(window, &overrides);
        let endpoint = report.endpoint(campaign_id);
        let response = self.transport.post(&endpoint, &body.to_json()?).await?;
        let rows = self.flattener.flatten(&response, columns, false)?;
        tracing::debug!(endpoint = %endpoint, rows = rows.len(), "Fetched metric report");
        Ok(rows)
    }
}

/// First row per campaign id, in discovery order.
fn parent_rows(report: &ReportTable) -> Vec<(String, &ReportRow)> {
    let mut parents: Vec<(String, &ReportRow)> = Vec::new();
    for row in &report.rows {
        if let Some(id) = row.id("campaignId") {
            if !parents.iter().any(|(known, _)| *known == id) {
                parents.push((id, row));
            }
        }
    }
    parents
}

fn stamp_ancestors(row: &mut ReportRow, parent: &ReportRow) {
    for column in ANCESTOR_COLUMNS {
        row.insert(column, parent.get(column).cloned().unwrap_or(Value::Null));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use heathcliff_core::ReportError;
    use heathcliff_test_utils::{metric_response, metric_row, MockTransport};
    use serde_json::json;

    fn window() -> ReportWindow {
        ReportWindow::new(
            NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 3, 2).unwrap(),
        )
    }

    fn campaigns_fixture() -> Value {
        metric_response(vec![
            metric_row(
                json!({"campaignId": 2, "campaignName": "Two", "campaignStatus": "ENABLED",
                       "app": {"adamId": 900, "appName": "Bird"}}),
                vec![json!({"date": "2020-03-01", "impressions": 5})],
            ),
            metric_row(
                json!({"campaignId": 1, "campaignName": "One", "campaignStatus": "PAUSED",
                       "app": {"adamId": 901, "appName": "Fish"}}),
                vec![json!({"date": "2020-03-01", "impressions": 7})],
            ),
        ])
    }

    #[tokio::test]
    async fn test_child_rows_inherit_parent_attributes_in_discovery_order() {
        let transport = MockTransport::new()
            .with_post("reports/campaigns", campaigns_fixture())
            .with_post(
                "reports/campaigns/2/adgroups",
                metric_response(vec![metric_row(
                    json!({"adGroupId": 20, "adGroupName": "G20"}),
                    vec![json!({"impressions": 1, "localSpend": {"currency": "USD", "amount": "1.25"}})],
                )]),
            )
            .with_post(
                "reports/campaigns/1/adgroups",
                metric_response(vec![metric_row(
                    json!({"adGroupId": 10, "adGroupName": "G10"}),
                    vec![json!({"impressions": 2})],
                )]),
            );
        let mut reporter = SearchAdsReporter::new(transport);

        let table = reporter
            .adgroups_report(&window(), None, &RequestOverrides::default())
            .await
            .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].get("adGroupId"), Some(&json!(20)));
        assert_eq!(table.rows[0].get("campaignName"), Some(&json!("Two")));
        assert_eq!(table.rows[0].get("appName"), Some(&json!("Bird")));
        assert_eq!(table.rows[0].get("localSpend"), Some(&json!(1.25)));
        assert_eq!(table.rows[1].get("campaignStatus"), Some(&json!("PAUSED")));
        assert_eq!(table.rows[1].get("adamId"), Some(&json!(901)));
        assert_eq!(table.rows[1].get("localSpend"), Some(&Value::Null));
        assert_eq!(
            reporter.transport().endpoints(),
            vec![
                "reports/campaigns",
                "reports/campaigns/2/adgroups",
                "reports/campaigns/1/adgroups"
            ]
        );
    }

    #[tokio::test]
    async fn test_no_campaigns_yields_shaped_empty_table() {
        let transport =
            MockTransport::new().with_post("reports/campaigns", metric_response(vec![]));
        let mut reporter = SearchAdsReporter::new(transport);
        let columns = vec!["impressions".to_string()];

        let table = reporter
            .keywords_report(&window(), Some(columns.as_slice()), &RequestOverrides::default())
            .await
            .unwrap();

        assert!(table.is_empty());
        assert_eq!(
            table.columns,
            vec!["impressions", "campaignId", "campaignName", "campaignStatus", "adamId", "appName"]
        );
        assert_eq!(reporter.transport().endpoints(), vec!["reports/campaigns"]);
    }

    #[tokio::test]
    async fn test_searchterms_defaults_then_caller_overrides() {
        let transport = MockTransport::new()
            .with_post("reports/campaigns", campaigns_fixture())
            .with_post("reports/campaigns/2/searchterms", metric_response(vec![]))
            .with_post("reports/campaigns/1/searchterms", metric_response(vec![]));
        let mut reporter = SearchAdsReporter::new(transport);
        let caller = RequestOverrides {
            return_row_totals: Some(true),
            ..Default::default()
        };

        reporter
            .searchterms_report(&window(), None, &caller)
            .await
            .unwrap();

        let calls = reporter.transport().calls();
        let body = calls[1].body.clone().unwrap();
        assert_eq!(body["returnRecordsWithNoMetrics"], json!(false));
        assert_eq!(body["returnRowTotals"], json!(true));
        assert_eq!(body["selector"]["orderBy"][0]["field"], json!("keywordId"));
        let parent_body = calls[0].body.clone().unwrap();
        assert_eq!(parent_body["selector"]["orderBy"][0]["field"], json!("modificationTime"));
    }

    #[tokio::test]
    async fn test_child_pagination_overflow_aborts_run() {
        let transport = MockTransport::new()
            .with_post("reports/campaigns", campaigns_fixture())
            .with_post(
                "reports/campaigns/2/creativesets",
                json!({"pagination": {"totalResults": 6000, "itemsPerPage": 5000}}),
            );
        let mut reporter = SearchAdsReporter::new(transport);

        let err = reporter
            .creative_sets_report(&window(), None, &RequestOverrides::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::PaginationUnsupported { .. }));
    }

    #[tokio::test]
    async fn test_child_report_records_campaign_ids() {
        let transport = MockTransport::new()
            .with_post("reports/campaigns", campaigns_fixture())
            .with_post("reports/campaigns/2/keywords", metric_response(vec![]))
            .with_post("reports/campaigns/1/keywords", metric_response(vec![]));
        let mut reporter = SearchAdsReporter::new(transport);

        reporter
            .keywords_report(&window(), None, &RequestOverrides::default())
            .await
            .unwrap();

        assert_eq!(
            reporter.cache().get(Granularity::Campaign),
            Some(&["2".to_string(), "1".to_string()][..])
        );
    }
}
