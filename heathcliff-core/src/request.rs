//! Report request bodies.
//!
//! Overrides replace top-level keys wholesale. Overriding `selector` replaces
//! the default sort and pagination together; callers that need a different
//! page size or sort must supply the full selector.

use crate::{ReportError, ReportResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default page size for metric reports.
pub const DEFAULT_PAGINATION_LIMIT: u32 = 5000;

/// Default sort field for metric reports.
pub const DEFAULT_ORDER_FIELD: &str = "modificationTime";

/// Inclusive date window of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

/// Time bucketing of metric rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeGranularity {
    Hourly,
    #[default]
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBy {
    pub field: String,
    pub sort_order: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

/// Sort and pagination spec of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selector {
    pub order_by: Vec<OrderBy>,
    pub pagination: Pagination,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Value>,
}

impl Selector {
    /// Single-field descending sort with the given page size.
    pub fn descending(field: impl Into<String>, limit: u32) -> Self {
        Self {
            order_by: vec![OrderBy {
                field: field.into(),
                sort_order: SortOrder::Descending,
            }],
            pagination: Pagination {
                limit,
                offset: None,
            },
            conditions: Vec::new(),
        }
    }
}

/// Body of a metric report request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequestBody {
    pub start_time: String,
    pub end_time: String,
    pub time_zone: String,
    pub granularity: TimeGranularity,
    pub return_row_totals: bool,
    pub return_records_with_no_metrics: bool,
    pub selector: Selector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_grand_totals: Option<bool>,
}

impl ReportRequestBody {
    pub fn to_json(&self) -> ReportResult<Value> {
        serde_json::to_value(self).map_err(|e| ReportError::Serialization(e.to_string()))
    }
}

/// Recognized override keys. Each supplied key replaces the default value
/// of the same top-level key; nothing is merged below the top level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct RequestOverrides {
    pub time_zone: Option<String>,
    pub granularity: Option<TimeGranularity>,
    pub return_row_totals: Option<bool>,
    pub return_records_with_no_metrics: Option<bool>,
    pub selector: Option<Selector>,
    pub group_by: Option<Vec<String>>,
    pub return_grand_totals: Option<bool>,
}

impl RequestOverrides {
    /// Layer `other` on top of `self`; keys set in `other` win.
    pub fn merged_with(&self, other: &RequestOverrides) -> RequestOverrides {
        RequestOverrides {
            time_zone: other.time_zone.clone().or_else(|| self.time_zone.clone()),
            granularity: other.granularity.or(self.granularity),
            return_row_totals: other.return_row_totals.or(self.return_row_totals),
            return_records_with_no_metrics: other
                .return_records_with_no_metrics
                .or(self.return_records_with_no_metrics),
            selector: other.selector.clone().or_else(|| self.selector.clone()),
            group_by: other.group_by.clone().or_else(|| self.group_by.clone()),
            return_grand_totals: other.return_grand_totals.or(self.return_grand_totals),
        }
    }
}

/// Builds [`ReportRequestBody`] values from a window and overrides.
#[derive(Debug, Clone)]
pub struct ReportRequestBuilder {
    time_zone: String,
    pagination_limit: u32,
}

impl ReportRequestBuilder {
    pub fn new() -> Self {
        Self {
            time_zone: "UTC".to_string(),
            pagination_limit: DEFAULT_PAGINATION_LIMIT,
        }
    }

    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = time_zone.into();
        self
    }

    pub fn with_pagination_limit(mut self, limit: u32) -> Self {
        self.pagination_limit = limit;
        self
    }

    pub fn pagination_limit(&self) -> u32 {
        self.pagination_limit
    }

    pub fn build(&self, window: &ReportWindow, overrides: &RequestOverrides) -> ReportRequestBody {
        let overrides = overrides.clone();
        ReportRequestBody {
            start_time: window.start.format("%Y-%m-%d").to_string(),
            end_time: window.end.format("%Y-%m-%d").to_string(),
            time_zone: overrides.time_zone.unwrap_or_else(|| self.time_zone.clone()),
            granularity: overrides.granularity.unwrap_or_default(),
            return_row_totals: overrides.return_row_totals.unwrap_or(false),
            return_records_with_no_metrics: overrides.return_records_with_no_metrics.unwrap_or(true),
            selector: overrides
                .selector
                .unwrap_or_else(|| Selector::descending(DEFAULT_ORDER_FIELD, self.pagination_limit)),
            group_by: overrides.group_by,
            return_grand_totals: overrides.return_grand_totals,
        }
    }
}

impl Default for ReportRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn window() -> ReportWindow {
        ReportWindow::new(
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 7).unwrap(),
        )
    }

    #[test]
    fn test_default_body_shape() {
        let body = ReportRequestBuilder::new().build(&window(), &RequestOverrides::default());
        assert_eq!(
            body.to_json().unwrap(),
            json!({
                "startTime": "2020-01-01",
                "endTime": "2020-01-07",
                "timeZone": "UTC",
                "granularity": "DAILY",
                "returnRowTotals": false,
                "returnRecordsWithNoMetrics": true,
                "selector": {
                    "orderBy": [{"field": "modificationTime", "sortOrder": "DESCENDING"}],
                    "pagination": {"limit": 5000}
                }
            })
        );
    }

    #[test]
    fn test_selector_override_replaces_sort_and_pagination() {
        let overrides = RequestOverrides {
            selector: Some(Selector::descending("keywordId", 100)),
            ..Default::default()
        };
        let body = ReportRequestBuilder::new().build(&window(), &overrides);
        assert_eq!(body.selector.order_by[0].field, "keywordId");
        assert_eq!(body.selector.pagination.limit, 100);
    }

    #[test]
    fn test_merged_overrides_caller_wins() {
        let defaults = RequestOverrides {
            return_records_with_no_metrics: Some(false),
            selector: Some(Selector::descending("keywordId", 5000)),
            ..Default::default()
        };
        let caller = RequestOverrides {
            granularity: Some(TimeGranularity::Weekly),
            selector: Some(Selector::descending("impressions", 10)),
            ..Default::default()
        };
        let merged = defaults.merged_with(&caller);
        assert_eq!(merged.return_records_with_no_metrics, Some(false));
        assert_eq!(merged.granularity, Some(TimeGranularity::Weekly));
        assert_eq!(merged.selector.unwrap().order_by[0].field, "impressions");
    }

    #[test]
    fn test_overrides_reject_unknown_keys() {
        let parsed: Result<RequestOverrides, _> =
            serde_json::from_value(json!({"timeZone": "ORTZ", "bogus": 1}));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_builder_pagination_limit_feeds_default_selector() {
        let body = ReportRequestBuilder::new()
            .with_pagination_limit(250)
            .with_time_zone("ORTZ")
            .build(&window(), &RequestOverrides::default());
        assert_eq!(body.selector.pagination.limit, 250);
        assert_eq!(body.time_zone, "ORTZ");
    }
}
