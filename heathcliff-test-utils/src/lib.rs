//! HEATHCLIFF Test Utilities
//!
//! Centralized test infrastructure for the HEATHCLIFF workspace:
//! - A scripted mock transport that records every call
//! - Response fixtures in the Search Ads wire format
//! - Proptest generators for rows, amounts and pagination blocks
//! - Custom assertions for report tables and errors

// Re-export core types for convenience
pub use heathcliff_core::{
    Granularity, MetricReport, Query, ReportError, ReportResult, ReportRow, ReportTable,
    SearchAdsTransport,
};

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

// ============================================================================
// MOCK TRANSPORT
// ============================================================================

/// HTTP method of a recorded call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
}

/// One request seen by [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub endpoint: String,
    pub query: Query,
    pub body: Option<Value>,
    /// Organization selected when the call was issued.
    pub org_id: Option<u64>,
}

/// Transport answering from scripted responses keyed by method and endpoint.
///
/// A scripted response is returned for every matching call. Responses scripted
/// for an organization win over unscoped ones while that organization is
/// selected. Calls without a scripted response fail with
/// [`ReportError::Transport`].
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: HashMap<(Method, String, Option<u64>), Value>,
    calls: Mutex<Vec<RecordedCall>>,
    org_id: Option<u64>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_get(self, endpoint: impl Into<String>, response: Value) -> Self {
        self.with_response(Method::Get, endpoint, response)
    }

    pub fn with_post(self, endpoint: impl Into<String>, response: Value) -> Self {
        self.with_response(Method::Post, endpoint, response)
    }

    pub fn with_put(self, endpoint: impl Into<String>, response: Value) -> Self {
        self.with_response(Method::Put, endpoint, response)
    }

    /// Script a GET response seen only while `org_id` is selected.
    pub fn with_get_for_org(
        mut self,
        org_id: u64,
        endpoint: impl Into<String>,
        response: Value,
    ) -> Self {
        self.responses
            .insert((Method::Get, endpoint.into(), Some(org_id)), response);
        self
    }

    pub fn with_org_id(mut self, org_id: u64) -> Self {
        self.org_id = Some(org_id);
        self
    }

    fn with_response(mut self, method: Method, endpoint: impl Into<String>, response: Value) -> Self {
        self.responses.insert((method, endpoint.into(), None), response);
        self
    }

    /// Every call so far, in issue order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Endpoints of every call so far, in issue order.
    pub fn endpoints(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.endpoint).collect()
    }

    fn respond(
        &self,
        method: Method,
        endpoint: &str,
        query: Query,
        body: Option<Value>,
    ) -> ReportResult<Value> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                method,
                endpoint: endpoint.to_string(),
                query,
                body,
                org_id: self.org_id,
            });
        }
        let scoped = (method, endpoint.to_string(), self.org_id);
        let unscoped = (method, endpoint.to_string(), None);
        self.responses
            .get(&scoped)
            .or_else(|| self.responses.get(&unscoped))
            .cloned()
            .ok_or_else(|| ReportError::Transport {
                endpoint: endpoint.to_string(),
                reason: format!("no scripted {:?} response", method),
            })
    }
}

#[async_trait]
impl SearchAdsTransport for MockTransport {
    async fn get(&self, endpoint: &str, query: &Query) -> ReportResult<Value> {
        self.respond(Method::Get, endpoint, query.clone(), None)
    }

    async fn post(&self, endpoint: &str, body: &Value) -> ReportResult<Value> {
        self.respond(Method::Post, endpoint, Query::new(), Some(body.clone()))
    }

    async fn put(&self, endpoint: &str, body: &Value) -> ReportResult<Value> {
        self.respond(Method::Put, endpoint, Query::new(), Some(body.clone()))
    }

    fn org_id(&self) -> Option<u64> {
        self.org_id
    }

    fn set_org_id(&mut self, org_id: Option<u64>) {
        self.org_id = org_id;
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub use fixtures::*;

pub mod fixtures {
    //! Responses in the Search Ads wire format.

    use serde_json::{json, Value};

    /// Entity listing response with complete pagination.
    pub fn entity_response(entities: Vec<Value>) -> Value {
        let count = entities.len();
        json!({
            "data": entities,
            "pagination": {
                "totalResults": count,
                "startIndex": 0,
                "itemsPerPage": count.max(1),
            },
        })
    }

    /// Metric report response wrapping `rows`.
    pub fn metric_response(rows: Vec<Value>) -> Value {
        let count = rows.len();
        json!({
            "data": {"reportingDataResponse": {"row": rows}},
            "pagination": {
                "totalResults": count,
                "startIndex": 0,
                "itemsPerPage": 5000,
            },
        })
    }

    /// One raw report row: entity metadata plus its granularity breakdowns.
    pub fn metric_row(metadata: Value, breakdowns: Vec<Value>) -> Value {
        json!({"metadata": metadata, "granularity": breakdowns})
    }

    /// A currency-tagged amount as the API sends it.
    pub fn amount(currency: &str, value: &str) -> Value {
        json!({"currency": currency, "amount": value})
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for Search Ads payloads.

    use super::fixtures::{amount, metric_row};
    use proptest::prelude::*;
    use serde_json::{json, Map, Value};

    /// Generate an ISO currency code from a small pool.
    pub fn arb_currency() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["USD", "EUR", "GBP", "JPY"]).prop_map(str::to_string)
    }

    /// Generate a decimal amount string with two fractional digits.
    pub fn arb_amount_string() -> impl Strategy<Value = String> {
        (0u32..1_000_000).prop_map(|cents| format!("{}.{:02}", cents / 100, cents % 100))
    }

    /// Generate a metric name drawn from the amount fields the API reports.
    pub fn arb_amount_field() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["localSpend", "avgCPA", "avgCPT", "avgCPM", "dailyBudget"])
            .prop_map(str::to_string)
    }

    /// Generate a breakdown whose amounts all share `currency`.
    pub fn arb_breakdown(currency: String) -> impl Strategy<Value = Value> {
        (
            prop::collection::btree_map(arb_amount_field(), arb_amount_string(), 0..4),
            0u64..10_000,
            0u64..1_000,
        )
            .prop_map(move |(amounts, impressions, taps)| {
                let mut breakdown = Map::new();
                breakdown.insert("impressions".to_string(), json!(impressions));
                breakdown.insert("taps".to_string(), json!(taps));
                for (field, value) in amounts {
                    breakdown.insert(field, amount(&currency, &value));
                }
                Value::Object(breakdown)
            })
    }

    /// Generate a single-currency raw report row with 1..4 breakdowns.
    pub fn arb_metric_row() -> impl Strategy<Value = Value> {
        (1u64..100_000, "[a-z]{1,12}", arb_currency()).prop_flat_map(|(id, name, currency)| {
            prop::collection::vec(arb_breakdown(currency), 1..4).prop_map(move |breakdowns| {
                metric_row(
                    json!({
                        "campaignId": id,
                        "campaignName": name.clone(),
                        "campaignStatus": "ENABLED",
                        "app": {"adamId": id * 7, "appName": name.clone()},
                    }),
                    breakdowns,
                )
            })
        })
    }

    /// Generate a pagination block; `totalResults` may exceed `itemsPerPage`.
    pub fn arb_pagination() -> impl Strategy<Value = (u64, u64)> {
        (0u64..20_000, 1u64..10_000)
    }

    /// Generate a column allow-list drawn from commonly requested columns.
    pub fn arb_columns() -> impl Strategy<Value = Vec<String>> {
        prop::sample::subsequence(
            vec![
                "campaignId",
                "campaignName",
                "adamId",
                "appName",
                "impressions",
                "taps",
                "localSpend",
                "avgCPT",
                "original_currency",
            ],
            0..=9,
        )
        .prop_map(|columns| columns.into_iter().map(str::to_string).collect())
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for report tables and errors.

    use super::*;

    /// Assert that every row carries exactly the table's columns.
    #[track_caller]
    pub fn assert_uniform_columns(table: &ReportTable) {
        for (index, row) in table.rows.iter().enumerate() {
            let mut columns: Vec<&String> = row.columns().collect();
            let mut expected: Vec<&String> = table.columns.iter().collect();
            columns.sort();
            expected.sort();
            assert_eq!(columns, expected, "Row {} does not match the schema", index);
        }
    }

    /// Assert that every row's columns are within `allowed`.
    #[track_caller]
    pub fn assert_projected(rows: &[ReportRow], allowed: &[String]) {
        for row in rows {
            for column in row.columns() {
                assert!(
                    allowed.contains(column),
                    "Column {} is outside the allow-list {:?}",
                    column,
                    allowed
                );
            }
        }
    }

    /// Assert that a result failed on pagination.
    #[track_caller]
    pub fn assert_pagination_unsupported<T: std::fmt::Debug>(result: &ReportResult<T>) {
        match result {
            Err(ReportError::PaginationUnsupported { .. }) => {}
            other => panic!("Expected PaginationUnsupported, got: {:?}", other),
        }
    }

    /// Assert that a result failed on mixed currencies.
    #[track_caller]
    pub fn assert_mixed_currency<T: std::fmt::Debug>(result: &ReportResult<T>) {
        match result {
            Err(ReportError::MixedCurrencyRow { .. }) => {}
            other => panic!("Expected MixedCurrencyRow, got: {:?}", other),
        }
    }
}
