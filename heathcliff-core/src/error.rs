//! Error types for HEATHCLIFF reporting operations

use crate::Granularity;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Reporting errors.
///
/// Every variant aborts the run at the point of detection. Variants that stem
/// from a bad payload carry the offending value for diagnosis.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReportError {
    #[error("Operation {operation} requires a selected organization")]
    MissingOrganizationContext { operation: &'static str },

    #[error("Expected exactly one organization named for orgId {org_id}, found {matches}")]
    AmbiguousOrganizationName { org_id: u64, matches: usize },

    #[error(
        "Reporting pagination is not supported: totalResults ({total_results}) is greater than itemsPerPage ({items_per_page})"
    )]
    PaginationUnsupported {
        total_results: u64,
        items_per_page: u64,
    },

    #[error("Unexpected response shape: {reason}")]
    UnexpectedResponseShape { reason: String, response: Value },

    #[error("Report row includes different currencies: {currencies:?}")]
    MixedCurrencyRow { currencies: BTreeMap<String, String> },

    #[error("Invalid amount in field {field}: {value}")]
    InvalidAmount { field: String, value: Value },

    #[error("Column {column} is not part of the table schema")]
    SchemaMismatch { column: String },

    #[error("No {granularity} entities found to scope child requests")]
    NoParentEntities { granularity: Granularity },

    #[error("Transport error on {endpoint}: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("Failed to serialize request body: {0}")]
    Serialization(String),
}

impl ReportError {
    /// Build an [`ReportError::UnexpectedResponseShape`] that keeps the raw payload.
    pub fn unexpected_shape(reason: impl Into<String>, response: &Value) -> Self {
        Self::UnexpectedResponseShape {
            reason: reason.into(),
            response: response.clone(),
        }
    }
}

/// Result type alias for reporting operations.
pub type ReportResult<T> = Result<T, ReportError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pagination_error_display_names_both_counts() {
        let err = ReportError::PaginationUnsupported {
            total_results: 10,
            items_per_page: 5,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("totalResults (10)"));
        assert!(msg.contains("itemsPerPage (5)"));
    }

    #[test]
    fn test_unexpected_shape_keeps_raw_response() {
        let raw = json!({"data": {"error": "nope"}});
        let err = ReportError::unexpected_shape("missing reportingDataResponse", &raw);
        match err {
            ReportError::UnexpectedResponseShape { reason, response } => {
                assert_eq!(reason, "missing reportingDataResponse");
                assert_eq!(response, raw);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_mixed_currency_display_lists_fields() {
        let mut currencies = BTreeMap::new();
        currencies.insert("localSpend".to_string(), "USD".to_string());
        currencies.insert("avgCPT".to_string(), "EUR".to_string());
        let msg = format!("{}", ReportError::MixedCurrencyRow { currencies });
        assert!(msg.contains("different currencies"));
        assert!(msg.contains("USD"));
        assert!(msg.contains("EUR"));
    }

    #[test]
    fn test_no_parent_entities_display_names_parent_level() {
        let err = ReportError::NoParentEntities {
            granularity: Granularity::Campaign,
        };
        assert!(format!("{}", err).contains("No campaign entities"));
    }

    #[test]
    fn test_serialization_display_keeps_reason() {
        let err = ReportError::Serialization("key must be a string".to_string());
        assert_eq!(
            err.to_string(),
            "Failed to serialize request body: key must be a string"
        );
    }
}
