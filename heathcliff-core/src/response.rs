//! Response envelopes and flattening into report rows.
//!
//! Responses are decoded once into typed envelopes. Anything that does not fit
//! the expected envelope is reported as
//! [`ReportError::UnexpectedResponseShape`] with the raw payload attached.

use crate::amount::{AmountNormalizer, ORIGINAL_CURRENCY_COLUMN};
use crate::{ReportError, ReportResult, ReportRow};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// ENVELOPES
// ============================================================================

/// Pagination block of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub total_results: u64,
    pub items_per_page: u64,
    #[serde(default)]
    pub start_index: u64,
}

impl PaginationInfo {
    /// Fail when the response holds fewer items than the API reports.
    pub fn ensure_complete(&self) -> ReportResult<()> {
        if self.total_results > self.items_per_page {
            return Err(ReportError::PaginationUnsupported {
                total_results: self.total_results,
                items_per_page: self.items_per_page,
            });
        }
        Ok(())
    }
}

/// Metric report envelope: `data.reportingDataResponse.row`.
#[derive(Debug, Clone, Deserialize)]
struct MetricEnvelope {
    data: MetricData,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetricData {
    reporting_data_response: ReportingDataResponse,
}

#[derive(Debug, Clone, Deserialize)]
struct ReportingDataResponse {
    row: Vec<RawReportRow>,
}

/// Entity listing envelope: `data` is a list of entities.
#[derive(Debug, Clone, Deserialize)]
struct EntityEnvelope {
    data: Vec<Map<String, Value>>,
}

/// One API row before flattening.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReportRow {
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub granularity: Vec<Map<String, Value>>,
}

/// Read the pagination block, accepting a missing or null block.
pub fn pagination_of(response: &Value) -> ReportResult<Option<PaginationInfo>> {
    match response.get("pagination") {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| ReportError::unexpected_shape(format!("invalid pagination: {}", e), response)),
    }
}

/// Decode the rows of a response.
///
/// Entity listings are wrapped so that each entity becomes the single
/// breakdown of a row without metadata.
pub fn decode_rows(response: &Value, is_entity_response: bool) -> ReportResult<Vec<RawReportRow>> {
    if is_entity_response {
        let envelope: EntityEnvelope = serde_json::from_value(response.clone())
            .map_err(|e| ReportError::unexpected_shape(e.to_string(), response))?;
        Ok(envelope
            .data
            .into_iter()
            .map(|entity| RawReportRow {
                metadata: Map::new(),
                granularity: vec![entity],
            })
            .collect())
    } else {
        let envelope: MetricEnvelope = serde_json::from_value(response.clone())
            .map_err(|e| ReportError::unexpected_shape(e.to_string(), response))?;
        Ok(envelope.data.reporting_data_response.row)
    }
}

// ============================================================================
// FLATTENER
// ============================================================================

/// Turns raw API responses into flat [`ReportRow`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseFlattener {
    normalizer: AmountNormalizer,
}

impl ResponseFlattener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten `response` into rows.
    ///
    /// With `allowed_columns`, every produced row only carries listed columns,
    /// and `original_currency` only when listed.
    pub fn flatten(
        &self,
        response: &Value,
        allowed_columns: Option<&[String]>,
        is_entity_response: bool,
    ) -> ReportResult<Vec<ReportRow>> {
        if let Some(pagination) = pagination_of(response)? {
            pagination.ensure_complete()?;
        }

        let rows = decode_rows(response, is_entity_response)?;
        let mut output = Vec::new();
        for row in rows {
            let base = base_record(row.metadata, response, allowed_columns)?;
            for breakdown in row.granularity {
                let mut flat = base.clone();
                flat.extend(breakdown);
                if let Some(columns) = allowed_columns {
                    flat.retain_columns(columns);
                }
                self.normalizer.normalize(&mut flat)?;
                if let Some(columns) = allowed_columns {
                    if !columns.iter().any(|c| c == ORIGINAL_CURRENCY_COLUMN) {
                        flat.remove(ORIGINAL_CURRENCY_COLUMN);
                    }
                }
                output.push(flat);
            }
        }
        Ok(output)
    }
}

/// Build the per-row base record from metadata.
fn base_record(
    metadata: Map<String, Value>,
    response: &Value,
    allowed_columns: Option<&[String]>,
) -> ReportResult<ReportRow> {
    let mut base = ReportRow::from(metadata);

    if let Some(app) = base.remove("app") {
        let app = app
            .as_object()
            .ok_or_else(|| ReportError::unexpected_shape("metadata.app is not an object", response))?;
        base.insert("adamId", app.get("adamId").cloned().unwrap_or(Value::Null));
        base.insert("appName", app.get("appName").cloned().unwrap_or(Value::Null));
    }

    let joined_reasons = match base.get("servingStateReasons") {
        Some(Value::Array(reasons)) => Some(
            reasons
                .iter()
                .map(|reason| match reason {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
        ),
        _ => None,
    };
    if let Some(joined) = joined_reasons {
        base.insert("servingStateReasons", Value::String(joined));
    }

    if let Some(columns) = allowed_columns {
        base.retain_columns(columns);
    }
    Ok(base)
}

// =============================================================================
// TESTS
// =============================================================================
