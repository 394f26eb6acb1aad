//! Transport seam between the reporting engine and the HTTP API.

use crate::ReportResult;
use async_trait::async_trait;
use serde_json::Value;

/// Query parameters for GET requests.
pub type Query = Vec<(String, String)>;

/// The HTTP surface the reporting engine consumes.
///
/// Endpoints are relative to the versioned API root (`campaigns`,
/// `reports/campaigns/42/adgroups`). Implementations must be thread-safe
/// (Send + Sync). Calls are issued one at a time by the engine.
///
/// # Example
/// ```ignore
/// struct RecordingTransport { /* ... */ }
///
/// #[async_trait]
/// impl SearchAdsTransport for RecordingTransport {
///     async fn get(&self, endpoint: &str, query: &Query) -> ReportResult<Value> {
///         // Perform the request
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait SearchAdsTransport: Send + Sync {
    /// Issue a GET request.
    async fn get(&self, endpoint: &str, query: &Query) -> ReportResult<Value>;

    /// Issue a POST request with a JSON body.
    async fn post(&self, endpoint: &str, body: &Value) -> ReportResult<Value>;

    /// Issue a PUT request with a JSON body.
    async fn put(&self, endpoint: &str, body: &Value) -> ReportResult<Value>;

    /// Organization requests are scoped to, if any.
    fn org_id(&self) -> Option<u64>;

    /// Select the organization subsequent requests are scoped to.
    fn set_org_id(&mut self, org_id: Option<u64>);
}
