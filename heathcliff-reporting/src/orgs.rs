//! Organization lookups against the `acls` endpoint.

use heathcliff_core::{canonical_id, Query, ReportError, ReportResult, SearchAdsTransport};
use serde_json::{Map, Value};

const ACLS_ENDPOINT: &str = "acls";

async fn fetch_acls<T>(transport: &T) -> ReportResult<Vec<Map<String, Value>>>
where
    T: SearchAdsTransport + ?Sized,
{
    let response = transport.get(ACLS_ENDPOINT, &Query::new()).await?;
    match response.get("data") {
        Some(Value::Array(entries)) => entries
            .iter()
            .map(|entry| match entry {
                Value::Object(map) => Ok(map.clone()),
                _ => Err(ReportError::unexpected_shape(
                    "acls entry is not an object",
                    &response,
                )),
            })
            .collect(),
        Some(Value::Null) | None => Err(ReportError::unexpected_shape(
            "acls response data is null",
            &response,
        )),
        Some(_) => Err(ReportError::unexpected_shape(
            "acls response data is not a list",
            &response,
        )),
    }
}

fn org_id_of(entry: &Map<String, Value>) -> Option<u64> {
    entry
        .get("orgId")
        .and_then(canonical_id)
        .and_then(|id| id.parse().ok())
}

/// Every organization visible to the credential, in response order.
pub async fn org_ids<T>(transport: &T) -> ReportResult<Vec<u64>>
where
    T: SearchAdsTransport + ?Sized,
{
    let mut ids: Vec<u64> = Vec::new();
    for entry in fetch_acls(transport).await? {
        if let Some(id) = org_id_of(&entry) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    Ok(ids)
}

/// Name of the organization the transport is scoped to.
pub async fn org_name<T>(transport: &T) -> ReportResult<String>
where
    T: SearchAdsTransport + ?Sized,
{
    let org_id = transport
        .org_id()
        .ok_or(ReportError::MissingOrganizationContext {
            operation: "org_name",
        })?;

    let entries = fetch_acls(transport).await?;
    let names: Vec<&Value> = entries
        .iter()
        .filter(|entry| org_id_of(entry) == Some(org_id))
        .filter_map(|entry| entry.get("orgName"))
        .collect();

    match names.as_slice() {
        [Value::String(name)] => Ok(name.clone()),
        _ => Err(ReportError::AmbiguousOrganizationName {
            org_id,
            matches: names.len(),
        }),
    }
}
