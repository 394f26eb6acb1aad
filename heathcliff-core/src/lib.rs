//! HEATHCLIFF Core - Report Types and Flattening
//!
//! Pure data structures and transformations for the Search Ads reporting
//! engine: entity granularities, request bodies, response flattening, amount
//! normalization and the report table. The only I/O seam is the
//! [`SearchAdsTransport`] trait; implementations live in other crates.

pub mod amount;
pub mod error;
pub mod granularity;
pub mod request;
pub mod response;
pub mod row;
pub mod table;
pub mod transport;

pub use amount::{AmountNormalizer, AmountValue, ORIGINAL_CURRENCY_COLUMN};
pub use error::{ReportError, ReportResult};
pub use granularity::{Granularity, MetricReport};
pub use request::{
    OrderBy, Pagination, ReportRequestBody, ReportRequestBuilder, ReportWindow, RequestOverrides,
    Selector, SortOrder, TimeGranularity, DEFAULT_ORDER_FIELD, DEFAULT_PAGINATION_LIMIT,
};
pub use response::{PaginationInfo, RawReportRow, ResponseFlattener};
pub use row::{canonical_id, ReportRow};
pub use table::{ColumnSchema, ReportTable, ReportTableBuilder};
pub use transport::{Query, SearchAdsTransport};
