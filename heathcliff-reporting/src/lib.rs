//! HEATHCLIFF Reporting - Search Ads Report Engine
//!
//! Turns the Search Ads campaign hierarchy into flat report tables:
//!
//! - [`SearchAdsReporter`] owns a [`SearchAdsTransport`] and an
//!   [`EntityIdCache`]. It resolves parent ids before child levels are listed
//!   and fans campaign-scoped metric reports out over every campaign.
//! - [`org_ids`] and [`org_name`] look up the organizations a credential sees.
//! - [`IoReporter`] sweeps organizations and renames API fields to the
//!   channel-neutral vocabulary of [`io_mapping`].
//!
//! Every request is awaited before the next one is issued.
//!
//! [`SearchAdsTransport`]: heathcliff_core::SearchAdsTransport

pub mod aggregator;
pub mod hierarchy;
pub mod io_mapping;
pub mod io_reporter;
pub mod orgs;
pub mod reporter;

pub use aggregator::{default_overrides, ANCESTOR_COLUMNS};
pub use io_mapping::{
    io_column, EntityAttribute, EntityGranularity, IoChannelMapping, SearchAdsMapping,
    GRANULARITY_COLUMN,
};
pub use io_reporter::IoReporter;
pub use orgs::{org_ids, org_name};
pub use reporter::{
    EmptyParentPolicy, EntityIdCache, ReporterSettings, SearchAdsReporter,
    DEFAULT_ENTITY_PAGE_LIMIT,
};
