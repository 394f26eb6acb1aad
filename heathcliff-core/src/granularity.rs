//! Entity hierarchy levels and report kinds for the Search Ads API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ENTITY GRANULARITY
// ============================================================================

/// One level of the org → campaign → ad group hierarchy.
///
/// Variants are declared root first, so the derived ordering sorts parents
/// before their children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Granularity {
    #[serde(rename = "org")]
    Org,
    #[serde(rename = "campaign")]
    Campaign,
    #[serde(rename = "adGroup")]
    AdGroup,
}

impl Granularity {
    /// All levels, root first.
    pub const ALL: [Granularity; 3] = [Granularity::Org, Granularity::Campaign, Granularity::AdGroup];

    /// Name used by the API for this level.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Granularity::Org => "org",
            Granularity::Campaign => "campaign",
            Granularity::AdGroup => "adGroup",
        }
    }

    /// Immediate parent level, `None` for the root.
    pub fn parent(&self) -> Option<Granularity> {
        match self {
            Granularity::Org => None,
            Granularity::Campaign => Some(Granularity::Org),
            Granularity::AdGroup => Some(Granularity::Campaign),
        }
    }

    /// Immediate child levels.
    pub fn children(&self) -> &'static [Granularity] {
        match self {
            Granularity::Org => &[Granularity::Campaign],
            Granularity::Campaign => &[Granularity::AdGroup],
            Granularity::AdGroup => &[],
        }
    }

    /// Every ancestor level, nearest first.
    pub fn ancestors(&self) -> Vec<Granularity> {
        let mut out = Vec::new();
        let mut current = self.parent();
        while let Some(level) = current {
            out.push(level);
            current = level.parent();
        }
        out
    }

    /// Column that carries this level's identifier in API responses.
    pub fn id_column(&self) -> &'static str {
        match self {
            Granularity::Org => "orgId",
            Granularity::Campaign => "campaignId",
            Granularity::AdGroup => "adGroupId",
        }
    }

    /// Whether listing this level needs one request per parent id.
    ///
    /// Campaigns are scoped by the organization the transport carries, so only
    /// ad groups fan out over explicit parent ids.
    pub fn requires_parent_ids(&self) -> bool {
        matches!(self, Granularity::AdGroup)
    }

    /// Listing endpoints for this level.
    ///
    /// `parent_ids` is only consulted for levels that
    /// [require parent ids](Self::requires_parent_ids).
    pub fn entity_endpoints(&self, parent_ids: &[String]) -> Vec<String> {
        match self {
            Granularity::Org => vec!["acls".to_string()],
            Granularity::Campaign => vec!["campaigns".to_string()],
            Granularity::AdGroup => parent_ids
                .iter()
                .map(|id| format!("campaigns/{}/adgroups", id))
                .collect(),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "org" => Ok(Granularity::Org),
            "campaign" => Ok(Granularity::Campaign),
            "adGroup" => Ok(Granularity::AdGroup),
            other => Err(format!("Unknown granularity: {}", other)),
        }
    }
}

// ============================================================================
// METRIC REPORTS
// ============================================================================

/// Metric report kinds served under `reports/campaigns`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricReport {
    Campaigns,
    AdGroups,
    Keywords,
    SearchTerms,
    CreativeSets,
}

impl MetricReport {
    /// Endpoint for this report.
    ///
    /// Child reports are scoped to one campaign; `campaign_id` is ignored for
    /// [`MetricReport::Campaigns`].
    pub fn endpoint(&self, campaign_id: &str) -> String {
        match self {
            MetricReport::Campaigns => "reports/campaigns".to_string(),
            MetricReport::AdGroups => format!("reports/campaigns/{}/adgroups", campaign_id),
            MetricReport::Keywords => format!("reports/campaigns/{}/keywords", campaign_id),
            MetricReport::SearchTerms => format!("reports/campaigns/{}/searchterms", campaign_id),
            MetricReport::CreativeSets => {
                format!("reports/campaigns/{}/creativesets", campaign_id)
            }
        }
    }

    /// Whether the report is requested once per parent campaign.
    pub fn is_campaign_scoped(&self) -> bool {
        !matches!(self, MetricReport::Campaigns)
    }
}

impl FromStr for MetricReport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "campaigns" => Ok(MetricReport::Campaigns),
            "adgroups" => Ok(MetricReport::AdGroups),
            "keywords" => Ok(MetricReport::Keywords),
            "searchterms" => Ok(MetricReport::SearchTerms),
            "creativesets" => Ok(MetricReport::CreativeSets),
            other => Err(format!("Unknown report: {}", other)),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_root_first() {
        let mut levels = vec![Granularity::AdGroup, Granularity::Org, Granularity::Campaign];
        levels.sort();
        assert_eq!(levels, Granularity::ALL.to_vec());
    }

    #[test]
    fn test_parent_child_links_are_consistent() {
        for level in Granularity::ALL {
            for child in level.children() {
                assert_eq!(child.parent(), Some(level));
            }
        }
        assert_eq!(Granularity::Org.parent(), None);
    }

    #[test]
    fn test_ancestors_nearest_first() {
        assert_eq!(
            Granularity::AdGroup.ancestors(),
            vec![Granularity::Campaign, Granularity::Org]
        );
        assert!(Granularity::Org.ancestors().is_empty());
    }

    #[test]
    fn test_adgroup_endpoints_fan_out_over_parents() {
        let parents = vec!["1".to_string(), "2".to_string()];
        assert_eq!(
            Granularity::AdGroup.entity_endpoints(&parents),
            vec!["campaigns/1/adgroups", "campaigns/2/adgroups"]
        );
        assert_eq!(Granularity::Campaign.entity_endpoints(&parents), vec!["campaigns"]);
        assert!(Granularity::AdGroup.entity_endpoints(&[]).is_empty());
    }

    #[test]
    fn test_granularity_round_trips_through_api_name() {
        for level in Granularity::ALL {
            assert_eq!(level.as_api_str().parse::<Granularity>(), Ok(level));
        }
    }

    #[test]
    fn test_metric_report_endpoints() {
        assert_eq!(MetricReport::Campaigns.endpoint("9"), "reports/campaigns");
        assert_eq!(
            MetricReport::SearchTerms.endpoint("9"),
            "reports/campaigns/9/searchterms"
        );
        assert!(!MetricReport::Campaigns.is_campaign_scoped());
        assert!(MetricReport::CreativeSets.is_campaign_scoped());
    }
}
