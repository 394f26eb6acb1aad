//! Translation between the channel-neutral entity vocabulary and Search Ads
//! API fields.
//!
//! The neutral vocabulary names entities `account`, `campaign` and `adgroup`
//! and their attributes `id`, `name`, `status`, `daily_budget` and `goal`.
//! [`IoChannelMapping`] provides the generic mapping as default methods;
//! [`SearchAdsMapping`] overrides the entries where the API differs.

use heathcliff_core::{canonical_id, Granularity};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// VOCABULARY
// ============================================================================

/// Channel-neutral entity level. Ordered root first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityGranularity {
    Account,
    Campaign,
    Adgroup,
}

impl EntityGranularity {
    pub const ALL: [EntityGranularity; 3] = [
        EntityGranularity::Account,
        EntityGranularity::Campaign,
        EntityGranularity::Adgroup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityGranularity::Account => "account",
            EntityGranularity::Campaign => "campaign",
            EntityGranularity::Adgroup => "adgroup",
        }
    }

    /// Every ancestor level, root first.
    pub fn ancestors(&self) -> &'static [EntityGranularity] {
        match self {
            EntityGranularity::Account => &[],
            EntityGranularity::Campaign => &[EntityGranularity::Account],
            EntityGranularity::Adgroup => &[EntityGranularity::Account, EntityGranularity::Campaign],
        }
    }
}

impl fmt::Display for EntityGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityGranularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "account" => Ok(EntityGranularity::Account),
            "campaign" => Ok(EntityGranularity::Campaign),
            "adgroup" => Ok(EntityGranularity::Adgroup),
            other => Err(format!("Unknown entity granularity: {}", other)),
        }
    }
}

/// Channel-neutral entity attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityAttribute {
    Id,
    Name,
    Status,
    DailyBudget,
    Goal,
}

impl EntityAttribute {
    pub const ALL: [EntityAttribute; 5] = [
        EntityAttribute::Id,
        EntityAttribute::Name,
        EntityAttribute::Status,
        EntityAttribute::DailyBudget,
        EntityAttribute::Goal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityAttribute::Id => "id",
            EntityAttribute::Name => "name",
            EntityAttribute::Status => "status",
            EntityAttribute::DailyBudget => "daily_budget",
            EntityAttribute::Goal => "goal",
        }
    }
}

impl fmt::Display for EntityAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output column for an attribute at a level, e.g. `campaign_daily_budget`.
pub fn io_column(granularity: EntityGranularity, attribute: EntityAttribute) -> String {
    format!("{}_{}", granularity, attribute)
}

/// Output column naming the level a row describes.
pub const GRANULARITY_COLUMN: &str = "granularity";

// ============================================================================
// GENERIC MAPPING
// ============================================================================

/// Levels whose neutral name is also the API name.
pub fn generic_granularity_to_api(granularity: EntityGranularity) -> Option<Granularity> {
    granularity.as_str().parse::<Granularity>().ok()
}

pub fn generic_attribute_to_api(attribute: EntityAttribute) -> Option<String> {
    match attribute {
        EntityAttribute::Id => Some("id".to_string()),
        EntityAttribute::Name => Some("name".to_string()),
        EntityAttribute::Status => Some("status".to_string()),
        EntityAttribute::DailyBudget | EntityAttribute::Goal => None,
    }
}

pub fn generic_value_to_io(_attribute: EntityAttribute, value: &Value) -> Value {
    value.clone()
}

// ============================================================================
// MAPPING TRAIT
// ============================================================================

/// Maps the neutral vocabulary onto one channel's API.
///
/// Every method has a generic default. Implementations override only the
/// entries where their API deviates.
pub trait IoChannelMapping: Send + Sync {
    /// API level for a neutral level, `None` when the channel has no such level.
    fn granularity_to_api(&self, granularity: EntityGranularity) -> Option<Granularity> {
        generic_granularity_to_api(granularity)
    }

    /// API field for an attribute at a level, `None` when unmapped.
    fn attribute_to_api(
        &self,
        attribute: EntityAttribute,
        _granularity: EntityGranularity,
    ) -> Option<String> {
        generic_attribute_to_api(attribute)
    }

    /// Convert an API value into its neutral form.
    fn api_value_to_io(&self, attribute: EntityAttribute, value: &Value) -> Value {
        generic_value_to_io(attribute, value)
    }

    /// Attribute an API column carries at a level.
    fn api_column_to_io(
        &self,
        column: &str,
        granularity: EntityGranularity,
    ) -> Option<EntityAttribute> {
        EntityAttribute::ALL.into_iter().find(|attribute| {
            self.attribute_to_api(*attribute, granularity).as_deref() == Some(column)
        })
    }
}

/// Mapping for the Search Ads API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchAdsMapping;

impl IoChannelMapping for SearchAdsMapping {
    fn granularity_to_api(&self, granularity: EntityGranularity) -> Option<Granularity> {
        match granularity {
            EntityGranularity::Account => Some(Granularity::Org),
            EntityGranularity::Adgroup => Some(Granularity::AdGroup),
            _ => generic_granularity_to_api(granularity),
        }
    }

    fn attribute_to_api(
        &self,
        attribute: EntityAttribute,
        granularity: EntityGranularity,
    ) -> Option<String> {
        let field = match (attribute, granularity) {
            (EntityAttribute::Id, EntityGranularity::Account) => "orgId",
            (EntityAttribute::Id, EntityGranularity::Campaign) => "campaignId",
            (EntityAttribute::Id, EntityGranularity::Adgroup) => "adGroupId",
            (EntityAttribute::Name, EntityGranularity::Account) => "orgName",
            (EntityAttribute::DailyBudget, EntityGranularity::Campaign) => "dailyBudgetAmount",
            (EntityAttribute::Goal, EntityGranularity::Adgroup) => "cpaGoal",
            _ => return generic_attribute_to_api(attribute),
        };
        Some(field.to_string())
    }

    fn api_value_to_io(&self, attribute: EntityAttribute, value: &Value) -> Value {
        match attribute {
            EntityAttribute::Id => canonical_id(value).map_or(Value::Null, Value::String),
            _ => generic_value_to_io(attribute, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generic_granularity_only_maps_shared_names() {
        assert_eq!(generic_granularity_to_api(EntityGranularity::Account), None);
        assert_eq!(
            generic_granularity_to_api(EntityGranularity::Campaign),
            Some(Granularity::Campaign)
        );
        assert_eq!(generic_granularity_to_api(EntityGranularity::Adgroup), None);
    }

    #[test]
    fn test_search_ads_granularity_overrides() {
        let mapping = SearchAdsMapping;
        assert_eq!(
            EntityGranularity::ALL.map(|g| mapping.granularity_to_api(g)),
            [
                Some(Granularity::Org),
                Some(Granularity::Campaign),
                Some(Granularity::AdGroup)
            ]
        );
    }

    #[test]
    fn test_id_maps_to_a_distinct_field_per_level() {
        let mapping = SearchAdsMapping;
        let fields: Vec<Option<String>> = EntityGranularity::ALL
            .iter()
            .map(|g| mapping.attribute_to_api(EntityAttribute::Id, *g))
            .collect();
        assert_eq!(
            fields,
            vec![
                Some("orgId".to_string()),
                Some("campaignId".to_string()),
                Some("adGroupId".to_string())
            ]
        );
    }

    #[test]
    fn test_attribute_fallbacks() {
        let mapping = SearchAdsMapping;
        assert_eq!(
            mapping.attribute_to_api(EntityAttribute::Name, EntityGranularity::Account),
            Some("orgName".to_string())
        );
        assert_eq!(
            mapping.attribute_to_api(EntityAttribute::Name, EntityGranularity::Campaign),
            Some("name".to_string())
        );
        assert_eq!(
            mapping.attribute_to_api(EntityAttribute::Status, EntityGranularity::Adgroup),
            Some("status".to_string())
        );
        assert_eq!(
            mapping.attribute_to_api(EntityAttribute::DailyBudget, EntityGranularity::Adgroup),
            None
        );
        assert_eq!(
            mapping.attribute_to_api(EntityAttribute::Goal, EntityGranularity::Adgroup),
            Some("cpaGoal".to_string())
        );
    }

    #[test]
    fn test_reverse_mapping_recovers_attribute() {
        let mapping = SearchAdsMapping;
        for granularity in EntityGranularity::ALL {
            for attribute in EntityAttribute::ALL {
                if let Some(field) = mapping.attribute_to_api(attribute, granularity) {
                    assert_eq!(
                        mapping.api_column_to_io(&field, granularity),
                        Some(attribute),
                        "{} at {}",
                        field,
                        granularity
                    );
                }
            }
        }
        assert_eq!(mapping.api_column_to_io("orgId", EntityGranularity::Campaign), None);
    }

    #[test]
    fn test_id_values_coerced_to_strings() {
        let mapping = SearchAdsMapping;
        assert_eq!(
            mapping.api_value_to_io(EntityAttribute::Id, &json!(117310.0)),
            json!("117310")
        );
        assert_eq!(mapping.api_value_to_io(EntityAttribute::Id, &Value::Null), Value::Null);
        assert_eq!(
            mapping.api_value_to_io(EntityAttribute::Status, &json!("PAUSED")),
            json!("PAUSED")
        );
    }

    #[test]
    fn test_io_column_names() {
        assert_eq!(
            io_column(EntityGranularity::Campaign, EntityAttribute::DailyBudget),
            "campaign_daily_budget"
        );
        assert_eq!(io_column(EntityGranularity::Account, EntityAttribute::Id), "account_id");
        assert_eq!("adgroup".parse::<EntityGranularity>(), Ok(EntityGranularity::Adgroup));
    }
}
