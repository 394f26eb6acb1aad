use heathcliff_client::config::{ClientConfig, ConfigError};
use heathcliff_core::{Selector, TimeGranularity};
use heathcliff_reporting::{EmptyParentPolicy, EntityGranularity};
use proptest::prelude::*;
use std::io::Write;

const BASE_CONFIG: &str = r#"
[api]
base_url = "https://api.searchads.apple.com/api"
api_version = "v2"
certificate_path = "certs/searchads.pem"
key_path = "certs/searchads.key"
request_timeout_ms = 30000

[report]
start_date = "2020-03-01"
end_date = "2020-03-31"
"#;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

fn load(contents: &str) -> Result<ClientConfig, ConfigError> {
    let file = write_config(contents);
    let config = ClientConfig::from_path(file.path())?;
    config.validate()?;
    Ok(config)
}

#[test]
fn minimal_config_uses_reporter_defaults() {
    let config = load(BASE_CONFIG).unwrap();
    assert_eq!(config.api.org_id, None);
    assert_eq!(config.reporter.empty_parent_policy, EmptyParentPolicy::Warn);
    assert_eq!(config.reporter.entity_page_limit, 1000);
    assert_eq!(config.reporter.report_page_limit, 5000);
    assert_eq!(config.report.window().start.to_string(), "2020-03-01");
    assert!(config.report.columns.is_none());
}

#[test]
fn full_config_parses_every_section() {
    let contents = format!(
        r#"{}
columns = ["campaignId", "impressions", "localSpend"]
granularities = ["campaign", "adgroup"]
attributes = ["id", "daily_budget"]

[report.overrides]
granularity = "WEEKLY"
returnRowTotals = true

[report.overrides.selector]
orderBy = [{{ field = "keywordId", sortOrder = "ASCENDING" }}]
pagination = {{ limit = 100 }}

[reporter]
empty_parent_policy = "fail"
time_zone = "America/Los_Angeles"
"#,
        BASE_CONFIG.trim_end()
    );
    let config = load(&contents).unwrap();

    assert_eq!(config.reporter.empty_parent_policy, EmptyParentPolicy::Fail);
    assert_eq!(config.reporter.time_zone, "America/Los_Angeles");
    assert_eq!(
        config.report.granularities,
        Some(vec![EntityGranularity::Campaign, EntityGranularity::Adgroup])
    );
    assert_eq!(config.report.overrides.granularity, Some(TimeGranularity::Weekly));
    assert_eq!(config.report.overrides.return_row_totals, Some(true));
    let selector: &Selector = config.report.overrides.selector.as_ref().unwrap();
    assert_eq!(selector.order_by[0].field, "keywordId");
    assert_eq!(selector.pagination.limit, 100);
}

#[test]
fn unknown_fields_are_rejected() {
    let contents = format!("{}\nverbose = true\n", BASE_CONFIG);
    assert!(matches!(load(&contents), Err(ConfigError::Parse(_))));
}

#[test]
fn unknown_override_keys_are_rejected() {
    let contents = format!("{}\n[report.overrides]\nfilters = []\n", BASE_CONFIG);
    assert!(matches!(load(&contents), Err(ConfigError::Parse(_))));
}

#[test]
fn reversed_window_is_invalid() {
    let contents = BASE_CONFIG.replace("2020-03-31", "2020-02-01");
    assert!(matches!(
        load(&contents),
        Err(ConfigError::InvalidValue {
            field: "report.end_date",
            ..
        })
    ));
}

#[test]
fn empty_column_list_is_invalid() {
    let contents = format!("{}columns = []\n", BASE_CONFIG);
    assert!(matches!(
        load(&contents),
        Err(ConfigError::InvalidValue {
            field: "report.columns",
            ..
        })
    ));
}

#[test]
fn load_validates_the_given_path() {
    let file = write_config(BASE_CONFIG);
    let config = ClientConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.api.api_version, "v2");

    let reversed = write_config(&BASE_CONFIG.replace("2020-03-31", "2020-02-01"));
    assert!(matches!(
        ClientConfig::load(Some(reversed.path())),
        Err(ConfigError::InvalidValue {
            field: "report.end_date",
            ..
        })
    ));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let result = ClientConfig::from_path(&dir.path().join("missing.toml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

proptest! {
    #[test]
    fn zero_timeout_is_always_invalid(version in "v[1-9]") {
        let contents = BASE_CONFIG
            .replace("v2", &version)
            .replace("30000", "0");
        let is_timeout_error = matches!(
            load(&contents),
            Err(ConfigError::InvalidValue { field: "api.request_timeout_ms", .. })
        );
        prop_assert!(is_timeout_error);
    }

    #[test]
    fn explicit_org_id_round_trips(org_id in 1u64..10_000_000) {
        let contents = BASE_CONFIG.replace(
            "request_timeout_ms = 30000",
            &format!("request_timeout_ms = 30000\norg_id = {}", org_id),
        );
        let config = load(&contents).unwrap();
        prop_assert_eq!(config.api.org_id, Some(org_id));
    }
}
