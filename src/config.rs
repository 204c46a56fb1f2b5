use serde::Deserialize;
use serde_json::Value;

use crate::sources::adapter::{FetchParams, SortOrder};

// ------------------------------------------------------------
// Root configuration
// ------------------------------------------------------------
//
// Top-level structure loaded from `config.json`.
//
// It defines:
// - Which apps to collect (app id -> display name)
// - Where the raw CSV files go
// - Fetch parameters, review source settings, debug flags
//
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Directory receiving `{name}_raw_{YYYYMMDD}.csv` files
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// App id -> display name, in collection order.
    ///
    /// Kept as raw JSON on purpose: shape errors (array, non-string
    /// names, empty object) are reported by `SourceMapping::from_json`
    /// as `InvalidConfiguration` instead of a serde error.
    pub apps: Value,

    /// Optional fetch parameters
    pub fetch: Option<FetchConfig>,

    /// Optional review source settings
    pub source: Option<SourceConfig>,

    /// Optional debug configuration
    pub debug: Option<DebugConfig>,
}

fn default_output_dir() -> String {
    "data/raw".to_string()
}

impl Config {
    pub fn from_json_str(data: &str) -> serde_json::Result<Self> {
        serde_json::from_str(data)
    }

    /// Fetch parameters with defaults applied.
    pub fn fetch_params(&self) -> FetchParams {
        self.fetch
            .as_ref()
            .map(FetchConfig::to_params)
            .unwrap_or_default()
    }

    pub fn source_config(&self) -> SourceConfig {
        self.source.clone().unwrap_or_default()
    }

    pub fn debug_log(&self) -> bool {
        self.debug.as_ref().is_some_and(|d| d.log.unwrap_or(false))
    }
}

// ------------------------------------------------------------
// Fetch configuration
// ------------------------------------------------------------
//
// Every field is optional; missing ones fall back to
// `FetchParams::default()` (en / us / newest / 100 ms).
//
#[derive(Debug, Deserialize, Clone, Default)]
pub struct FetchConfig {
    /// Review language (`hl`)
    pub lang: Option<String>,

    /// Store country (`gl`)
    pub country: Option<String>,

    pub sort: Option<SortOrder>,

    /// Only keep reviews with this star rating
    pub filter_score: Option<u8>,

    /// Delay between page requests in milliseconds
    pub sleep_ms: Option<u64>,
}

impl FetchConfig {
    pub fn to_params(&self) -> FetchParams {
        let defaults = FetchParams::default();
        FetchParams {
            lang: self.lang.clone().unwrap_or(defaults.lang),
            country: self.country.clone().unwrap_or(defaults.country),
            sort: self.sort.unwrap_or(defaults.sort),
            filter_score: self.filter_score.or(defaults.filter_score),
            sleep_ms: self.sleep_ms.unwrap_or(defaults.sleep_ms),
        }
    }
}

// ------------------------------------------------------------
// Review source configuration
// ------------------------------------------------------------
//
// `base_url` exists so tests (and proxies) can point the adapter
// somewhere other than play.google.com.
//
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    /// Source identifier (e.g. "google_play")
    #[serde(default = "default_source_name")]
    pub name: String,

    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_source_name() -> String {
    "google_play".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            name: default_source_name(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    /// Raises the default log filter to `debug`
    pub log: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg = Config::from_json_str(r#"{ "apps": { "com.a.app": "Bank_A" } }"#).unwrap();

        assert_eq!(cfg.output_dir, "data/raw");
        assert_eq!(cfg.fetch_params(), FetchParams::default());
        assert_eq!(cfg.source_config().name, "google_play");
        assert_eq!(cfg.source_config().timeout_secs, 30);
        assert!(!cfg.debug_log());
    }

    #[test]
    fn partial_fetch_section_keeps_other_defaults() {
        let cfg = Config::from_json_str(
            r#"{
                "apps": { "com.a.app": "Bank_A" },
                "fetch": { "country": "et", "sort": "most_relevant" },
                "debug": { "log": true }
            }"#,
        )
        .unwrap();

        let params = cfg.fetch_params();
        assert_eq!(params.lang, "en");
        assert_eq!(params.country, "et");
        assert_eq!(params.sort, SortOrder::MostRelevant);
        assert_eq!(params.sleep_ms, 100);
        assert!(cfg.debug_log());
    }

    #[test]
    fn apps_keep_file_order() {
        let cfg = Config::from_json_str(
            r#"{ "apps": { "z.app": "Z", "a.app": "A", "m.app": "M" } }"#,
        )
        .unwrap();

        let keys: Vec<&String> = cfg.apps.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["z.app", "a.app", "m.app"]);
    }

    #[test]
    fn missing_apps_is_a_parse_error() {
        assert!(Config::from_json_str(r#"{ "output_dir": "out" }"#).is_err());
    }
}
