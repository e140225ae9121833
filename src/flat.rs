//! The flattened options snapshot handed to the rest of the system.

use crate::value::RawValue;
use indexmap::IndexMap;
use serde::Serialize;
use std::path::PathBuf;

/// Default `search.limit` when a search record is first created.
pub const DEFAULT_SEARCH_LIMIT: u64 = 20;

/// Which dependency section a newly saved dependency goes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SaveType {
    Prod,
    Dev,
    Peer,
    Optional,
    PeerOptional,
}

/// Network retry policy, filled in by the `fetch-retry*` options.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retries: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_timeout: Option<u64>,
}

/// Search policy, filled in by the `search*` options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOptions {
    pub limit: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staleness: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opts: Option<IndexMap<String, String>>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            limit: DEFAULT_SEARCH_LIMIT,
            description: None,
            exclude: None,
            staleness: None,
            opts: None,
        }
    }
}

/// Flattened configuration.
///
/// Every field is optional: `None` means no rule wrote it. The JSON form
/// (see [`FlatOptions::to_json`]) uses camelCase keys and leaves absent
/// fields out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatOptions {
    // dependency groups
    #[serde(skip_serializing_if = "Option::is_none")]
    pub omit: Option<Vec<String>>,

    // saving
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_type: Option<SaveType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_bundle: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_lock: Option<bool>,

    // cache and network
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefer_online: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefer_offline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_sockets: Option<u64>,
    #[serde(rename = "strictSSL", skip_serializing_if = "Option::is_none")]
    pub strict_ssl: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_proxy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub https_proxy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub always_auth: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,

    // publishing and tags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,

    // scripts and tooling
    /// `Some(None)` means explicitly unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_shell: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_scripts: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legacy_peer_deps: Option<bool>,

    // output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unicode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parseable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchOptions>,

    // behavior
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci_name: Option<String>,

    // process identity, always injected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub npm_bin: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_bin: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_algorithm: Option<String>,

    /// Scoped registries (`@scope:registry`) and per-registry settings
    /// (`//host/path/:key`), copied verbatim.
    #[serde(flatten)]
    pub registry_settings: IndexMap<String, RawValue>,
}

impl FlatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retry record, created empty on first access.
    pub fn retry_mut(&mut self) -> &mut RetryOptions {
        self.retry.get_or_insert_with(RetryOptions::default)
    }

    /// Search record, created with the default limit on first access.
    pub fn search_mut(&mut self) -> &mut SearchOptions {
        self.search.get_or_insert_with(SearchOptions::default)
    }

    /// Registry URL configured for `@scope`, if any.
    pub fn scoped_registry(&self, scope: &str) -> Option<&str> {
        self.registry_settings
            .get(&crate::registry::scope_registry_key(scope))
            .and_then(RawValue::as_str)
    }

    /// JSON view with camelCase keys.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_snapshot_serializes_to_empty_object() {
        assert_eq!(FlatOptions::new().to_json(), json!({}));
    }

    #[test]
    fn test_explicit_unset_is_serialized_as_null() {
        let flat = FlatOptions {
            script_shell: Some(None),
            ..Default::default()
        };
        assert_eq!(flat.to_json(), json!({ "scriptShell": null }));
    }

    #[test]
    fn test_camel_case_and_renamed_keys() {
        let flat = FlatOptions {
            strict_ssl: Some(false),
            save_type: Some(SaveType::PeerOptional),
            max_sockets: Some(12),
            ..Default::default()
        };
        assert_eq!(
            flat.to_json(),
            json!({ "strictSSL": false, "saveType": "peerOptional", "maxSockets": 12 })
        );
    }

    #[test]
    fn test_search_record_starts_with_default_limit() {
        let mut flat = FlatOptions::new();
        flat.search_mut().staleness = Some(5);
        assert_eq!(
            flat.to_json(),
            json!({ "search": { "limit": 20, "staleness": 5 } })
        );
    }

    #[test]
    fn test_registry_settings_are_inlined() {
        let mut flat = FlatOptions::new();
        flat.registry_settings.insert(
            "@acme:registry".to_string(),
            RawValue::from("https://npm.acme.com/"),
        );
        assert_eq!(flat.scoped_registry("@acme"), Some("https://npm.acme.com/"));
        assert_eq!(
            flat.to_json(),
            json!({ "@acme:registry": "https://npm.acme.com/" })
        );
    }
}
