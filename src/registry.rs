//! Registry-related keys that live outside the closed definition set.
//!
//! Scoped registries (`@scope:registry`) and per-registry settings keyed by
//! a nerf-darted URL (`//registry.example.com/:_authToken`) are open-ended:
//! any number of them may appear, so they are matched by pattern when a
//! key has no definition.

use regex::Regex;
use std::sync::LazyLock;

/// The default npm registry URL.
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org/";

static SCOPED_REGISTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)@.*:registry$").expect("valid regex"));

/// Does `key` name a scoped registry, e.g. `@myorg:registry`?
///
/// # Examples
///
/// ```
/// use npm_flat_config::registry::is_scoped_registry_key;
///
/// assert!(is_scoped_registry_key("@myorg:registry"));
/// assert!(is_scoped_registry_key("@MyOrg:REGISTRY"));
/// assert!(!is_scoped_registry_key("registry"));
/// ```
pub fn is_scoped_registry_key(key: &str) -> bool {
    SCOPED_REGISTRY.is_match(key)
}

/// Does `key` hold a per-registry setting, e.g. `//host/:_authToken`?
pub fn is_registry_setting_key(key: &str) -> bool {
    key.starts_with("//")
}

/// Keys that are copied verbatim into the flat snapshot.
pub fn is_open_ended_key(key: &str) -> bool {
    is_scoped_registry_key(key) || is_registry_setting_key(key)
}

/// Build the config key for a scoped registry.
///
/// # Examples
///
/// ```
/// use npm_flat_config::registry::scope_registry_key;
///
/// assert_eq!(scope_registry_key("@myorg"), "@myorg:registry");
/// ```
pub fn scope_registry_key(scope: &str) -> String {
    format!("{}:registry", scope)
}

/// Prefix `scope` with `@` unless it already has one. Empty stays empty.
pub fn normalize_scope(scope: &str) -> String {
    if scope.is_empty() || scope.starts_with('@') {
        scope.to_string()
    } else {
        format!("@{}", scope)
    }
}
