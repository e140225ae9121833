//! Flatten and normalize rules shared by several definitions.
//!
//! Simple one-field rules are written inline in the definition table; the
//! ones here either touch more than one flat field, read sibling raw
//! values, or are shared between options.

use crate::definition::FlattenContext;
use crate::flat::{FlatOptions, SaveType};
use crate::paths::content_store;
use crate::registry::normalize_scope;
use crate::value::{RawConfig, RawValue};
use regex::Regex;
use std::sync::LazyLock;

/// `cache-min` at or above this means "prefer the cache".
pub const PREFER_OFFLINE_THRESHOLD: f64 = 9999.0;

/// Hash algorithm used by the content-addressable cache.
pub const HASH_ALGORITHM: &str = "sha1";

// --- dependency groups ---------------------------------------------------

/// Flat `omit` derived from the raw lists: `omit` minus `include`.
pub fn effective_omit(raw: &RawConfig) -> Vec<String> {
    let include = raw.list("include");
    let mut omit = raw.list("omit");
    omit.retain(|o| !include.contains(o));
    omit
}

fn is_dev_alias(value: &RawValue) -> bool {
    matches!(value.as_str(), Some("dev" | "development"))
}

fn is_prod_alias(value: &RawValue) -> bool {
    matches!(value.as_str(), Some("prod" | "production"))
}

pub fn normalize_also(value: &RawValue, raw: &mut RawConfig) {
    if is_dev_alias(value) {
        raw.add_to_list("include", "dev");
        raw.remove_from_list("omit", "dev");
    }
}

pub fn normalize_optional(value: &RawValue, raw: &mut RawConfig) {
    match value.as_bool() {
        Some(true) => raw.add_to_list("include", "optional"),
        Some(false) => raw.add_to_list("omit", "optional"),
        None => {}
    }
}

pub fn normalize_production(value: &RawValue, raw: &mut RawConfig) {
    if value.as_bool() == Some(true) {
        raw.add_to_list("omit", "dev");
    }
}

pub fn flatten_also(_: &str, value: &RawValue, ctx: &FlattenContext<'_>, flat: &mut FlatOptions) {
    if is_dev_alias(value) {
        flat.omit = Some(effective_omit(ctx.raw));
    }
}

pub fn flatten_include(_: &str, value: &RawValue, ctx: &FlattenContext<'_>, flat: &mut FlatOptions) {
    let included = value.to_list();
    let omit = flat.omit.get_or_insert_with(|| effective_omit(ctx.raw));
    omit.retain(|o| !included.contains(o));
}

pub fn flatten_omit(_: &str, _: &RawValue, ctx: &FlattenContext<'_>, flat: &mut FlatOptions) {
    flat.omit = Some(effective_omit(ctx.raw));
}

pub fn flatten_only(_: &str, value: &RawValue, ctx: &FlattenContext<'_>, flat: &mut FlatOptions) {
    if !is_prod_alias(value) {
        return;
    }
    if ctx.raw.list("include").iter().any(|i| i == "dev") {
        return;
    }
    let omit = flat.omit.get_or_insert_with(Vec::new);
    if !omit.iter().any(|o| o == "dev") {
        omit.push("dev".to_string());
    }
}

pub fn flatten_optional(_: &str, value: &RawValue, ctx: &FlattenContext<'_>, flat: &mut FlatOptions) {
    if value.as_bool().is_some() {
        flat.omit = Some(effective_omit(ctx.raw));
    }
}

pub fn flatten_production(_: &str, value: &RawValue, ctx: &FlattenContext<'_>, flat: &mut FlatOptions) {
    if value.as_bool() == Some(true) {
        flat.omit = Some(effective_omit(ctx.raw));
    }
}

// --- cache -----------------------------------------------------------------

pub fn flatten_cache(_: &str, value: &RawValue, _: &FlattenContext<'_>, flat: &mut FlatOptions) {
    if let Some(root) = value.as_str() {
        flat.cache = Some(content_store(root));
    }
}

pub fn flatten_cache_max(_: &str, value: &RawValue, _: &FlattenContext<'_>, flat: &mut FlatOptions) {
    if value.as_f64().is_some_and(|n| n <= 0.0) {
        flat.prefer_online = Some(true);
    }
}

pub fn flatten_cache_min(_: &str, value: &RawValue, _: &FlattenContext<'_>, flat: &mut FlatOptions) {
    if value.as_f64().is_some_and(|n| n >= PREFER_OFFLINE_THRESHOLD) {
        flat.prefer_offline = Some(true);
    }
}

// --- output ----------------------------------------------------------------

/// `"always"` forces color; other truthy values need a terminal.
pub fn flatten_color(_: &str, value: &RawValue, ctx: &FlattenContext<'_>, flat: &mut FlatOptions) {
    flat.color = Some(match value {
        RawValue::String(s) if s == "always" => true,
        other => other.is_truthy() && ctx.env.stdout_is_tty,
    });
}

// --- network ---------------------------------------------------------------

pub fn flatten_noproxy(_: &str, value: &RawValue, _: &FlattenContext<'_>, flat: &mut FlatOptions) {
    flat.no_proxy = Some(value.to_list().join(","));
}

pub fn flatten_search_opts(_: &str, value: &RawValue, _: &FlattenContext<'_>, flat: &mut FlatOptions) {
    let query = value.as_str().unwrap_or_default();
    let opts = url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    flat.search_mut().opts = Some(opts);
}

static UA_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\{(npm-version|node-version|platform|arch|ci)\}").expect("valid regex")
});

/// Fill the user agent template from sibling values and the environment.
pub fn flatten_user_agent(_: &str, value: &RawValue, ctx: &FlattenContext<'_>, flat: &mut FlatOptions) {
    let template = value.as_str().unwrap_or_default();
    let sibling = |key: &str| -> String {
        ctx.raw
            .get(key)
            .and_then(RawValue::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let agent = UA_PLACEHOLDER.replace_all(template, |caps: &regex::Captures| {
        match caps[1].to_ascii_lowercase().as_str() {
            "npm-version" => sibling("npm-version"),
            "node-version" => sibling("node-version"),
            "platform" => ctx.env.os.clone(),
            "arch" => ctx.env.arch.clone(),
            _ => match sibling("ci-name").as_str() {
                "" => String::new(),
                name => format!("ci/{}", name),
            },
        }
    });
    // A placeholder that resolved to nothing leaves a bare `node/` token.
    let agent: Vec<&str> = agent
        .split_whitespace()
        .filter(|token| !token.ends_with('/'))
        .collect();
    flat.user_agent = Some(agent.join(" "));
}

// --- identity and publishing -----------------------------------------------

pub fn flatten_scope(_: &str, value: &RawValue, _: &FlattenContext<'_>, flat: &mut FlatOptions) {
    if let Some(scope) = value.as_str() {
        flat.project_scope = Some(normalize_scope(scope));
    }
}

/// Empty or missing means explicitly unset.
pub fn flatten_script_shell(_: &str, value: &RawValue, _: &FlattenContext<'_>, flat: &mut FlatOptions) {
    flat.script_shell = Some(value.as_str().filter(|s| !s.is_empty()).map(String::from));
}

/// `shrinkwrap` and `package-lock` both write `packageLock`; last one wins.
pub fn flatten_package_lock(_: &str, value: &RawValue, _: &FlattenContext<'_>, flat: &mut FlatOptions) {
    flat.package_lock = Some(value.is_truthy());
}

/// Shared by `save-prefix` and `save-exact`. Without a truthy `save-exact`
/// or a `save-prefix` string the field is left alone.
pub fn flatten_save_prefix(_: &str, _: &RawValue, ctx: &FlattenContext<'_>, flat: &mut FlatOptions) {
    if ctx.raw.is_truthy("save-exact") {
        flat.save_prefix = Some(String::new());
    } else if let Some(prefix) = ctx.raw.get("save-prefix").and_then(RawValue::as_str) {
        flat.save_prefix = Some(prefix.to_string());
    }
}

// --- save type state machine -------------------------------------------------

pub fn flatten_save_prod(_: &str, value: &RawValue, _: &FlattenContext<'_>, flat: &mut FlatOptions) {
    set_or_clear(flat, value.is_truthy(), SaveType::Prod);
}

pub fn flatten_save_dev(_: &str, value: &RawValue, _: &FlattenContext<'_>, flat: &mut FlatOptions) {
    set_or_clear(flat, value.is_truthy(), SaveType::Dev);
}

fn set_or_clear(flat: &mut FlatOptions, on: bool, target: SaveType) {
    if on {
        flat.save_type = Some(target);
    } else if flat.save_type == Some(target) {
        flat.save_type = None;
    }
}

pub fn flatten_save_peer(_: &str, value: &RawValue, _: &FlattenContext<'_>, flat: &mut FlatOptions) {
    flat.save_type = toggle_peer_optional(flat.save_type, value.is_truthy(), SaveType::Peer);
}

pub fn flatten_save_optional(_: &str, value: &RawValue, _: &FlattenContext<'_>, flat: &mut FlatOptions) {
    flat.save_type = toggle_peer_optional(flat.save_type, value.is_truthy(), SaveType::Optional);
}

/// Transition for `save-peer` / `save-optional`.
///
/// `this` is the state the option owns (peer or optional); `peerOptional`
/// is the combination of both.
fn toggle_peer_optional(current: Option<SaveType>, on: bool, this: SaveType) -> Option<SaveType> {
    let other = match this {
        SaveType::Peer => SaveType::Optional,
        _ => SaveType::Peer,
    };
    match (on, current) {
        (true, Some(SaveType::PeerOptional)) => current,
        (true, Some(state)) if state == other => Some(SaveType::PeerOptional),
        (true, _) => Some(this),
        (false, Some(SaveType::PeerOptional)) => Some(other),
        (false, Some(state)) if state == this => None,
        (false, _) => current,
    }
}

/// Bundling is incompatible with peer dependencies.
pub fn flatten_save_bundle(_: &str, value: &RawValue, ctx: &FlattenContext<'_>, flat: &mut FlatOptions) {
    flat.save_bundle = Some(value.is_truthy() && !ctx.raw.is_truthy("save-peer"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use pretty_assertions::assert_eq;

    fn run(rule: crate::definition::FlattenFn, value: RawValue, raw: &RawConfig, flat: &mut FlatOptions) {
        let env = Environment::default();
        let ctx = FlattenContext { raw, env: &env };
        rule("test", &value, &ctx, flat);
    }

    #[test]
    fn test_effective_omit_excludes_included() {
        let raw = RawConfig::new()
            .with("omit", vec!["dev", "optional"])
            .with("include", vec!["dev"]);
        assert_eq!(effective_omit(&raw), vec!["optional"]);
        assert!(effective_omit(&RawConfig::new()).is_empty());
    }

    #[test]
    fn test_toggle_peer_optional_table() {
        use SaveType::*;
        let peer = |cur, on| toggle_peer_optional(cur, on, Peer);
        let optional = |cur, on| toggle_peer_optional(cur, on, Optional);

        assert_eq!(peer(None, true), Some(Peer));
        assert_eq!(peer(Some(Optional), true), Some(PeerOptional));
        assert_eq!(peer(Some(PeerOptional), true), Some(PeerOptional));
        assert_eq!(peer(Some(Prod), true), Some(Peer));
        assert_eq!(peer(Some(PeerOptional), false), Some(Optional));
        assert_eq!(peer(Some(Peer), false), None);
        assert_eq!(peer(Some(Dev), false), Some(Dev));
        assert_eq!(peer(None, false), None);

        assert_eq!(optional(None, true), Some(Optional));
        assert_eq!(optional(Some(Peer), true), Some(PeerOptional));
        assert_eq!(optional(Some(PeerOptional), false), Some(Peer));
        assert_eq!(optional(Some(Optional), false), None);
        assert_eq!(optional(Some(Peer), false), Some(Peer));
    }

    #[test]
    fn test_user_agent_template() {
        let raw = RawConfig::new()
            .with("npm-version", "7.0.0")
            .with("node-version", "v14.8.0")
            .with("ci-name", "github-actions");
        let mut env = Environment::default();
        env.os = "linux".to_string();
        env.arch = "x86_64".to_string();
        let ctx = FlattenContext { raw: &raw, env: &env };
        let mut flat = FlatOptions::new();
        flatten_user_agent(
            "user-agent",
            &RawValue::from("npm/{npm-version} node/{NODE-VERSION} {platform} {arch} {ci}"),
            &ctx,
            &mut flat,
        );
        assert_eq!(
            flat.user_agent.as_deref(),
            Some("npm/7.0.0 node/v14.8.0 linux x86_64 ci/github-actions")
        );
    }

    #[test]
    fn test_user_agent_without_ci_is_trimmed() {
        let raw = RawConfig::new().with("npm-version", "7.0.0");
        let mut flat = FlatOptions::new();
        run(flatten_user_agent, RawValue::from("npm/{npm-version} {ci}"), &raw, &mut flat);
        assert_eq!(flat.user_agent.as_deref(), Some("npm/7.0.0"));
    }

    #[test]
    fn test_save_exact_false_alone_keeps_prefix() {
        let raw = RawConfig::new().with("save-exact", false);
        let mut flat = FlatOptions::new();
        run(flatten_save_prefix, RawValue::from(false), &raw, &mut flat);
        assert_eq!(flat.save_prefix, None);

        flat.save_prefix = Some("~".to_string());
        run(flatten_save_prefix, RawValue::from(false), &raw, &mut flat);
        assert_eq!(flat.save_prefix.as_deref(), Some("~"));
    }

    #[test]
    fn test_user_agent_drops_unresolved_version() {
        let raw = RawConfig::new().with("npm-version", "7.0.0");
        let mut env = Environment::default();
        env.os = "linux".to_string();
        env.arch = "x86_64".to_string();
        let ctx = FlattenContext { raw: &raw, env: &env };
        let mut flat = FlatOptions::new();
        flatten_user_agent(
            "user-agent",
            &RawValue::from("npm/{npm-version} node/{node-version} {platform} {arch} {ci}"),
            &ctx,
            &mut flat,
        );
        assert_eq!(flat.user_agent.as_deref(), Some("npm/7.0.0 linux x86_64"));
    }

    #[test]
    fn test_save_prefix_and_exact() {
        let raw = RawConfig::new().with("save-prefix", "~");
        let mut flat = FlatOptions::new();
        run(flatten_save_prefix, RawValue::from("~"), &raw, &mut flat);
        assert_eq!(flat.save_prefix.as_deref(), Some("~"));

        let raw = raw.with("save-exact", true);
        run(flatten_save_prefix, RawValue::from(true), &raw, &mut flat);
        assert_eq!(flat.save_prefix.as_deref(), Some(""));
    }

    #[test]
    fn test_malformed_values_are_noops() {
        let raw = RawConfig::new();
        let mut flat = FlatOptions::new();
        run(flatten_cache_max, RawValue::from("soon"), &raw, &mut flat);
        run(flatten_cache_min, RawValue::Null, &raw, &mut flat);
        run(flatten_cache, RawValue::from(42i64), &raw, &mut flat);
        run(flatten_optional, RawValue::from("yes"), &raw, &mut flat);
        run(flatten_production, RawValue::from(1i64), &raw, &mut flat);
        run(flatten_only, RawValue::from(true), &raw, &mut flat);
        run(flatten_scope, RawValue::from(true), &raw, &mut flat);
        assert_eq!(flat, FlatOptions::new());
    }
}
