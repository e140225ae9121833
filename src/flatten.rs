//! The flatten engine.
//!
//! Flattening runs in two phases over the raw object, both in its
//! iteration order:
//!
//! 1. **Normalize**: options that imply dependency-group changes (`also`,
//!    `optional`, `production`) rewrite the `include`/`omit` lists of a
//!    private copy of the raw object.
//! 2. **Flatten**: every key with a flatten rule writes into the
//!    accumulator, reading sibling values from the normalized copy. Keys
//!    without a definition are copied verbatim when they are scoped
//!    registries or per-registry settings, and dropped otherwise.
//!
//! Finally the process identity and hash algorithm are injected.

use crate::definition::FlattenContext;
use crate::definitions::Definitions;
use crate::env::Environment;
use crate::flat::FlatOptions;
use crate::registry::is_open_ended_key;
use crate::rules::HASH_ALGORITHM;
use crate::value::RawConfig;
use tracing::{debug_span, trace};

/// Resolve `also`/`optional`/`production` into the raw `include`/`omit`
/// lists. The input is left untouched.
pub fn normalize(definitions: &Definitions, raw: &RawConfig) -> RawConfig {
    let mut normalized = raw.clone();
    for (key, value) in raw.iter() {
        if let Some(normalize) = definitions.get(key).and_then(|d| d.normalize) {
            normalize(value, &mut normalized);
        }
    }
    normalized
}

/// Flatten `raw` into `flat` and return it.
pub fn flatten<'a>(
    definitions: &Definitions,
    env: &Environment,
    raw: &RawConfig,
    flat: &'a mut FlatOptions,
) -> &'a mut FlatOptions {
    let _span = debug_span!("flatten", keys = raw.len()).entered();

    let normalized = normalize(definitions, raw);
    let ctx = FlattenContext {
        raw: &normalized,
        env,
    };

    for (key, value) in raw.iter() {
        match definitions.get(key) {
            Some(def) if def.flatten.is_some() => def.flatten_into(value, &ctx, flat),
            Some(_) => trace!(key, "option has no flat form"),
            None if is_open_ended_key(key) => {
                flat.registry_settings.insert(key.to_string(), value.clone());
            }
            None => trace!(key, "dropping unrecognized config key"),
        }
    }

    flat.npm_bin = env.npm_bin.clone();
    flat.node_bin = env.node_bin();
    flat.hash_algorithm = Some(HASH_ALGORITHM.to_string());

    flat
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Platform;
    use crate::value::RawValue;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn setup() -> (Definitions, Environment) {
        let env = Environment::new(Platform::Posix)
            .with_npm_bin("/usr/lib/node_modules/npm/bin/npm-cli")
            .with_node_path("/usr/bin/node");
        (Definitions::new(&env).unwrap(), env)
    }

    #[test]
    fn test_identity_fields_always_injected() {
        let (defs, env) = setup();
        let mut flat = FlatOptions::new();
        flatten(&defs, &env, &RawConfig::new(), &mut flat);

        assert_eq!(
            flat,
            FlatOptions {
                npm_bin: Some(PathBuf::from("/usr/lib/node_modules/npm/bin/npm-cli")),
                node_bin: Some(PathBuf::from("/usr/bin/node")),
                hash_algorithm: Some("sha1".to_string()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_node_env_override() {
        let (defs, env) = setup();
        let env = env.with_var("NODE", "/custom/node");
        let mut flat = FlatOptions::new();
        flatten(&defs, &env, &RawConfig::new(), &mut flat);
        assert_eq!(flat.node_bin, Some(PathBuf::from("/custom/node")));
    }

    #[test]
    fn test_open_ended_keys_copied_verbatim() {
        let (defs, env) = setup();
        let raw = RawConfig::new()
            .with("@acme:registry", "https://npm.acme.com/")
            .with("//npm.acme.com/:_authToken", "secret")
            .with("mystery-key", "ignored")
            .with("loglevel", "silly");
        let mut flat = FlatOptions::new();
        flatten(&defs, &env, &raw, &mut flat);

        let keys: Vec<&str> = flat.registry_settings.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["@acme:registry", "//npm.acme.com/:_authToken"]);
        assert_eq!(
            flat.registry_settings.get("//npm.acme.com/:_authToken"),
            Some(&RawValue::from("secret"))
        );
    }

    #[test]
    fn test_normalize_leaves_input_untouched() {
        let (defs, _) = setup();
        let raw = RawConfig::new()
            .with("omit", vec!["dev", "optional"])
            .with("also", "development")
            .with("optional", true)
            .with("production", true);
        let before = raw.clone();

        let normalized = normalize(&defs, &raw);
        assert_eq!(raw, before);
        assert_eq!(normalized.list("include"), vec!["dev", "optional"]);
        assert_eq!(normalized.list("omit"), vec!["optional", "dev"]);
    }

    #[test]
    fn test_normalize_runs_before_flatten() {
        let (defs, env) = setup();
        // `omit` comes first, but `production` still shapes its flat value.
        let raw = RawConfig::new()
            .with("omit", Vec::<String>::new())
            .with("production", true);
        let mut flat = FlatOptions::new();
        flatten(&defs, &env, &raw, &mut flat);
        assert_eq!(flat.omit, Some(vec!["dev".to_string()]));
    }
}
