//! The definition registry, shorthands and generated docs.

use npm_flat_config::{
    describe_all, Definition, Definitions, Environment, Error, FlatOptions, NpmConfig, Platform,
    RawValue, ValueType,
};

fn config() -> NpmConfig {
    NpmConfig::with_environment(Environment::new(Platform::Posix)).unwrap()
}

// =============================================================================
// Definitions
// =============================================================================

#[test]
fn test_every_key_is_unique_and_documented() {
    let config = config();
    let defs = config.definitions();
    assert!(defs.len() > 50);

    for def in defs.iter() {
        assert!(!def.key.is_empty());
        assert!(!def.types.is_empty(), "{} has no types", def.key);
        assert!(!def.description.trim().is_empty(), "{} has no description", def.key);
    }
}

#[test]
fn test_defaults_fit_declared_types() {
    let config = config();
    for def in config.definitions().iter() {
        let fits = match &def.default {
            RawValue::Null => def.allows(&ValueType::Null),
            RawValue::Bool(_) => def.allows(&ValueType::Boolean),
            RawValue::Number(_) => def.allows(&ValueType::Number),
            RawValue::List(_) => def.allows(&ValueType::List),
            RawValue::String(_) => def.types.iter().any(|t| {
                matches!(
                    t,
                    ValueType::String
                        | ValueType::Path
                        | ValueType::Url
                        | ValueType::Date
                        | ValueType::Any
                        | ValueType::OneOf(_)
                )
            }),
        };
        assert!(fits, "default of {} does not fit its types", def.key);
    }
}

#[test]
fn test_deprecated_options() {
    let config = config();
    let defs = config.definitions();
    for key in ["also", "cache-max", "cache-min", "only", "optional", "production", "shrinkwrap"] {
        assert!(defs.get(key).unwrap().is_deprecated(), "{} should be deprecated", key);
    }
    assert!(!defs.get("omit").unwrap().is_deprecated());
}

#[test]
fn test_flattened_keys_exclude_cli_only_options() {
    let config = config();
    let keys: Vec<&str> = config.definitions().flattened_keys().collect();
    assert!(keys.contains(&"registry"));
    assert!(keys.contains(&"save-dev"));
    assert!(!keys.contains(&"loglevel"));
    assert!(!keys.contains(&"usage"));
    assert!(!keys.contains(&"version"));
}

#[test]
fn test_duplicate_definition_rejected() {
    let result = Definitions::from_definitions(vec![
        Definition::new("tag", "latest", vec![ValueType::String], ""),
        Definition::new("tag", "next", vec![ValueType::String], ""),
    ]);
    match result {
        Err(Error::DuplicateDefinition(key)) => assert_eq!(key, "tag"),
        other => panic!("Expected DuplicateDefinition, got: {:?}", other),
    }
}

#[test]
fn test_custom_flatten_rule() {
    let defs = Definitions::from_definitions(vec![Definition::new(
        "offline",
        false,
        vec![ValueType::Boolean],
        "Work offline.",
    )
    .with_flatten(|_, v, _, f| f.offline = Some(v.is_truthy()))])
    .unwrap();

    let env = Environment::default();
    let raw = npm_flat_config::RawConfig::new().with("offline", true);
    let mut flat = FlatOptions::new();
    npm_flat_config::flatten(&defs, &env, &raw, &mut flat);
    assert_eq!(flat.offline, Some(true));
}

// =============================================================================
// Shorthands
// =============================================================================

#[test]
fn test_shorthands_cover_short_flags() {
    let config = config();
    let shorthands = config.shorthands();

    for def in config.definitions().iter() {
        if let Some(short) = def.short {
            assert_eq!(
                shorthands.get(&short.to_string()),
                Some(&[format!("--{}", def.key)][..])
            );
        }
    }
    assert_eq!(
        shorthands.get("dd"),
        Some(&["--loglevel".to_string(), "verbose".to_string()][..])
    );
    assert_eq!(shorthands.get("local"), Some(&["--no-global".to_string()][..]));
}

// =============================================================================
// Docs
// =============================================================================

#[test]
fn test_describe_all_blocks() {
    let config = config();
    let doc = config.describe_all();

    assert_eq!(doc.matches("#### `").count(), config.definitions().len());
    assert!(doc.starts_with("#### `access`"));
    assert!(doc.contains("#### `save-dev`\n\n* Default: false\n* Type: Boolean\n* Short: -D\n"));
    assert!(doc.contains("* DEPRECATED: "));
    assert_eq!(doc, describe_all(config.definitions()));
}

#[test]
fn test_describe_lists_marked_repeatable() {
    let doc = config().describe_all();
    assert!(doc.contains("(can be set multiple times)"));
}
