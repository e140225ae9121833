//! npmrc parsing into a raw configuration object.
//!
//! This is the thinnest possible upstream for the flatten engine: one
//! file's `key = value` lines, with `${VAR}` expansion and each value
//! coerced according to its definition's type.
//!
//! Keys such as `//registry.npmjs.org/:_authToken` are taken literally,
//! never as INI sections or comments.

use crate::definition::Definition;
use crate::definitions::Definitions;
use crate::env::Environment;
use crate::error::{Error, Result};
use crate::paths::expand_tilde;
use crate::value::{RawConfig, RawValue, ValueType};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// `${VAR}` or `${VAR?}`, with any run of backslashes in front.
static ENV_EXPR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<esc>\\*)\$\{(?P<name>[^${}?]+)(?P<mod>\?)?\}").expect("valid regex")
});

/// Parse npmrc content into a raw configuration object.
///
/// - Comments start with `#` or `;`
/// - `key[] = value` appends to a list
/// - Scoped registry and nerf-darted keys are kept as plain strings
/// - Values that do not fit the option's type are dropped with a warning
pub fn parse_npmrc(content: &str, definitions: &Definitions, env: &Environment) -> RawConfig {
    let mut raw = RawConfig::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        // Lines without = are ignored, as npm's ini parser does
        let Some(eq_pos) = line.find('=') else {
            continue;
        };
        let key = line[..eq_pos].trim();
        let value = expand_env_vars(line[eq_pos + 1..].trim(), env);

        if let Some(key) = key.strip_suffix("[]") {
            let key = expand_env_vars(key, env);
            raw.add_to_list(&key, &value);
            continue;
        }

        let key = expand_env_vars(key, env);
        if key.is_empty() {
            continue;
        }

        match definitions.get(&key) {
            Some(def) => match coerce(def, &value, env) {
                Some(coerced) => raw.set(key, coerced),
                None => warn!(key = %key, value = %value, "invalid config value, ignoring"),
            },
            None => raw.set(key, value),
        }
    }

    raw
}

/// Read and parse an npmrc file.
///
/// Returns `Ok(None)` if the file doesn't exist.
/// Returns `Err` if the file exists but can't be read.
pub fn load_npmrc(
    path: &Path,
    definitions: &Definitions,
    env: &Environment,
) -> Result<Option<RawConfig>> {
    if !path.exists() {
        debug!(path = %path.display(), "config file not found");
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| Error::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(Some(parse_npmrc(&content, definitions, env)))
}

/// Coerce a string from a config file to the option's type.
///
/// Returns `None` when the value fits none of the allowed types.
pub fn coerce(def: &Definition, value: &str, env: &Environment) -> Option<RawValue> {
    let allows = |ty: &ValueType| def.allows(ty);

    if allows(&ValueType::Null) && value == "null" {
        return Some(RawValue::Null);
    }
    if allows(&ValueType::Boolean) {
        if let Some(b) = parse_bool(value) {
            return Some(RawValue::Bool(b));
        }
    }
    if allows(&ValueType::Number) {
        if let Ok(n) = value.parse::<f64>() {
            return Some(RawValue::Number(n));
        }
    }
    let enumerated = def.types.iter().any(|t| match t {
        ValueType::OneOf(values) => values.iter().any(|v| v == value),
        _ => false,
    });
    if enumerated {
        return Some(wrap(def, value.to_string()));
    }
    if allows(&ValueType::Path) {
        let path = expand_tilde(value, env.home.as_deref());
        return Some(wrap(def, path.to_string_lossy().into_owned()));
    }
    if allows(&ValueType::Url) && url::Url::parse(value).is_ok() {
        return Some(RawValue::String(value.to_string()));
    }
    if allows(&ValueType::String) || allows(&ValueType::Date) || allows(&ValueType::Any) {
        return Some(wrap(def, value.to_string()));
    }
    None
}

/// List-typed options hold lists even when given a single value.
fn wrap(def: &Definition, value: String) -> RawValue {
    if def.allows(&ValueType::List) {
        RawValue::List(vec![value])
    } else {
        RawValue::String(value)
    }
}

/// Substitute `${VAR}` references from the environment snapshot.
///
/// An undefined `${VAR}` stays as written; an undefined `${VAR?}` becomes
/// empty. An odd number of leading backslashes escapes the reference, and
/// half of them (rounded down) are kept.
pub fn expand_env_vars(value: &str, env: &Environment) -> String {
    ENV_EXPR
        .replace_all(value, |caps: &regex::Captures| {
            let esc = caps.name("esc").map_or("", |m| m.as_str());
            let name = caps.name("name").map_or("", |m| m.as_str());
            let modifier = caps.name("mod").map_or("", |m| m.as_str());

            // An odd number of backslashes escapes the `$`
            let kept_esc = &esc[..(esc.len() / 2)];
            if esc.len() % 2 == 1 {
                return format!("{}${{{}{}}}", kept_esc, name, modifier);
            }

            let val = match env.raw_var(name) {
                Some(v) => v.to_string(),
                None if modifier == "?" => String::new(),
                None => format!("${{{}}}", name),
            };
            format!("{}{}", kept_esc, val)
        })
        .into_owned()
}

/// Case-insensitive `true`/`false`; anything else is `None`.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
