//! CLI shorthand expansions.
//!
//! These are only expanded by the argument parser; they are not valid in
//! npmrc files or the environment.

use crate::definitions::Definitions;
use crate::error::{Error, Result};
use indexmap::IndexMap;

/// Aliases that expand into something other than a plain `--<key>`.
const STATIC_SHORTHANDS: &[(&str, &[&str])] = &[
    ("enjoy-by", &["--before"]),
    ("d", &["--loglevel", "info"]),
    ("dd", &["--loglevel", "verbose"]),
    ("ddd", &["--loglevel", "silly"]),
    ("quiet", &["--loglevel", "warn"]),
    ("q", &["--loglevel", "warn"]),
    ("s", &["--loglevel", "silent"]),
    ("silent", &["--loglevel", "silent"]),
    ("verbose", &["--loglevel", "verbose"]),
    ("desc", &["--description"]),
    ("help", &["--usage"]),
    ("local", &["--no-global"]),
    ("n", &["--no-yes"]),
    ("no", &["--no-yes"]),
    ("porcelain", &["--parseable"]),
    ("readonly", &["--read-only"]),
    ("reg", &["--registry"]),
];

/// Token → expansion table used by the argument parser.
#[derive(Debug, Clone)]
pub struct Shorthands {
    table: IndexMap<String, Vec<String>>,
}

impl Shorthands {
    /// Static aliases plus `-<short>` → `--<key>` for every definition
    /// with a short form.
    pub fn new(definitions: &Definitions) -> Result<Self> {
        let mut table: IndexMap<String, Vec<String>> = STATIC_SHORTHANDS
            .iter()
            .map(|(alias, expansion)| {
                (
                    alias.to_string(),
                    expansion.iter().map(|s| s.to_string()).collect(),
                )
            })
            .collect();

        for def in definitions.iter() {
            let Some(short) = def.short else { continue };
            let token = short.to_string();
            if table.contains_key(&token) {
                return Err(Error::ShorthandCollision {
                    short,
                    key: def.key.to_string(),
                });
            }
            table.insert(token, vec![format!("--{}", def.key)]);
        }

        Ok(Shorthands { table })
    }

    /// Expansion for `token`, without its leading dashes.
    pub fn get(&self, token: &str) -> Option<&[String]> {
        self.table.get(token).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.table.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Definition;
    use crate::env::Environment;
    use crate::value::ValueType;

    #[test]
    fn test_static_entries() {
        let defs = Definitions::new(&Environment::default()).unwrap();
        let shorthands = Shorthands::new(&defs).unwrap();

        assert_eq!(
            shorthands.get("quiet"),
            Some(&["--loglevel".to_string(), "warn".to_string()][..])
        );
        assert_eq!(shorthands.get("reg"), Some(&["--registry".to_string()][..]));
        assert_eq!(shorthands.get("nope"), None);
    }

    #[test]
    fn test_derived_entries() {
        let defs = Definitions::new(&Environment::default()).unwrap();
        let shorthands = Shorthands::new(&defs).unwrap();

        assert_eq!(shorthands.get("g"), Some(&["--global".to_string()][..]));
        assert_eq!(shorthands.get("D"), Some(&["--save-dev".to_string()][..]));
        assert_eq!(
            shorthands.len(),
            STATIC_SHORTHANDS.len() + defs.iter().filter(|d| d.short.is_some()).count()
        );
    }

    #[test]
    fn test_collision_with_static_alias() {
        let defs = Definitions::from_definitions(vec![Definition::new(
            "dry-run",
            false,
            vec![ValueType::Boolean],
            "",
        )
        .with_short('d')])
        .unwrap();

        match Shorthands::new(&defs) {
            Err(Error::ShorthandCollision { short, key }) => {
                assert_eq!(short, 'd');
                assert_eq!(key, "dry-run");
            }
            other => panic!("Expected ShorthandCollision, got: {:?}", other),
        }
    }
}
