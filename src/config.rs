//! The configuration facade.
//!
//! [`NpmConfig`] bundles the environment snapshot, the definition registry
//! and the shorthand table, all built once per process.

use crate::definitions::Definitions;
use crate::describe::describe_all;
use crate::env::Environment;
use crate::error::Result;
use crate::flat::FlatOptions;
use crate::flatten;
use crate::parser;
use crate::shorthands::Shorthands;
use crate::value::RawConfig;
use std::path::Path;

/// npm configuration definitions bound to one environment.
///
/// # Examples
///
/// ```
/// use npm_flat_config::{Environment, NpmConfig, Platform, RawConfig};
///
/// let config = NpmConfig::with_environment(Environment::new(Platform::Posix))?;
///
/// let raw = RawConfig::new()
///     .with("scope", "myorg")
///     .with("save-dev", true);
/// let flat = config.flatten(&raw);
///
/// assert_eq!(flat.project_scope.as_deref(), Some("@myorg"));
/// # Ok::<(), npm_flat_config::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct NpmConfig {
    env: Environment,
    definitions: Definitions,
    shorthands: Shorthands,
}

impl NpmConfig {
    /// Snapshot the running process and build the registry from it.
    pub fn load() -> Result<Self> {
        Self::with_environment(Environment::capture())
    }

    /// Build the registry from an explicit environment snapshot.
    pub fn with_environment(env: Environment) -> Result<Self> {
        let definitions = Definitions::new(&env)?;
        let shorthands = Shorthands::new(&definitions)?;
        Ok(NpmConfig {
            env,
            definitions,
            shorthands,
        })
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    pub fn shorthands(&self) -> &Shorthands {
        &self.shorthands
    }

    /// The default layer, suitable as the base of a merged raw object.
    pub fn defaults(&self) -> RawConfig {
        self.definitions.defaults(&self.env)
    }

    /// Parse npmrc content into a raw configuration object.
    pub fn parse_npmrc(&self, content: &str) -> RawConfig {
        parser::parse_npmrc(content, &self.definitions, &self.env)
    }

    /// Read and parse an npmrc file. A missing file gives `Ok(None)`.
    pub fn load_npmrc(&self, path: &Path) -> Result<Option<RawConfig>> {
        parser::load_npmrc(path, &self.definitions, &self.env)
    }

    /// Flatten `raw` into a fresh snapshot.
    pub fn flatten(&self, raw: &RawConfig) -> FlatOptions {
        let mut flat = FlatOptions::new();
        self.flatten_into(raw, &mut flat);
        flat
    }

    /// Flatten `raw` into an existing accumulator.
    pub fn flatten_into<'a>(&self, raw: &RawConfig, flat: &'a mut FlatOptions) -> &'a mut FlatOptions {
        flatten::flatten(&self.definitions, &self.env, raw, flat)
    }

    /// Documentation for every option.
    pub fn describe_all(&self) -> String {
        describe_all(&self.definitions)
    }
}
