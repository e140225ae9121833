//! npm configuration definitions and flattening.
//!
//! This crate turns a merged raw npm configuration (CLI flags, environment
//! and npmrc files, already layered by the caller) into one typed
//! snapshot, [`FlatOptions`], that the rest of a package manager reads.
//!
//! - A **definition registry** of every recognized option: type, default,
//!   short flag, description and flatten rule
//! - **Environment-derived defaults** (editor, shell, unicode, cache dir,
//!   local addresses, color), computed once from an [`Environment`] snapshot
//! - A **flatten engine** that runs each option's rule in raw-object order
//! - The CLI **shorthand table** and sorted **documentation**
//!
//! # Quick Start
//!
//! ```
//! use npm_flat_config::{Environment, NpmConfig, Platform, RawConfig, SaveType};
//!
//! let config = NpmConfig::with_environment(Environment::new(Platform::Posix)).unwrap();
//!
//! let raw = RawConfig::new()
//!     .with("save-peer", true)
//!     .with("save-optional", true)
//!     .with("@myorg:registry", "https://npm.myorg.com/");
//! let flat = config.flatten(&raw);
//!
//! assert_eq!(flat.save_type, Some(SaveType::PeerOptional));
//! assert_eq!(flat.scoped_registry("@myorg"), Some("https://npm.myorg.com/"));
//! assert_eq!(flat.hash_algorithm.as_deref(), Some("sha1"));
//! ```
//!
//! # Flattening order
//!
//! Rules run in the raw object's insertion order, so later keys win where
//! two options write the same flat field:
//!
//! ```text
//! shrinkwrap = false
//! package-lock = true   →  packageLock: true
//! ```
//!
//! Dependency-group options (`also`, `optional`, `production`) are resolved
//! into the `include`/`omit` lists before any rule runs, so the flat
//! `omit` list never contains an entry that is also included.

mod config;
pub mod defaults;
mod definition;
mod definitions;
mod describe;
mod env;
mod error;
mod flat;
mod flatten;
mod parser;
mod paths;
pub mod registry;
pub mod rules;
mod shorthands;
mod value;

// Re-export main types
pub use config::NpmConfig;
pub use definition::{Definition, FlattenContext, FlattenFn, NormalizeFn};
pub use definitions::Definitions;
pub use describe::describe_all;
pub use env::{Environment, Platform};
pub use error::{Error, Result};
pub use flat::{FlatOptions, RetryOptions, SaveType, SearchOptions, DEFAULT_SEARCH_LIMIT};
pub use flatten::{flatten, normalize};
pub use parser::{coerce, expand_env_vars, load_npmrc, parse_bool, parse_npmrc};
pub use paths::{content_store, expand_tilde, global_config_path, global_prefix, CONTENT_STORE_DIR};
pub use shorthands::Shorthands;
pub use value::{RawConfig, RawValue, ValueType};
