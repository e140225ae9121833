//! The definition registry.
//!
//! [`Definitions::new`] builds the table of every recognized option,
//! resolving environment-dependent defaults once from an [`Environment`].
//! The registry is immutable afterwards and can be shared freely.

use crate::defaults;
use crate::definition::Definition;
use crate::env::Environment;
use crate::error::{Error, Result};
use crate::paths::expand_tilde;
use crate::registry::DEFAULT_REGISTRY;
use crate::rules;
use crate::value::{RawConfig, RawValue, ValueType as T};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Ordered registry of option definitions.
#[derive(Debug, Clone)]
pub struct Definitions {
    defs: IndexMap<&'static str, Definition>,
}

impl Definitions {
    /// Build the built-in registry for the given environment.
    pub fn new(env: &Environment) -> Result<Self> {
        Self::from_definitions(builtin(env))
    }

    /// Build a registry from an explicit list.
    ///
    /// Fails if two definitions share a key or a short form.
    pub fn from_definitions(list: impl IntoIterator<Item = Definition>) -> Result<Self> {
        let mut defs: IndexMap<&'static str, Definition> = IndexMap::new();
        let mut shorts: HashMap<char, &'static str> = HashMap::new();

        for def in list {
            if defs.contains_key(def.key) {
                return Err(Error::DuplicateDefinition(def.key.to_string()));
            }
            if let Some(short) = def.short {
                if let Some(first) = shorts.insert(short, def.key) {
                    return Err(Error::DuplicateShort {
                        short,
                        first: first.to_string(),
                        second: def.key.to_string(),
                    });
                }
            }
            defs.insert(def.key, def);
        }

        Ok(Definitions { defs })
    }

    pub fn get(&self, key: &str) -> Option<&Definition> {
        self.defs.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.defs.contains_key(key)
    }

    /// Definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Definition> {
        self.defs.values()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Keys of the options that end up in the flat snapshot.
    pub fn flattened_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.defs.values().filter(|d| d.flatten.is_some()).map(|d| d.key)
    }

    /// The default layer as a raw configuration object.
    ///
    /// Path-typed defaults have their leading `~` expanded.
    pub fn defaults(&self, env: &Environment) -> RawConfig {
        self.iter()
            .map(|def| {
                let value = match &def.default {
                    RawValue::String(s) if def.allows(&T::Path) => RawValue::String(
                        expand_tilde(s, env.home.as_deref())
                            .to_string_lossy()
                            .into_owned(),
                    ),
                    other => other.clone(),
                };
                (def.key, value)
            })
            .collect()
    }
}

/// Allowed types for `local-address`: `null` plus every interface address.
fn local_address_types(env: &Environment) -> Vec<T> {
    let addresses: Vec<String> = defaults::local_addresses(env).into_iter().flatten().collect();
    let mut types = vec![T::Null];
    if !addresses.is_empty() {
        types.push(T::OneOf(addresses));
    }
    types
}

fn builtin(env: &Environment) -> Vec<Definition> {
    vec![
        Definition::new(
            "access",
            RawValue::Null,
            vec![T::Null, T::one_of(&["restricted", "public"])],
            "Access level of a newly published scoped package.",
        )
        .with_flatten(|_, v, _, f| f.access = v.as_str().map(String::from)),
        Definition::new(
            "all",
            false,
            vec![T::Boolean],
            "Show all outdated or installed packages, not just direct dependencies.",
        )
        .with_short('a')
        .with_flatten(|_, v, _, f| f.all = Some(v.is_truthy())),
        Definition::new(
            "also",
            RawValue::Null,
            vec![T::Null, T::one_of(&["dev", "development"])],
            "When set to `dev` or `development`, include dev dependencies.",
        )
        .with_deprecated("Please use --include=dev instead.")
        .with_normalize(rules::normalize_also)
        .with_flatten(rules::flatten_also),
        Definition::new(
            "always-auth",
            false,
            vec![T::Boolean],
            "Always send authentication, even for GET requests.",
        )
        .with_flatten(|_, v, _, f| f.always_auth = Some(v.is_truthy())),
        Definition::new(
            "audit",
            true,
            vec![T::Boolean],
            "Submit audit reports alongside installs.",
        )
        .with_flatten(|_, v, _, f| f.audit = Some(v.is_truthy())),
        Definition::new(
            "before",
            RawValue::Null,
            vec![T::Null, T::Date],
            "Only install versions published on or before this date.",
        )
        .with_flatten(|_, v, _, f| f.before = v.as_str().map(String::from)),
        Definition::new(
            "cache",
            defaults::cache(env),
            vec![T::Path],
            "The location of the package cache directory.",
        )
        .with_flatten(rules::flatten_cache),
        Definition::new(
            "cache-max",
            f64::INFINITY,
            vec![T::Number],
            "A value of 0 or less makes every request revalidate against the registry.",
        )
        .with_deprecated("The --cache-max option is deprecated. Use --prefer-online instead.")
        .with_flatten(rules::flatten_cache_max),
        Definition::new(
            "cache-min",
            0,
            vec![T::Number],
            "A value of 9999 or more makes requests prefer cached data.",
        )
        .with_deprecated("The --cache-min option is deprecated. Use --prefer-offline instead.")
        .with_flatten(rules::flatten_cache_min),
        Definition::new(
            "ci-name",
            RawValue::Null,
            vec![T::Null, T::String],
            "Name of the CI system, reported in the user agent.",
        )
        .with_flatten(|_, v, _, f| f.ci_name = v.as_str().map(String::from)),
        Definition::new(
            "color",
            defaults::color(env),
            vec![T::one_of(&["always"]), T::Boolean],
            "If false, never show colors. If \"always\", always show colors. \
             If true, show colors when output is a terminal.",
        )
        .with_flatten(rules::flatten_color),
        Definition::new(
            "description",
            true,
            vec![T::Boolean],
            "Show the description in search results.",
        )
        .with_flatten(|_, v, _, f| f.search_mut().description = Some(v.is_truthy())),
        Definition::new(
            "dry-run",
            false,
            vec![T::Boolean],
            "Report what would be done without changing anything.",
        )
        .with_flatten(|_, v, _, f| f.dry_run = Some(v.is_truthy())),
        Definition::new(
            "editor",
            defaults::editor(env),
            vec![T::String],
            "The command used to edit files.",
        )
        .with_flatten(|_, v, _, f| f.editor = v.as_str().map(String::from)),
        Definition::new(
            "fetch-retries",
            2,
            vec![T::Number],
            "Number of times to retry a failed registry request.",
        )
        .with_flatten(|_, v, _, f| {
            if let Some(n) = v.as_u64() {
                f.retry_mut().retries = Some(n);
            }
        }),
        Definition::new(
            "fetch-retry-factor",
            10,
            vec![T::Number],
            "Exponential backoff factor between retries.",
        )
        .with_flatten(|_, v, _, f| {
            if let Some(n) = v.as_f64() {
                f.retry_mut().factor = Some(n);
            }
        }),
        Definition::new(
            "fetch-retry-maxtimeout",
            60000,
            vec![T::Number],
            "Maximum time to wait between retries, in milliseconds.",
        )
        .with_flatten(|_, v, _, f| {
            if let Some(n) = v.as_u64() {
                f.retry_mut().max_timeout = Some(n);
            }
        }),
        Definition::new(
            "fetch-retry-mintimeout",
            10000,
            vec![T::Number],
            "Minimum time to wait between retries, in milliseconds.",
        )
        .with_flatten(|_, v, _, f| {
            if let Some(n) = v.as_u64() {
                f.retry_mut().min_timeout = Some(n);
            }
        }),
        Definition::new(
            "fetch-timeout",
            5 * 60 * 1000,
            vec![T::Number],
            "Maximum time to wait for a registry response, in milliseconds.",
        )
        .with_flatten(|_, v, _, f| {
            if let Some(n) = v.as_u64() {
                f.timeout = Some(n);
            }
        }),
        Definition::new(
            "force",
            false,
            vec![T::Boolean],
            "Skip safety checks that would otherwise abort the command.",
        )
        .with_short('f')
        .with_flatten(|_, v, _, f| f.force = Some(v.is_truthy())),
        Definition::new(
            "global",
            false,
            vec![T::Boolean],
            "Operate in global mode, installing into the global prefix.",
        )
        .with_short('g')
        .with_flatten(|_, v, _, f| f.global = Some(v.is_truthy())),
        Definition::new(
            "globalconfig",
            defaults::global_config(env),
            vec![T::Null, T::Path],
            "The global config file.",
        ),
        Definition::new(
            "https-proxy",
            RawValue::Null,
            vec![T::Null, T::Url],
            "Proxy used for outgoing https requests.",
        )
        .with_flatten(|_, v, _, f| f.https_proxy = v.as_str().map(String::from)),
        Definition::new(
            "ignore-scripts",
            false,
            vec![T::Boolean],
            "Do not run scripts from package.json files.",
        )
        .with_flatten(|_, v, _, f| f.ignore_scripts = Some(v.is_truthy())),
        Definition::new(
            "include",
            Vec::<String>::new(),
            vec![T::List, T::one_of(&["prod", "dev", "optional", "peer"])],
            "Dependency types to install. Takes precedence over --omit.",
        )
        .with_flatten(rules::flatten_include),
        Definition::new(
            "json",
            false,
            vec![T::Boolean],
            "Output JSON data.",
        )
        .with_flatten(|_, v, _, f| f.json = Some(v.is_truthy())),
        Definition::new(
            "legacy-peer-deps",
            false,
            vec![T::Boolean],
            "Ignore peer dependencies entirely, as npm 3 through 6 did.",
        )
        .with_flatten(|_, v, _, f| f.legacy_peer_deps = Some(v.is_truthy())),
        Definition::new(
            "local-address",
            RawValue::Null,
            local_address_types(env),
            "Local interface address to use for registry connections.",
        )
        .with_flatten(|_, v, _, f| f.local_address = v.as_str().map(String::from)),
        Definition::new(
            "loglevel",
            "notice",
            vec![T::one_of(&[
                "silent", "error", "warn", "notice", "http", "timing", "info", "verbose",
                "silly",
            ])],
            "Which level of logs to report.",
        ),
        Definition::new(
            "long",
            false,
            vec![T::Boolean],
            "Show extended information.",
        )
        .with_short('l')
        .with_flatten(|_, v, _, f| f.long = Some(v.is_truthy())),
        Definition::new(
            "maxsockets",
            50,
            vec![T::Number],
            "Maximum number of connections per origin.",
        )
        .with_flatten(|_, v, _, f| {
            if let Some(n) = v.as_u64() {
                f.max_sockets = Some(n);
            }
        }),
        Definition::new(
            "node-version",
            env.node_version.clone(),
            vec![T::Null, T::String],
            "The node version to use when checking engines.",
        ),
        Definition::new(
            "noproxy",
            "",
            vec![T::Null, T::String, T::List],
            "Comma-separated domain extensions that bypass the proxy.",
        )
        .with_flatten(rules::flatten_noproxy),
        Definition::new(
            "npm-version",
            env!("CARGO_PKG_VERSION"),
            vec![T::String],
            "The npm version reported in the user agent.",
        ),
        Definition::new(
            "offline",
            false,
            vec![T::Boolean],
            "Never hit the network; fail if data is not cached.",
        )
        .with_flatten(|_, v, _, f| f.offline = Some(v.is_truthy())),
        Definition::new(
            "omit",
            defaults::omit(env),
            vec![T::List, T::one_of(&["dev", "optional", "peer"])],
            "Dependency types to skip installing.",
        )
        .with_flatten(rules::flatten_omit),
        Definition::new(
            "only",
            RawValue::Null,
            vec![T::Null, T::one_of(&["prod", "production"])],
            "When set to `prod` or `production`, omit dev dependencies.",
        )
        .with_deprecated("Use --omit=dev to omit dev dependencies from the install.")
        .with_flatten(rules::flatten_only),
        Definition::new(
            "optional",
            RawValue::Null,
            vec![T::Null, T::Boolean],
            "Include or omit optional dependencies.",
        )
        .with_deprecated(
            "Use --omit=optional to exclude optional dependencies, \
             or --include=optional to include them.",
        )
        .with_normalize(rules::normalize_optional)
        .with_flatten(rules::flatten_optional),
        Definition::new(
            "otp",
            RawValue::Null,
            vec![T::Null, T::String],
            "One-time password from a two-factor authenticator.",
        )
        .with_flatten(|_, v, _, f| f.otp = v.as_str().map(String::from)),
        Definition::new(
            "package-lock",
            true,
            vec![T::Boolean],
            "Read and write package-lock.json.",
        )
        .with_flatten(rules::flatten_package_lock),
        Definition::new(
            "parseable",
            false,
            vec![T::Boolean],
            "Output parseable results.",
        )
        .with_short('p')
        .with_flatten(|_, v, _, f| f.parseable = Some(v.is_truthy())),
        Definition::new(
            "prefer-offline",
            false,
            vec![T::Boolean],
            "Use cached data without checking staleness.",
        )
        .with_flatten(|_, v, _, f| f.prefer_offline = Some(v.is_truthy())),
        Definition::new(
            "prefer-online",
            false,
            vec![T::Boolean],
            "Always revalidate cached data against the registry.",
        )
        .with_flatten(|_, v, _, f| f.prefer_online = Some(v.is_truthy())),
        Definition::new(
            "production",
            false,
            vec![T::Boolean],
            "Omit dev dependencies.",
        )
        .with_deprecated("Use --omit=dev instead.")
        .with_normalize(rules::normalize_production)
        .with_flatten(rules::flatten_production),
        Definition::new(
            "proxy",
            RawValue::Null,
            vec![T::Null, T::Boolean, T::Url],
            "Proxy used for outgoing http requests.",
        )
        .with_flatten(|_, v, _, f| f.proxy = v.as_str().map(String::from)),
        Definition::new(
            "read-only",
            false,
            vec![T::Boolean],
            "Create read-only tokens.",
        )
        .with_flatten(|_, v, _, f| f.read_only = Some(v.is_truthy())),
        Definition::new(
            "registry",
            DEFAULT_REGISTRY,
            vec![T::Url],
            "The base URL of the npm registry.",
        )
        .with_flatten(|_, v, _, f| f.registry = v.as_str().map(String::from)),
        Definition::new(
            "save",
            true,
            vec![T::Boolean],
            "Save installed packages to package.json.",
        )
        .with_short('S')
        .with_flatten(|_, v, _, f| f.save = Some(v.is_truthy())),
        Definition::new(
            "save-bundle",
            false,
            vec![T::Boolean],
            "Also save installed packages to bundleDependencies. Ignored with --save-peer.",
        )
        .with_short('B')
        .with_flatten(rules::flatten_save_bundle),
        Definition::new(
            "save-dev",
            false,
            vec![T::Boolean],
            "Save installed packages to devDependencies.",
        )
        .with_short('D')
        .with_flatten(rules::flatten_save_dev),
        Definition::new(
            "save-exact",
            false,
            vec![T::Boolean],
            "Save exact versions instead of ranges.",
        )
        .with_short('E')
        .with_flatten(rules::flatten_save_prefix),
        Definition::new(
            "save-optional",
            false,
            vec![T::Boolean],
            "Save installed packages to optionalDependencies.",
        )
        .with_short('O')
        .with_flatten(rules::flatten_save_optional),
        Definition::new(
            "save-peer",
            false,
            vec![T::Boolean],
            "Save installed packages to peerDependencies.",
        )
        .with_flatten(rules::flatten_save_peer),
        Definition::new(
            "save-prefix",
            "^",
            vec![T::String],
            "Range operator prefixed to saved versions.",
        )
        .with_flatten(rules::flatten_save_prefix),
        Definition::new(
            "save-prod",
            false,
            vec![T::Boolean],
            "Save installed packages to dependencies.",
        )
        .with_short('P')
        .with_flatten(rules::flatten_save_prod),
        Definition::new(
            "scope",
            "",
            vec![T::String],
            "Scope of the current project, applied to init and login.",
        )
        .with_flatten(rules::flatten_scope),
        Definition::new(
            "script-shell",
            RawValue::Null,
            vec![T::Null, T::String],
            "Shell used to run package scripts.",
        )
        .with_flatten(rules::flatten_script_shell),
        Definition::new(
            "searchexclude",
            "",
            vec![T::Null, T::String],
            "Space-separated terms to exclude from search results.",
        )
        .with_flatten(|_, v, _, f| f.search_mut().exclude = v.as_str().map(String::from)),
        Definition::new(
            "searchlimit",
            20,
            vec![T::Number],
            "Number of items to limit search results to.",
        )
        .with_flatten(|_, v, _, f| {
            if let Some(n) = v.as_u64() {
                f.search_mut().limit = n;
            }
        }),
        Definition::new(
            "searchopts",
            "",
            vec![T::String],
            "Query string of options passed to the search endpoint.",
        )
        .with_flatten(rules::flatten_search_opts),
        Definition::new(
            "searchstaleness",
            900,
            vec![T::Number],
            "Age of the cached search metadata, in seconds, before it is refreshed.",
        )
        .with_flatten(|_, v, _, f| {
            if let Some(n) = v.as_u64() {
                f.search_mut().staleness = Some(n);
            }
        }),
        Definition::new(
            "shell",
            defaults::shell(env),
            vec![T::String],
            "Shell used by npm exec and npm explore.",
        )
        .with_flatten(|_, v, _, f| f.shell = v.as_str().map(String::from)),
        Definition::new(
            "shrinkwrap",
            true,
            vec![T::Boolean],
            "Alias for --package-lock.",
        )
        .with_deprecated("Use the --package-lock setting instead.")
        .with_flatten(rules::flatten_package_lock),
        Definition::new(
            "strict-ssl",
            true,
            vec![T::Boolean],
            "Validate TLS certificates of the registry.",
        )
        .with_flatten(|_, v, _, f| f.strict_ssl = Some(v.is_truthy())),
        Definition::new(
            "tag",
            "latest",
            vec![T::String],
            "Dist-tag installed when no version is given, and applied on publish.",
        )
        .with_flatten(|_, v, _, f| f.default_tag = v.as_str().map(String::from)),
        Definition::new(
            "unicode",
            defaults::unicode(env),
            vec![T::Boolean],
            "Use unicode characters in tree output.",
        )
        .with_flatten(|_, v, _, f| f.unicode = Some(v.is_truthy())),
        Definition::new(
            "usage",
            false,
            vec![T::Boolean],
            "Show short usage output about the command.",
        )
        .with_short('h'),
        Definition::new(
            "user-agent",
            "npm/{npm-version} node/{node-version} {platform} {arch} {ci}",
            vec![T::String],
            "User-Agent header sent with registry requests.",
        )
        .with_flatten(rules::flatten_user_agent),
        Definition::new(
            "userconfig",
            "~/.npmrc",
            vec![T::Path],
            "The user-level config file.",
        ),
        Definition::new(
            "version",
            false,
            vec![T::Boolean],
            "Print the npm version and exit.",
        )
        .with_short('v'),
        Definition::new(
            "yes",
            RawValue::Null,
            vec![T::Null, T::Boolean],
            "Answer yes to any prompt. --no-yes answers no.",
        )
        .with_short('y')
        .with_flatten(|_, v, _, f| f.yes = v.as_bool()),
    ]
}
