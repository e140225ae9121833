//! A single config option definition.

use crate::env::Environment;
use crate::flat::FlatOptions;
use crate::value::{RawConfig, RawValue, ValueType};

/// Read-only neighborhood handed to flatten rules.
#[derive(Debug, Clone, Copy)]
pub struct FlattenContext<'a> {
    /// The raw configuration after dependency-group normalization.
    pub raw: &'a RawConfig,
    pub env: &'a Environment,
}

/// Writes the flat form of one raw value.
///
/// Arguments: the option key, its raw value, the surrounding context, and
/// the accumulator. Rules never fail; unexpected values are no-ops.
pub type FlattenFn = fn(&str, &RawValue, &FlattenContext<'_>, &mut FlatOptions);

/// Rewrites the raw `include`/`omit` lists before flattening.
pub type NormalizeFn = fn(&RawValue, &mut RawConfig);

/// Definition of one config option.
#[derive(Clone)]
pub struct Definition {
    pub key: &'static str,
    pub default: RawValue,
    /// Union of accepted types.
    pub types: Vec<ValueType>,
    pub short: Option<char>,
    pub deprecated: Option<&'static str>,
    pub description: &'static str,
    pub normalize: Option<NormalizeFn>,
    pub flatten: Option<FlattenFn>,
}

impl std::fmt::Debug for Definition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Definition")
            .field("key", &self.key)
            .field("default", &self.default)
            .field("types", &self.types)
            .field("short", &self.short)
            .field("deprecated", &self.deprecated)
            .field("normalize", &self.normalize.is_some())
            .field("flatten", &self.flatten.is_some())
            .finish()
    }
}

impl Definition {
    pub fn new(
        key: &'static str,
        default: impl Into<RawValue>,
        types: Vec<ValueType>,
        description: &'static str,
    ) -> Self {
        Definition {
            key,
            default: default.into(),
            types,
            short: None,
            deprecated: None,
            description,
            normalize: None,
            flatten: None,
        }
    }

    pub fn with_short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn with_deprecated(mut self, note: &'static str) -> Self {
        self.deprecated = Some(note);
        self
    }

    pub fn with_flatten(mut self, flatten: FlattenFn) -> Self {
        self.flatten = Some(flatten);
        self
    }

    pub fn with_normalize(mut self, normalize: NormalizeFn) -> Self {
        self.normalize = Some(normalize);
        self
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated.is_some()
    }

    pub fn allows(&self, ty: &ValueType) -> bool {
        self.types.contains(ty)
    }

    /// Apply this option's flatten rule, if it has one.
    pub fn flatten_into(&self, value: &RawValue, ctx: &FlattenContext<'_>, flat: &mut FlatOptions) {
        if let Some(flatten) = self.flatten {
            flatten(self.key, value, ctx, flat);
        }
    }

    /// Render the documentation block for this option.
    pub fn describe(&self) -> String {
        let types: Vec<String> = self.types.iter().map(ToString::to_string).collect();

        let mut out = format!(
            "#### `{}`\n\n* Default: {}\n* Type: {}\n",
            self.key,
            self.default,
            types.join(", ")
        );
        if let Some(short) = self.short {
            out.push_str(&format!("* Short: -{}\n", short));
        }
        if let Some(note) = self.deprecated {
            out.push_str(&format!("* DEPRECATED: {}\n", note.trim()));
        }
        out.push('\n');
        out.push_str(self.description.trim());
        out
    }
}
