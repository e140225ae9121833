//! Documentation for every option, as shown by `npm help config`.

use crate::definitions::Definitions;

/// Render all definitions: non-deprecated first, then deprecated, each
/// group sorted by key. Blocks are separated by a blank line.
pub fn describe_all(definitions: &Definitions) -> String {
    let mut defs: Vec<_> = definitions.iter().collect();
    defs.sort_by(|a, b| {
        a.is_deprecated()
            .cmp(&b.is_deprecated())
            .then_with(|| a.key.cmp(b.key))
    });
    defs.iter()
        .map(|d| d.describe())
        .collect::<Vec<_>>()
        .join("\n\n")
}
