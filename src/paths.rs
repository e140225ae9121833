//! Path helpers shared by defaults and value coercion.

use crate::env::{Environment, Platform};
use std::path::{Path, PathBuf};

/// Subdirectory of the cache root holding the content-addressable store.
pub const CONTENT_STORE_DIR: &str = "_cacache";

/// Find the global prefix.
///
/// `PREFIX` wins. Otherwise the prefix is derived from the `node` binary:
///
/// - **Unix**: parent of parent of node (e.g. `/usr/local/bin/node` -> `/usr/local`)
/// - **Windows**: parent of node (e.g. `c:\node\node.exe` -> `c:\node`)
///
/// Returns `None` if neither is available.
pub fn global_prefix(env: &Environment) -> Option<PathBuf> {
    if let Some(prefix) = env.var("PREFIX") {
        return Some(PathBuf::from(prefix));
    }
    let node = env.node_bin()?;
    match env.platform {
        // c:\node\node.exe --> prefix=c:\node\
        Platform::Windows => node.parent().map(Path::to_path_buf),
        // /usr/local/bin/node --> prefix=/usr/local
        Platform::Posix => node.parent().and_then(Path::parent).map(Path::to_path_buf),
    }
}

/// Path to the global npmrc (`{globalPrefix}/etc/npmrc`).
pub fn global_config_path(prefix: &Path) -> PathBuf {
    prefix.join("etc").join("npmrc")
}

/// Location of the content-addressable store under a cache root.
pub fn content_store(cache_root: &str) -> PathBuf {
    Path::new(cache_root).join(CONTENT_STORE_DIR)
}

/// Expand `~` at the start of a path to `home`.
///
/// Paths are returned unchanged when there is no home directory.
pub fn expand_tilde(path: &str, home: Option<&Path>) -> PathBuf {
    match home {
        Some(home) if path == "~" => home.to_path_buf(),
        Some(home) => match path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
            Some(rest) => home.join(rest),
            None => PathBuf::from(path),
        },
        None => PathBuf::from(path),
    }
}
