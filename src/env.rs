//! Snapshot of the process environment.
//!
//! Every default that depends on the host (editor, shell, locale, cache
//! location, network interfaces, ...) is computed from an [`Environment`]
//! value instead of reading global process state directly. Capture it once
//! with [`Environment::capture`], or build one by hand in tests.

use is_terminal::IsTerminal;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Platform family as far as config defaults are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    /// Windows, or a POSIX layer on top of it (cygwin, msys).
    Windows,
    /// Anything else.
    #[default]
    Posix,
}

impl Platform {
    /// Detect the platform from the build target and the `OSTYPE` variable.
    pub fn detect(ostype: Option<&str>) -> Self {
        if cfg!(windows) || matches!(ostype, Some("cygwin") | Some("msys")) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }

    pub fn is_windows(self) -> bool {
        self == Platform::Windows
    }
}

/// Immutable view of the environment used to compute defaults and to
/// flatten values that depend on the host.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Platform family.
    pub platform: Platform,
    /// Operating system name used in the user agent (e.g. `linux`).
    pub os: String,
    /// CPU architecture used in the user agent (e.g. `x86_64`).
    pub arch: String,
    /// User's home directory.
    pub home: Option<PathBuf>,
    /// Addresses of the host's network interfaces.
    ///
    /// `None` means enumeration failed.
    pub interfaces: Option<Vec<String>>,
    /// Whether standard output is attached to a terminal.
    pub stdout_is_tty: bool,
    /// Path of the executable that is running the package manager.
    pub npm_bin: Option<PathBuf>,
    /// Path of the `node` binary found on `PATH`.
    pub node_path: Option<PathBuf>,
    /// Version reported by that `node` binary (e.g. `v20.11.0`).
    pub node_version: Option<String>,
    vars: HashMap<String, String>,
}

impl Default for Environment {
    fn default() -> Self {
        Environment {
            platform: Platform::Posix,
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            home: None,
            interfaces: Some(Vec::new()),
            stdout_is_tty: false,
            npm_bin: None,
            node_path: None,
            node_version: None,
            vars: HashMap::new(),
        }
    }
}

impl Environment {
    /// Snapshot the running process.
    ///
    /// Never fails: every lookup that cannot be answered falls back to the
    /// most conservative value.
    pub fn capture() -> Self {
        let vars: HashMap<String, String> = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();

        let interfaces = match if_addrs::get_if_addrs() {
            Ok(ifaces) => Some(ifaces.iter().map(|i| i.ip().to_string()).collect()),
            Err(err) => {
                debug!(error = %err, "network interface enumeration failed");
                None
            }
        };

        let platform = Platform::detect(vars.get("OSTYPE").map(String::as_str));
        let node_path = which::which("node").ok();
        let node_version = node_path.as_deref().and_then(query_node_version);

        Environment {
            platform,
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            home: dirs::home_dir(),
            interfaces,
            stdout_is_tty: std::io::stdout().is_terminal(),
            npm_bin: std::env::current_exe().ok(),
            node_path,
            node_version,
            vars,
        }
    }

    /// An empty environment for the given platform.
    pub fn new(platform: Platform) -> Self {
        Environment {
            platform,
            ..Default::default()
        }
    }

    /// Set an environment variable in this snapshot.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Set the interface list; `None` simulates an enumeration failure.
    pub fn with_interfaces(mut self, interfaces: Option<Vec<String>>) -> Self {
        self.interfaces = interfaces;
        self
    }

    pub fn with_stdout_tty(mut self, is_tty: bool) -> Self {
        self.stdout_is_tty = is_tty;
        self
    }

    pub fn with_npm_bin(mut self, path: impl Into<PathBuf>) -> Self {
        self.npm_bin = Some(path.into());
        self
    }

    pub fn with_node_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.node_path = Some(path.into());
        self
    }

    pub fn with_node_version(mut self, version: impl Into<String>) -> Self {
        self.node_version = Some(version.into());
        self
    }

    /// Look up a variable. Empty values count as unset.
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Look up a variable, keeping empty values.
    pub fn raw_var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Runtime binary: `NODE` overrides the `node` found on `PATH`.
    pub fn node_bin(&self) -> Option<PathBuf> {
        self.var("NODE")
            .map(PathBuf::from)
            .or_else(|| self.node_path.clone())
    }
}

/// Ask a `node` binary for its version.
fn query_node_version(node: &Path) -> Option<String> {
    let output = match Command::new(node).arg("--version").output() {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            debug!(node = %node.display(), status = %output.status, "node --version failed");
            return None;
        }
        Err(err) => {
            debug!(node = %node.display(), error = %err, "could not run node");
            return None;
        }
    };
    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!version.is_empty()).then_some(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_platform_from_ostype() {
        assert_eq!(Platform::detect(Some("cygwin")), Platform::Windows);
        assert_eq!(Platform::detect(Some("msys")), Platform::Windows);
        if !cfg!(windows) {
            assert_eq!(Platform::detect(Some("linux-gnu")), Platform::Posix);
            assert_eq!(Platform::detect(None), Platform::Posix);
        }
    }

    #[test]
    fn test_empty_var_is_unset() {
        let env = Environment::default().with_var("EDITOR", "");
        assert_eq!(env.var("EDITOR"), None);
        assert_eq!(env.raw_var("EDITOR"), Some(""));
    }

    #[test]
    fn test_node_bin_prefers_env_override() {
        let env = Environment::default().with_node_path("/usr/bin/node");
        assert_eq!(env.node_bin(), Some(PathBuf::from("/usr/bin/node")));

        let env = env.with_var("NODE", "/opt/node/bin/node");
        assert_eq!(env.node_bin(), Some(PathBuf::from("/opt/node/bin/node")));
    }

    #[test]
    fn test_capture_does_not_panic() {
        let env = Environment::capture();
        assert!(!env.os.is_empty());
    }
}
