//! Environment-dependent defaults.
//!
//! Each resolver reads only the [`Environment`] snapshot and never fails.
//! They run once while the definition registry is built.

use crate::env::Environment;
use crate::paths::{global_config_path, global_prefix};
use crate::value::RawValue;
use regex::Regex;
use std::sync::LazyLock;

static UTF8_LOCALE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)UTF-?8$").expect("valid regex"));

/// Locale variables in the order they take precedence.
const LOCALE_VARS: [&str; 3] = ["LC_ALL", "LC_CTYPE", "LANG"];

/// `EDITOR`, then `VISUAL`, then the platform's stock editor.
pub fn editor(env: &Environment) -> String {
    env.var("EDITOR")
        .or_else(|| env.var("VISUAL"))
        .map(String::from)
        .unwrap_or_else(|| {
            if env.platform.is_windows() {
                "notepad.exe".to_string()
            } else {
                "vi".to_string()
            }
        })
}

/// `ComSpec` (or `cmd`) on Windows, `SHELL` (or `sh`) elsewhere.
pub fn shell(env: &Environment) -> String {
    if env.platform.is_windows() {
        env.var("ComSpec").unwrap_or("cmd").to_string()
    } else {
        env.var("SHELL").unwrap_or("sh").to_string()
    }
}

/// The first locale variable that is set decides; none set means unicode.
pub fn unicode(env: &Environment) -> bool {
    LOCALE_VARS
        .iter()
        .find_map(|name| env.var(name))
        .map_or(true, |locale| UTF8_LOCALE.is_match(locale))
}

/// Cache root, kept with its leading `~` so docs show the portable form.
pub fn cache(env: &Environment) -> String {
    if env.platform.is_windows() {
        let root = env.var("LOCALAPPDATA").unwrap_or("~");
        format!("{}/npm-cache", root)
    } else {
        "~/.npm".to_string()
    }
}

/// Addresses a request may bind to: `null` plus every interface address.
pub fn local_addresses(env: &Environment) -> Vec<Option<String>> {
    let mut allowed = vec![None];
    if let Some(interfaces) = &env.interfaces {
        allowed.extend(interfaces.iter().cloned().map(Some));
    }
    allowed
}

/// Colors are on unless `NO_COLOR` is set to something other than `0`.
pub fn color(env: &Environment) -> bool {
    match env.var("NO_COLOR") {
        None => true,
        Some(value) => value == "0",
    }
}

/// Omit dev dependencies when `NODE_ENV=production`.
pub fn omit(env: &Environment) -> Vec<String> {
    if env.var("NODE_ENV") == Some("production") {
        vec!["dev".to_string()]
    } else {
        Vec::new()
    }
}

/// `{globalPrefix}/etc/npmrc`, or `null` when no prefix can be found.
pub fn global_config(env: &Environment) -> RawValue {
    global_prefix(env)
        .map(|prefix| global_config_path(&prefix).to_string_lossy().into_owned())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Platform;

    fn posix() -> Environment {
        Environment::new(Platform::Posix)
    }

    fn windows() -> Environment {
        Environment::new(Platform::Windows)
    }

    #[test]
    fn test_editor_prefers_editor_then_visual() {
        let env = posix().with_var("EDITOR", "vim").with_var("VISUAL", "mate");
        assert_eq!(editor(&env), "vim");

        let env = posix().with_var("VISUAL", "mate");
        assert_eq!(editor(&env), "mate");
    }

    #[test]
    fn test_editor_platform_fallback() {
        assert_eq!(editor(&windows()), "notepad.exe");
        assert_eq!(editor(&posix()), "vi");
    }

    #[test]
    fn test_shell_windows() {
        assert_eq!(shell(&windows().with_var("ComSpec", "command.com")), "command.com");
        assert_eq!(shell(&windows()), "cmd");
    }

    #[test]
    fn test_shell_posix() {
        assert_eq!(
            shell(&posix().with_var("SHELL", "/usr/local/bin/bash")),
            "/usr/local/bin/bash"
        );
        assert_eq!(shell(&posix()), "sh");
    }

    #[test]
    fn test_unicode_lc_all_decides() {
        let env = posix()
            .with_var("LC_ALL", "utf8")
            .with_var("LC_CTYPE", "UTF-8")
            .with_var("LANG", "Unicode utf-8");
        assert!(unicode(&env));

        let env = posix()
            .with_var("LC_ALL", "no unicode for youUUUU!")
            .with_var("LC_CTYPE", "UTF-8")
            .with_var("LANG", "Unicode utf-8");
        assert!(!unicode(&env));
    }

    #[test]
    fn test_unicode_falls_through_to_lc_ctype_and_lang() {
        let env = posix().with_var("LC_CTYPE", "UTF-8").with_var("LANG", "C");
        assert!(unicode(&env));

        let env = posix()
            .with_var("LC_CTYPE", "something other than unicode version 8")
            .with_var("LANG", "en_US.UTF-8");
        assert!(!unicode(&env));

        assert!(unicode(&posix().with_var("LANG", "en_US.UTF-8")));
        assert!(!unicode(&posix().with_var("LANG", "ISO-8859-1")));
    }

    #[test]
    fn test_unicode_defaults_to_true() {
        assert!(unicode(&posix()));
    }

    #[test]
    fn test_cache_windows() {
        let env = windows().with_var("LOCALAPPDATA", "app/data/local");
        assert_eq!(cache(&env), "app/data/local/npm-cache");
        assert_eq!(cache(&windows()), "~/npm-cache");
    }

    #[test]
    fn test_cache_posix_ignores_localappdata() {
        assert_eq!(cache(&posix()), "~/.npm");
        assert_eq!(cache(&posix().with_var("LOCALAPPDATA", "app/data/local")), "~/.npm");
    }

    #[test]
    fn test_local_addresses() {
        let env = posix().with_interfaces(Some(vec![
            "127.0.0.1".to_string(),
            "no place like home".to_string(),
        ]));
        assert_eq!(
            local_addresses(&env),
            vec![
                None,
                Some("127.0.0.1".to_string()),
                Some("no place like home".to_string())
            ]
        );
    }

    #[test]
    fn test_local_addresses_enumeration_failure() {
        let env = posix().with_interfaces(None);
        assert_eq!(local_addresses(&env), vec![None]);
    }

    #[test]
    fn test_color() {
        assert!(color(&posix()));
        assert!(color(&posix().with_var("NO_COLOR", "0")));
        assert!(color(&posix().with_var("NO_COLOR", "")));
        assert!(!color(&posix().with_var("NO_COLOR", "1")));
    }

    #[test]
    fn test_omit_in_production() {
        assert!(omit(&posix()).is_empty());
        assert_eq!(omit(&posix().with_var("NODE_ENV", "production")), vec!["dev"]);
    }

    #[test]
    fn test_global_config() {
        let env = posix().with_node_path("/usr/local/bin/node");
        assert_eq!(
            global_config(&env),
            RawValue::from(
                global_config_path(std::path::Path::new("/usr/local"))
                    .to_string_lossy()
                    .into_owned()
            )
        );
        assert_eq!(global_config(&posix()), RawValue::Null);
    }
}
