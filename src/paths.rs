//! Directory layout for band-terminal.
//!
//! - Config: `$XDG_CONFIG_HOME/band-terminal/` or `~/.config/band-terminal/`
//!   (kept under `.config` on macOS too, so `site.toml` is easy to edit)
//! - Logs:   `~/Library/Logs/band-terminal/` on macOS, XDG data dir elsewhere

use std::path::{Path, PathBuf};

const APP_NAME: &str = "band-terminal";
const CONFIG_FILE: &str = "site.toml";

/// Return the user's home directory, falling back to `/tmp` if `$HOME` is unset.
fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

pub fn config_dir() -> PathBuf {
    match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join(APP_NAME),
        _ => home_dir().join(".config").join(APP_NAME),
    }
}

/// Full path to `site.toml`.
pub fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

pub fn log_dir() -> PathBuf {
    resolve_log_dir(&home_dir())
}

#[cfg(target_os = "macos")]
fn resolve_log_dir(home: &Path) -> PathBuf {
    home.join("Library").join("Logs").join(APP_NAME)
}

#[cfg(not(target_os = "macos"))]
fn resolve_log_dir(home: &Path) -> PathBuf {
    match std::env::var("XDG_DATA_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join(APP_NAME).join("logs"),
        _ => home.join(".local").join("share").join(APP_NAME).join("logs"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_ends_with_site_toml() {
        let path = config_path();
        assert!(path.ends_with("band-terminal/site.toml"));
    }

    #[test]
    fn log_dir_is_app_scoped() {
        assert!(log_dir().to_string_lossy().contains("band-terminal"));
    }
}
