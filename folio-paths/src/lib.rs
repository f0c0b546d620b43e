//! XDG Base Directory paths for folio.
//!
//! The reader client follows XDG on every platform so that config lives in
//! the same place as other command-line tools, not in platform-native
//! application-support folders.

use std::path::PathBuf;

const APP_DIR: &str = "folio";

/// Get the folio config directory.
///
/// Returns `$XDG_CONFIG_HOME/folio` if set, otherwise `~/.config/folio`.
///
/// # Examples
///
/// ```
/// use folio_paths::config_dir;
///
/// let config_file = config_dir().join("config.toml");
/// assert!(config_file.ends_with("folio/config.toml"));
/// ```
pub fn config_dir() -> PathBuf {
    resolve("XDG_CONFIG_HOME", ".config")
}

/// Get the folio data directory.
///
/// Returns `$XDG_DATA_HOME/folio` if set, otherwise `~/.local/share/folio`.
pub fn data_dir() -> PathBuf {
    resolve("XDG_DATA_HOME", ".local/share")
}

/// User config file inside [`config_dir`].
pub fn user_config_file() -> PathBuf {
    config_dir().join("config.toml")
}

fn resolve(xdg_var: &str, home_relative: &str) -> PathBuf {
    match std::env::var(xdg_var) {
        Ok(base) if !base.trim().is_empty() => PathBuf::from(base).join(APP_DIR),
        _ => match dirs::home_dir() {
            Some(home) => home.join(home_relative).join(APP_DIR),
            None => PathBuf::from(home_relative).join(APP_DIR),
        },
    }
}
