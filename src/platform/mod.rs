// Topicmarks platform paths
// Config and data directories per OS, selected with `cfg(target_os)`.
//
// `TOPICMARKS_DATA_DIR` replaces the data directory and `TOPICMARKS_CONFIG`
// replaces the settings file path outright.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "topicmarks";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "TOPICMARKS_DATA_DIR";
/// Environment variable overriding the settings file path.
pub const CONFIG_ENV: &str = "TOPICMARKS_CONFIG";

fn home_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    let var = "USERPROFILE";
    #[cfg(not(target_os = "windows"))]
    let var = "HOME";
    PathBuf::from(env::var(var).unwrap_or_else(|_| env::temp_dir().to_string_lossy().to_string()))
}

/// Returns the configuration directory for Topicmarks.
///
/// - **Linux**: `$XDG_CONFIG_HOME/topicmarks` or `~/.config/topicmarks`
/// - **macOS**: `~/Library/Application Support/Topicmarks`
/// - **Windows**: `%APPDATA%/Topicmarks`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        home_dir()
            .join("Library")
            .join("Application Support")
            .join("Topicmarks")
    }
    #[cfg(target_os = "windows")]
    {
        match env::var("APPDATA") {
            Ok(appdata) => PathBuf::from(appdata).join("Topicmarks"),
            Err(_) => home_dir().join("AppData").join("Roaming").join("Topicmarks"),
        }
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        match env::var("XDG_CONFIG_HOME") {
            Ok(xdg) => PathBuf::from(xdg).join(APP_DIR),
            Err(_) => home_dir().join(".config").join(APP_DIR),
        }
    }
}

/// Returns the data directory for Topicmarks, honoring `TOPICMARKS_DATA_DIR`.
///
/// - **Linux**: `$XDG_DATA_HOME/topicmarks` or `~/.local/share/topicmarks`
/// - **macOS**: `~/Library/Application Support/Topicmarks`
/// - **Windows**: `%APPDATA%/Topicmarks`
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    #[cfg(any(target_os = "macos", target_os = "windows"))]
    {
        get_config_dir()
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        match env::var("XDG_DATA_HOME") {
            Ok(xdg) => PathBuf::from(xdg).join(APP_DIR),
            Err(_) => home_dir().join(".local").join("share").join(APP_DIR),
        }
    }
}

/// Settings file location, honoring `TOPICMARKS_CONFIG`.
pub fn get_settings_path() -> PathBuf {
    match env::var(CONFIG_ENV) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => get_config_dir().join("settings.json"),
    }
}

/// Database file inside the data directory.
pub fn get_database_path() -> PathBuf {
    get_data_dir().join("topicmarks.db")
}
