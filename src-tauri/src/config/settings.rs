use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use lazy_static::lazy_static;

/// Backend endpoints and notification defaults, overridable via settings.toml
/// in the app data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub parser_base_url: String,
    pub push_base_url: String,
    pub default_reminder_time: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            parser_base_url: "http://localhost:5000".to_string(),
            push_base_url: "http://localhost:5000".to_string(),
            default_reminder_time: "09:00".to_string(),
        }
    }
}

fn get_settings_path() -> PathBuf {
    // Use platform-specific app data directory
    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push("Library/Application Support/com.classtrack.app");
            dir.push("settings.toml");
            return dir;
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            let mut dir = PathBuf::from(appdata);
            dir.push("com.classtrack.app");
            dir.push("settings.toml");
            return dir;
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push(".local/share/com.classtrack.app");
            dir.push("settings.toml");
            return dir;
        }
    }

    // Fallback
    PathBuf::from("settings.toml")
}

fn load_settings_internal() -> Settings {
    let settings_path = get_settings_path();

    // Try to load from the settings file
    if let Ok(content) = fs::read_to_string(&settings_path) {
        if let Ok(settings) = toml::from_str::<Settings>(&content) {
            tracing::info!(path = ?settings_path, "Loaded settings");
            return settings;
        } else {
            tracing::warn!(path = ?settings_path, "Failed to parse settings.toml, using defaults");
        }
    }

    // Return defaults if the file doesn't exist or parsing fails
    tracing::info!("Using default settings");
    Settings::default()
}

lazy_static! {
    static ref SETTINGS: Settings = load_settings_internal();
}

/// Get the cached settings (loaded once at startup)
pub fn get_settings() -> &'static Settings {
    &SETTINGS
}
