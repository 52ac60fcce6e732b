use std::path::PathBuf;

use crate::error::TrackError;
use crate::state::app::AppModel;

/// Bumped when the persisted layout changes shape
const SCHEMA_VERSION: u32 = 1;

fn data_dir() -> PathBuf {
    // Test override
    if let Some(dir) = std::env::var_os("CLASSTRACK_DATA_DIR") {
        return PathBuf::from(dir);
    }

    // Use platform-specific app data directory
    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push("Library/Application Support/com.classtrack.app");
            return dir;
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            let mut dir = PathBuf::from(appdata);
            dir.push("com.classtrack.app");
            return dir;
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push(".local/share/com.classtrack.app");
            return dir;
        }
    }

    // Fallback
    PathBuf::from(".")
}

pub fn state_path() -> PathBuf {
    data_dir().join("state.json")
}

pub fn version_path() -> PathBuf {
    data_dir().join("schema_version")
}

/// Load the whole persisted state once at startup. A missing or
/// unreadable blob hydrates to defaults; it is never an error.
pub async fn load() -> AppModel {
    let path = state_path();
    match tokio::fs::read_to_string(&path).await {
        Ok(data) => match serde_json::from_str::<AppModel>(&data) {
            Ok(model) => model,
            Err(e) => {
                tracing::warn!(
                    path = ?path,
                    error = %e,
                    "Failed to parse state.json, using defaults"
                );
                AppModel::default()
            }
        },
        Err(e) => {
            tracing::debug!(
                path = ?path,
                error = %e,
                "Failed to read state.json, using defaults"
            );
            AppModel::default()
        }
    }
}

/// Serialize the entire state tree. Called after every mutation; the
/// schema marker is written alongside.
pub async fn save(model: &AppModel) -> Result<(), TrackError> {
    let path = state_path();
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| TrackError::new(
                format!("Failed to create directory: {}", e),
                "io"
            ).with_context(format!("path: {:?}", parent)))?;
    }

    let json = serde_json::to_string_pretty(model)
        .map_err(|e| TrackError::new(
            format!("Failed to serialize state: {}", e),
            "json_serialize"
        ))?;

    tokio::fs::write(&path, json)
        .await
        .map_err(|e| TrackError::new(
            format!("Failed to write state.json: {}", e),
            "io"
        ).with_context(format!("path: {:?}", path)))?;

    tokio::fs::write(version_path(), SCHEMA_VERSION.to_string())
        .await
        .map_err(|e| TrackError::new(
            format!("Failed to write schema marker: {}", e),
            "io"
        ))?;

    Ok(())
}

/// Explicit reset: remove the blob and the schema marker. Already-absent
/// files are fine.
pub async fn reset() -> Result<(), TrackError> {
    for path in [state_path(), version_path()] {
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(TrackError::new(
                    format!("Failed to remove {}: {}", path.display(), e),
                    "io"
                ));
            }
        }
    }
    Ok(())
}
