use serde::{Serialize, Deserialize};
use std::fmt;

/// Unified error type for the entire classtrack codebase.
/// All functions should return Result<T, TrackError> instead of String errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackError {
    pub message: String,
    pub stage: String,
    pub context: Option<String>,
    pub source: Option<String>,
}

impl TrackError {
    /// Create a new error with stage and message
    pub fn new<S: Into<String>>(message: S, stage: &'static str) -> Self {
        TrackError {
            message: message.into(),
            stage: stage.to_string(),
            context: None,
            source: None,
        }
    }

    /// Add additional context information
    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add source error information
    pub fn with_source<S: Into<String>>(mut self, source: S) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.message)?;
        if let Some(ref context) = self.context {
            write!(f, " (context: {})", context)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (source: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for TrackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl From<anyhow::Error> for TrackError {
    fn from(err: anyhow::Error) -> Self {
        TrackError::new(
            err.to_string(),
            "unknown"
        ).with_source("anyhow")
    }
}

impl From<std::io::Error> for TrackError {
    fn from(err: std::io::Error) -> Self {
        TrackError::new(
            format!("I/O error: {}", err),
            "io"
        ).with_source("std::io")
    }
}

impl From<serde_json::Error> for TrackError {
    fn from(err: serde_json::Error) -> Self {
        TrackError::new(
            format!("JSON error: {}", err),
            "json_parse"
        ).with_source("serde_json")
    }
}

impl From<reqwest::Error> for TrackError {
    fn from(err: reqwest::Error) -> Self {
        TrackError::new(
            format!("HTTP error: {}", err),
            "http"
        ).with_source("reqwest")
    }
}
