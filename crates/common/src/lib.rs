//! Common types and utilities for azdoc
//!
//! This crate contains the resource record model, the in-memory resource
//! store, configuration, and the error type shared by the analyzer,
//! generator, and CLI components.

pub mod config;
pub mod resource;
pub mod resource_types;

pub use config::{DocConfig, InsightConfig, OutputConfig};
pub use resource::{Field, Resource, ResourceStore};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading inventory data or producing documents
#[derive(Error, Debug)]
pub enum DocError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Failed to write {}: {source}", .artifact.display())]
    Artifact {
        artifact: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DocError {
    /// Wrap an I/O failure for one output artifact
    pub fn artifact(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DocError::Artifact {
            artifact: path.into(),
            source,
        }
    }
}

/// Result type for azdoc operations
pub type Result<T> = std::result::Result<T, DocError>;

/// Finding severity, ordered `Low < Medium < High < Critical`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// All severities, most severe first
    pub const DESCENDING: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }

    /// Coloured marker used in rendered documents
    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Critical => "🔴",
            Severity::High => "🟠",
            Severity::Medium => "🟡",
            Severity::Low => "🔵",
        }
    }

    /// Parse a severity label, ignoring case
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "critical" => Some(Severity::Critical),
            "high" => Some(Severity::High),
            "medium" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);

        let mut severities = vec![Severity::Low, Severity::Critical, Severity::Medium];
        severities.sort();
        assert_eq!(
            severities,
            vec![Severity::Low, Severity::Medium, Severity::Critical]
        );
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!(Severity::parse("HIGH"), Some(Severity::High));
        assert_eq!(Severity::parse(" critical "), Some(Severity::Critical));
        assert_eq!(Severity::parse("info"), None);
    }

    #[test]
    fn test_artifact_error_names_path() {
        let err = DocError::artifact(
            "docs/diagrams/hub.drawio",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let message = err.to_string();
        assert!(message.contains("docs/diagrams/hub.drawio"));
        assert!(message.contains("denied"));
    }
}
