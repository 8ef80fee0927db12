//! Configuration loading from YAML files
//!
//! Every component receives its settings through [`DocConfig`]; nothing
//! below the CLI layer reads flags or environment variables directly.

use crate::{DocError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root structure of `azdoc.yaml`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DocConfig {
    /// Display name used in document headers
    pub subscription_name: Option<String>,
    /// Tags every resource is expected to carry
    pub required_tags: Vec<String>,
    /// Output locations
    pub output: OutputConfig,
    /// Narrative/insight service settings
    pub insight: InsightConfig,
}

/// Where generated artifacts are written
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub markdown_name: String,
    /// Whether diagrams are generated at all
    pub diagrams: bool,
    /// Diagram directory, relative to `dir`
    pub diagrams_dir: PathBuf,
    /// Topology graph file name, relative to `dir`
    pub graph_name: String,
}

/// Text-generation service used for narrative sections and diagram hints
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InsightConfig {
    pub enabled: bool,
    pub model: String,
    /// OpenAI-compatible chat completions endpoint
    pub endpoint: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for DocConfig {
    fn default() -> Self {
        Self {
            subscription_name: None,
            required_tags: default_required_tags(),
            output: OutputConfig::default(),
            insight: InsightConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./docs"),
            markdown_name: "SUBSCRIPTION.md".to_string(),
            diagrams: true,
            diagrams_dir: PathBuf::from("diagrams"),
            graph_name: "graph.json".to_string(),
        }
    }
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: "gpt-4o-mini".to_string(),
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_tokens: 2000,
            timeout_secs: 60,
        }
    }
}

/// The four canonical governance tags
pub fn default_required_tags() -> Vec<String> {
    ["environment", "owner", "cost-center", "application"]
        .iter()
        .map(|t| t.to_string())
        .collect()
}

impl DocConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DocError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        Self::from_yaml_str(&content)
            .map_err(|e| DocError::Config(format!("Invalid config in {:?}: {}", path, e)))
    }

    /// Parse configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: DocConfig =
            serde_yaml::from_str(content).map_err(|e| DocError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("No config file at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if self.required_tags.iter().any(|t| t.trim().is_empty()) {
            return Err(DocError::Config(
                "required_tags must not contain empty names".to_string(),
            ));
        }
        if self.output.markdown_name.trim().is_empty() {
            return Err(DocError::Config(
                "output.markdown_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn markdown_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.markdown_name)
    }

    pub fn diagrams_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.diagrams_dir)
    }

    pub fn graph_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.graph_name)
    }
}
