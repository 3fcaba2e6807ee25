//! Pipeline configuration
//!
//! Loaded from a TOML file or built in code; every field has a default so an
//! empty file (or none at all) yields a working pipeline.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::edi::Delimiters;
use crate::pipeline::retry::RetryPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Submission retry policy
    #[serde(default)]
    pub retry: RetryPolicy,
    /// Emit per-stage progress logs
    #[serde(default = "default_logging")]
    pub logging: bool,
    /// Interchange delimiters
    #[serde(default)]
    pub delimiters: Delimiters,
}

fn default_logging() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            logging: default_logging(),
            delimiters: Delimiters::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("invalid pipeline config in {}", path.display()))
    }
}
