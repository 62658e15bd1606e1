//! Runtime configuration.
//!
//! Defaults cover a local checkout: contracts under `contracts/`, the reader
//! model under `models/roberta-base-cuad/`. A JSON file may override any
//! subset of fields; the CLI applies flag and environment overrides on top.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::document::PipelineParams;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("parsing config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReviewConfig {
    /// Directory uploaded contracts are written to and indexed from.
    pub contracts_dir: PathBuf,
    /// Directory holding `model.onnx` and `tokenizer.json` for the reader.
    pub model_dir: PathBuf,
    pub retriever_top_k: usize,
    pub reader_top_k: usize,
    /// Token budget for one question + paragraph window.
    pub max_seq_len: usize,
    /// Token overlap between consecutive windows of a long paragraph.
    pub doc_stride: usize,
    /// Longest answer span, in tokens.
    pub max_answer_len: usize,
    /// Characters of context kept either side of an answer.
    pub context_window: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            contracts_dir: PathBuf::from("contracts"),
            model_dir: PathBuf::from("models").join("roberta-base-cuad"),
            retriever_top_k: 1,
            reader_top_k: 5,
            max_seq_len: 384,
            doc_stride: 128,
            max_answer_len: 64,
            context_window: 150,
        }
    }
}

impl ReviewConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retriever_top_k == 0 || self.reader_top_k == 0 {
            return Err(ConfigError::Invalid("top_k values must be at least 1".into()));
        }
        // Half of each window is left for the question.
        if self.doc_stride >= self.max_seq_len / 2 {
            return Err(ConfigError::Invalid(format!(
                "doc_stride ({}) must be less than half of max_seq_len ({})",
                self.doc_stride, self.max_seq_len
            )));
        }
        if self.max_answer_len == 0 {
            return Err(ConfigError::Invalid("max_answer_len must be at least 1".into()));
        }
        Ok(())
    }

    pub fn pipeline_params(&self) -> PipelineParams {
        PipelineParams {
            retriever_top_k: self.retriever_top_k,
            reader_top_k: self.reader_top_k,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ReviewConfig::default();
        config.validate().unwrap();
        assert_eq!(config.contracts_dir, PathBuf::from("contracts"));
        assert_eq!(config.pipeline_params(), PipelineParams::default());
    }

    #[test]
    fn load_partial_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{"contracts_dir": "/srv/contracts", "reader_top_k": 3}"#).unwrap();

        let config = ReviewConfig::load(&path).unwrap();
        assert_eq!(config.contracts_dir, PathBuf::from("/srv/contracts"));
        assert_eq!(config.reader_top_k, 3);
        assert_eq!(config.retriever_top_k, 1);
        assert_eq!(config.max_seq_len, 384);
    }

    #[test]
    fn load_missing_file_errors() {
        let result = ReviewConfig::load(Path::new("/nonexistent/config.json"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn load_rejects_unknown_fields() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{"contract_dir": "typo"}"#).unwrap();

        assert!(matches!(ReviewConfig::load(&path), Err(ConfigError::Json(_))));
    }

    #[test]
    fn validate_rejects_stride_past_window() {
        let config = ReviewConfig {
            doc_stride: 384,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn validate_rejects_stride_over_half_window() {
        let config = ReviewConfig {
            max_seq_len: 200,
            doc_stride: 150,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn load_rejects_wide_stride() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{"max_seq_len": 200, "doc_stride": 150}"#).unwrap();

        assert!(matches!(ReviewConfig::load(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn validate_rejects_zero_top_k() {
        let config = ReviewConfig {
            reader_top_k: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
