use std::path::PathBuf;
use thiserror::Error;

/// Collects field-level conversion problems for one record.
#[derive(Debug, Clone, Default)]
pub struct ErrorAccumulator(Option<String>);

impl ErrorAccumulator {
    pub fn push(&mut self, msg: &str) {
        match &mut self.0 {
            Some(existing) => {
                existing.push_str("; ");
                existing.push_str(msg);
            }
            None => {
                self.0 = Some(msg.to_string());
            }
        }
    }

    pub fn take(&mut self) -> Option<String> {
        self.0.take()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

/// Fault that makes a single game block unusable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("block has no tag pairs")]
    NoTagSection,
}

/// Fatal input-level failure; nothing can be analyzed.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("Failed to read file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to initialize zstd decoder for '{}': {source}", .path.display())]
    Decompress {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid path pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("No files match '{0}'")]
    NoInputFiles(String),

    #[error("Invalid compression value '{0}'. Supported values: 'zstd' or omitted.")]
    InvalidCompression(String),
}
