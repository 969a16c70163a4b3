//! Errors raised while loading posts

use std::path::PathBuf;
use thiserror::Error;

use super::frontmatter::FrontMatterError;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Post not found")]
    NotFound { slug: String },

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse front-matter of {slug}: {source}")]
    FrontMatter {
        slug: String,
        #[source]
        source: FrontMatterError,
    },

    #[error("Invalid metadata for {slug}: {source}")]
    Validation {
        slug: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ContentError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentError::NotFound { .. })
    }
}
