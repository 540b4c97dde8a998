//! Errors raised while loading an AST document.

use std::path::PathBuf;
use thiserror::Error;

/// An error that occurred while loading a serialized AST.
#[derive(Debug, Error)]
pub enum AstError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The path that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON or does not match the AST shape.
    #[error("invalid AST document: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = AstError::Io {
            path: PathBuf::from("Card.svelte.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(error.to_string(), "failed to read Card.svelte.json: not found");
    }
}
