//! Error taxonomy for the two pipelines.
//!
//! - [`AssetResolutionError`] ends a single hash request. The variants keep
//!   "no icon reference", "fallback not found" and "unreachable" apart because
//!   the fix differs (pass the icon URL by hand vs. try another network path).
//! - [`DataFormatError`] is recovered per row: the row is skipped and counted.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a favicon source into bytes.
#[derive(Error, Debug)]
pub enum AssetResolutionError {
    #[error("{url} is unreachable: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{url} answered HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("declared icon {url} answered HTTP {status}")]
    IconNotFound { url: String, status: u16 },

    #[error("no icon reference found in markup of {page}")]
    NoIconReference { page: String },

    #[error("no icon reference in {page} and fallback {url} answered HTTP {status}")]
    FallbackNotFound {
        page: String,
        url: String,
        status: u16,
    },

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("cannot read {}: {source}", path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl AssetResolutionError {
    /// Short, stable label for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            AssetResolutionError::Unreachable { .. } => "unreachable",
            AssetResolutionError::HttpStatus { .. } => "http-status",
            AssetResolutionError::IconNotFound { .. } => "icon-not-found",
            AssetResolutionError::NoIconReference { .. } => "no-icon-reference",
            AssetResolutionError::FallbackNotFound { .. } => "fallback-not-found",
            AssetResolutionError::InvalidUrl { .. } => "invalid-url",
            AssetResolutionError::FileUnreadable { .. } => "file-unreadable",
        }
    }

    /// Remediation hint shown under the error in the terminal report.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            AssetResolutionError::Unreachable { .. } => {
                Some("host might be down or filtered; try another network path")
            }
            AssetResolutionError::NoIconReference { .. }
            | AssetResolutionError::FallbackNotFound { .. } => {
                Some("pass the icon URL directly with --url")
            }
            _ => None,
        }
    }
}

/// A dataset row that could not be turned into a [`DatasetRow`](crate::models::DatasetRow).
#[derive(Error, Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataFormatError {
    #[error("line {line}: missing required field '{field}'")]
    MissingField { line: u64, field: &'static str },

    #[error("line {line}: malformed record: {reason}")]
    Malformed { line: u64, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_messages_are_distinct() {
        let none = AssetResolutionError::NoIconReference {
            page: "https://a.example/".into(),
        };
        let fallback = AssetResolutionError::FallbackNotFound {
            page: "https://a.example/".into(),
            url: "https://a.example/favicon.ico".into(),
            status: 404,
        };
        let down = AssetResolutionError::Unreachable {
            url: "https://a.example/".into(),
            source: "connection refused".into(),
        };
        assert_ne!(none.kind(), fallback.kind());
        assert_ne!(fallback.kind(), down.kind());
        assert!(fallback.to_string().contains("404"));
        assert!(down.to_string().contains("connection refused"));
    }

    #[test]
    fn test_data_format_message() {
        let err = DataFormatError::MissingField { line: 7, field: "org" };
        assert_eq!(err.to_string(), "line 7: missing required field 'org'");
    }
}
