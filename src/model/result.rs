//! Outcome of a clean operation.

use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};

use super::{DocumentMetadata, Method};
use crate::error::{Error, ErrorKind};

/// Terminal value of a clean operation.
///
/// Either the success fields or the failure fields are set, never both.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CleanResult {
    Success(CleanSuccess),
    Failure(CleanFailure),
}

/// Fields of a successful clean.
#[derive(Debug, Clone, Serialize)]
pub struct CleanSuccess {
    /// Where the cleaned document went
    pub output: CleanOutput,

    /// Method the caller asked for
    pub requested: Method,

    /// Method that actually produced the output (never `Auto`)
    pub method: Method,

    /// Number of pages in the output document
    pub pages: usize,
}

/// Fields of a failed clean.
#[derive(Debug, Clone, Serialize)]
pub struct CleanFailure {
    /// Method the caller asked for
    pub requested: Method,

    /// Error discriminant
    pub kind: ErrorKind,

    /// Human-readable error description
    pub message: String,
}

/// The cleaned document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanOutput {
    /// Written to this file
    Path(PathBuf),
    /// Returned in memory; serialized as its length
    Bytes(#[serde(serialize_with = "serialize_len")] Vec<u8>),
}

fn serialize_len<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(bytes.len() as u64)
}

impl CleanResult {
    /// Build a failed result from an error.
    pub fn failure(requested: Method, err: &Error) -> Self {
        CleanResult::Failure(CleanFailure {
            requested,
            kind: err.kind(),
            message: err.to_string(),
        })
    }

    /// Convert an internal result into the terminal value.
    pub fn from_result(requested: Method, result: crate::Result<CleanSuccess>) -> Self {
        match result {
            Ok(success) => CleanResult::Success(success),
            Err(err) => Self::failure(requested, &err),
        }
    }

    /// Whether the clean succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, CleanResult::Success(_))
    }

    /// Method that produced the output, if any.
    pub fn method(&self) -> Option<Method> {
        match self {
            CleanResult::Success(s) => Some(s.method),
            CleanResult::Failure(_) => None,
        }
    }

    /// Error discriminant, if the clean failed.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            CleanResult::Success(_) => None,
            CleanResult::Failure(f) => Some(f.kind),
        }
    }

    /// Error description, if the clean failed.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            CleanResult::Success(_) => None,
            CleanResult::Failure(f) => Some(&f.message),
        }
    }

    /// Output file, if the clean wrote one.
    pub fn output_path(&self) -> Option<&Path> {
        match self {
            CleanResult::Success(CleanSuccess {
                output: CleanOutput::Path(path),
                ..
            }) => Some(path),
            _ => None,
        }
    }

    /// Output bytes, if the clean produced an in-memory document.
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            CleanResult::Success(CleanSuccess {
                output: CleanOutput::Bytes(bytes),
                ..
            }) => Some(bytes),
            _ => None,
        }
    }
}

/// Per-file report produced by batch processing.
#[derive(Debug, Clone, Serialize)]
pub struct CleanReport {
    /// Input file
    pub input: PathBuf,

    /// Clean outcome
    pub result: CleanResult,

    /// First-page metadata, when requested and found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DocumentMetadata>,

    /// Why metadata extraction failed, if it did (never fatal)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_error: Option<String>,
}

impl CleanReport {
    /// Create a report without metadata.
    pub fn new(input: impl Into<PathBuf>, result: CleanResult) -> Self {
        Self {
            input: input.into(),
            result,
            metadata: None,
            metadata_error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_carries_kind_and_message() {
        let result = CleanResult::failure(Method::Old, &Error::NotAPdf);
        assert!(!result.is_success());
        assert_eq!(result.error_kind(), Some(ErrorKind::NotAPdf));
        assert_eq!(result.error_message(), Some("File is not a .pdf file"));
        assert!(result.method().is_none());
        assert!(result.output_path().is_none());
    }

    #[test]
    fn test_success_json_shape() {
        let result = CleanResult::Success(CleanSuccess {
            output: CleanOutput::Bytes(vec![0; 42]),
            requested: Method::Auto,
            method: Method::New,
            pages: 3,
        });
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["method"], "new");
        assert_eq!(json["requested"], "auto");
        assert_eq!(json["output"]["bytes"], 42);
        assert!(json.get("message").is_none());
    }

    #[test]
    fn test_failure_json_shape() {
        let result = CleanResult::failure(
            Method::New,
            &Error::NoEmbeddedContentFound("no shared objects".to_string()),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["kind"], "no_embedded_content_found");
        assert!(json.get("output").is_none());
    }
}
