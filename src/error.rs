//! Error types for unembed library.

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Result type alias for unembed operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while cleaning a PDF.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input lacks the `.pdf` extension or the `%PDF-` signature.
    #[error("File is not a .pdf file")]
    NotAPdf,

    /// The PDF version in the header is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The PDF library rejected the document.
    #[error("PDF parsing error: {0}")]
    ParseFailure(String),

    /// The PDF document is encrypted and could not be opened.
    #[error("Document is encrypted")]
    Encrypted,

    /// The object graph does not have the shape a method requires.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// No embedded or shared content was found for the chosen method.
    #[error("No embedded content found: {0}")]
    NoEmbeddedContentFound(String),

    /// A method name that is not one of `auto`, `new`, `old`, `naive`.
    #[error("Cleaning method not found: {0}")]
    UnknownMethod(String),

    /// Writing the output document failed.
    #[error("Serialization error: {0}")]
    SerializationFailure(String),

    /// Producing the normalized intermediate copy failed.
    #[error("Preprocessing error: {0}")]
    PreprocessingFailure(String),

    /// First-page metadata could not be extracted.
    #[error("Metadata extraction error: {0}")]
    Metadata(String),
}

impl Error {
    /// The serializable discriminant of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            Error::NotAPdf => ErrorKind::NotAPdf,
            Error::UnsupportedVersion(_) => ErrorKind::UnsupportedVersion,
            Error::ParseFailure(_) => ErrorKind::ParseFailure,
            Error::Encrypted => ErrorKind::Encrypted,
            Error::MalformedDocument(_) => ErrorKind::MalformedDocument,
            Error::NoEmbeddedContentFound(_) => ErrorKind::NoEmbeddedContentFound,
            Error::UnknownMethod(_) => ErrorKind::UnknownMethod,
            Error::SerializationFailure(_) => ErrorKind::SerializationFailure,
            Error::PreprocessingFailure(_) => ErrorKind::PreprocessingFailure,
            Error::Metadata(_) => ErrorKind::Metadata,
        }
    }
}

/// Discriminant of [`Error`], carried in failed clean results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Io,
    NotAPdf,
    UnsupportedVersion,
    ParseFailure,
    Encrypted,
    MalformedDocument,
    NoEmbeddedContentFound,
    UnknownMethod,
    SerializationFailure,
    PreprocessingFailure,
    Metadata,
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::ParseFailure(err.to_string()),
        }
    }
}
