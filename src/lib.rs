//! # unembed
//!
//! Recovers the original pages of PDF documents that a sharing platform has
//! re-wrapped with banners, watermarks and full-page ads.
//!
//! Decorated documents come in two layouts. Newer ones keep each original
//! page as a run of content streams between wrapper streams shared by every
//! page; older ones embed each original page as a form XObject. Both are
//! undone by looking at object identity only, so the recovered pages reuse
//! the original streams unchanged.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unembed::{clean_file, CleanOptions};
//!
//! let result = clean_file("apuntes.pdf", &CleanOptions::default());
//! if let Some(path) = result.output_path() {
//!     println!("clean copy at {}", path.display());
//! }
//! ```
//!
//! ## Methods
//!
//! - **new**: splice the original content out from between shared wrapper
//!   streams
//! - **old**: promote `EmbeddedPdfPage` XObjects back to pages
//! - **naive**: classify decorated pages and keep everything
//! - **auto**: inspect the document and pick one of the above

pub mod assemble;
pub mod batch;
pub mod clean;
pub mod deembed;
pub mod detect;
pub mod error;
pub mod metadata;
pub mod model;
pub mod options;
pub mod preprocess;

#[cfg(feature = "ffi")]
pub mod ffi;

// Re-export commonly used types
pub use assemble::OutputAssembler;
pub use batch::{clean_paths, clean_paths_with, discover, Discovery};
pub use clean::{
    clean_bytes, clean_document, clean_document_with, clean_file, clean_file_report, Cleaned,
};
pub use deembed::{select_method, PageContentGraph, PageTypeClassifier, RepeatingObjectLocator};
pub use detect::{detect_format_from_bytes, detect_format_from_path, PdfFormat};
pub use error::{Error, ErrorKind, Result};
pub use model::{
    CleanFailure, CleanOutput, CleanReport, CleanResult, CleanSuccess, DocumentMetadata, Method,
    PageBox, PageType,
};
pub use options::{ClassifierOptions, CleanOptions};

use std::path::{Path, PathBuf};

/// Builder for cleaning PDF documents.
///
/// # Example
///
/// ```no_run
/// use unembed::{Cleaner, Method};
///
/// let reports = Cleaner::new()
///     .with_method(Method::New)
///     .replace(true)
///     .sequential()
///     .clean_paths(&["apuntes/"]);
/// for report in reports {
///     println!("{}: {}", report.input.display(), report.result.is_success());
/// }
/// ```
pub struct Cleaner {
    options: CleanOptions,
}

impl Cleaner {
    /// Create a new Cleaner builder.
    pub fn new() -> Self {
        Self {
            options: CleanOptions::default(),
        }
    }

    /// Set the cleaning method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.options = self.options.with_method(method);
        self
    }

    /// Force the naive method.
    pub fn naive(mut self) -> Self {
        self.options = self.options.force_naive();
        self
    }

    /// Overwrite inputs instead of writing `_clean` siblings.
    pub fn replace(mut self, replace: bool) -> Self {
        self.options = self.options.with_replace(replace);
        self
    }

    /// Set the output file suffix.
    pub fn with_output_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.options = self.options.with_output_suffix(suffix);
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Skip first-page metadata.
    pub fn without_metadata(mut self) -> Self {
        self.options = self.options.with_metadata(false);
        self
    }

    /// Use the first release's page classifications.
    pub fn legacy_classifier(mut self) -> Self {
        self.options.classifier = self.options.classifier.legacy();
        self
    }

    /// The options this builder will clean with.
    pub fn options(&self) -> &CleanOptions {
        &self.options
    }

    /// Clean one file.
    pub fn clean_file<P: AsRef<Path>>(&self, path: P) -> CleanResult {
        clean_file(path, &self.options)
    }

    /// Clean an in-memory PDF.
    pub fn clean_bytes(&self, data: &[u8]) -> CleanResult {
        clean_bytes(data, &self.options)
    }

    /// Clean files and directories, one report per PDF found.
    ///
    /// Inputs that do not exist are logged and skipped.
    pub fn clean_paths<P: AsRef<Path>>(&self, inputs: &[P]) -> Vec<CleanReport> {
        let files: Vec<PathBuf> = discover(inputs, &self.options, None).files;
        clean_paths(&files, &self.options)
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new()
    }
}
