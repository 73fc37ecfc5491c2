//! Cleaning options and configuration.

use std::path::{Path, PathBuf};

use crate::model::Method;

/// Suffix appended to the input stem when not replacing in place.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_clean";

/// File-name prefix added by the sharing platform to downloaded files.
pub const DEFAULT_STRIP_PREFIX: &str = "wuolah-free-";

/// Host of the platform's ad links.
pub const DEFAULT_AD_LINK_HOST: &str = "wlh.es";

/// Options for cleaning PDF documents.
#[derive(Debug, Clone)]
pub struct CleanOptions {
    /// Method to use (`Auto` inspects the document)
    pub method: Method,

    /// Overwrite the input file instead of writing a sibling
    pub replace: bool,

    /// Suffix for the output file stem
    pub output_suffix: String,

    /// Prefix removed from the output file name, if present
    pub strip_prefix: Option<String>,

    /// Whether batches are processed in parallel
    pub parallel: bool,

    /// Whether to read first-page metadata during file cleaning
    pub extract_metadata: bool,

    /// Page classifier settings for the naive method
    pub classifier: ClassifierOptions,
}

impl CleanOptions {
    /// Create new clean options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cleaning method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Force the naive method.
    pub fn force_naive(mut self) -> Self {
        self.method = Method::Naive;
        self
    }

    /// Overwrite input files with their cleaned version.
    pub fn with_replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    /// Set the output file suffix.
    pub fn with_output_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.output_suffix = suffix.into();
        self
    }

    /// Set or clear the prefix stripped from output names.
    pub fn with_strip_prefix(mut self, prefix: Option<String>) -> Self {
        self.strip_prefix = prefix;
        self
    }

    /// Enable or disable parallel batch processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel batch processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Enable or disable metadata extraction.
    pub fn with_metadata(mut self, extract: bool) -> Self {
        self.extract_metadata = extract;
        self
    }

    /// Set classifier options.
    pub fn with_classifier(mut self, classifier: ClassifierOptions) -> Self {
        self.classifier = classifier;
        self
    }

    /// Where the cleaned version of `input` is written.
    ///
    /// `notes.pdf` becomes `notes_clean.pdf` in the same directory, with the
    /// platform prefix removed from the name. With `replace`, the input path
    /// itself.
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        if self.replace {
            return input.to_path_buf();
        }

        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = match &self.strip_prefix {
            Some(prefix) if !prefix.is_empty() && stem.len() > prefix.len() => stem
                .strip_prefix(prefix.as_str())
                .map(str::to_string)
                .unwrap_or(stem),
            _ => stem,
        };

        input.with_file_name(format!("{}{}.pdf", stem, self.output_suffix))
    }
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            method: Method::Auto,
            replace: false,
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            strip_prefix: Some(DEFAULT_STRIP_PREFIX.to_string()),
            parallel: true,
            extract_metadata: true,
            classifier: ClassifierOptions::default(),
        }
    }
}

/// Settings for the dimension-based page classifier.
#[derive(Debug, Clone)]
pub struct ClassifierOptions {
    /// Check every category against the logo table, as the first classifier
    /// release did
    pub legacy_logo_tables: bool,

    /// Host whose link annotations mark platform decoration
    pub ad_link_host: String,
}

impl ClassifierOptions {
    /// Create new classifier options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reproduce the first release's classifications.
    pub fn legacy(mut self) -> Self {
        self.legacy_logo_tables = true;
        self
    }

    /// Set the ad link host.
    pub fn with_ad_link_host(mut self, host: impl Into<String>) -> Self {
        self.ad_link_host = host.into();
        self
    }
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            legacy_logo_tables: false,
            ad_link_host: DEFAULT_AD_LINK_HOST.to_string(),
        }
    }
}
