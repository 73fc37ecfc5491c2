//! Cleaning methods.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Strategy used to recover the original pages of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Inspect the document and pick one of the other methods.
    #[default]
    Auto,
    /// Splice the page content between objects shared with a sibling page.
    New,
    /// Wrap embedded `EmbeddedPdfPage` XObjects into standalone pages.
    Old,
    /// Classify pages only and pass them through unchanged.
    Naive,
}

impl Method {
    /// All method names accepted by [`Method::from_str`].
    pub const NAMES: [&'static str; 4] = ["auto", "new", "old", "naive"];

    /// Lowercase method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Auto => "auto",
            Method::New => "new",
            Method::Old => "old",
            Method::Naive => "naive",
        }
    }

    /// Numeric code reported through the C ABI.
    pub fn code(&self) -> u8 {
        match self {
            Method::New => 0,
            Method::Old => 1,
            Method::Naive => 2,
            Method::Auto => 3,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Method::Auto),
            "new" => Ok(Method::New),
            "old" => Ok(Method::Old),
            "naive" => Ok(Method::Naive),
            _ => Err(Error::UnknownMethod(s.to_string())),
        }
    }
}
