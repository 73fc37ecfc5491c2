//! Page classification results.

use serde::{Deserialize, Serialize};

/// Kind of injected decoration detected on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    /// Horizontal and vertical banners framing the original content.
    BannerAds,
    /// A full-page advertisement interstitial.
    FullPageAds,
    /// A small logo stamped on otherwise original content.
    Watermark,
    /// Nothing recognizable.
    #[default]
    Unknown,
}

impl PageType {
    /// Whether the page carries any recognized decoration.
    pub fn is_decorated(&self) -> bool {
        !matches!(self, PageType::Unknown)
    }
}
