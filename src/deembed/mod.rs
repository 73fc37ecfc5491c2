//! De-embedding engine.
//!
//! Turns a decorated document into the list of pages the clean document
//! should contain. Three strategies are available:
//!
//! - [`locator`]: splice each page's original content streams out from
//!   between shared wrapper streams ([`Method::New`])
//! - [`embedded`]: promote embedded page XObjects back to pages
//!   ([`Method::Old`])
//! - [`classify`]: classify decorations and keep pages as they are
//!   ([`Method::Naive`])
//!
//! [`selector::select_method`] picks one when the caller asks for
//! [`Method::Auto`]. None of them modify the source document.

pub mod classify;
pub mod embedded;
pub mod graph;
pub mod locator;
pub mod page;
pub mod selector;

pub use classify::PageTypeClassifier;
pub use graph::PageContentGraph;
pub use locator::RepeatingObjectLocator;
pub use page::{ContentRef, OutputPage};
pub use selector::select_method;

use lopdf::Document;

use crate::error::Result;
use crate::model::Method;
use crate::options::ClassifierOptions;

/// Pages recovered from a document, with the method that produced them.
#[derive(Debug, Clone)]
pub struct Deembedded {
    /// Concrete method used (never `Auto`)
    pub method: Method,
    /// Output pages, in order
    pub pages: Vec<OutputPage>,
}

/// Recover the original pages of `doc` with `method`.
pub fn deembed(doc: &Document, method: Method, classifier: &ClassifierOptions) -> Result<Deembedded> {
    let method = match method {
        Method::Auto => {
            let selected = select_method(doc);
            log::info!("Selected method: {}", selected);
            selected
        }
        other => other,
    };

    let pages = match method {
        Method::New => RepeatingObjectLocator::new(doc).extract()?,
        Method::Old => embedded::extract(doc)?,
        Method::Naive | Method::Auto => classify::passthrough(doc, classifier)?,
    };

    log::debug!("{} method produced {} pages", method, pages.len());
    Ok(Deembedded { method, pages })
}
