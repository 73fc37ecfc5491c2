//! Picks the cleaning method a document needs.

use lopdf::Document;

use super::embedded::has_embedded_pages;
use super::graph::{shared_ids, PageContentGraph};
use crate::model::Method;

/// Choose a concrete method for `doc`.
///
/// 1. Two or more multi-stream pages whose first two share more than one
///    content object: [`Method::New`].
/// 2. Any embedded page XObject: [`Method::Old`].
/// 3. Otherwise [`Method::Naive`].
///
/// Never returns [`Method::Auto`]. Reads the document only.
pub fn select_method(doc: &Document) -> Method {
    let graph = PageContentGraph::new(doc);
    if let [first, second, ..] = graph.multi_content().as_slice() {
        if shared_ids(&first.contents, &second.contents).len() > 1 {
            return Method::New;
        }
    }

    if has_embedded_pages(doc) {
        return Method::Old;
    }

    Method::Naive
}
