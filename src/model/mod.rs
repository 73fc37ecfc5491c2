//! Data model shared by the cleaning engine and its callers.

mod geometry;
mod metadata;
mod method;
mod page_type;
mod result;

pub use geometry::PageBox;
pub use metadata::DocumentMetadata;
pub use method::Method;
pub use page_type::PageType;
pub use result::{CleanFailure, CleanOutput, CleanReport, CleanResult, CleanSuccess};
