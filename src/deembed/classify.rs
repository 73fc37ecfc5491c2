//! Naive page classification by decoration signatures.
//!
//! The platform stamps pages with images of a small set of fixed pixel sizes.
//! Pages are recognized by those sizes, and failing that by the platform's
//! link annotations. Classification never modifies the document.

use std::collections::HashSet;

use lopdf::{Dictionary, Document, Object, ObjectId};

use super::graph::{content_ids, integer_of, name_of, page_xobjects, resolve, xobject_dict};
use super::page::OutputPage;
use crate::error::Result;
use crate::model::PageType;
use crate::options::ClassifierOptions;

/// Image size as `(height, width)` in pixels.
pub type Dimensions = (i64, i64);

/// Watermark logos.
pub const LOGO_DIMS: [Dimensions; 9] = [
    (71, 390),
    (37, 203),
    (73, 390),
    (23, 130),
    (24, 130),
    (19, 109),
    (20, 109),
    (72, 391),
    (24, 129),
];

/// Banners across the top or bottom of a page.
pub const HORIZONTAL_BANNER_DIMS: [Dimensions; 10] = [
    (247, 1414),
    (213, 1219),
    (215, 1219),
    (249, 1414),
    (217, 1240),
    (147, 1757),
    (221, 1240),
    (136, 780),
    (137, 780),
    (218, 1241),
];

/// Banners down the side of a page.
pub const VERTICAL_BANNER_DIMS: [Dimensions; 11] = [
    (1753, 170),
    (1518, 248),
    (1520, 147),
    (1753, 177),
    (1751, 171),
    (1537, 147),
    (1093, 217),
    (1534, 150),
    (970, 92),
    (969, 93),
    (1538, 148),
];

/// Full-page advertisements.
pub const FULL_PAGE_DIMS: [Dimensions; 10] = [
    (842, 595),
    (1754, 1240),
    (2526, 1785),
    (1733, 1219),
    (3508, 2480),
    (2339, 1653),
    (1785, 2526),
    (1109, 782),
    (1109, 784),
    (1759, 1241),
];

/// Sizes of the image XObjects named in a page's resources.
pub fn image_dimensions(doc: &Document, page_id: ObjectId) -> Vec<Dimensions> {
    page_xobjects(doc, page_id)
        .into_iter()
        .filter_map(|(_, id)| {
            let dict = xobject_dict(doc, id)?;
            if name_of(dict, b"Subtype")? != b"Image" {
                return None;
            }
            Some((
                integer_of(doc, dict, b"Height")?,
                integer_of(doc, dict, b"Width")?,
            ))
        })
        .collect()
}

/// Classify a set of image sizes, if any signature matches.
///
/// With `legacy_logo_tables`, every category is checked against the logo
/// table, so a logo alone reads as banner ads.
pub fn classify_dimensions(images: &[Dimensions], legacy_logo_tables: bool) -> Option<PageType> {
    let images: HashSet<Dimensions> = images.iter().copied().collect();
    let matches = |table: &[Dimensions]| table.iter().any(|dims| images.contains(dims));
    let table = |own: &'static [Dimensions]| -> &'static [Dimensions] {
        if legacy_logo_tables {
            &LOGO_DIMS
        } else {
            own
        }
    };

    let horizontal = matches(table(&HORIZONTAL_BANNER_DIMS));
    let vertical = matches(table(&VERTICAL_BANNER_DIMS));
    if horizontal && vertical {
        Some(PageType::BannerAds)
    } else if matches(table(&FULL_PAGE_DIMS)) {
        Some(PageType::FullPageAds)
    } else if matches(&LOGO_DIMS) {
        Some(PageType::Watermark)
    } else {
        None
    }
}

/// Classifies pages by their decoration.
#[derive(Debug, Clone, Default)]
pub struct PageTypeClassifier {
    options: ClassifierOptions,
}

impl PageTypeClassifier {
    /// Create a classifier.
    pub fn new(options: ClassifierOptions) -> Self {
        Self { options }
    }

    /// Classify one page.
    pub fn classify(&self, doc: &Document, page_id: ObjectId) -> PageType {
        let images = image_dimensions(doc, page_id);
        if let Some(page_type) = classify_dimensions(&images, self.options.legacy_logo_tables) {
            return page_type;
        }

        match self.ad_link_count(doc, page_id) {
            1 => PageType::Watermark,
            2 => PageType::BannerAds,
            _ => PageType::Unknown,
        }
    }

    /// Classify every page, in page order.
    pub fn classify_all(&self, doc: &Document) -> Vec<(u32, PageType)> {
        doc.get_pages()
            .into_iter()
            .map(|(number, page_id)| (number, self.classify(doc, page_id)))
            .collect()
    }

    /// Link annotations pointing at the ad host from the left page edge.
    fn ad_link_count(&self, doc: &Document, page_id: ObjectId) -> usize {
        let Some(annots) = doc
            .get_dictionary(page_id)
            .ok()
            .and_then(|page| page.get(b"Annots").ok())
            .and_then(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_array().ok())
        else {
            return 0;
        };

        annots
            .iter()
            .filter_map(|annot| resolve(doc, annot)?.as_dict().ok())
            .filter(|annot| self.links_to_ad_host(doc, annot) && starts_at_left_edge(doc, annot))
            .count()
    }

    fn links_to_ad_host(&self, doc: &Document, annot: &Dictionary) -> bool {
        let uri = annot
            .get(b"A")
            .ok()
            .and_then(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_dict().ok())
            .and_then(|action| action.get(b"URI").ok())
            .and_then(|obj| resolve(doc, obj));

        match uri {
            Some(Object::String(bytes, _)) => {
                String::from_utf8_lossy(bytes).contains(self.options.ad_link_host.as_str())
            }
            _ => false,
        }
    }
}

fn starts_at_left_edge(doc: &Document, annot: &Dictionary) -> bool {
    annot
        .get(b"Rect")
        .ok()
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_array().ok())
        .and_then(|rect| rect.first())
        .and_then(|x0| x0.as_float().ok())
        .map(|x0| x0 == 0.0)
        .unwrap_or(false)
}

/// The naive method: classify and log each page, then keep it as it is.
///
/// Contents and annotations are kept. Only the geometry is rewritten by the
/// assembler.
pub fn passthrough(doc: &Document, options: &ClassifierOptions) -> Result<Vec<OutputPage>> {
    let classifier = PageTypeClassifier::new(options.clone());
    doc.get_pages()
        .into_iter()
        .map(|(number, page_id)| {
            let page_type = classifier.classify(doc, page_id);
            if page_type.is_decorated() {
                log::info!("Page {}: {:?}", number, page_type);
            } else {
                log::debug!("Page {}: no known decoration", number);
            }

            let mut page = OutputPage::copy_of(doc, number, page_id)?
                .with_existing_contents(&content_ids(doc, page_id));
            if let Some(annots) = page_annotations(doc, page_id) {
                page.dict.set("Annots", annots);
            }
            Ok(page)
        })
        .collect()
}

fn page_annotations(doc: &Document, page_id: ObjectId) -> Option<Object> {
    let annots = doc.get_dictionary(page_id).ok()?.get(b"Annots").ok()?;
    match resolve(doc, annots)? {
        array @ Object::Array(_) => Some(array.clone()),
        _ => None,
    }
}
