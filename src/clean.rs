//! Clean operations on documents, buffers and files.
//!
//! [`clean_bytes`] and [`clean_file`] never panic and never return `Err`:
//! every failure, including an internal fault, ends up in the returned
//! [`CleanResult`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use lopdf::Document;

use crate::assemble::{write_atomically, OutputAssembler};
use crate::deembed::deembed;
use crate::detect::{detect_format_from_bytes, detect_format_from_path, has_pdf_extension};
use crate::error::{Error, Result};
use crate::metadata;
use crate::model::{CleanOutput, CleanReport, CleanResult, CleanSuccess, DocumentMetadata, Method};
use crate::options::{ClassifierOptions, CleanOptions};
use crate::preprocess;

/// A cleaned document, serialized.
#[derive(Debug, Clone)]
pub struct Cleaned {
    /// Concrete method used
    pub method: Method,
    /// PDF bytes
    pub bytes: Vec<u8>,
    /// Number of pages
    pub pages: usize,
}

/// Clean a loaded document with the default classifier settings.
///
/// Returns the output bytes and the method actually used.
///
/// # Example
///
/// ```no_run
/// use unembed::{clean_document, Method};
///
/// let doc = lopdf::Document::load("apuntes.pdf")?;
/// let (bytes, method) = clean_document(&doc, Method::Auto)?;
/// std::fs::write("apuntes_clean.pdf", bytes)?;
/// println!("cleaned with the {} method", method);
/// # Ok::<(), unembed::Error>(())
/// ```
pub fn clean_document(doc: &Document, method: Method) -> Result<(Vec<u8>, Method)> {
    let cleaned = clean_document_with(doc, method, &ClassifierOptions::default())?;
    Ok((cleaned.bytes, cleaned.method))
}

/// Clean a loaded document.
///
/// The source document is not modified.
pub fn clean_document_with(
    doc: &Document,
    method: Method,
    classifier: &ClassifierOptions,
) -> Result<Cleaned> {
    let deembedded = deembed(doc, method, classifier)?;
    let pages = deembedded.pages.len();
    let bytes = OutputAssembler::new(doc).to_bytes(deembedded.pages)?;
    Ok(Cleaned {
        method: deembedded.method,
        bytes,
        pages,
    })
}

/// Clean an in-memory PDF.
///
/// # Example
///
/// ```no_run
/// use unembed::{clean_bytes, CleanOptions};
///
/// let data = std::fs::read("apuntes.pdf").unwrap();
/// let result = clean_bytes(&data, &CleanOptions::default());
/// if let Some(bytes) = result.into_bytes() {
///     std::fs::write("apuntes_clean.pdf", bytes).unwrap();
/// }
/// ```
pub fn clean_bytes(data: &[u8], options: &CleanOptions) -> CleanResult {
    guarded(options.method, || {
        detect_format_from_bytes(data)?;
        let doc = preprocess::unlock_bytes(data)?;
        let cleaned = clean_document_with(&doc, options.method, &options.classifier)?;
        Ok(CleanSuccess {
            output: CleanOutput::Bytes(cleaned.bytes),
            requested: options.method,
            method: cleaned.method,
            pages: cleaned.pages,
        })
    })
}

/// Clean a PDF file.
///
/// The output goes to [`CleanOptions::output_path_for`]. On failure nothing
/// is written there.
///
/// # Example
///
/// ```no_run
/// use unembed::{clean_file, CleanOptions};
///
/// let result = clean_file("apuntes.pdf", &CleanOptions::default());
/// match result.output_path() {
///     Some(path) => println!("written to {}", path.display()),
///     None => eprintln!("{}", result.error_message().unwrap_or_default()),
/// }
/// ```
pub fn clean_file<P: AsRef<Path>>(path: P, options: &CleanOptions) -> CleanResult {
    let path = path.as_ref();
    guarded(options.method, || run_file(path, options, None))
}

/// Clean a PDF file and collect its metadata, if enabled.
pub fn clean_file_report<P: AsRef<Path>>(path: P, options: &CleanOptions) -> CleanReport {
    let path = path.as_ref();
    let mut metadata = None;
    let result = guarded(options.method, || {
        let slot = options.extract_metadata.then_some(&mut metadata);
        run_file(path, options, slot)
    });

    let mut report = CleanReport::new(path, result);
    match metadata {
        Some(Ok(found)) => report.metadata = Some(found),
        Some(Err(err)) => report.metadata_error = Some(err.to_string()),
        None => {}
    }
    report
}

fn run_file(
    path: &Path,
    options: &CleanOptions,
    metadata_slot: Option<&mut Option<Result<DocumentMetadata>>>,
) -> Result<CleanSuccess> {
    if !has_pdf_extension(path) {
        return Err(Error::NotAPdf);
    }
    let format = detect_format_from_path(path)?;
    log::debug!("{}: {}", path.display(), format);

    let unlocked = preprocess::unlock(path)?;
    let doc = unlocked.load()?;

    if let Some(slot) = metadata_slot {
        *slot = Some(metadata::extract(&doc));
    }

    let cleaned = clean_document_with(&doc, options.method, &options.classifier)?;
    let output = options.output_path_for(path);
    write_atomically(&output, &cleaned.bytes)?;

    log::info!(
        "{} -> {} ({} method, {} pages)",
        path.display(),
        output.display(),
        cleaned.method,
        cleaned.pages
    );
    Ok(CleanSuccess {
        output: CleanOutput::Path(output),
        requested: options.method,
        method: cleaned.method,
        pages: cleaned.pages,
    })
}

/// Run `f`, turning errors and panics into a failed result.
fn guarded<F>(requested: Method, f: F) -> CleanResult
where
    F: FnOnce() -> Result<CleanSuccess>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => CleanResult::from_result(requested, result),
        Err(payload) => {
            let err = Error::MalformedDocument(format!(
                "internal fault: {}",
                panic_message(&*payload)
            ));
            log::error!("{}", err);
            CleanResult::failure(requested, &err)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
