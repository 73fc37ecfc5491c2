//! Normalized intermediate copies of input documents.
//!
//! Inputs are opened once, decrypted when the empty user password allows it,
//! decompressed, and written back out as a plain intermediate file. The
//! engine then works on that copy. The intermediate file lives exactly as
//! long as its [`Unlocked`] guard.

use std::io::Write;
use std::path::Path;

use lopdf::Document;
use tempfile::{Builder, NamedTempFile, TempPath};

use crate::error::{Error, Result};

/// Suffix of intermediate file names.
pub const INTERMEDIATE_SUFFIX: &str = "_inter.pdf";

/// A decrypted, decompressed copy of an input file.
///
/// The file is deleted when the guard is dropped.
#[derive(Debug)]
pub struct Unlocked {
    path: TempPath,
    /// Whether the input was encrypted
    pub was_encrypted: bool,
}

impl Unlocked {
    /// Location of the intermediate file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the intermediate document.
    pub fn load(&self) -> Result<Document> {
        Ok(Document::load(self.path())?)
    }
}

/// Produce the intermediate copy of `path`.
///
/// The copy is written beside the input, or into the system temp directory
/// when the input directory is not writable.
pub fn unlock<P: AsRef<Path>>(path: P) -> Result<Unlocked> {
    let path = path.as_ref();
    let mut doc = Document::load(path)?;
    let was_encrypted = normalize(&mut doc, &path.display().to_string())?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let mut file = create_intermediate(path.parent(), &stem)?;

    doc.save_to(&mut file)
        .map_err(|e| Error::PreprocessingFailure(format!("writing intermediate copy: {}", e)))?;
    file.flush()
        .map_err(|e| Error::PreprocessingFailure(format!("writing intermediate copy: {}", e)))?;

    log::debug!("Intermediate copy of {} at {}", path.display(), file.path().display());
    Ok(Unlocked {
        path: file.into_temp_path(),
        was_encrypted,
    })
}

/// Load and normalize an in-memory document.
pub fn unlock_bytes(data: &[u8]) -> Result<Document> {
    let mut doc = Document::load_mem(data)?;
    normalize(&mut doc, "input buffer")?;
    Ok(doc)
}

/// Decrypt and decompress in place. Returns whether the document was
/// encrypted.
fn normalize(doc: &mut Document, label: &str) -> Result<bool> {
    let was_encrypted = doc.is_encrypted();
    if was_encrypted {
        log::warn!("{} is encrypted, trying the empty password", label);
        doc.decrypt("").map_err(|_| Error::Encrypted)?;
    }
    doc.decompress();
    Ok(was_encrypted)
}

fn create_intermediate(dir: Option<&Path>, stem: &str) -> Result<NamedTempFile> {
    let prefix = format!("{}.", stem);
    let mut builder = Builder::new();
    builder.prefix(&prefix).suffix(INTERMEDIATE_SUFFIX);

    let beside = match dir {
        Some(dir) if !dir.as_os_str().is_empty() => builder.tempfile_in(dir),
        _ => builder.tempfile_in("."),
    };

    beside.or_else(|e| {
        log::warn!(
            "Cannot write intermediate copy beside the input ({}), using the temp directory",
            e
        );
        builder
            .tempfile()
            .map_err(|e| Error::PreprocessingFailure(format!("creating intermediate copy: {}", e)))
    })
}
