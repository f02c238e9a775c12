//! Retrieval boundary.
//!
//! A [`Retriever`] turns a [`DocumentRequest`] into raw bytes. Archives are
//! unpacked here so the pipeline only ever sees one XML document per
//! identity. Independent requests are fetched on scoped threads.

use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::time::Instant;

use lexgraph_core::errors::{ExError, ExErrorKind, LexGraphError};
use lexgraph_core::model::{DocumentId, RawDocument};
use lexgraph_core::{log_op_end, log_op_error, log_op_start};
use lexgraph_core_types::schema::STAGE_RETRIEVE;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Largest archive entry extracted; statutes are far below this.
pub const MAX_ENTRY_BYTES: u64 = 64 * 1024 * 1024;

/// What to fetch for one document identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRequest {
    pub id: DocumentId,
    /// File path or URL, interpreted by the retriever
    pub location: String,
    /// Encoding label supplied by the caller, overriding detection
    pub declared_encoding: Option<String>,
}

impl DocumentRequest {
    pub fn new(id: DocumentId, location: impl Into<String>) -> Self {
        Self {
            id,
            location: location.into(),
            declared_encoding: None,
        }
    }

    pub fn with_declared_encoding(mut self, label: impl Into<String>) -> Self {
        self.declared_encoding = Some(label.into());
        self
    }
}

pub trait Retriever: Sync {
    /// Fetch the raw payload named by `request.location`.
    ///
    /// # Errors
    /// `Retrieval` (or `Timeout`) when the payload cannot be obtained.
    fn fetch(&self, request: &DocumentRequest) -> Result<Vec<u8>, ExError>;

    /// Fetch and unpack into a [`RawDocument`].
    ///
    /// # Errors
    /// Fetch failures and unreadable archives.
    fn retrieve(&self, request: &DocumentRequest) -> Result<RawDocument, ExError> {
        let payload = self.fetch(request)?;
        let bytes = unpack(&request.id, payload)?;
        let mut raw = RawDocument::new(request.id.clone(), bytes);
        if let Some(label) = &request.declared_encoding {
            raw = raw.with_declared_encoding(label.clone());
        }
        Ok(raw)
    }
}

/// Reads `location` as a local file path.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileRetriever;

impl Retriever for FileRetriever {
    fn fetch(&self, request: &DocumentRequest) -> Result<Vec<u8>, ExError> {
        let path = PathBuf::from(&request.location);
        std::fs::read(&path).map_err(|e| {
            retrieval_error(&request.id, format!("{}: {}", path.display(), e))
        })
    }
}

pub fn retrieval_error(id: &DocumentId, reason: impl Into<String>) -> ExError {
    ExError::from(LexGraphError::Retrieval {
        doc_id: id.to_string(),
        reason: reason.into(),
    })
    .with_op("retrieve")
    .with_stage(STAGE_RETRIEVE)
}

/// Return the XML payload: the bytes themselves, or the chosen entry of a
/// zip archive (an entry ending in `law.xml`, else the first `.xml`).
///
/// # Errors
/// `Retrieval` when the archive is unreadable, holds no XML entry, or the
/// chosen entry exceeds [`MAX_ENTRY_BYTES`].
pub fn unpack(id: &DocumentId, payload: Vec<u8>) -> Result<Vec<u8>, ExError> {
    unpack_with_limit(id, payload, MAX_ENTRY_BYTES)
}

/// [`unpack`] with an explicit cap on the extracted entry size.
///
/// # Errors
/// See [`unpack`].
pub fn unpack_with_limit(id: &DocumentId, payload: Vec<u8>, limit: u64) -> Result<Vec<u8>, ExError> {
    if !payload.starts_with(ZIP_MAGIC) {
        return Ok(payload);
    }

    let mut archive = zip::ZipArchive::new(Cursor::new(payload))
        .map_err(|e| retrieval_error(id, format!("unreadable archive: {e}")))?;

    let mut names = Vec::with_capacity(archive.len());
    let mut xml_entries: Vec<(usize, String)> = Vec::new();
    for index in 0..archive.len() {
        let entry = archive
            .by_index(index)
            .map_err(|e| retrieval_error(id, format!("unreadable archive entry {index}: {e}")))?;
        let name = entry.name().to_string();
        if !entry.is_dir() && name.to_ascii_lowercase().ends_with(".xml") {
            xml_entries.push((index, name.to_ascii_lowercase()));
        }
        names.push(name);
    }

    let chosen = xml_entries
        .iter()
        .find(|(_, name)| name.ends_with("law.xml"))
        .or_else(|| xml_entries.first())
        .map(|(index, _)| *index)
        .ok_or_else(|| {
            retrieval_error(id, format!("archive holds no XML entry (entries: {})", names.join(", ")))
        })?;

    let mut entry = archive
        .by_index(chosen)
        .map_err(|e| retrieval_error(id, format!("unreadable archive entry {chosen}: {e}")))?;
    if entry.size() > limit {
        return Err(too_large(id, entry.name(), limit));
    }
    let name = entry.name().to_string();
    let mut bytes = Vec::new();
    // The declared size is not trusted: read at most one byte past the cap.
    entry
        .by_ref()
        .take(limit + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| retrieval_error(id, format!("cannot extract {name}: {e}")))?;
    if bytes.len() as u64 > limit {
        return Err(too_large(id, &name, limit));
    }
    Ok(bytes)
}

fn too_large(id: &DocumentId, name: &str, limit: u64) -> ExError {
    retrieval_error(id, format!("archive entry {name} exceeds {limit} bytes"))
}

/// Retrieve every request, concurrently, preserving request order.
pub fn retrieve_all(
    retriever: &dyn Retriever,
    requests: &[DocumentRequest],
) -> Vec<Result<RawDocument, ExError>> {
    std::thread::scope(|scope| {
        let handles: Vec<_> = requests
            .iter()
            .map(|request| scope.spawn(move || retrieve_logged(retriever, request)))
            .collect();

        handles
            .into_iter()
            .zip(requests)
            .map(|(handle, request)| {
                handle.join().unwrap_or_else(|_| {
                    Err(ExError::new(ExErrorKind::Internal)
                        .with_op("retrieve")
                        .with_doc_id(request.id.to_string())
                        .with_stage(STAGE_RETRIEVE)
                        .with_message("retrieval thread panicked"))
                })
            })
            .collect()
    })
}

fn retrieve_logged(retriever: &dyn Retriever, request: &DocumentRequest) -> Result<RawDocument, ExError> {
    log_op_start!(STAGE_RETRIEVE, doc_id = %request.id, stage = STAGE_RETRIEVE, location = %request.location);
    let start = Instant::now();

    let result = retriever.retrieve(request).map(|raw| {
        log_op_end!(
            STAGE_RETRIEVE,
            duration_ms = start.elapsed().as_millis() as u64,
            doc_id = %request.id,
            stage = STAGE_RETRIEVE,
            bytes_len = raw.bytes.len()
        );
        raw
    });

    result.map_err(|e| {
        let e = e.with_doc_id(request.id.to_string()).with_stage(STAGE_RETRIEVE);
        log_op_error!(
            STAGE_RETRIEVE,
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            doc_id = %request.id,
            stage = STAGE_RETRIEVE
        );
        e
    })
}
