//! Document loading and transport encoding
//!
//! A document is an opaque binary blob identified by name. Before it can be
//! attached to a model request it is encoded once into a transport-safe
//! base64 form, which the session caches so repeated questions against the
//! same document never re-read the file.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// The document could not be read from its source
#[derive(Debug, Error)]
#[error("failed to read document {path}: {source}")]
pub struct EncodeError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// An uploaded binary document, identified by its file name
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Load a document from disk, named after the file
    pub fn from_path(path: &Path) -> Result<Self, EncodeError> {
        debug!(path = %path.display(), "from_path: called");
        let bytes = fs::read(path).map_err(|source| EncodeError {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }
}

/// Transport-safe encoded form of a document, cached per session
#[derive(Debug, Clone)]
pub struct EncodedDocument {
    pub name: String,
    pub mime_type: String,
    pub data: String,
}

/// Encode a document for embedding in a request payload
///
/// Pure and deterministic: the same bytes always produce the same string.
pub fn encode(document: &Document) -> EncodedDocument {
    debug!(name = %document.name, len = document.bytes.len(), "encode: called");
    EncodedDocument {
        name: document.name.clone(),
        mime_type: mime_for_name(&document.name).to_string(),
        data: BASE64_STANDARD.encode(&document.bytes),
    }
}

/// MIME type from the file extension
///
/// The tutor is built around PDF chapters but the encoder itself does not
/// care; unknown extensions fall back to an opaque binary type.
fn mime_for_name(name: &str) -> &'static str {
    let ext = name.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "txt" => "text/plain",
        "md" => "text/markdown",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_vector() {
        let doc = Document::new("hello.txt", b"hello".to_vec());
        let encoded = encode(&doc);
        assert_eq!(encoded.data, "aGVsbG8=");
        assert_eq!(encoded.mime_type, "text/plain");
        assert_eq!(encoded.name, "hello.txt");
    }

    #[test]
    fn test_encode_is_deterministic() {
        let doc = Document::new("chapter1.pdf", vec![0x25, 0x50, 0x44, 0x46, 0x00, 0xff]);
        let first = encode(&doc);
        let second = encode(&doc);
        assert_eq!(first.data, second.data);
    }

    #[test]
    fn test_mime_mapping() {
        assert_eq!(mime_for_name("chapter1.pdf"), "application/pdf");
        assert_eq!(mime_for_name("Chapter1.PDF"), "application/pdf");
        assert_eq!(mime_for_name("photo.jpeg"), "image/jpeg");
        assert_eq!(mime_for_name("mystery"), "application/octet-stream");
    }

    #[test]
    fn test_from_path_missing_file_is_encode_error() {
        let err = Document::from_path(Path::new("/nonexistent/chapter1.pdf")).unwrap_err();
        assert!(err.to_string().contains("chapter1.pdf"));
    }

    #[test]
    fn test_from_path_reads_and_names() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("notes.pdf");
        fs::write(&path, b"fake pdf bytes").unwrap();

        let doc = Document::from_path(&path).unwrap();
        assert_eq!(doc.name, "notes.pdf");
        assert_eq!(doc.bytes, b"fake pdf bytes");
    }
}
