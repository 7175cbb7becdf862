//! File content codec and download helpers.
//!
//! File content travels as standard base64 inside JSON bodies. Saving a
//! downloaded file is delegated to a [`SaveTarget`], the platform-specific
//! "save as" step.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

use crate::api::client::ApiClient;
use crate::api::files::get_file_by_id;

/// Minimum decoded bytes per slice when decoding.
pub const DEFAULT_SLICE_SIZE: usize = 512;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Invalid base64 content: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Binary content tagged with its mime type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl Blob {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Encode binary content as base64 text.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode base64 text into a [`Blob`] of the given mime type.
pub fn decode(text: &str, mime_type: &str) -> Result<Blob, CodecError> {
    decode_with_slice_size(text, mime_type, DEFAULT_SLICE_SIZE)
}

/// Decode base64 text slice by slice, each slice yielding at least
/// `slice_size` bytes.
///
/// Slices are cut on 4-character boundaries, so each one decodes on its own
/// and the result is identical for every slice size. A size of 0 is
/// treated as 1.
pub fn decode_with_slice_size(
    text: &str,
    mime_type: &str,
    slice_size: usize,
) -> Result<Blob, CodecError> {
    let chunk_chars = slice_size.max(1).div_ceil(3) * 4;

    let mut bytes = Vec::with_capacity(text.len() / 4 * 3);
    for chunk in text.as_bytes().chunks(chunk_chars) {
        STANDARD.decode_vec(chunk, &mut bytes)?;
    }

    Ok(Blob {
        bytes,
        mime_type: mime_type.to_string(),
    })
}

/// Platform collaborator that persists a downloaded blob.
pub trait SaveTarget {
    fn save(&self, blob: &Blob, filename: &str) -> io::Result<()>;
}

/// Saves downloads into a directory.
pub struct DirectorySaveTarget {
    dir: PathBuf,
}

impl DirectorySaveTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SaveTarget for DirectorySaveTarget {
    fn save(&self, blob: &Blob, filename: &str) -> io::Result<()> {
        // only the final component; names come from the server
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty file name"))?;
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);
        fs::write(&path, &blob.bytes)?;
        log::info!("Saved {} bytes to {}", blob.len(), path.display());
        Ok(())
    }
}

/// Hand a blob to the save target. Failures are logged, never returned.
pub fn trigger_download(blob: &Blob, filename: &str, target: &dyn SaveTarget) {
    if blob.is_empty() {
        log::warn!("Saving {} with no content", filename);
    }
    if let Err(e) = target.save(blob, filename) {
        log::error!("Download of {} failed: {}", filename, e);
    }
}

/// File name offered for a download: spaces become underscores and the
/// stored extension (which carries its dot) is appended.
pub fn download_name(name: &str, extension: &str) -> String {
    format!("{}{}", name.replace(' ', "_"), extension)
}

/// Fetch a file and hand its content to `target`.
///
/// Returns the file name the content was offered under, or `None` when the
/// file does not exist, has no content, or could not be fetched or decoded.
pub async fn download_file(
    api: &ApiClient,
    user_id: &str,
    categ_id: &str,
    file_id: &str,
    target: &dyn SaveTarget,
) -> Option<String> {
    let res = get_file_by_id(api, user_id, categ_id, file_id).await;
    if res.code == 204 {
        return None;
    }
    let Some(file) = res.data else {
        log::warn!("Download of file {} failed: {}", file_id, res.message);
        return None;
    };
    let Some(content) = file.content.as_deref() else {
        log::warn!("File {} has no content", file_id);
        return None;
    };

    let blob = match decode(content, &file.mimetype) {
        Ok(blob) => blob,
        Err(e) => {
            log::error!("File {} content is not valid base64: {}", file_id, e);
            return None;
        }
    };

    let filename = download_name(&file.name, &file.extension);
    trigger_download(&blob, &filename, target);
    Some(filename)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::testing::spawn_stub;

    /// Records what would have been saved.
    #[derive(Default)]
    struct CaptureTarget {
        saved: Mutex<Vec<(String, Blob)>>,
    }

    impl SaveTarget for CaptureTarget {
        fn save(&self, blob: &Blob, filename: &str) -> io::Result<()> {
            self.saved
                .lock()
                .unwrap()
                .push((filename.to_string(), blob.clone()));
            Ok(())
        }
    }

    struct FailingTarget;

    impl SaveTarget for FailingTarget {
        fn save(&self, _blob: &Blob, _filename: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }
    }

    fn sample_bytes(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 31 % 256) as u8).collect()
    }

    #[test]
    fn test_roundtrip_independent_of_slice_size() {
        for len in [0, 1, 2, 3, 4, 5, 511, 512, 513, 1500, 4096] {
            let bytes = sample_bytes(len);
            let text = encode(&bytes);
            for slice in [0, 1, 2, 3, 7, 64, 512, 10_000] {
                let blob = decode_with_slice_size(&text, "application/octet-stream", slice)
                    .unwrap_or_else(|e| panic!("len {} slice {}: {}", len, slice, e));
                assert_eq!(blob.bytes, bytes, "len {} slice {}", len, slice);
            }
        }
    }

    #[test]
    fn test_decode_keeps_mime_type() {
        let blob = decode("aGVsbG8=", "text/plain").unwrap();
        assert_eq!(blob.bytes, b"hello");
        assert_eq!(blob.mime_type, "text/plain");
        assert_eq!(blob.len(), 5);
    }

    #[test]
    fn test_decode_rejects_invalid_base64() {
        assert!(decode("not base64!", "text/plain").is_err());
        assert!(decode("abc", "text/plain").is_err());
    }

    #[test]
    fn test_download_name() {
        assert_eq!(download_name("annual report 2024", ".pdf"), "annual_report_2024.pdf");
        assert_eq!(download_name("plain", ""), "plain");
    }

    #[test]
    fn test_trigger_download_swallows_errors() {
        let blob = decode("aGk=", "text/plain").unwrap();
        trigger_download(&blob, "hi.txt", &FailingTarget);
    }

    #[test]
    fn test_trigger_download_saves_empty_blob() {
        let target = CaptureTarget::default();
        let blob = decode("", "text/plain").unwrap();
        assert!(blob.is_empty());

        trigger_download(&blob, "empty.txt", &target);
        let saved = target.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0, "empty.txt");
    }

    #[test]
    fn test_directory_target_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = DirectorySaveTarget::new(dir.path().join("downloads"));
        let blob = decode(&encode(b"\x00\x01binary"), "application/octet-stream").unwrap();

        target.save(&blob, "../escape.bin").unwrap();
        let written = fs::read(target.dir().join("escape.bin")).unwrap();
        assert_eq!(written, b"\x00\x01binary");
    }

    #[tokio::test]
    async fn test_download_file_saves_decoded_content() {
        let router = Router::new().route(
            "/auth/user/:user/category/:categ/file/:file",
            get(|| async {
                Json(json!({
                    "file_id": "f1",
                    "categ_id": "c1",
                    "name": "my notes",
                    "extension": ".txt",
                    "mimetype": "text/plain",
                    "blob": encode(b"hello world")
                }))
            }),
        );
        let ctx = spawn_stub(router).await;
        let target = CaptureTarget::default();

        let name = download_file(&ctx.api, "u1", "c1", "f1", &target).await;
        assert_eq!(name.as_deref(), Some("my_notes.txt"));

        let saved = target.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0, "my_notes.txt");
        assert_eq!(saved[0].1.bytes, b"hello world");
        assert_eq!(saved[0].1.mime_type, "text/plain");
    }

    #[tokio::test]
    async fn test_download_file_missing_is_silent() {
        let router = Router::new().route(
            "/auth/user/:user/category/:categ/file/:file",
            get(|| async { StatusCode::NO_CONTENT }),
        );
        let ctx = spawn_stub(router).await;
        let target = CaptureTarget::default();

        assert_eq!(download_file(&ctx.api, "u1", "c1", "f1", &target).await, None);
        assert!(target.saved.lock().unwrap().is_empty());
    }
}
