use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::foundation::error::{DubframeError, DubframeResult};

/// Where a delivered file ended up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveredFile {
    /// Final file name, after sanitizing.
    pub file_name: String,
    /// Content MIME type.
    pub mime: String,
    /// Size in bytes.
    pub len: usize,
    /// Location on disk, when the target writes files.
    pub path: Option<PathBuf>,
}

/// Destination for finished exports and voice downloads.
pub trait DownloadTarget {
    /// Hand `bytes` to the user under `file_name`.
    fn deliver(&mut self, file_name: &str, mime: &str, bytes: &[u8])
    -> DubframeResult<DeliveredFile>;
}

/// Milliseconds since the Unix epoch, used to make download names unique.
pub fn timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Name of an exported video: `translated_video_<ratio>_<ts>.<ext>`.
pub fn export_file_name(ratio_label: &str, ts_ms: i64, extension: &str) -> String {
    format!("translated_video_{ratio_label}_{ts_ms}.{extension}")
}

/// Name of a downloaded voice track: `dubbing-<lang>-<ts>.wav`.
pub fn wav_file_name(language: &str, ts_ms: i64) -> String {
    format!("dubbing-{language}-{ts_ms}.wav")
}

/// Make `name` safe as a single path component (`16:9` becomes `16-9`).
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ':' | '/' | '\\' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect()
}

/// Writes deliveries into a directory.
#[derive(Clone, Debug)]
pub struct DirectoryDownloads {
    dir: PathBuf,
}

impl DirectoryDownloads {
    /// Target writing into `dir` (created on first delivery).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Destination directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadTarget for DirectoryDownloads {
    fn deliver(
        &mut self,
        file_name: &str,
        mime: &str,
        bytes: &[u8],
    ) -> DubframeResult<DeliveredFile> {
        let file_name = sanitize_file_name(file_name);
        if file_name.is_empty() {
            return Err(DubframeError::validation("download file name is empty"));
        }
        let path = self.dir.join(&file_name);
        ensure_parent_dir(&path)?;
        std::fs::write(&path, bytes).map_err(|e| {
            DubframeError::resource(format!("failed to write '{}': {e}", path.display()))
        })?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "download written");
        Ok(DeliveredFile {
            file_name,
            mime: mime.to_owned(),
            len: bytes.len(),
            path: Some(path),
        })
    }
}

/// A delivery kept by [`InMemoryDownloads`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredDownload {
    /// Sanitized file name.
    pub file_name: String,
    /// Content MIME type.
    pub mime: String,
    /// Content bytes.
    pub bytes: Vec<u8>,
}

/// Keeps deliveries in memory; clones share the same list.
#[derive(Clone, Debug, Default)]
pub struct InMemoryDownloads {
    files: Arc<Mutex<Vec<StoredDownload>>>,
}

impl InMemoryDownloads {
    /// Empty target.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far.
    pub fn files(&self) -> Vec<StoredDownload> {
        self.files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl DownloadTarget for InMemoryDownloads {
    fn deliver(
        &mut self,
        file_name: &str,
        mime: &str,
        bytes: &[u8],
    ) -> DubframeResult<DeliveredFile> {
        let file_name = sanitize_file_name(file_name);
        self.files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(StoredDownload {
                file_name: file_name.clone(),
                mime: mime.to_owned(),
                bytes: bytes.to_vec(),
            });
        Ok(DeliveredFile {
            file_name,
            mime: mime.to_owned(),
            len: bytes.len(),
            path: None,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/download.rs"]
mod tests;
