/**
 * Editor Document Store
 *
 * Produces the rendition of a source file the editor asked for and keeps it
 * in a cache directory keyed by document and source file:
 *
 * ```text
 * cache_dir/
 * └── <doc_id>/
 *     └── <source key>/
 *         ├── document.docx
 *         └── document.pdf
 * ```
 *
 * The source key is a name-based UUID of the source path, so two share
 * tokens opened under the same document id never read each other's
 * renditions.
 *
 * A rendition in the source's own format is a plain copy. Anything else is
 * delegated to an external converter invoked as `<program> <input> <output>`.
 * Renditions are written to a temporary name and renamed into place so a
 * concurrent reader never sees a partial file.
 */

use async_trait::async_trait;
use axum::http::StatusCode;
use bytes::{Bytes, BytesMut};
use futures_util::stream::{self, Stream};
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::io::{AsyncRead, AsyncReadExt};
use uuid::Uuid;

use crate::backend::document::storage::SourceFile;
use crate::backend::error::BackendError;

/// Read size used when streaming renditions
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Byte stream handed to the HTTP layer
pub type FileStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// A rendition ready to be streamed
///
/// Reading consumes the handle; ownership of the bytes passes to the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    path: PathBuf,
    format: String,
}

impl RenderedFile {
    pub fn new(path: PathBuf, format: impl Into<String>) -> Self {
        Self {
            path,
            format: format.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// Open the rendition as a chunked stream
    pub async fn read(self) -> Result<FileStream, BackendError> {
        let file = tokio::fs::File::open(&self.path).await?;
        Ok(Box::pin(chunked(file)))
    }
}

/// Turn a reader into a stream of `CHUNK_SIZE` chunks, ending after the first error
pub fn chunked<R>(reader: R) -> impl Stream<Item = io::Result<Bytes>> + Send
where
    R: AsyncRead + Unpin + Send + 'static,
{
    stream::unfold(Some(reader), |state| async move {
        let mut reader = state?;
        let mut buf = BytesMut::with_capacity(CHUNK_SIZE);
        match reader.read_buf(&mut buf).await {
            Ok(0) => None,
            Ok(_) => Some((Ok(buf.freeze()), Some(reader))),
            Err(e) => Some((Err(e), None)),
        }
    })
}

/// Produces editor renditions of source files
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Get (or build) the `format` rendition of `source` for document `doc_id`
    async fn get_document_for_editor(
        &self,
        doc_id: i64,
        source: &SourceFile,
        format: &str,
    ) -> Result<RenderedFile, BackendError>;
}

/// Filesystem-backed document store
#[derive(Debug, Clone)]
pub struct LocalDocumentStore {
    cache_dir: PathBuf,
    converter: Option<PathBuf>,
}

/// Stable cache key of a source file
fn source_key(source: &SourceFile) -> String {
    let path = source.path.to_string_lossy();
    Uuid::new_v5(&Uuid::NAMESPACE_URL, path.as_bytes())
        .simple()
        .to_string()
}

impl LocalDocumentStore {
    pub fn new(cache_dir: PathBuf, converter: Option<PathBuf>) -> Self {
        Self {
            cache_dir,
            converter,
        }
    }

    /// Cache directory of `source` opened as document `doc_id`
    fn rendition_dir(&self, doc_id: i64, source: &SourceFile) -> PathBuf {
        self.cache_dir
            .join(doc_id.to_string())
            .join(source_key(source))
    }

    async fn render(
        &self,
        source: &SourceFile,
        format: &str,
        output: &Path,
    ) -> Result<(), BackendError> {
        if source.extension().as_deref() == Some(format) {
            tokio::fs::copy(&source.path, output).await?;
            return Ok(());
        }

        let program = self.converter.as_ref().ok_or_else(|| {
            BackendError::handler(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                format!("Cannot render {} as {}", source.name, format),
            )
        })?;

        tracing::info!("[Document] Converting {} to {}", source.name, format);
        let status = tokio::process::Command::new(program)
            .arg(&source.path)
            .arg(output)
            .status()
            .await?;

        if !status.success() {
            tracing::error!("[Document] Converter exited with {} for {}", status, source.name);
            return Err(BackendError::handler(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Document conversion failed",
            ));
        }
        Ok(())
    }
}

fn is_valid_format(format: &str) -> bool {
    !format.is_empty()
        && format.len() <= 10
        && format.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn get_document_for_editor(
        &self,
        doc_id: i64,
        source: &SourceFile,
        format: &str,
    ) -> Result<RenderedFile, BackendError> {
        let format = format.to_ascii_lowercase();
        if !is_valid_format(&format) {
            return Err(BackendError::handler(StatusCode::BAD_REQUEST, "Invalid format"));
        }

        let dir = self.rendition_dir(doc_id, source);
        let target = dir.join(format!("document.{}", format));
        if tokio::fs::try_exists(&target).await? {
            tracing::debug!(
                "[Document] Reusing cached {} rendition of document {}",
                format,
                doc_id
            );
            return Ok(RenderedFile::new(target, format));
        }

        // concurrent renders of one source each write their own partial file;
        // rename replaces the target atomically with identical content
        tokio::fs::create_dir_all(&dir).await?;
        let partial = dir.join(format!(".document.{}.{}", format, Uuid::new_v4().simple()));
        if let Err(e) = self.render(source, &format, &partial).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }
        tokio::fs::rename(&partial, &target).await?;

        tracing::info!("[Document] Prepared {} rendition of document {}", format, doc_id);
        Ok(RenderedFile::new(target, format))
    }
}
