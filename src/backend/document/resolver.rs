/**
 * Document Resolver
 *
 * Turns an editor's "open document" request into a byte stream:
 *
 * 1. Read the share token out of the callback URL the editor supplied
 * 2. Resolve it to a source file through the storage backend
 * 3. Ask the document store for the rendition in the requested format
 * 4. Hand back the rendition as a stream
 *
 * A missing token, a malformed one and one that resolves to nothing all
 * fail with `Forbidden`. Storage failures propagate unchanged.
 */

use std::sync::Arc;

use crate::backend::document::storage::FileResolver;
use crate::backend::document::store::{DocumentStore, FileStream};
use crate::backend::document::url_decoder::extract_share_token;
use crate::backend::error::BackendError;

/// Resolves and streams documents for the editor
#[derive(Clone)]
pub struct DocumentResolver {
    files: Arc<dyn FileResolver>,
    store: Arc<dyn DocumentStore>,
}

impl DocumentResolver {
    pub fn new(files: Arc<dyn FileResolver>, store: Arc<dyn DocumentStore>) -> Self {
        Self { files, store }
    }

    /// Open document `doc_id` in `format`, authorised by the token in `url`
    pub async fn open_document(
        &self,
        doc_id: i64,
        format: &str,
        url: &str,
    ) -> Result<FileStream, BackendError> {
        let token = extract_share_token(url).ok_or_else(|| {
            tracing::warn!("[Document] No share token in callback URL for document {}", doc_id);
            BackendError::forbidden("Failed to get document")
        })?;

        let source = self
            .files
            .resolve_file_for_token(&token)
            .await?
            .ok_or_else(|| {
                tracing::warn!("[Document] Share token does not resolve for document {}", doc_id);
                BackendError::forbidden("Failed to get document")
            })?;

        tracing::info!("[Document] Opening {} as {} for document {}", source.name, format, doc_id);

        let rendered = self
            .store
            .get_document_for_editor(doc_id, &source, format)
            .await?;
        rendered.read().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::document::storage::{ShareRegistry, SourceFile};
    use crate::backend::document::store::RenderedFile;
    use async_trait::async_trait;
    use bytes::Bytes;
    use futures_util::TryStreamExt;
    use std::sync::Mutex;

    /// Store that serves a fixed rendition and records what it was asked for
    struct RecordingStore {
        rendition: std::path::PathBuf,
        calls: Mutex<Vec<(i64, String, String)>>,
    }

    #[async_trait]
    impl DocumentStore for RecordingStore {
        async fn get_document_for_editor(
            &self,
            doc_id: i64,
            source: &SourceFile,
            format: &str,
        ) -> Result<RenderedFile, BackendError> {
            self.calls
                .lock()
                .unwrap()
                .push((doc_id, source.name.clone(), format.to_string()));
            Ok(RenderedFile::new(self.rendition.clone(), format))
        }
    }

    struct FailingResolver;

    #[async_trait]
    impl FileResolver for FailingResolver {
        async fn resolve_file_for_token(
            &self,
            _token: &str,
        ) -> Result<Option<SourceFile>, BackendError> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "backend down").into())
        }
    }

    fn fixture() -> (tempfile::TempDir, Arc<ShareRegistry>, Arc<RecordingStore>) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("report.docx"), b"docx").unwrap();
        std::fs::write(dir.path().join("report.pdf"), b"%PDF-1.7 rendition").unwrap();

        let registry = Arc::new(
            ShareRegistry::from_manifest(
                dir.path().to_path_buf(),
                "[[share]]\ntoken = \"abc123\"\npath = \"report.docx\"\n",
            )
            .unwrap(),
        );
        let store = Arc::new(RecordingStore {
            rendition: dir.path().join("report.pdf"),
            calls: Mutex::new(Vec::new()),
        });
        (dir, registry, store)
    }

    #[tokio::test]
    async fn test_open_document_streams_rendition() {
        let (_dir, registry, store) = fixture();
        let resolver = DocumentResolver::new(registry, store.clone());

        let stream = resolver
            .open_document(42, "pdf", "https://editor/cb?doc=abc123")
            .await
            .unwrap();
        let chunks: Vec<Bytes> = stream.try_collect().await.unwrap();

        assert_eq!(chunks.concat(), b"%PDF-1.7 rendition");
        assert_eq!(
            *store.calls.lock().unwrap(),
            vec![(42, "report.docx".to_string(), "pdf".to_string())]
        );
    }

    #[tokio::test]
    async fn test_bad_tokens_are_forbidden() {
        let (_dir, registry, store) = fixture();
        let resolver = DocumentResolver::new(registry, store.clone());

        for url in [
            "https://editor/cb",
            "https://editor/cb?doc=",
            "https://editor/cb?doc=%FF",
            "https://editor/cb?doc=nope",
        ] {
            let result = resolver.open_document(42, "pdf", url).await;
            assert!(matches!(result, Err(BackendError::Forbidden { .. })), "{}", url);
        }
        assert!(store.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_is_not_forbidden() {
        let (_dir, _registry, store) = fixture();
        let resolver = DocumentResolver::new(Arc::new(FailingResolver), store);

        let result = resolver
            .open_document(42, "pdf", "https://editor/cb?doc=abc123")
            .await;
        assert!(matches!(result, Err(BackendError::StorageError(_))));
    }
}
