//! Upload directory management.
//!
//! Multipart file parts are streamed straight to disk under a generated name
//! before any database write. If the write that should reference them fails,
//! the handler calls [`StagedUploads::discard`] so no orphaned bytes remain.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use axum::extract::multipart::Field;
use axum::extract::Multipart;
use minutes_core::uploads::{
    check_allowed, generate_stored_name, public_path, stored_name_from_public_path, UploadError,
};
use minutes_db::models::attached_file::NewAttachedFile;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, AppResult};

/// The directory uploads are written to, plus the per-file size ceiling.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
    max_file_bytes: u64,
}

/// A file part written to the upload directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// Client-supplied file name, as sent.
    pub original_name: String,
    pub stored_name: String,
    /// `/uploads/{stored_name}`.
    pub public_path: String,
    pub size: u64,
    pub mime: Option<String>,
}

impl StoredUpload {
    pub fn to_attachment(&self) -> NewAttachedFile {
        NewAttachedFile {
            file_name: self.original_name.clone(),
            file_path: self.public_path.clone(),
            file_size: i64::try_from(self.size).unwrap_or(i64::MAX),
            file_type: self.mime.clone(),
        }
    }
}

/// Files written for one request and not yet committed to the database.
#[derive(Debug)]
pub struct StagedUploads {
    store: UploadStore,
    files: Vec<StoredUpload>,
}

impl StagedUploads {
    pub fn files(&self) -> &[StoredUpload] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn attachments(&self) -> Vec<NewAttachedFile> {
        self.files.iter().map(StoredUpload::to_attachment).collect()
    }

    /// Keep the files if `result` is `Ok`, otherwise remove them.
    pub async fn settle<T, E>(self, result: Result<T, E>) -> Result<T, E> {
        if result.is_err() {
            self.discard().await;
        }
        result
    }

    /// Remove every staged file from disk.
    pub async fn discard(self) {
        for file in &self.files {
            self.store.remove(&file.public_path).await;
        }
    }
}

/// Text fields and staged files of one multipart request.
#[derive(Debug)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub files: StagedUploads,
}

impl UploadForm {
    /// Non-blank text field value.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Remove and return a field exactly as sent, blank or not.
    pub fn take(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>, max_file_bytes: u64) -> Self {
        Self {
            root: root.into(),
            max_file_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_bytes
    }

    /// Create the upload directory if it does not exist yet.
    pub async fn ensure_root(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Whether a file can currently be created in the upload directory.
    pub async fn is_writable(&self) -> bool {
        let probe = self
            .root
            .join(format!(".probe-{}", uuid::Uuid::new_v4().simple()));
        match tokio::fs::write(&probe, b"").await {
            Ok(()) => {
                let _ = tokio::fs::remove_file(&probe).await;
                true
            }
            Err(e) => {
                tracing::warn!(path = %self.root.display(), error = %e, "Upload directory not writable");
                false
            }
        }
    }

    /// Read a whole multipart request, streaming parts named `file_field`
    /// to disk (at most `max_files` of them) and collecting all other parts
    /// as text.
    ///
    /// On any error the files already written are removed before returning.
    pub async fn read_form(
        &self,
        multipart: &mut Multipart,
        file_field: &str,
        max_files: usize,
    ) -> AppResult<UploadForm> {
        let mut fields = HashMap::new();
        let mut files = StagedUploads {
            store: self.clone(),
            files: Vec::new(),
        };

        if let Err(e) = self
            .collect_parts(multipart, file_field, max_files, &mut fields, &mut files.files)
            .await
        {
            files.discard().await;
            return Err(e);
        }

        Ok(UploadForm { fields, files })
    }

    async fn collect_parts(
        &self,
        multipart: &mut Multipart,
        file_field: &str,
        max_files: usize,
        fields: &mut HashMap<String, String>,
        files: &mut Vec<StoredUpload>,
    ) -> AppResult<()> {
        let array_field = format!("{file_field}[]");

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            if name == file_field || name == array_field {
                // Browsers send an empty part when no file was chosen.
                if field.file_name().map_or(true, str::is_empty) {
                    continue;
                }
                if files.len() >= max_files {
                    return Err(UploadError::TooManyFiles { max: max_files }.into());
                }
                files.push(self.store_field(field).await?);
            } else {
                let text = field.text().await?;
                fields.insert(name, text);
            }
        }

        Ok(())
    }

    /// Validate one file part and stream it into the upload directory.
    async fn store_field(&self, mut field: Field<'_>) -> AppResult<StoredUpload> {
        let original_name = field.file_name().unwrap_or("file").to_string();
        let mime = field.content_type().map(String::from);
        check_allowed(mime.as_deref(), &original_name)?;

        let stored_name = generate_stored_name(&original_name);
        let path = self.root.join(&stored_name);

        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| storage_error(&path, e))?;

        match self.write_chunks(&mut field, &mut file, &path).await {
            Ok(size) => {
                tracing::debug!(stored_name = %stored_name, size, "Stored upload");
                Ok(StoredUpload {
                    original_name,
                    public_path: public_path(&stored_name),
                    stored_name,
                    size,
                    mime,
                })
            }
            Err(e) => {
                drop(file);
                if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                    tracing::warn!(path = %path.display(), error = %remove_err, "Failed to remove partial upload");
                }
                Err(e)
            }
        }
    }

    async fn write_chunks(
        &self,
        field: &mut Field<'_>,
        file: &mut tokio::fs::File,
        path: &Path,
    ) -> AppResult<u64> {
        let mut size: u64 = 0;
        while let Some(chunk) = field.chunk().await? {
            size += chunk.len() as u64;
            if size > self.max_file_bytes {
                return Err(UploadError::TooLarge {
                    limit: self.max_file_bytes,
                }
                .into());
            }
            file.write_all(&chunk)
                .await
                .map_err(|e| storage_error(path, e))?;
        }
        file.flush().await.map_err(|e| storage_error(path, e))?;
        Ok(size)
    }

    /// Delete the bytes behind a public path. Missing files, empty paths and
    /// paths outside the upload directory are ignored.
    pub async fn remove(&self, public_path: &str) {
        let Some(name) = stored_name_from_public_path(public_path) else {
            if !public_path.is_empty() {
                tracing::warn!(public_path, "Refusing to remove file outside the upload directory");
            }
            return;
        };

        match tokio::fs::remove_file(self.root.join(name)).await {
            Ok(()) => tracing::debug!(public_path, "Removed stored file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(public_path, "Stored file already absent");
            }
            Err(e) => tracing::warn!(public_path, error = %e, "Failed to remove stored file"),
        }
    }

    /// Remove several stored files; see [`UploadStore::remove`].
    pub async fn remove_all<S: AsRef<str> + Sync>(&self, public_paths: &[S]) {
        for path in public_paths {
            self.remove(path.as_ref()).await;
        }
    }
}

fn storage_error(path: &Path, err: io::Error) -> AppError {
    AppError::InternalError(format!("Failed to write {}: {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;

    use super::*;

    const BOUNDARY: &str = "minutes-test-boundary";

    /// `(field name, Some((file name, content type)) for files, body)`.
    type Part<'a> = (&'a str, Option<(&'a str, &'a str)>, &'a [u8]);

    async fn multipart(parts: &[Part<'_>]) -> Multipart {
        let mut body = Vec::new();
        for (name, file, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file {
                Some((file_name, content_type)) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    fn stored_count(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn files_are_streamed_and_text_fields_collected() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path(), 1024);
        let mut form = multipart(&[
            ("agenda_topic", None, "งบประมาณ".as_bytes()),
            ("files", Some(("minutes.pdf", "application/pdf")), b"%PDF-1.4"),
            ("files", Some(("notes.txt", "text/plain")), b"hello"),
        ])
        .await;

        let form = store.read_form(&mut form, "files", 5).await.unwrap();

        assert_eq!(form.text("agenda_topic"), Some("งบประมาณ"));
        assert_eq!(form.files.len(), 2);
        let first = &form.files.files()[0];
        assert_eq!(first.original_name, "minutes.pdf");
        assert_eq!(first.size, 8);
        assert!(first.public_path.starts_with("/uploads/meeting_"));
        assert!(dir.path().join(&first.stored_name).exists());
    }

    #[tokio::test]
    async fn disallowed_type_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path(), 1024);
        let mut form = multipart(&[
            ("files", Some(("ok.pdf", "application/pdf")), b"%PDF"),
            ("files", Some(("run.exe", "application/x-msdownload")), b"MZ"),
        ])
        .await;

        let result = store.read_form(&mut form, "files", 5).await;

        assert_matches!(
            result,
            Err(AppError::Upload(UploadError::DisallowedType { .. }))
        );
        assert_eq!(stored_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn oversized_file_is_rejected_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path(), 4);
        let mut form = multipart(&[("pdfFile", Some(("big.pdf", "application/pdf")), b"0123456789")]).await;

        let result = store.read_form(&mut form, "pdfFile", 1).await;

        assert_matches!(result, Err(AppError::Upload(UploadError::TooLarge { limit: 4 })));
        assert_eq!(stored_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn too_many_files_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path(), 1024);
        let mut form = multipart(&[
            ("files", Some(("a.txt", "text/plain")), b"a"),
            ("files", Some(("b.txt", "text/plain")), b"b"),
        ])
        .await;

        let result = store.read_form(&mut form, "files", 1).await;

        assert_matches!(result, Err(AppError::Upload(UploadError::TooManyFiles { max: 1 })));
        assert_eq!(stored_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn discard_removes_staged_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path(), 1024);
        let mut form = multipart(&[("files", Some(("a.txt", "text/plain")), b"a")]).await;

        let form = store.read_form(&mut form, "files", 5).await.unwrap();
        assert_eq!(stored_count(dir.path()), 1);

        form.files.discard().await;
        assert_eq!(stored_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn settle_keeps_files_only_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path(), 1024);

        let mut ok = multipart(&[("files", Some(("a.txt", "text/plain")), b"a")]).await;
        let form = store.read_form(&mut ok, "files", 5).await.unwrap();
        let kept: Result<u8, ()> = form.files.settle(Ok(1)).await;
        assert_eq!(kept, Ok(1));
        assert_eq!(stored_count(dir.path()), 1);

        let mut failed = multipart(&[("files", Some(("b.txt", "text/plain")), b"b")]).await;
        let form = store.read_form(&mut failed, "files", 5).await.unwrap();
        let dropped: Result<u8, &str> = form.files.settle(Err("insert failed")).await;
        assert_eq!(dropped, Err("insert failed"));
        assert_eq!(stored_count(dir.path()), 1);
    }

    #[tokio::test]
    async fn removing_missing_or_foreign_paths_is_harmless() {
        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("keep.txt");
        std::fs::write(&outside, b"x").unwrap();
        let store = UploadStore::new(dir.path().join("uploads"), 1024);

        store.remove("").await;
        store.remove("/uploads/never-existed.pdf").await;
        store.remove("/uploads/../keep.txt").await;

        assert!(outside.exists());
    }

    fn assert_send<T: Send>(_: &T) {}

    #[tokio::test]
    async fn remove_all_takes_borrowed_paths_across_await() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path(), 1024);
        let mut form = multipart(&[
            ("files", Some(("a.txt", "text/plain")), b"a"),
            ("files", Some(("b.txt", "text/plain")), b"b"),
        ])
        .await;
        let form = store.read_form(&mut form, "files", 5).await.unwrap();
        let paths: Vec<&str> = form
            .files
            .files()
            .iter()
            .map(|f| f.public_path.as_str())
            .collect();

        let removal = store.remove_all(&paths);
        assert_send(&removal);
        removal.await;

        assert_eq!(stored_count(dir.path()), 0);
    }
}
