//! Upload policy: which files are accepted, how many, how large, and what
//! they are called once stored.

use chrono::Utc;

/// Public URL prefix under which stored uploads are served.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Per-file ceiling used when `MAX_UPLOAD_BYTES` is not configured (20 MiB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 20 * 1024 * 1024;

/// Most attachments accepted in one meeting upload request.
pub const MAX_MEETING_FILES: usize = 10;

/// Most attachments accepted in one agenda upload request.
pub const MAX_AGENDA_FILES: usize = 5;

pub const ALLOWED_MIME_TYPES: &[&str] = &[
    // Documents
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "text/plain",
    "text/markdown",
    "text/csv",
    // Images
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/bmp",
    "image/webp",
    "image/svg+xml",
    // Archives
    "application/zip",
    "application/x-zip-compressed",
    "application/x-rar-compressed",
    "application/x-7z-compressed",
    "application/x-tar",
    "application/gzip",
    // Video
    "video/mp4",
    "video/mpeg",
    "video/quicktime",
    "video/x-msvideo",
    "video/x-ms-wmv",
    // Audio
    "audio/mpeg",
    "audio/wav",
    "audio/ogg",
    "audio/mp4",
];

/// Extensions accepted when the declared MIME type is not in the list above.
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "md", "csv", "jpg", "jpeg", "png",
    "gif", "bmp", "webp", "svg", "zip", "rar", "7z", "tar", "gz", "mp4", "mpeg", "mov", "avi",
    "wmv", "mp3", "wav", "ogg",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("File type not allowed: {mime} ({file_name})")]
    DisallowedType { mime: String, file_name: String },

    #[error("File exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },

    #[error("At most {max} files may be uploaded at once")]
    TooManyFiles { max: usize },

    #[error("No file was uploaded")]
    NoFile,

    #[error("Malformed upload: {0}")]
    Malformed(String),
}

/// Lower-cased extension of `file_name`, without the dot.
pub fn extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Whether a part with this declared MIME type and original name may be stored.
///
/// The declared type is checked first; the extension is a fallback for
/// clients that send `application/octet-stream` or nothing at all.
pub fn is_allowed(mime: Option<&str>, file_name: &str) -> bool {
    if let Some(mime) = mime {
        let essence = mime.split(';').next().unwrap_or(mime).trim();
        if ALLOWED_MIME_TYPES
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(essence))
        {
            return true;
        }
    }
    extension(file_name).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Check a part against the allow-list, producing the rejection error.
pub fn check_allowed(mime: Option<&str>, file_name: &str) -> Result<(), UploadError> {
    if is_allowed(mime, file_name) {
        Ok(())
    } else {
        Err(UploadError::DisallowedType {
            mime: mime.unwrap_or("unknown").to_string(),
            file_name: file_name.to_string(),
        })
    }
}

fn is_kept_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(c, '_' | '.' | ' ' | '-')
        // Thai consonants, then vowels and tone marks.
        || ('\u{0E01}'..='\u{0E2E}').contains(&c)
        || ('\u{0E30}'..='\u{0E4C}').contains(&c)
}

/// Strip everything but ASCII letters/digits, Thai script, `_`, `.`, space
/// and `-` from a client-supplied file name. Path separators never survive.
pub fn sanitize_file_name(original: &str) -> String {
    let cleaned: String = original.chars().filter(|&c| is_kept_char(c)).collect();
    let cleaned = cleaned.trim();
    let (stem, ext) = match cleaned.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() => (stem, Some(ext)),
        _ => (cleaned, None),
    };
    // A stem reduced to nothing still keeps the extension.
    let stem = match stem.trim_start_matches('.').trim() {
        "" => "file",
        stem => stem,
    };
    match ext {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem.to_string(),
    }
}

/// Stored name for an upload: `meeting_{millis}_{nonce}_{sanitized original}`.
pub fn stored_file_name(original: &str, unix_millis: i64, nonce: &str) -> String {
    format!(
        "meeting_{unix_millis}_{nonce}_{}",
        sanitize_file_name(original)
    )
}

/// [`stored_file_name`] with the current time and a random 8 hex digit nonce.
pub fn generate_stored_name(original: &str) -> String {
    let nonce = uuid::Uuid::new_v4().simple().to_string();
    stored_file_name(original, Utc::now().timestamp_millis(), &nonce[..8])
}

/// Public path (`/uploads/{name}`) for a stored file name.
pub fn public_path(stored_name: &str) -> String {
    format!("{PUBLIC_PREFIX}/{stored_name}")
}

/// Stored file name referenced by a public path, if it is one of ours.
///
/// Returns `None` for empty paths, paths outside [`PUBLIC_PREFIX`], and
/// anything that would escape the upload directory.
pub fn stored_name_from_public_path(path: &str) -> Option<&str> {
    let name = path.strip_prefix(PUBLIC_PREFIX)?.strip_prefix('/')?;
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return None;
    }
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn declared_mime_is_accepted() {
        assert!(is_allowed(Some("application/pdf"), "minutes.bin"));
        assert!(is_allowed(Some("Image/PNG"), "scan"));
        assert!(is_allowed(Some("text/plain; charset=utf-8"), "notes"));
    }

    #[test]
    fn extension_is_the_fallback() {
        assert!(is_allowed(Some("application/octet-stream"), "agenda.DOCX"));
        assert!(is_allowed(None, "photo.jpeg"));
    }

    #[test]
    fn executables_are_rejected() {
        assert!(!is_allowed(Some("application/x-msdownload"), "setup.exe"));
        assert!(!is_allowed(None, "script"));
        assert!(!is_allowed(None, ".pdf"));
    }

    #[test]
    fn check_allowed_reports_the_offending_part() {
        let err = check_allowed(Some("application/x-sh"), "run.sh").unwrap_err();
        assert_matches!(err, UploadError::DisallowedType { ref mime, ref file_name }
            if mime == "application/x-sh" && file_name == "run.sh");
    }

    #[test]
    fn sanitize_keeps_thai_and_safe_ascii() {
        assert_eq!(
            sanitize_file_name("รายงานการประชุม ครั้งที่-1.pdf"),
            "รายงานการประชุม ครั้งที่-1.pdf"
        );
        assert_eq!(sanitize_file_name("report_v2 (final).pdf"), "report_v2 final.pdf");
    }

    #[test]
    fn sanitize_removes_path_components() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "file.etcpasswd");
        assert_eq!(sanitize_file_name("C:\\temp\\a.txt"), "Ctempa.txt");
    }

    #[test]
    fn sanitize_keeps_the_extension_when_the_stem_is_lost() {
        assert_eq!(sanitize_file_name("???.pdf"), "file.pdf");
        assert_eq!(sanitize_file_name("«»  .docx"), "file.docx");
        assert_eq!(sanitize_file_name("?.tar.gz"), "tar.gz");
        assert!(stored_file_name("???.pdf", 1, "abcd1234").ends_with("_file.pdf"));
    }

    #[test]
    fn sanitize_never_returns_an_empty_name() {
        assert_eq!(sanitize_file_name("???"), "file");
        assert_eq!(sanitize_file_name(".."), "file");
    }

    #[test]
    fn stored_name_layout() {
        assert_eq!(
            stored_file_name("a b.pdf", 1_700_000_000_000, "deadbeef"),
            "meeting_1700000000000_deadbeef_a b.pdf"
        );
    }

    #[test]
    fn generated_names_differ() {
        assert_ne!(generate_stored_name("x.pdf"), generate_stored_name("x.pdf"));
    }

    #[test]
    fn public_path_round_trip() {
        let path = public_path("meeting_1_abcd1234_x.pdf");
        assert_eq!(path, "/uploads/meeting_1_abcd1234_x.pdf");
        assert_eq!(stored_name_from_public_path(&path), Some("meeting_1_abcd1234_x.pdf"));
    }

    #[test]
    fn foreign_or_escaping_paths_are_ignored() {
        assert_eq!(stored_name_from_public_path(""), None);
        assert_eq!(stored_name_from_public_path("/uploads/"), None);
        assert_eq!(stored_name_from_public_path("/etc/passwd"), None);
        assert_eq!(stored_name_from_public_path("/uploads/../secret"), None);
        assert_eq!(stored_name_from_public_path("/uploads/.."), None);
    }
}
