//! Upload validation and object path construction

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use super::ValidationError;

/// Largest accepted upload (10 MiB)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Folder used when the client does not name one
const DEFAULT_FOLDER: &str = "uploads";

/// Characters outside this set are replaced in file names
static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("invalid filename regex"));

/// Folder segments: lowercase slug segments separated by `/`
static FOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9_-]{0,63}(/[a-z0-9][a-z0-9_-]{0,63}){0,3}$")
        .expect("invalid folder regex")
});

/// Check size and content type of an uploaded file.
pub fn validate_upload(content_type: Option<&str>, len: usize) -> Result<(), ValidationError> {
    if len == 0 {
        return Err(ValidationError::Upload {
            reason: "file is empty".into(),
        });
    }
    if len > MAX_UPLOAD_BYTES {
        return Err(ValidationError::Upload {
            reason: format!("file exceeds {} bytes", MAX_UPLOAD_BYTES),
        });
    }

    let content_type = content_type.unwrap_or_default().trim().to_ascii_lowercase();
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    if essence.starts_with("image/") || essence == "application/pdf" {
        Ok(())
    } else if essence.is_empty() {
        Err(ValidationError::Upload {
            reason: "missing content type".into(),
        })
    } else {
        Err(ValidationError::Upload {
            reason: format!("content type '{}' is not allowed", essence),
        })
    }
}

/// Reduce a client-supplied file name to a safe object key segment.
pub fn sanitize_filename(name: &str) -> String {
    // Browsers may send a full path; keep only the final segment
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned = UNSAFE_CHARS.replace_all(base, "-");
    let cleaned = cleaned.trim_matches(|c| c == '-' || c == '.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.chars().take(100).collect()
    }
}

/// Validate an optional folder; falls back to `uploads`.
pub fn upload_folder(folder: Option<&str>) -> Result<String, ValidationError> {
    match folder.map(|f| f.trim().trim_matches('/')) {
        None | Some("") => Ok(DEFAULT_FOLDER.to_string()),
        Some(f) if FOLDER_RE.is_match(f) => Ok(f.to_string()),
        Some(_) => Err(ValidationError::InvalidFormat {
            field: "folder",
            reason: "must be lowercase slug segments separated by '/'",
        }),
    }
}

/// `{folder}/{id}-{sanitized name}`
pub fn object_path(folder: &str, id: Uuid, filename: &str) -> String {
    format!("{}/{}-{}", folder, id, sanitize_filename(filename))
}
