//! Per-file upload header derivation

use std::path::Path;

use crate::cache_control::render_cache_control;
use crate::config::MimeSettingsTable;
use crate::mime::MimeRegistry;

/// Canned ACL applied to every uploaded object
pub const UPLOAD_ACL: &str = "public-read";

/// Headers attached to a single object upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadHeaders {
    pub acl: &'static str,
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
    pub cache_control: Option<String>,
}

impl Default for UploadHeaders {
    fn default() -> Self {
        Self {
            acl: UPLOAD_ACL,
            content_type: None,
            content_encoding: None,
            cache_control: None,
        }
    }
}

/// Compute the upload headers for one file.
///
/// Text types get an explicit UTF-8 charset; the cache-control header
/// comes from the per-MIME-type settings table when an entry exists.
pub fn derive_headers(
    path: &Path,
    registry: &MimeRegistry,
    mime_types: &MimeSettingsTable,
) -> UploadHeaders {
    let (mime, encoding) = registry.guess(path);

    let content_type = mime.map(|mime| {
        if mime.starts_with("text/") {
            format!("{}; charset=UTF-8", mime)
        } else {
            mime.to_string()
        }
    });

    let cache_control = mime
        .and_then(|mime| mime_types.get(mime))
        .and_then(|settings| settings.cache_control.as_ref())
        .map(render_cache_control);

    UploadHeaders {
        acl: UPLOAD_ACL,
        content_type,
        content_encoding: encoding.map(str::to_string),
        cache_control,
    }
}
