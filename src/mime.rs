//! MIME type and content-encoding guessing from file names

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use tracing::{info, warn};

/// Built-in extension to MIME type table covering common build
/// artifacts. Overlay files extend or override it at startup.
const BUILTIN_TYPES: &[(&str, &str)] = &[
    ("css", "text/css"),
    ("csv", "text/csv"),
    ("eot", "application/vnd.ms-fontobject"),
    ("gif", "image/gif"),
    ("htm", "text/html"),
    ("html", "text/html"),
    ("ico", "image/vnd.microsoft.icon"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("js", "application/javascript"),
    ("json", "application/json"),
    ("map", "application/json"),
    ("md", "text/markdown"),
    ("mjs", "application/javascript"),
    ("mp3", "audio/mpeg"),
    ("mp4", "video/mp4"),
    ("otf", "font/otf"),
    ("pdf", "application/pdf"),
    ("png", "image/png"),
    ("svg", "image/svg+xml"),
    ("ttf", "font/ttf"),
    ("txt", "text/plain"),
    ("wasm", "application/wasm"),
    ("webm", "video/webm"),
    ("webp", "image/webp"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("xml", "application/xml"),
];

/// Suffixes that denote a content encoding rather than a type.
/// `.gzip` is accepted alongside the standard `.gz`.
const BUILTIN_ENCODINGS: &[(&str, &str)] = &[("gz", "gzip"), ("gzip", "gzip")];

/// Extensible filename-to-MIME lookup with encoding detection
#[derive(Debug, Clone)]
pub struct MimeRegistry {
    types: HashMap<String, String>,
    encodings: HashMap<String, String>,
}

impl Default for MimeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MimeRegistry {
    /// Create a registry with the built-in tables
    pub fn new() -> Self {
        let types = BUILTIN_TYPES
            .iter()
            .map(|(ext, mime)| (ext.to_string(), mime.to_string()))
            .collect();
        let encodings = BUILTIN_ENCODINGS
            .iter()
            .map(|(ext, enc)| (ext.to_string(), enc.to_string()))
            .collect();

        Self { types, encodings }
    }

    /// Merge a `mime.types`-format file (`type/subtype ext ext...`,
    /// `#` comments) over the current table. A missing file is
    /// ignored; any other read failure logs a warning.
    pub fn load_overlay(&mut self, path: &Path) {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("{} could not be opened, ignoring", path.display());
                return;
            }
            Err(e) => {
                warn!("Could not read {}: {}", path.display(), e);
                return;
            }
        };

        for line in content.lines() {
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }

            let mut fields = line.split_whitespace();
            let mime = match fields.next() {
                Some(mime) => mime,
                None => continue,
            };
            for ext in fields {
                self.types.insert(
                    ext.trim_start_matches('.').to_ascii_lowercase(),
                    mime.to_string(),
                );
            }
        }
    }

    /// Guess the MIME type and content encoding for a file name.
    ///
    /// An encoding suffix (`.gz`, `.gzip`) is stripped before the type
    /// lookup, so `bundle.js.gz` guesses as JavaScript with `gzip`
    /// encoding. Lookups are case-insensitive.
    pub fn guess(&self, path: &Path) -> (Option<&str>, Option<&str>) {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return (None, None),
        };

        let (stem, encoding) = match last_extension(name) {
            Some((stem, ext)) => match self.encodings.get(&ext) {
                Some(encoding) => (stem, Some(encoding.as_str())),
                None => (name, None),
            },
            None => (name, None),
        };

        let mime = last_extension(stem)
            .and_then(|(_, ext)| self.types.get(&ext))
            .map(String::as_str);

        (mime, encoding)
    }
}

/// Split off the final extension, lowercased. Leading-dot names like
/// `.DS_Store` have no extension.
fn last_extension(name: &str) -> Option<(&str, String)> {
    let idx = name.rfind('.')?;
    if idx == 0 {
        return None;
    }
    Some((&name[..idx], name[idx + 1..].to_ascii_lowercase()))
}
