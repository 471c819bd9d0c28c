//! Tests for MIME type and encoding guessing

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use s3_deploy::mime::MimeRegistry;

#[test]
fn test_guess_common_types() {
    let registry = MimeRegistry::new();

    assert_eq!(
        registry.guess(Path::new("index.html")),
        (Some("text/html"), None)
    );
    assert_eq!(
        registry.guess(Path::new("logo.png")),
        (Some("image/png"), None)
    );
    assert_eq!(
        registry.guess(Path::new("app.js")),
        (Some("application/javascript"), None)
    );
}

#[test]
fn test_guess_is_case_insensitive() {
    let registry = MimeRegistry::new();
    assert_eq!(
        registry.guess(Path::new("README.TXT")),
        (Some("text/plain"), None)
    );
}

#[test]
fn test_unknown_extension_has_no_type() {
    let registry = MimeRegistry::new();
    assert_eq!(registry.guess(Path::new("binary.xyz")), (None, None));
    assert_eq!(registry.guess(Path::new("no_extension")), (None, None));
}

#[test]
fn test_leading_dot_is_not_an_extension() {
    let registry = MimeRegistry::new();
    assert_eq!(registry.guess(Path::new(".DS_Store")), (None, None));
}

#[test]
fn test_gz_suffix_detects_encoding() {
    let registry = MimeRegistry::new();
    assert_eq!(
        registry.guess(Path::new("bundle.js.gz")),
        (Some("application/javascript"), Some("gzip"))
    );
}

#[test]
fn test_gzip_suffix_detects_encoding() {
    let registry = MimeRegistry::new();
    assert_eq!(
        registry.guess(Path::new("styles.css.gzip")),
        (Some("text/css"), Some("gzip"))
    );
}

#[test]
fn test_encoding_without_inner_type() {
    let registry = MimeRegistry::new();
    assert_eq!(registry.guess(Path::new("data.gz")), (None, Some("gzip")));
}

#[test]
fn test_overlay_adds_and_overrides() {
    let dir = TempDir::new().unwrap();
    let overlay = dir.path().join("mime.types");
    fs::write(
        &overlay,
        "# custom types\napplication/x-level level lvl\ntext/x-notes txt\n",
    )
    .unwrap();

    let mut registry = MimeRegistry::new();
    registry.load_overlay(&overlay);

    assert_eq!(
        registry.guess(Path::new("world.level")),
        (Some("application/x-level"), None)
    );
    assert_eq!(
        registry.guess(Path::new("world.lvl")),
        (Some("application/x-level"), None)
    );
    // Overlay wins over the built-in table
    assert_eq!(
        registry.guess(Path::new("notes.txt")),
        (Some("text/x-notes"), None)
    );
}

#[test]
fn test_later_overlay_wins() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("a.types");
    let second = dir.path().join("b.types");
    fs::write(&first, "application/x-first dat\n").unwrap();
    fs::write(&second, "application/x-second dat\n").unwrap();

    let mut registry = MimeRegistry::new();
    registry.load_overlay(&first);
    registry.load_overlay(&second);

    assert_eq!(
        registry.guess(Path::new("save.dat")),
        (Some("application/x-second"), None)
    );
}

#[test]
fn test_missing_overlay_is_ignored() {
    let mut registry = MimeRegistry::new();
    registry.load_overlay(Path::new("/nonexistent/mime.types"));
    assert_eq!(
        registry.guess(Path::new("index.html")),
        (Some("text/html"), None)
    );
}
