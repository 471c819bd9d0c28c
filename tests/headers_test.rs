//! Tests for upload header derivation

use std::path::Path;

use s3_deploy::cache_control::{CacheControlDirective, CacheDirectives, DurationValue};
use s3_deploy::config::{MimeSettingsTable, MimeTypeSettings};
use s3_deploy::headers::{derive_headers, UPLOAD_ACL};
use s3_deploy::mime::MimeRegistry;

fn empty_table() -> MimeSettingsTable {
    MimeSettingsTable::new()
}

#[test]
fn test_text_types_get_utf8_charset() {
    let registry = MimeRegistry::new();
    let headers = derive_headers(Path::new("index.html"), &registry, &empty_table());
    assert_eq!(
        headers.content_type.as_deref(),
        Some("text/html; charset=UTF-8")
    );
}

#[test]
fn test_non_text_types_pass_through() {
    let registry = MimeRegistry::new();
    let headers = derive_headers(Path::new("logo.png"), &registry, &empty_table());
    assert_eq!(headers.content_type.as_deref(), Some("image/png"));
}

#[test]
fn test_unknown_type_omits_content_type() {
    let registry = MimeRegistry::new();
    let headers = derive_headers(Path::new("blob.xyz"), &registry, &empty_table());
    assert_eq!(headers.content_type, None);
    assert_eq!(headers.content_encoding, None);
    assert_eq!(headers.cache_control, None);
}

#[test]
fn test_acl_is_always_public_read() {
    let registry = MimeRegistry::new();
    let table = empty_table();

    let known = derive_headers(Path::new("index.html"), &registry, &table);
    let unknown = derive_headers(Path::new("blob.xyz"), &registry, &table);

    assert_eq!(known.acl, UPLOAD_ACL);
    assert_eq!(unknown.acl, "public-read");
}

#[test]
fn test_gzipped_text_gets_charset_and_encoding() {
    let registry = MimeRegistry::new();
    let headers = derive_headers(Path::new("page.html.gz"), &registry, &empty_table());
    assert_eq!(
        headers.content_type.as_deref(),
        Some("text/html; charset=UTF-8")
    );
    assert_eq!(headers.content_encoding.as_deref(), Some("gzip"));
}

#[test]
fn test_gzip_suffix_sets_encoding() {
    let registry = MimeRegistry::new();
    let headers = derive_headers(Path::new("bundle.js.gzip"), &registry, &empty_table());
    assert_eq!(
        headers.content_type.as_deref(),
        Some("application/javascript")
    );
    assert_eq!(headers.content_encoding.as_deref(), Some("gzip"));
}

#[test]
fn test_cache_control_from_settings_table() {
    let registry = MimeRegistry::new();
    let mut table = empty_table();
    table.insert(
        "text/html".to_string(),
        MimeTypeSettings {
            cache_control: Some(CacheControlDirective::Raw("max-age=300".to_string())),
        },
    );

    let headers = derive_headers(Path::new("index.html"), &registry, &table);
    assert_eq!(headers.cache_control.as_deref(), Some("max-age=300"));

    // Types without an entry carry no cache-control header
    let other = derive_headers(Path::new("logo.png"), &registry, &table);
    assert_eq!(other.cache_control, None);
}

#[test]
fn test_structured_cache_control_is_rendered() {
    let registry = MimeRegistry::new();
    let mut table = empty_table();
    table.insert(
        "image/png".to_string(),
        MimeTypeSettings {
            cache_control: Some(CacheControlDirective::Directives(CacheDirectives {
                public: Some(true),
                max_age: Some(DurationValue::Text("PT1H".to_string())),
                ..Default::default()
            })),
        },
    );

    let headers = derive_headers(Path::new("logo.png"), &registry, &table);
    assert_eq!(
        headers.cache_control.as_deref(),
        Some("public, max-age=\"3600\"")
    );
}

#[test]
fn test_settings_lookup_uses_bare_mime_type() {
    // The table is keyed by the guessed MIME type, not the final
    // charset-qualified header value.
    let registry = MimeRegistry::new();
    let mut table = empty_table();
    table.insert(
        "text/css".to_string(),
        MimeTypeSettings {
            cache_control: Some(CacheControlDirective::Raw("no-store".to_string())),
        },
    );

    let headers = derive_headers(Path::new("site.css"), &registry, &table);
    assert_eq!(
        headers.content_type.as_deref(),
        Some("text/css; charset=UTF-8")
    );
    assert_eq!(headers.cache_control.as_deref(), Some("no-store"));
}
