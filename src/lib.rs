//! s3-deploy library - build-artifact deployment to S3 buckets

pub mod cache_control;
pub mod config;
pub mod headers;
pub mod mime;
pub mod selector;
pub mod storage;
pub mod uploader;

// Re-export commonly used types
pub use cache_control::{parse_duration_seconds, render_cache_control, CacheControlDirective};
pub use config::{load_config_file, merged_config, DeployConfig, Job, MimeSettingsTable};
pub use headers::{derive_headers, UploadHeaders};
pub use mime::MimeRegistry;
pub use selector::select_files;
pub use storage::{S3Storage, StorageClient};
pub use uploader::Uploader;
