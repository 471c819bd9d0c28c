//! Upload executor - concurrent per-job uploads with retry, plus the
//! sequential job runner

use std::path::Path;

use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::{DeployConfig, Job, MimeSettingsTable};
use crate::headers::derive_headers;
use crate::mime::MimeRegistry;
use crate::selector::{resolve_src, select_files, SelectError};
use crate::storage::StorageClient;

/// Upload attempts per file before the outcome is recorded as failed
pub const MAX_ATTEMPTS: u32 = 4;

/// Concurrent upload workers within one job
pub const UPLOAD_CONCURRENCY: usize = 10;

/// Fatal errors that abort the run
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("could not find jobs in the configuration")]
    MissingJobs,
    #[error(transparent)]
    Select(#[from] SelectError),
}

/// Runs upload jobs against an injected storage client. Everything a
/// worker touches besides the store itself is read-only.
pub struct Uploader<'a, S: StorageClient> {
    storage: &'a S,
    registry: &'a MimeRegistry,
    mime_types: &'a MimeSettingsTable,
    build_root: &'a Path,
}

impl<'a, S: StorageClient> Uploader<'a, S> {
    pub fn new(
        storage: &'a S,
        registry: &'a MimeRegistry,
        mime_types: &'a MimeSettingsTable,
        build_root: &'a Path,
    ) -> Self {
        Self {
            storage,
            registry,
            mime_types,
            build_root,
        }
    }

    /// Run every configured job in listed order, one at a time.
    ///
    /// Returns true iff every job succeeded. A configuration without
    /// a job list aborts before any upload begins; an empty list is
    /// vacuously successful.
    pub async fn run_jobs(&self, config: &DeployConfig) -> Result<bool, DeployError> {
        let jobs = match &config.jobs {
            Some(jobs) => jobs,
            None => return Err(DeployError::MissingJobs),
        };

        let mut all_ok = true;
        for job in jobs {
            all_ok &= self.upload_job(job).await?;
        }

        Ok(all_ok)
    }

    /// Upload one job's selected files with bounded concurrency.
    ///
    /// Returns true iff every selected file uploaded (non-files count
    /// as trivially successful). The aggregate does not depend on
    /// completion order.
    pub async fn upload_job(&self, job: &Job) -> Result<bool, DeployError> {
        match &job.name {
            Some(name) => info!("Starting job: {}", name),
            None => info!("Starting job"),
        }

        let src = match &job.src {
            Some(src) => src.clone(),
            None => self.build_root.to_path_buf(),
        };
        let src = resolve_src(&src)?;
        let dest = job.dest.clone().unwrap_or_default();

        let files = select_files(&src, job.match_patterns.as_deref())?;

        let src_ref = &src;
        let dest_ref = dest.as_str();
        let results: Vec<bool> = stream::iter(files)
            .map(|path| async move { self.upload_file(src_ref, dest_ref, &path).await })
            .buffer_unordered(UPLOAD_CONCURRENCY)
            .collect()
            .await;

        Ok(results.into_iter().all(|ok| ok))
    }

    /// Upload one selected path, retrying transient failures with no
    /// inter-attempt delay. Non-files (directories, dangling links)
    /// are skipped and count as success.
    async fn upload_file(&self, src: &Path, dest: &str, path: &Path) -> bool {
        if !path.is_file() {
            return true;
        }

        let relative = path
            .strip_prefix(src)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        let key = if dest.is_empty() {
            relative.clone()
        } else {
            format!("{}/{}", dest.trim_end_matches('/'), relative)
        };

        let headers = derive_headers(path, self.registry, self.mime_types);

        for attempt in 1..=MAX_ATTEMPTS {
            match self.storage.put(path, &key, &headers).await {
                Ok(()) => {
                    debug!("{} => {} (uploaded; attempts: {})", relative, key, attempt);
                    return true;
                }
                Err(e) => {
                    debug!("{} => {} (failed; attempt: {})", relative, key, attempt);
                    debug!("{}", e);
                }
            }
        }

        error!("{} => {} (aborted; attempts: {})", relative, key, MAX_ATTEMPTS);
        false
    }
}
