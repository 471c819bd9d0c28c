//! Storage capability - the object store behind the upload pipeline

use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use thiserror::Error;

use crate::headers::UploadHeaders;

/// Errors from a single put attempt
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not read {path}: {message}")]
    Io { path: String, message: String },
    #[error("put {key} failed: {message}")]
    Put { key: String, message: String },
}

/// Object-storage capability: one durable `put`.
///
/// The upload executor is written against this trait so tests can
/// substitute a double; the production implementation wraps the AWS
/// SDK client. Implementations must be safe for concurrent use.
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put(
        &self,
        local_path: &Path,
        key: &str,
        headers: &UploadHeaders,
    ) -> Result<(), StorageError>;
}

/// S3-backed storage client
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl StorageClient for S3Storage {
    async fn put(
        &self,
        local_path: &Path,
        key: &str,
        headers: &UploadHeaders,
    ) -> Result<(), StorageError> {
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| StorageError::Io {
                path: local_path.display().to_string(),
                message: e.to_string(),
            })?;

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .acl(ObjectCannedAcl::from(headers.acl))
            .body(body);

        if let Some(content_type) = &headers.content_type {
            request = request.content_type(content_type);
        }
        if let Some(content_encoding) = &headers.content_encoding {
            request = request.content_encoding(content_encoding);
        }
        if let Some(cache_control) = &headers.cache_control {
            request = request.cache_control(cache_control);
        }

        request.send().await.map_err(|e| StorageError::Put {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        Ok(())
    }
}
