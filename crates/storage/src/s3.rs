use crate::backend::{ByteStream, ObjectEntry, StorageBackend};
use crate::StorageError;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::{primitives::ByteStream as S3ByteStream, Client};
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use futures::StreamExt;
use std::path::Path;
use tokio_util::io::ReaderStream;

/// S3-compatible storage backend
/// Compatible with: AWS S3, Cloudflare R2, MinIO, DigitalOcean Spaces, etc.
pub struct S3Backend {
    client: Client,
    bucket_name: String,
    bucket_prefix: String,
}

impl S3Backend {
    pub async fn new(
        endpoint_url: String,
        region: String,
        access_key_id: String,
        secret_access_key: String,
        bucket_name: String,
        bucket_prefix: String,
    ) -> Result<Self, StorageError> {
        if bucket_name.is_empty() {
            return Err(StorageError::ConfigError("bucket_name is empty".to_string()));
        }

        let credentials = Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "blobfinder-s3",
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(region));
        if !endpoint_url.is_empty() {
            loader = loader.endpoint_url(endpoint_url);
        }
        let config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(true)
            .build();
        let client = Client::from_conf(s3_config);

        Ok(Self {
            client,
            bucket_name,
            bucket_prefix: bucket_prefix.trim_matches('/').to_string(),
        })
    }

    fn build_key(&self, remote_key: &str) -> String {
        if self.bucket_prefix.is_empty() {
            remote_key.to_string()
        } else {
            format!("{}/{}", self.bucket_prefix, remote_key)
        }
    }

    fn strip_key(&self, bucket_key: &str) -> String {
        if self.bucket_prefix.is_empty() {
            bucket_key.to_string()
        } else {
            bucket_key
                .strip_prefix(&self.bucket_prefix)
                .map(|k| k.trim_start_matches('/'))
                .unwrap_or(bucket_key)
                .to_string()
        }
    }

    /// `x-amz-copy-source` wants `bucket/key` with the key URL-encoded
    fn copy_source(&self, key: &str) -> String {
        let mut encoded = String::with_capacity(key.len());
        for byte in key.bytes() {
            match byte {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                    encoded.push(byte as char)
                }
                other => encoded.push_str(&format!("%{:02X}", other)),
            }
        }
        format!("{}/{}", self.bucket_name, encoded)
    }
}

fn to_utc(time: Option<&aws_sdk_s3::primitives::DateTime>) -> Option<DateTime<Utc>> {
    time.and_then(|t| Utc.timestamp_opt(t.secs(), t.subsec_nanos()).single())
}

/// Maps SDK failures onto the transient/permanent split
fn sdk_error<E, R>(key: &str, err: SdkError<E, R>) -> StorageError
where
    E: ProvideErrorMetadata + std::fmt::Debug,
    R: std::fmt::Debug,
{
    match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => StorageError::Transient {
            key: key.to_string(),
            message: format!("{:?}", err),
        },
        SdkError::ServiceError(service) => match service.err().code() {
            Some("NoSuchKey") | Some("NotFound") => StorageError::NotFound(key.to_string()),
            Some("SlowDown") | Some("ServiceUnavailable") | Some("InternalError") => {
                StorageError::Transient {
                    key: key.to_string(),
                    message: service.err().message().unwrap_or_default().to_string(),
                }
            }
            _ => StorageError::S3SdkError(format!(
                "{}: {}",
                key,
                service.err().message().unwrap_or("service error")
            )),
        },
        _ => StorageError::S3SdkError(format!("{}: {:?}", key, err)),
    }
}

/// Keeps the transient and not-found classification of a failed copy
fn copy_error(src_key: &str, dst_key: &str, err: StorageError) -> StorageError {
    match err {
        StorageError::Transient { .. } | StorageError::NotFound(_) => err,
        other => StorageError::CopyError(src_key.to_string(), dst_key.to_string(), other.to_string()),
    }
}

#[async_trait::async_trait]
impl StorageBackend for S3Backend {
    fn name(&self) -> &'static str {
        "s3"
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.metadata(key).await?.is_some())
    }

    async fn metadata(&self, key: &str) -> Result<Option<ObjectEntry>, StorageError> {
        let bucket_key = self.build_key(key);

        match self
            .client
            .head_object()
            .bucket(&self.bucket_name)
            .key(&bucket_key)
            .send()
            .await
        {
            Ok(head) => Ok(Some(ObjectEntry {
                key: key.to_string(),
                is_directory: key.ends_with('/'),
                size: head.content_length().unwrap_or_default().max(0) as u64,
                last_modified: to_utc(head.last_modified()),
            })),
            Err(SdkError::ServiceError(service)) if service.err().is_not_found() => Ok(None),
            Err(e) => Err(sdk_error(key, e)),
        }
    }

    async fn read_all(&self, key: &str) -> Result<Bytes, StorageError> {
        let bucket_key = self.build_key(key);

        let output = self
            .client
            .get_object()
            .bucket(&self.bucket_name)
            .key(&bucket_key)
            .send()
            .await
            .map_err(|e| sdk_error(key, e))?;

        let data = output.body.collect().await.map_err(|e| StorageError::Transient {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        Ok(data.into_bytes())
    }

    async fn read_stream(&self, key: &str) -> Result<ByteStream, StorageError> {
        let bucket_key = self.build_key(key);

        let output = self
            .client
            .get_object()
            .bucket(&self.bucket_name)
            .key(&bucket_key)
            .send()
            .await
            .map_err(|e| sdk_error(key, e))?;

        let reader = output.body.into_async_read();
        Ok(ReaderStream::new(reader).map(|chunk| chunk.map_err(StorageError::from)).boxed())
    }

    async fn write(&self, key: &str, data: Bytes) -> Result<(), StorageError> {
        let bucket_key = self.build_key(key);
        tracing::debug!("Uploading {} to S3 bucket {}", bucket_key, self.bucket_name);

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&bucket_key)
            .body(S3ByteStream::from(data))
            .send()
            .await
            .map_err(|e| StorageError::UploadError(key.to_string(), format!("{:?}", e)))?;

        Ok(())
    }

    async fn write_file(&self, key: &str, local_path: &Path) -> Result<(), StorageError> {
        let bucket_key = self.build_key(key);
        tracing::debug!("Uploading {} to S3 bucket {}", bucket_key, self.bucket_name);

        let body = S3ByteStream::from_path(local_path)
            .await
            .map_err(|e| StorageError::UploadError(key.to_string(), e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&bucket_key)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::UploadError(key.to_string(), format!("{:?}", e)))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let bucket_key = self.build_key(key);
        tracing::debug!("Deleting {} from S3 bucket {}", bucket_key, self.bucket_name);

        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(&bucket_key)
            .send()
            .await
            .map_err(|e| StorageError::DeleteError(key.to_string(), format!("{:?}", e)))?;

        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectEntry>, StorageError> {
        let bucket_prefix = self.build_key(prefix);
        let mut entries = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket_name)
                .prefix(&bucket_prefix)
                .delimiter("/")
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| sdk_error(prefix, e))?;

            for common in output.common_prefixes() {
                if let Some(p) = common.prefix() {
                    entries.push(ObjectEntry {
                        key: self.strip_key(p),
                        is_directory: true,
                        size: 0,
                        last_modified: None,
                    });
                }
            }

            for object in output.contents() {
                if let Some(k) = object.key() {
                    entries.push(ObjectEntry {
                        key: self.strip_key(k),
                        is_directory: k.ends_with('/'),
                        size: object.size().unwrap_or_default().max(0) as u64,
                        last_modified: to_utc(object.last_modified()),
                    });
                }
            }

            match output.next_continuation_token() {
                Some(token) if output.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries.dedup_by(|a, b| a.key == b.key);
        Ok(entries)
    }

    async fn copy(&self, src_key: &str, dst_key: &str) -> Result<(), StorageError> {
        let source = self.copy_source(&self.build_key(src_key));
        let destination = self.build_key(dst_key);

        self.client
            .copy_object()
            .bucket(&self.bucket_name)
            .copy_source(source)
            .key(&destination)
            .send()
            .await
            .map_err(|e| copy_error(src_key, dst_key, sdk_error(src_key, e)))?;

        Ok(())
    }

    fn is_remote(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::operation::copy_object::CopyObjectError;

    #[test]
    fn test_copy_timeout_is_transient() {
        let timeout = SdkError::<CopyObjectError, ()>::timeout_error("request timed out");

        let err = copy_error("a.txt", "b.txt", sdk_error("a.txt", timeout));

        assert!(err.is_transient());
    }

    #[test]
    fn test_copy_permanent_failure_names_both_keys() {
        let err = copy_error(
            "a.txt",
            "b.txt",
            StorageError::S3SdkError("a.txt: AccessDenied".to_string()),
        );

        assert!(!err.is_transient());
        assert!(matches!(err, StorageError::CopyError(src, dst, _) if src == "a.txt" && dst == "b.txt"));
    }

    #[test]
    fn test_copy_missing_source_stays_not_found() {
        let err = copy_error("a.txt", "b.txt", StorageError::NotFound("a.txt".to_string()));

        assert!(matches!(err, StorageError::NotFound(key) if key == "a.txt"));
    }
}
