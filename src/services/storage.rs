use chrono::Utc;
use once_cell::sync::Lazy;
use thiserror::Error;

use crate::config;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage endpoint is not configured")]
    EndpointMissing,

    #[error("Upload request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// An uploaded photo as received from the multipart body.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Stores listing photos in an S3-compatible bucket and returns their public
/// URLs. Objects are keyed `properties/<millis>-<seq>-<original name>`; the
/// per-request sequence number keeps same-named files uploaded in the same
/// instant from overwriting each other.
pub struct PhotoStorage {
    client: reqwest::Client,
}

static STORAGE: Lazy<PhotoStorage> = Lazy::new(|| PhotoStorage {
    client: reqwest::Client::new(),
});

impl PhotoStorage {
    pub fn shared() -> &'static PhotoStorage {
        &STORAGE
    }

    pub async fn upload(&self, seq: usize, photo: PhotoUpload) -> Result<String, StorageError> {
        let cfg = &config::config().storage;
        if cfg.endpoint.is_empty() {
            return Err(StorageError::EndpointMissing);
        }

        let key = Self::object_key(&photo.file_name, Utc::now().timestamp_millis(), seq);
        let url = format!(
            "{}/{}/{}",
            cfg.endpoint.trim_end_matches('/'),
            cfg.bucket,
            key
        );

        self.client
            .put(&url)
            .header("Content-Type", photo.content_type)
            .body(photo.bytes)
            .send()
            .await?
            .error_for_status()?;

        tracing::info!(key = %key, "uploaded property photo");
        Ok(url)
    }

    fn object_key(file_name: &str, timestamp_millis: i64, seq: usize) -> String {
        // Strip any path components a client might smuggle into the name.
        let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
        format!("properties/{}-{}-{}", timestamp_millis, seq, base)
    }
}
