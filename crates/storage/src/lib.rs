//! Blob storage: media bytes in, public URLs out.

use async_trait::async_trait;

use lullaby_core::types::DbId;

/// MIME type for narration blobs.
pub const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// MIME type for illustration blobs.
pub const IMAGE_CONTENT_TYPE: &str = "image/png";

/// Errors from blob persistence. Upload failures are hard failures for the
/// specific media item, not for the chapter.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Blob upload failed: {0}")]
    Upload(String),
}

/// Blob store returning public URLs for uploaded objects.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `path` (overwriting any existing object) and return
    /// the public URL.
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError>;
}

/// Object path for a paragraph's narration audio.
pub fn audio_object_path(user_id: DbId, story_id: DbId, chapter_id: DbId, index: i32) -> String {
    format!("{user_id}/{story_id}/{chapter_id}_{index}.mp3")
}

/// Object path for a paragraph's illustration.
pub fn image_object_path(user_id: DbId, story_id: DbId, chapter_id: DbId, index: i32) -> String {
    format!("{user_id}/{story_id}/{chapter_id}_{index}.png")
}

/// S3 blob-store configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bucket holding all story media.
    pub bucket: String,
    /// Public base URL the bucket is served from (CDN or website endpoint).
    pub public_base_url: String,
}

impl StorageConfig {
    /// Load storage configuration from environment variables.
    ///
    /// | Env Var                   | Required |
    /// |---------------------------|----------|
    /// | `MEDIA_BUCKET`            | **yes**  |
    /// | `MEDIA_PUBLIC_BASE_URL`   | **yes**  |
    pub fn from_env() -> Self {
        let bucket = std::env::var("MEDIA_BUCKET").expect("MEDIA_BUCKET must be set");
        let public_base_url = std::env::var("MEDIA_PUBLIC_BASE_URL")
            .expect("MEDIA_PUBLIC_BASE_URL must be set")
            .trim_end_matches('/')
            .to_string();
        Self {
            bucket,
            public_base_url,
        }
    }
}

/// S3-backed [`BlobStore`].
pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3BlobStore {
    /// Build the store from the default AWS credential/region chain.
    pub async fn from_config(config: &StorageConfig) -> Self {
        let aws_config = aws_config::load_from_env().await;
        Self {
            client: aws_sdk_s3::Client::new(&aws_config),
            bucket: config.bucket.clone(),
            public_base_url: config.public_base_url.clone(),
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path)
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .content_type(content_type)
            .body(aws_sdk_s3::primitives::ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Upload(format!("s3 put_object {path}: {e}")))?;

        Ok(self.public_url(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_paths_are_keyed_by_owner_story_chapter_index() {
        assert_eq!(audio_object_path(1, 2, 3, 4), "1/2/3_4.mp3");
        assert_eq!(image_object_path(9, 8, 7, 6), "9/8/7_6.png");
    }
}
