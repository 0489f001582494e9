use async_trait::async_trait;
use s3::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;

use super::error::MediaError;
use super::key::MediaKey;
use super::traits::{MediaStore, PendingUpload, UploadedMedia};

/// Connection settings for an S3-compatible media host.
#[derive(Clone, Debug)]
pub struct S3Settings {
    /// Custom endpoint, e.g. `https://media.example.com` or a MinIO URL.
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    /// Base of the publicly resolvable object URLs (often a CDN domain).
    pub public_base_url: String,
}

/// Media host backed by an S3-compatible object store.
pub struct S3MediaStore {
    bucket: Box<Bucket>,
    public_base_url: String,
}

impl S3MediaStore {
    pub fn new(settings: &S3Settings) -> Result<Self, MediaError> {
        let region = Region::Custom {
            region: settings.region.clone(),
            endpoint: settings.endpoint.clone(),
        };
        let credentials = Credentials::new(
            Some(&settings.access_key),
            Some(&settings.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| MediaError::Transport(format!("invalid credentials: {e}")))?;

        let bucket = Bucket::new(&settings.bucket, region, credentials)
            .map_err(|e| MediaError::Transport(e.to_string()))?
            .with_path_style();

        Ok(Self {
            bucket,
            public_base_url: settings.public_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, key: &MediaKey) -> String {
        format!("{}/{key}", self.public_base_url)
    }
}

#[async_trait]
impl MediaStore for S3MediaStore {
    async fn upload(
        &self,
        upload: &PendingUpload,
        folder: &str,
    ) -> Result<UploadedMedia, MediaError> {
        let key = MediaKey::generate(folder, &upload.filename);
        let content_type = upload
            .content_type
            .as_deref()
            .unwrap_or("application/octet-stream");

        let response = self
            .bucket
            .put_object_with_content_type(key.as_str(), &upload.bytes, content_type)
            .await
            .map_err(|e| match e {
                S3Error::HttpFailWithBody(status, body) => {
                    MediaError::Rejected(format!("status {status}: {body}"))
                }
                other => MediaError::Transport(other.to_string()),
            })?;

        if !(200..300).contains(&response.status_code()) {
            return Err(MediaError::Rejected(format!(
                "status {}",
                response.status_code()
            )));
        }

        Ok(UploadedMedia {
            url: self.url_for(&key),
            kind: upload.kind,
            key,
        })
    }

    async fn delete(&self, key: &MediaKey) -> Result<bool, MediaError> {
        match self.bucket.delete_object(key.as_str()).await {
            Ok(_) => Ok(true),
            Err(S3Error::HttpFailWithBody(404, _)) => Ok(false),
            Err(e) => Err(MediaError::Transport(e.to_string())),
        }
    }
}
