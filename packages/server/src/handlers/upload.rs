use std::collections::HashMap;

use axum::extract::{DefaultBodyLimit, Multipart};
use common::media::PendingUpload;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Body limit for multipart content writes.
pub fn multipart_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(64 * 1024 * 1024) // 64 MB
}

/// One file part collected from a multipart body.
pub struct FilePart {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: Option<String>,
}

impl FilePart {
    pub fn into_pending_upload(self) -> PendingUpload {
        PendingUpload::new(self.bytes, self.filename, self.content_type)
    }
}

/// A drained multipart body: the text fields and the file parts, keyed
/// by field name. Content writes send one JSON `payload` text field plus
/// slot-named file parts (`background`, `image`, `section_image_{i}`).
pub struct MultipartForm {
    texts: HashMap<String, String>,
    files: HashMap<String, FilePart>,
}

impl MultipartForm {
    /// Drain the body, enforcing the per-file size cap while reading.
    pub async fn collect(
        multipart: &mut Multipart,
        max_file_size: u64,
    ) -> Result<Self, AppError> {
        let mut texts = HashMap::new();
        let mut files = HashMap::new();

        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
        {
            let Some(name) = field.name().map(|s| s.to_string()) else {
                continue; // Unnamed fields carry nothing we can address.
            };

            match field.file_name().map(|s| s.to_string()) {
                Some(filename) => {
                    let content_type = field.content_type().map(|m| m.to_string());
                    let mut bytes = Vec::new();

                    while let Some(chunk) = field
                        .chunk()
                        .await
                        .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
                    {
                        if (bytes.len() + chunk.len()) as u64 > max_file_size {
                            return Err(AppError::Validation(format!(
                                "File '{name}' exceeds maximum size of {max_file_size} bytes"
                            )));
                        }
                        bytes.extend_from_slice(&chunk);
                    }

                    files.insert(
                        name,
                        FilePart {
                            bytes,
                            filename,
                            content_type,
                        },
                    );
                }
                None => {
                    let text = field.text().await.map_err(|e| {
                        AppError::Validation(format!("Failed to read field '{name}': {e}"))
                    })?;
                    texts.insert(name, text);
                }
            }
        }

        Ok(Self { texts, files })
    }

    /// Deserialize the required JSON `payload` field.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        let raw = self
            .texts
            .get("payload")
            .ok_or_else(|| AppError::Validation("Missing 'payload' field".into()))?;
        serde_json::from_str(raw)
            .map_err(|e| AppError::Validation(format!("Invalid payload: {e}")))
    }

    /// Remove and return the file part with the given field name.
    pub fn take_file(&mut self, name: &str) -> Option<FilePart> {
        self.files.remove(name)
    }
}
