use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::CloudinaryConfig;
use crate::error::AppError;

pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

/// An uploaded avatar image as received from the client.
#[derive(Debug, Clone)]
pub struct AvatarFile {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

impl AvatarFile {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.bytes.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }
        if self.bytes.len() > MAX_AVATAR_BYTES {
            return Err(AppError::Validation(format!(
                "Uploaded file exceeds {} bytes",
                MAX_AVATAR_BYTES
            )));
        }
        if !self.content_type.starts_with("image/") {
            return Err(AppError::Validation(format!(
                "Unsupported file type: {}",
                self.content_type
            )));
        }
        Ok(())
    }
}

/// Stores avatar images and hands back the URL they are served from.
#[async_trait]
pub trait AvatarStore: Send + Sync {
    async fn store(&self, file: &AvatarFile) -> Result<String, AppError>;
}

/// Keep only characters that are safe in a file name.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "avatar".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Writes avatars into a local directory served under `/uploads`.
pub struct LocalAvatarStore {
    dir: PathBuf,
}

impl LocalAvatarStore {
    pub const PUBLIC_PREFIX: &'static str = "/uploads";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl AvatarStore for LocalAvatarStore {
    async fn store(&self, file: &AvatarFile) -> Result<String, AppError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create upload dir: {}", e)))?;

        let name = format!("{}-{}", Uuid::new_v4(), sanitize_filename(&file.filename));
        let path = self.dir.join(&name);
        tokio::fs::write(&path, &file.bytes)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", path.display(), e)))?;

        info!("Stored avatar {} ({} bytes)", path.display(), file.bytes.len());
        Ok(format!("{}/{}", Self::PUBLIC_PREFIX, name))
    }
}

#[derive(Debug, Deserialize)]
struct CloudinaryUploadResponse {
    secure_url: String,
}

/// Unsigned uploads to Cloudinary through an upload preset.
pub struct CloudinaryAvatarStore {
    client: Client,
    config: CloudinaryConfig,
}

impl CloudinaryAvatarStore {
    pub const FOLDER: &'static str = "teacher-avatars";

    pub fn new(config: CloudinaryConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl AvatarStore for CloudinaryAvatarStore {
    async fn store(&self, file: &AvatarFile) -> Result<String, AppError> {
        info!("Uploading file \"{}\" to Cloudinary", file.filename);

        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.config.cloud_name
        );
        let part = Part::bytes(file.bytes.clone())
            .file_name(sanitize_filename(&file.filename))
            .mime_str(&file.content_type)
            .map_err(|e| AppError::Validation(format!("Invalid content type: {}", e)))?;
        let form = Form::new()
            .text("upload_preset", self.config.upload_preset.clone())
            .text("folder", Self::FOLDER)
            .part("file", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Upload(format!("Cloudinary request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Failed to upload to Cloudinary: {} {}", status, body);
            return Err(AppError::Upload(format!("Cloudinary error {}", status)));
        }

        let parsed: CloudinaryUploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upload(format!("Failed to parse Cloudinary response: {}", e)))?;

        info!("File uploaded successfully to Cloudinary: {}", parsed.secure_url);
        Ok(parsed.secure_url)
    }
}
