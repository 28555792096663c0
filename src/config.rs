use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub upload_preset: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub upload_dir: PathBuf,
    pub cloudinary: Option<CloudinaryConfig>,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://timetable.db?mode=rwc".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR '{}' is invalid: {}", bind_addr, e)))?;

        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("uploads"));

        let cloudinary = match (
            env::var("CLOUDINARY_CLOUD_NAME").ok().filter(|v| !v.is_empty()),
            env::var("CLOUDINARY_UPLOAD_PRESET").ok().filter(|v| !v.is_empty()),
        ) {
            (Some(cloud_name), Some(upload_preset)) => Some(CloudinaryConfig {
                cloud_name,
                upload_preset,
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            bind_addr,
            upload_dir,
            cloudinary,
        })
    }
}
