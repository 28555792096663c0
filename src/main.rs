use std::sync::Arc;
use std::time::Instant;

use tower_http::services::ServeDir;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use timetable::api::router;
use timetable::config::AppConfig;
use timetable::db;
use timetable::services::SystemClock;
use timetable::state::AppState;
use timetable::upload::{AvatarStore, CloudinaryAvatarStore, LocalAvatarStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "timetable=debug,tower_http=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;

    let pool = db::connect(&config.database_url).await?;

    let avatars: Arc<dyn AvatarStore> = match config.cloudinary.clone() {
        Some(cloudinary) => {
            info!("Cloudinary configuration detected, avatars go to {}", cloudinary.cloud_name);
            Arc::new(CloudinaryAvatarStore::new(cloudinary)?)
        }
        None => {
            warn!("Cloudinary credentials not configured, storing avatars in {}", config.upload_dir.display());
            Arc::new(LocalAvatarStore::new(&config.upload_dir))
        }
    };

    let state = AppState {
        db: pool.clone(),
        clock: Arc::new(SystemClock),
        avatars,
        started_at: Instant::now(),
    };

    let mut app = router(state);
    if config.cloudinary.is_none() {
        app = app.nest_service(LocalAvatarStore::PUBLIC_PREFIX, ServeDir::new(&config.upload_dir));
    }

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
