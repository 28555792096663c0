use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use timetable::config::AppConfig;
use timetable::db;
use timetable::services::seed::seed_demo_timetable;
use timetable::services::{ScheduleService, SystemClock};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "timetable=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;
    let pool = db::connect(&config.database_url).await?;

    info!("Seeding database at {}", config.database_url);
    let service = ScheduleService::new(pool, Arc::new(SystemClock));
    let created = seed_demo_timetable(&service).await?;
    println!("Created {} schedule entries", created);

    Ok(())
}
