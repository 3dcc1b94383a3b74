use crate::METRICS;
use sqlx::PgPool;
use std::time::Duration;
use tokio::time;

const UPDATE_INTERVAL: Duration = Duration::from_secs(60);

/// Keeps the `entries` and `stars` gauges in line with the database.
pub fn spawn_updater_task(db: PgPool) {
    tokio::spawn(async move {
        loop {
            updater_task(&db).await;
            time::sleep(UPDATE_INTERVAL).await;
        }
    });
}

async fn updater_task(db: &PgPool) {
    let metrics = match METRICS.get() {
        Some(m) => m,
        None => return,
    };

    match starry_db::count_entries(db).await {
        Ok(count) => metrics.entries.set(count),
        Err(e) => tracing::warn!("failed to count starboard entries: {}", e),
    }
    match starry_db::total_stars(db).await {
        Ok(stars) => metrics.stars.set(stars),
        Err(e) => tracing::warn!("failed to sum starboard stars: {}", e),
    }
}
