use crate::ShardManagerWrapper;
use serenity::gateway::ActivityData;
use serenity::prelude::Context;
use sqlx::PgPool;
use std::time::Duration;

const UPDATE_INTERVAL: Duration = Duration::from_secs(300);

pub fn status_text(entries: i64) -> String {
    match entries {
        1 => "1 starred message".to_string(),
        n => format!("{} starred messages", n),
    }
}

/// Shows the number of starboard entries as the presence of every shard.
pub async fn update_status(ctx: &Context, db: &PgPool) {
    let entries = match starry_db::count_entries(db).await {
        Ok(n) => n,
        Err(e) => {
            tracing::warn!("couldn't count entries for the status: {}", e);
            return;
        }
    };

    let shard_manager = match ctx.data.read().await.get::<ShardManagerWrapper>() {
        Some(m) => m.clone(),
        None => {
            ctx.set_activity(Some(ActivityData::watching(status_text(entries))));
            return;
        }
    };

    for info in shard_manager.runners.lock().await.values() {
        info.runner_tx
            .set_activity(Some(ActivityData::watching(status_text(entries))));
    }
}

pub fn spawn_status_task(ctx: Context, db: PgPool) {
    tokio::spawn(async move {
        loop {
            update_status(&ctx, &db).await;
            tokio::time::sleep(UPDATE_INTERVAL).await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::status_text;

    #[test]
    fn pluralises() {
        assert_eq!(status_text(0), "0 starred messages");
        assert_eq!(status_text(1), "1 starred message");
        assert_eq!(status_text(12), "12 starred messages");
    }
}
