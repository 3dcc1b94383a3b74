use crate::ShardManagerWrapper;
use serenity::client::Context;

/// Gets the average websocket latency in milliseconds, and how many shards reported one.
pub async fn get_avg_ws_latency(ctx: &Context) -> (u128, u8) {
    let shard_manager = match ctx.data.read().await.get::<ShardManagerWrapper>() {
        Some(m) => m.clone(),
        None => return (0, 0),
    };

    let mut total: u8 = 0;
    let mut latency: u128 = 0;
    for info in shard_manager.runners.lock().await.values() {
        if let Some(l) = info.latency {
            total = total.saturating_add(1);
            latency += l.as_millis();
        }
    }
    (average(latency, total), total)
}

fn average(sum: u128, count: u8) -> u128 {
    if count == 0 {
        // no shards ready
        0
    } else {
        sum / count as u128
    }
}

#[cfg(test)]
mod tests {
    use super::average;

    #[test]
    fn averages_over_ready_shards() {
        assert_eq!(average(0, 0), 0);
        assert_eq!(average(90, 3), 30);
    }
}
