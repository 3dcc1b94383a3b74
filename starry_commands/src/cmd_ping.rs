use starry_db::PgPoolKey;
use starry_macros::handle_serenity_error;
use starry_utils::get_avg_ws_latency;
use serenity::{
    builder::{CreateEmbed, CreateMessage},
    client::Context,
    framework::standard::{macros::command, CommandResult},
    model::prelude::Message,
};
use sqlx::query;
use std::time::Instant;

#[command("ping")]
#[aliases("p")]
#[bucket = "general"]
#[description = "Play a game of ping-pong!"]
async fn cmd_ping(ctx: &Context, msg: &Message) -> CommandResult {
    let (ws_latency, _) = get_avg_ws_latency(ctx).await;
    let rest_api_latency = {
        let st = Instant::now();
        msg.channel_id.broadcast_typing(&ctx.http).await?;
        st.elapsed().as_nanos() as f64
    };
    let db_latency = {
        let db = ctx
            .data
            .read()
            .await
            .get::<PgPoolKey>()
            .cloned()
            .ok_or("no database pool in the client's data")?;
        let st = Instant::now();
        query("SELECT 1").execute(&db).await?;
        st.elapsed().as_nanos() as f64
    };

    let embed = CreateEmbed::new()
        .title("🏓")
        .field("WebSocket", format!("{}ms", ws_latency), false)
        .field(
            "Discord REST API",
            format!("{:.2}ms", rest_api_latency / 1_000_000.0),
            false,
        )
        .field("PSQL", format!("{:.2}ms", db_latency / 1_000_000.0), false);
    if let Err(e) = msg
        .channel_id
        .send_message(&ctx, CreateMessage::new().embed(embed))
        .await
    {
        handle_serenity_error!(e);
    }

    Ok(())
}
