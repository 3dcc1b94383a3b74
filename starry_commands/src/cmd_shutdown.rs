use starry_macros::handle_serenity_error;
use starry_utils::ShardManagerWrapper;
use serenity::{
    client::Context,
    framework::standard::{macros::command, CommandResult},
    model::prelude::Message,
};

#[command("shutdown")]
#[description = "Stops every shard, which ends the bot process once it's saved its metrics."]
#[owners_only]
async fn cmd_shutdown(ctx: &Context, msg: &Message) -> CommandResult {
    if let Err(e) = msg.channel_id.say(ctx, "Beginning shutdown...").await {
        handle_serenity_error!(e);
    }
    let manager = ctx
        .data
        .read()
        .await
        .get::<ShardManagerWrapper>()
        .cloned()
        .ok_or("no shard manager in the client's data")?;
    manager.shutdown_all().await;
    Ok(())
}
