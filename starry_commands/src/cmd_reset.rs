use starry_macros::handle_serenity_error;
use serenity::{
    client::Context,
    framework::standard::{macros::command, CommandResult},
    model::prelude::Message,
};

#[command("resetboard")]
#[owners_only]
#[description = "Removes every entry and deletes every post on the starboard. There's no undo."]
async fn cmd_reset_board(ctx: &Context, msg: &Message) -> CommandResult {
    let starboard = crate::get_starboard(ctx).await?;
    let removed = starboard.remove_all_entries(&ctx.http).await?;
    tracing::info!("{} reset the starboard, {} entries removed", msg.author.id, removed);
    if let Err(e) = msg
        .channel_id
        .say(&ctx, format!("Starboard reset, {} entries removed", removed))
        .await
    {
        handle_serenity_error!(e);
    }
    Ok(())
}
