use crate::parse::parse_channel;
use starry_macros::handle_serenity_error;
use serenity::{
    client::Context,
    framework::standard::{macros::command, Args, CommandResult},
    model::prelude::Message,
};

#[command("purgechannel")]
#[owners_only]
#[min_args(1)]
#[description = "Removes every starboard entry from a channel."]
#[usage = "<channel>"]
#[example = "#memes"]
async fn cmd_purge_channel(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let channel = match parse_channel(args.rest()) {
        Some(c) => c,
        None => {
            msg.channel_id.say(&ctx, "That's not a channel I know of").await?;
            return Ok(());
        }
    };

    let starboard = crate::get_starboard(ctx).await?;
    let removed = starboard.remove_entries_in_channel(&ctx.http, channel).await?;
    if let Err(e) = msg
        .channel_id
        .say(&ctx, format!("Removed {} entries from <#{}>", removed, channel))
        .await
    {
        handle_serenity_error!(e);
    }
    Ok(())
}
