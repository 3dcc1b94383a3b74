use crate::parse::parse_user;
use starry_macros::handle_serenity_error;
use serenity::{
    client::Context,
    framework::standard::{macros::command, Args, CommandResult},
    model::prelude::Message,
};

#[command("refresh")]
#[required_permissions("MANAGE_MESSAGES")]
#[only_in("guilds")]
#[bucket = "expensive"]
#[description = "Re-renders every starboard post by a user, picking up new names and avatars."]
#[usage = "[user]"]
async fn cmd_refresh(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let user = match args.rest().trim() {
        "" => msg.author.id,
        other => match parse_user(other) {
            Some(u) => u,
            None => {
                msg.channel_id
                    .say(&ctx, "I can't tell who that is, mention them or give me their id")
                    .await?;
                return Ok(());
            }
        },
    };

    let starboard = crate::get_starboard(ctx).await?;
    let updated = starboard.update_every_user_entry(&ctx.http, user).await?;
    if let Err(e) = msg
        .channel_id
        .say(&ctx, format!("Refreshed {} starboard posts by <@{}>", updated, user))
        .await
    {
        handle_serenity_error!(e);
    }
    Ok(())
}
