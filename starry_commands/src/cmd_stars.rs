use crate::parse::parse_user;
use starry_macros::handle_serenity_error;
use serenity::{
    builder::{CreateEmbed, CreateMessage},
    client::Context,
    framework::standard::{macros::command, Args, CommandResult},
    model::prelude::Message,
};

#[command("stars")]
#[aliases("starred")]
#[bucket = "general"]
#[description = "How many of someone's messages made it to the starboard, and how many stars \
they got in total."]
#[usage = "[user]"]
#[example = "@someone"]
async fn cmd_stars(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
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
    let db = starboard.db();
    let embed = if starry_db::user_has_entry(db, user).await? {
        let (entries, stars) = starry_db::get_user_stats(db, user).await?;
        CreateEmbed::new().description(format!(
            "<@{}> has {} messages on the starboard with {} {} in total",
            user,
            entries,
            stars,
            starboard.emoji()
        ))
    } else {
        CreateEmbed::new().description(format!(
            "<@{}> doesn't have anything on the starboard yet",
            user
        ))
    };

    if let Err(e) = msg
        .channel_id
        .send_message(&ctx, CreateMessage::new().embed(embed))
        .await
    {
        handle_serenity_error!(e);
    }
    Ok(())
}
