use starry_macros::handle_serenity_error;
use serenity::{
    client::Context,
    framework::standard::{macros::command, Args, CommandResult},
    model::prelude::Message,
};

fn wants_redo(arg: &str) -> bool {
    matches!(arg.trim().to_ascii_lowercase().as_str(), "redo" | "true" | "yes" | "all")
}

#[command("recalculate")]
#[owners_only]
#[description = "Recounts the stars on every entry. Entries that no longer qualify are removed. \
Pass `redo` to re-render posts whose count didn't change too."]
#[usage = "[redo]"]
async fn cmd_recalculate(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let redo = wants_redo(args.rest());
    if let Err(e) = msg.channel_id.say(&ctx, "Recalculating, this can take a while...").await {
        handle_serenity_error!(e);
    }

    let starboard = crate::get_starboard(ctx).await?;
    let summary = starboard.recalculate_every_entry(&ctx.http, redo).await?;
    if let Err(e) = msg.channel_id.say(&ctx, summary.to_string()).await {
        handle_serenity_error!(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::wants_redo;

    #[test]
    fn redo_flag() {
        assert!(wants_redo("redo"));
        assert!(wants_redo(" TRUE "));
        assert!(!wants_redo(""));
        assert!(!wants_redo("no"));
    }
}
