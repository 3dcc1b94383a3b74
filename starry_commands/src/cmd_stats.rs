use chrono::{Duration, Utc};
use starry_db::StarboardRow;
use starry_macros::handle_serenity_error;
use starry_utils::START_TIME;
use serenity::{
    builder::{CreateEmbed, CreateEmbedFooter, CreateMessage},
    client::Context,
    framework::standard::{macros::command, CommandResult},
    model::prelude::{GuildId, Message},
};

const TOP_ENTRIES: i64 = 5;

/// Formats an uptime like `2d 3h 4m 5s`, leaving out leading zero units.
pub fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.num_seconds().max(0);
    let (days, hours, minutes, seconds) =
        (secs / 86_400, secs / 3_600 % 24, secs / 60 % 60, secs % 60);
    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{}d ", days));
    }
    if days > 0 || hours > 0 {
        out.push_str(&format!("{}h ", hours));
    }
    if days > 0 || hours > 0 || minutes > 0 {
        out.push_str(&format!("{}m ", minutes));
    }
    out.push_str(&format!("{}s", seconds));
    out
}

fn top_entry_line(rank: usize, row: &StarboardRow, guild: Option<GuildId>, emoji: &str) -> String {
    format!(
        "{}. [{} {}]({})",
        rank,
        row.stars,
        emoji,
        row.original_message().link(row.original_channel(), guild)
    )
}

#[command("stats")]
#[bucket = "expensive"]
#[description = "Live statistics on the starboard and the bot."]
async fn cmd_stats(ctx: &Context, msg: &Message) -> CommandResult {
    let starboard = crate::get_starboard(ctx).await?;
    let db = starboard.db();
    let entries = starry_db::count_entries(db).await?;
    let stars = starry_db::total_stars(db).await?;
    let top = starry_db::get_top_entries(db, TOP_ENTRIES).await?;

    let top = if top.is_empty() {
        "Nothing has been starred yet.".to_string()
    } else {
        top.iter()
            .enumerate()
            .map(|(i, row)| top_entry_line(i + 1, row, msg.guild_id, starboard.emoji()))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut embed = CreateEmbed::new()
        .title("Starboard Stats")
        .field("Entries", entries.to_string(), true)
        .field("Total Stars", stars.to_string(), true)
        .field("Top Entries", top, false);
    if let Some(start) = START_TIME.get() {
        embed = embed
            .field("Uptime", format_uptime(Utc::now() - *start), false)
            .footer(CreateEmbedFooter::new("Up since"))
            .timestamp(*start);
    }

    if let Err(e) = msg
        .channel_id
        .send_message(&ctx, CreateMessage::new().embed(embed))
        .await
    {
        handle_serenity_error!(e);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_skips_leading_zero_units() {
        assert_eq!(format_uptime(Duration::seconds(5)), "5s");
        assert_eq!(format_uptime(Duration::seconds(65)), "1m 5s");
        assert_eq!(format_uptime(Duration::seconds(3_600)), "1h 0m 0s");
        assert_eq!(format_uptime(Duration::seconds(90_061)), "1d 1h 1m 1s");
        assert_eq!(format_uptime(Duration::seconds(-3)), "0s");
    }

    #[test]
    fn top_entries_link_to_the_message() {
        let row = StarboardRow {
            original_message_id: 3,
            original_channel_id: 2,
            original_author_id: 4,
            starboard_message_id: 5,
            referenced_message_id: None,
            referenced_author_id: None,
            stars: 12,
        };
        assert_eq!(
            top_entry_line(1, &row, Some(GuildId::new(1)), "⭐"),
            "1. [12 ⭐](https://discord.com/channels/1/2/3)"
        );
    }
}
