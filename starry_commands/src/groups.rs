use super::*;
use serenity::framework::standard::macros::group;

#[group("Starboard")]
#[commands(cmd_stars, cmd_refresh)]
struct Board;

#[group("Bot Utils")]
#[commands(cmd_ping, cmd_stats)]
struct Utils;

#[group("Bot Owner Commands")]
#[commands(cmd_recalculate, cmd_purge_channel, cmd_reset_board, cmd_shutdown)]
struct BotOwner;
