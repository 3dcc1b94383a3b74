use crate::METRICS;
use serenity::framework::standard::macros::hook;
use serenity::model::prelude::Message;
use serenity::prelude::Context;
use tracing::warn;

#[hook]
pub async fn before_hook(_: &Context, msg: &Message, cmd_name: &str) -> bool {
    tracing::debug!("{} ran `{}` in {}", msg.author.id, cmd_name, msg.channel_id);

    let metrics = match METRICS.get() {
        Some(m) => m,
        None => return true,
    };

    match metrics.command_counter(cmd_name) {
        Some(counter) => counter.inc(),
        None => warn!("unknown command found: {}", cmd_name),
    }
    metrics.total_commands.inc();

    true
}
