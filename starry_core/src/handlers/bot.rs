use chrono::Utc;
use starry_board::{Starboard, StarboardError};
use starry_macros::handle_serenity_error;
use starry_metrics::spawn_updater_task;
use starry_utils::{spawn_status_task, START_TIME};
use serenity::{
    async_trait,
    client::{Context, EventHandler},
    model::{
        channel::{GuildChannel, Message, Reaction},
        event::MessageUpdateEvent,
        gateway::Ready,
        id::{ChannelId, GuildId, MessageId},
    },
};
use sqlx::PgPool;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Instant,
};
use tracing::{debug, error, info};

pub struct Handler {
    pub starboard: Arc<Starboard>,
    pub db: PgPool,
    pub recalculate_on_startup: bool,
    pub is_loop_running: AtomicBool,
    pub start_time: Instant,
}

fn log_error(what: &str, e: StarboardError) {
    match e {
        StarboardError::Discord(e) => {
            tracing::warn!("failed to handle {}", what);
            handle_serenity_error!(e);
        }
        StarboardError::Database(e) => error!("database error while handling {}: {}", what, e),
    }
}

impl Handler {
    /// A deleted message is either a post on the board or an original.
    async fn message_gone(&self, ctx: &Context, channel_id: ChannelId, message_id: MessageId) {
        let result = if channel_id == self.starboard.channel() {
            self.starboard.remove_by_starboard_message(message_id).await
        } else {
            self.starboard.remove_entry(&ctx.http, message_id).await
        };
        match result {
            Ok(true) => debug!("dropped the entry for deleted message {}", message_id),
            Ok(false) => {}
            Err(e) => log_error("a message delete", e),
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            "{} is connected on shard {}",
            ready.user.name,
            ready.shard.map_or(0, |s| s.id.0)
        );

        if self.is_loop_running.swap(true, Ordering::SeqCst) {
            return;
        }
        if START_TIME.set(Utc::now()).is_err() {
            debug!("start time was already set");
        }
        info!(
            "Started client in {}ms!",
            self.start_time.elapsed().as_millis()
        );

        spawn_updater_task(self.db.clone());
        spawn_status_task(ctx.clone(), self.db.clone());

        let starboard = Arc::clone(&self.starboard);
        let recalculate = self.recalculate_on_startup;
        tokio::spawn(async move {
            match starboard.migrate_authors(&ctx.http).await {
                Ok(0) => {}
                Ok(n) => info!("filled in the author of {} entries", n),
                Err(e) => log_error("the author migration", e),
            }
            if recalculate {
                if let Err(e) = starboard.recalculate_every_entry(&ctx.http, false).await {
                    log_error("the startup recalculation", e);
                }
            }
        });
    }

    async fn reaction_add(&self, ctx: Context, reaction: Reaction) {
        if reaction.channel_id == self.starboard.channel() || !self.starboard.is_star(&reaction.emoji)
        {
            return;
        }
        self.starboard
            .remember_guild(reaction.channel_id, reaction.guild_id);
        if let Err(e) = self
            .starboard
            .star_added(&ctx.http, reaction.channel_id, reaction.message_id)
            .await
        {
            log_error("a star", e);
        }
    }

    async fn reaction_remove(&self, ctx: Context, reaction: Reaction) {
        if reaction.channel_id == self.starboard.channel() || !self.starboard.is_star(&reaction.emoji)
        {
            return;
        }
        self.starboard
            .remember_guild(reaction.channel_id, reaction.guild_id);
        if let Err(e) = self
            .starboard
            .star_removed(&ctx.http, reaction.channel_id, reaction.message_id)
            .await
        {
            log_error("a removed star", e);
        }
    }

    async fn reaction_remove_all(&self, ctx: Context, channel_id: ChannelId, message_id: MessageId) {
        if channel_id == self.starboard.channel() {
            return;
        }
        if let Err(e) = self.starboard.remove_entry(&ctx.http, message_id).await {
            log_error("cleared reactions", e);
        }
    }

    async fn reaction_remove_emoji(&self, ctx: Context, removed: Reaction) {
        if removed.channel_id == self.starboard.channel() || !self.starboard.is_star(&removed.emoji)
        {
            return;
        }
        if let Err(e) = self
            .starboard
            .remove_entry(&ctx.http, removed.message_id)
            .await
        {
            log_error("cleared stars", e);
        }
    }

    async fn message_update(
        &self,
        ctx: Context,
        _old: Option<Message>,
        new: Option<Message>,
        event: MessageUpdateEvent,
    ) {
        if event.channel_id == self.starboard.channel() {
            return;
        }
        self.starboard.remember_guild(event.channel_id, event.guild_id);
        if let Err(e) = self
            .starboard
            .message_edited(&ctx.http, event.channel_id, event.id, new)
            .await
        {
            log_error("an edit", e);
        }
    }

    async fn message_delete(
        &self,
        ctx: Context,
        channel_id: ChannelId,
        deleted_message_id: MessageId,
        _guild_id: Option<GuildId>,
    ) {
        self.message_gone(&ctx, channel_id, deleted_message_id).await;
    }

    async fn message_delete_bulk(
        &self,
        ctx: Context,
        channel_id: ChannelId,
        deleted_message_ids: Vec<MessageId>,
        _guild_id: Option<GuildId>,
    ) {
        for id in deleted_message_ids {
            self.message_gone(&ctx, channel_id, id).await;
        }
    }

    async fn channel_delete(
        &self,
        ctx: Context,
        channel: GuildChannel,
        _messages: Option<Vec<Message>>,
    ) {
        match self
            .starboard
            .remove_entries_in_channel(&ctx.http, channel.id)
            .await
        {
            Ok(0) => {}
            Ok(n) => info!("removed {} entries from deleted channel {}", n, channel.id),
            Err(e) => log_error("a channel delete", e),
        }
    }
}
