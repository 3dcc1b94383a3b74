use crate::embed::{render_embeds, EmbedSource};
use crate::error::{is_unknown_resource, StarboardError};
use crate::locks::MessageLocks;
use crate::plan::{
    needs_new_post, plan_star_update, refresh_targets, EditOutcome, RefreshTarget, StarUpdate,
};
use crate::recount::{plan_recount, RecalculateSummary, RecountAction};
use crate::stars::{count_qualifying, is_star, normal_stars, StarDecision, Threshold};
use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use serenity::builder::{CreateEmbed, CreateMessage, EditMessage};
use serenity::http::Http;
use serenity::model::channel::{Channel, Message, ReactionType};
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};
use sqlx::PgPool;
use starry_config::BotConfig;
use starry_db::{NewEntry, StarboardRow};
use starry_metrics::Metrics;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Maintenance jobs never run more Discord requests than this at once.
const CONCURRENCY: usize = 8;
/// Discord's page size for reaction users.
const REACTORS_PER_PAGE: u8 = 100;

enum Recounted {
    Removed,
    Unchanged,
    Rerendered(MessageId, i16),
}

pub struct Starboard {
    db: PgPool,
    channel: ChannelId,
    emoji: String,
    threshold: Threshold,
    exclude_self_stars: bool,
    colour: u32,
    metrics: Option<Arc<Metrics>>,
    locks: MessageLocks,
    guilds: DashMap<ChannelId, GuildId>,
}

impl Starboard {
    pub fn new(db: PgPool, config: &BotConfig, metrics: Option<Arc<Metrics>>) -> Self {
        Self {
            db,
            channel: ChannelId::new(config.starboard_channel()),
            emoji: config.emoji().to_string(),
            threshold: Threshold::new(config.minimum_stars()),
            exclude_self_stars: config.exclude_self_stars(),
            colour: config.colour(),
            metrics,
            locks: MessageLocks::new(),
            guilds: DashMap::new(),
        }
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn emoji(&self) -> &str {
        &self.emoji
    }

    pub fn db(&self) -> &PgPool {
        &self.db
    }

    pub fn is_star(&self, reaction: &ReactionType) -> bool {
        is_star(reaction, &self.emoji)
    }

    /// Records the guild a gateway event came from, so jump links need no lookup.
    pub fn remember_guild(&self, channel: ChannelId, guild: Option<GuildId>) {
        if let Some(guild) = guild {
            self.guilds.insert(channel, guild);
        }
    }

    /// The guild owning `channel`, or `None` for DMs and deleted channels.
    async fn guild_of(
        &self,
        http: &Http,
        channel: ChannelId,
    ) -> Result<Option<GuildId>, StarboardError> {
        if let Some(guild) = self.guilds.get(&channel).map(|g| *g) {
            return Ok(Some(guild));
        }
        match http.get_channel(channel).await {
            Ok(Channel::Guild(c)) => {
                self.guilds.insert(channel, c.guild_id);
                Ok(Some(c.guild_id))
            }
            Ok(_) => Ok(None),
            Err(e) if is_unknown_resource(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Counts the stars on `message`, paging through reactors when the author has to be left out.
    pub async fn count_stars(&self, http: &Http, message: &Message) -> Result<i16, StarboardError> {
        let reaction = match message
            .reactions
            .iter()
            .find(|r| is_star(&r.reaction_type, &self.emoji))
        {
            Some(r) => r,
            None => return Ok(0),
        };
        if !self.exclude_self_stars {
            return Ok(normal_stars(reaction));
        }

        let mut reactors = Vec::new();
        let mut after: Option<UserId> = None;
        loop {
            let page = message
                .reaction_users(
                    http,
                    reaction.reaction_type.clone(),
                    Some(REACTORS_PER_PAGE),
                    after,
                )
                .await?;
            let len = page.len();
            after = page.last().map(|u| u.id);
            reactors.extend(page.into_iter().map(|u| u.id));
            if len < REACTORS_PER_PAGE as usize {
                break;
            }
        }
        Ok(count_qualifying(reactors, message.author.id, true))
    }

    /// A star was added to a message outside the starboard.
    pub async fn star_added(
        &self,
        http: &Http,
        channel: ChannelId,
        message_id: MessageId,
    ) -> Result<bool, StarboardError> {
        let _guard = self.locks.lock(message_id).await;
        let message = match fetch_message(http, channel, message_id).await? {
            Some(m) => m,
            None => return Ok(false),
        };
        let stars = self.count_stars(http, &message).await?;
        match self.threshold.evaluate(stars) {
            StarDecision::Below => Ok(false),
            StarDecision::Qualifies => self.upsert_locked(http, &message, stars).await,
        }
    }

    /// A star was removed. The entry goes away once the count drops below the threshold.
    pub async fn star_removed(
        &self,
        http: &Http,
        channel: ChannelId,
        message_id: MessageId,
    ) -> Result<bool, StarboardError> {
        let _guard = self.locks.lock(message_id).await;
        let message = match fetch_message(http, channel, message_id).await? {
            Some(m) => m,
            None => return self.remove_entry_locked(http, message_id).await,
        };
        let stars = self.count_stars(http, &message).await?;
        if self.threshold.evaluate(stars) == StarDecision::Below {
            return self.remove_entry_locked(http, message_id).await;
        }
        match starry_db::get_entry(&self.db, message_id).await? {
            Some(row) => {
                let referenced = message.referenced_message.as_deref();
                let outcome = self
                    .update_entry(http, &row, &message, referenced, Some(stars))
                    .await?;
                Ok(outcome == EditOutcome::Edited)
            }
            None => Ok(false),
        }
    }

    /// An original message was edited. `new` is used when the cache already has it.
    pub async fn message_edited(
        &self,
        http: &Http,
        channel: ChannelId,
        message_id: MessageId,
        new: Option<Message>,
    ) -> Result<bool, StarboardError> {
        // most edits are of messages that aren't on the board, skip the fetch for those
        let targets = self.refresh_targets_of(message_id).await?;
        if targets.is_empty() {
            return Ok(false);
        }
        let message = match new {
            Some(m) => m,
            None => match fetch_message(http, channel, message_id).await? {
                Some(m) => m,
                None => return Ok(false),
            },
        };
        self.refresh(http, &message, None, targets).await
    }

    pub async fn update_or_create_entry(
        &self,
        http: &Http,
        message: &Message,
        stars: i16,
    ) -> Result<bool, StarboardError> {
        let _guard = self.locks.lock(message.id).await;
        self.upsert_locked(http, message, stars).await
    }

    async fn upsert_locked(
        &self,
        http: &Http,
        message: &Message,
        stars: i16,
    ) -> Result<bool, StarboardError> {
        let referenced = message.referenced_message.as_deref();
        let existing = match starry_db::get_entry(&self.db, message.id).await? {
            Some(row) => Some(
                self.update_entry(http, &row, message, referenced, Some(stars))
                    .await?,
            ),
            None => None,
        };
        if needs_new_post(existing) {
            self.create_entry(http, message, referenced, stars).await?;
        }
        Ok(true)
    }

    async fn create_entry(
        &self,
        http: &Http,
        message: &Message,
        referenced: Option<&Message>,
        stars: i16,
    ) -> Result<(), StarboardError> {
        let embeds = self.render(http, message, referenced, stars).await?;
        let post = self
            .channel
            .send_message(http, CreateMessage::new().embeds(embeds))
            .await?;

        let entry = NewEntry {
            original_message: message.id,
            original_channel: message.channel_id,
            original_author: message.author.id,
            starboard_message: post.id,
            referenced_message: referenced.map(|m| m.id),
            referenced_author: referenced.map(|m| m.author.id),
            stars,
        };
        if let Err(e) = starry_db::add_entry(&self.db, &entry).await {
            if let Err(del) = self.channel.delete_message(http, post.id).await {
                warn!("failed to delete orphaned starboard post {}: {}", post.id, del);
            }
            return Err(e.into());
        }

        debug!("starred message {} with {} stars", message.id, stars);
        if let Some(m) = &self.metrics {
            m.entry_actions.created.inc();
        }
        Ok(())
    }

    /// Refreshes the entry for `message` and every entry replying to it.
    pub async fn update_without_creating_entry(
        &self,
        http: &Http,
        message: &Message,
        stars: Option<i16>,
    ) -> Result<bool, StarboardError> {
        let targets = self.refresh_targets_of(message.id).await?;
        self.refresh(http, message, stars, targets).await
    }

    async fn refresh_targets_of(
        &self,
        message_id: MessageId,
    ) -> Result<Vec<RefreshTarget>, StarboardError> {
        let own = starry_db::get_entry(&self.db, message_id).await?;
        let replies = starry_db::get_entries_referencing(&self.db, message_id).await?;
        Ok(refresh_targets(own, replies))
    }

    async fn refresh(
        &self,
        http: &Http,
        message: &Message,
        stars: Option<i16>,
        targets: Vec<RefreshTarget>,
    ) -> Result<bool, StarboardError> {
        let mut touched = false;
        for target in targets {
            match target {
                RefreshTarget::Entry(_) => {
                    let _guard = self.locks.lock(message.id).await;
                    // re-read under the lock, a star may have landed in between
                    if let Some(row) = starry_db::get_entry(&self.db, message.id).await? {
                        let referenced = message.referenced_message.as_deref();
                        touched |= self
                            .update_entry(http, &row, message, referenced, stars)
                            .await?
                            == EditOutcome::Edited;
                    }
                }
                RefreshTarget::ReplyTo(row) => {
                    let _guard = self.locks.lock(row.original_message()).await;
                    let original = match fetch_message(
                        http,
                        row.original_channel(),
                        row.original_message(),
                    )
                    .await?
                    {
                        Some(m) => m,
                        None => {
                            self.remove_entry_locked(http, row.original_message()).await?;
                            continue;
                        }
                    };
                    touched |= self
                        .update_entry(http, &row, &original, Some(message), None)
                        .await?
                        == EditOutcome::Edited;
                }
            }
        }
        Ok(touched)
    }

    /// Re-renders an existing post, writing a changed star count back first.
    async fn update_entry(
        &self,
        http: &Http,
        row: &StarboardRow,
        message: &Message,
        referenced: Option<&Message>,
        stars: Option<i16>,
    ) -> Result<EditOutcome, StarboardError> {
        let update = plan_star_update(row.stars, stars);
        if let StarUpdate::Persist(s) = update {
            starry_db::update_stars(&self.db, row.original_message(), s).await?;
        }
        self.edit_post(http, row, message, referenced, update.stars())
            .await
    }

    async fn edit_post(
        &self,
        http: &Http,
        row: &StarboardRow,
        message: &Message,
        referenced: Option<&Message>,
        stars: i16,
    ) -> Result<EditOutcome, StarboardError> {
        let embeds = self.render(http, message, referenced, stars).await?;
        match self
            .channel
            .edit_message(http, row.starboard_message(), EditMessage::new().embeds(embeds))
            .await
        {
            Ok(_) => {
                if let Some(m) = &self.metrics {
                    m.entry_actions.updated.inc();
                }
                Ok(EditOutcome::Edited)
            }
            Err(e) if is_unknown_resource(&e) => {
                info!(
                    "starboard post {} for {} is gone, dropping the entry",
                    row.starboard_message(),
                    row.original_message()
                );
                starry_db::remove_entry(&self.db, row.original_message()).await?;
                self.count_removed(1);
                Ok(EditOutcome::PostGone)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn remove_entry(
        &self,
        http: &Http,
        original_message: MessageId,
    ) -> Result<bool, StarboardError> {
        let _guard = self.locks.lock(original_message).await;
        self.remove_entry_locked(http, original_message).await
    }

    async fn remove_entry_locked(
        &self,
        http: &Http,
        original_message: MessageId,
    ) -> Result<bool, StarboardError> {
        match starry_db::remove_entry(&self.db, original_message).await? {
            Some(row) => {
                self.delete_post(http, &row).await?;
                self.count_removed(1);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// A post was deleted inside the starboard channel, so only the row needs to go.
    pub async fn remove_by_starboard_message(
        &self,
        starboard_message: MessageId,
    ) -> Result<bool, StarboardError> {
        let removed = starry_db::remove_entry_by_starboard_message(&self.db, starboard_message)
            .await?
            .is_some();
        if removed {
            self.count_removed(1);
        }
        Ok(removed)
    }

    /// Re-renders every entry showing `user`, e.g. after a name or avatar change.
    pub async fn update_every_user_entry(
        &self,
        http: &Http,
        user: UserId,
    ) -> Result<usize, StarboardError> {
        let rows = starry_db::get_entries_involving(&self.db, user).await?;
        let results: Vec<Result<bool, StarboardError>> = stream::iter(rows)
            .map(move |row| async move {
                let _guard = self.locks.lock(row.original_message()).await;
                match fetch_message(http, row.original_channel(), row.original_message()).await? {
                    Some(m) => {
                        let referenced = m.referenced_message.as_deref();
                        let outcome = self.update_entry(http, &row, &m, referenced, None).await?;
                        Ok(outcome == EditOutcome::Edited)
                    }
                    None => {
                        self.remove_entry_locked(http, row.original_message()).await?;
                        Ok(false)
                    }
                }
            })
            .buffer_unordered(CONCURRENCY)
            .collect()
            .await;

        let mut updated = 0;
        for r in results {
            match r {
                Ok(true) => updated += 1,
                Ok(false) => {}
                Err(e) => warn!("failed to refresh an entry of {}: {}", user, e),
            }
        }
        Ok(updated)
    }

    /// Recounts every entry. With `redo`, unchanged entries are re-rendered as well.
    pub async fn recalculate_every_entry(
        &self,
        http: &Http,
        redo: bool,
    ) -> Result<RecalculateSummary, StarboardError> {
        let rows = starry_db::get_all_entries(&self.db).await?;
        info!("recalculating {} entries", rows.len());

        let outcomes: Vec<Result<Recounted, StarboardError>> = stream::iter(rows)
            .map(move |row| async move { self.recalculate_entry(http, row, redo).await })
            .buffer_unordered(CONCURRENCY)
            .collect()
            .await;

        let mut summary = RecalculateSummary::default();
        let mut star_updates = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(Recounted::Removed) => summary.removed += 1,
                Ok(Recounted::Unchanged) => summary.unchanged += 1,
                Ok(Recounted::Rerendered(id, stars)) => {
                    summary.updated += 1;
                    star_updates.push((id, stars));
                }
                Err(e) => {
                    warn!("failed to recalculate an entry: {}", e);
                    summary.failed += 1;
                }
            }
        }
        starry_db::update_stars_bulk(&self.db, &star_updates).await?;
        info!("{}", summary);
        Ok(summary)
    }

    async fn recalculate_entry(
        &self,
        http: &Http,
        row: StarboardRow,
        redo: bool,
    ) -> Result<Recounted, StarboardError> {
        let _guard = self.locks.lock(row.original_message()).await;
        let message = fetch_message(http, row.original_channel(), row.original_message()).await?;
        let recount = match &message {
            Some(m) => Some(self.count_stars(http, m).await?),
            None => None,
        };

        match (plan_recount(row.stars, recount, self.threshold, redo), message) {
            (RecountAction::Skip, _) => Ok(Recounted::Unchanged),
            (RecountAction::Rerender(stars), Some(m)) => {
                let referenced = m.referenced_message.as_deref();
                match self.edit_post(http, &row, &m, referenced, stars).await? {
                    EditOutcome::Edited => Ok(Recounted::Rerendered(row.original_message(), stars)),
                    EditOutcome::PostGone => Ok(Recounted::Removed),
                }
            }
            _ => {
                self.remove_entry_locked(http, row.original_message()).await?;
                Ok(Recounted::Removed)
            }
        }
    }

    pub async fn remove_entries_in_channel(
        &self,
        http: &Http,
        channel: ChannelId,
    ) -> Result<usize, StarboardError> {
        let rows = starry_db::remove_entries_in_channel(&self.db, channel).await?;
        Ok(self.delete_posts(http, rows).await)
    }

    pub async fn remove_all_entries(&self, http: &Http) -> Result<usize, StarboardError> {
        let rows = starry_db::remove_all_entries(&self.db).await?;
        Ok(self.delete_posts(http, rows).await)
    }

    /// Fills in authors for entries stored before they were tracked.
    pub async fn migrate_authors(&self, http: &Http) -> Result<usize, StarboardError> {
        let rows = starry_db::get_entries_missing_author(&self.db).await?;
        if rows.is_empty() {
            return Ok(0);
        }
        info!("looking up authors for {} entries", rows.len());

        let results: Vec<Result<bool, StarboardError>> = stream::iter(rows)
            .map(move |row| async move {
                match fetch_message(http, row.original_channel(), row.original_message()).await? {
                    Some(m) => {
                        starry_db::set_author(&self.db, row.original_message(), m.author.id)
                            .await?;
                        Ok(true)
                    }
                    None => Ok(false),
                }
            })
            .buffer_unordered(CONCURRENCY)
            .collect()
            .await;

        let mut migrated = 0;
        for r in results {
            match r {
                Ok(true) => migrated += 1,
                Ok(false) => {}
                Err(e) => warn!("failed to look up an entry's author: {}", e),
            }
        }
        Ok(migrated)
    }

    /// Deletes the posts of rows already removed from the database.
    async fn delete_posts(&self, http: &Http, rows: Vec<StarboardRow>) -> usize {
        let count = rows.len();
        stream::iter(rows)
            .for_each_concurrent(CONCURRENCY, move |row| async move {
                if let Err(e) = self.delete_post(http, &row).await {
                    warn!("failed to delete starboard post {}: {}", row.starboard_message(), e);
                }
            })
            .await;
        self.count_removed(count);
        count
    }

    async fn delete_post(&self, http: &Http, row: &StarboardRow) -> Result<(), StarboardError> {
        match self.channel.delete_message(http, row.starboard_message()).await {
            Err(e) if !is_unknown_resource(&e) => Err(e.into()),
            _ => Ok(()),
        }
    }

    async fn render(
        &self,
        http: &Http,
        message: &Message,
        referenced: Option<&Message>,
        stars: i16,
    ) -> Result<Vec<CreateEmbed>, StarboardError> {
        let guild = match message.guild_id {
            Some(g) => Some(g),
            None => self.guild_of(http, message.channel_id).await?,
        };
        // a reply and the message it quotes always share a guild
        let original = EmbedSource::new(message, guild);
        let referenced = referenced.map(|m| EmbedSource::new(m, guild));
        Ok(
            render_embeds(&original, referenced.as_ref(), stars, &self.emoji, self.colour)
                .into_iter()
                .map(|e| e.into_create_embed())
                .collect(),
        )
    }

    fn count_removed(&self, n: usize) {
        if let Some(m) = &self.metrics {
            m.entry_actions.removed.inc_by(n as u64);
        }
    }
}

/// Fetches a message, treating a 404 as "deleted".
pub async fn fetch_message(
    http: &Http,
    channel: ChannelId,
    message: MessageId,
) -> Result<Option<Message>, StarboardError> {
    match http.get_message(channel, message).await {
        Ok(m) => Ok(Some(m)),
        Err(e) if is_unknown_resource(&e) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
