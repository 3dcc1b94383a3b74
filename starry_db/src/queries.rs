use crate::{to_db, NewEntry, StarboardRow, UNKNOWN_AUTHOR};
use serenity::model::id::{ChannelId, MessageId, UserId};
use sqlx::{query, query_as, query_scalar, PgPool};

pub async fn get_entry(
    db: &PgPool,
    original_message: MessageId,
) -> Result<Option<StarboardRow>, sqlx::Error> {
    query_as::<_, StarboardRow>("SELECT * FROM starboard WHERE original_message_id = $1")
        .bind(to_db(original_message.get()))
        .fetch_optional(db)
        .await
}

pub async fn add_entry(db: &PgPool, entry: &NewEntry) -> Result<(), sqlx::Error> {
    query(
        "INSERT INTO starboard
           (original_message_id, original_channel_id, original_author_id, starboard_message_id,
            referenced_message_id, referenced_author_id, stars)
         VALUES
           ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(to_db(entry.original_message.get()))
    .bind(to_db(entry.original_channel.get()))
    .bind(to_db(entry.original_author.get()))
    .bind(to_db(entry.starboard_message.get()))
    .bind(entry.referenced_message.map(|id| to_db(id.get())))
    .bind(entry.referenced_author.map(|id| to_db(id.get())))
    .bind(entry.stars)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn update_stars(
    db: &PgPool,
    original_message: MessageId,
    stars: i16,
) -> Result<(), sqlx::Error> {
    query("UPDATE starboard SET stars = $1 WHERE original_message_id = $2")
        .bind(stars)
        .bind(to_db(original_message.get()))
        .execute(db)
        .await?;
    Ok(())
}

/// Applies every `(message, stars)` pair in a single transaction.
pub async fn update_stars_bulk(
    db: &PgPool,
    updates: &[(MessageId, i16)],
) -> Result<(), sqlx::Error> {
    if updates.is_empty() {
        return Ok(());
    }
    let mut tx = db.begin().await?;
    for (original_message, stars) in updates {
        query("UPDATE starboard SET stars = $1 WHERE original_message_id = $2")
            .bind(*stars)
            .bind(to_db(original_message.get()))
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await
}

pub async fn remove_entry(
    db: &PgPool,
    original_message: MessageId,
) -> Result<Option<StarboardRow>, sqlx::Error> {
    query_as::<_, StarboardRow>("DELETE FROM starboard WHERE original_message_id = $1 RETURNING *")
        .bind(to_db(original_message.get()))
        .fetch_optional(db)
        .await
}

pub async fn remove_entry_by_starboard_message(
    db: &PgPool,
    starboard_message: MessageId,
) -> Result<Option<StarboardRow>, sqlx::Error> {
    query_as::<_, StarboardRow>("DELETE FROM starboard WHERE starboard_message_id = $1 RETURNING *")
        .bind(to_db(starboard_message.get()))
        .fetch_optional(db)
        .await
}

const ENTRIES_INVOLVING: &str =
    "SELECT * FROM starboard WHERE original_author_id = $1 OR referenced_author_id = $1";

/// Entries that show `user`, either as the starred author or as the one being replied to.
pub async fn get_entries_involving(
    db: &PgPool,
    user: UserId,
) -> Result<Vec<StarboardRow>, sqlx::Error> {
    query_as::<_, StarboardRow>(ENTRIES_INVOLVING)
        .bind(to_db(user.get()))
        .fetch_all(db)
        .await
}

pub async fn user_has_entry(db: &PgPool, user: UserId) -> Result<bool, sqlx::Error> {
    query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM starboard WHERE original_author_id = $1)")
        .bind(to_db(user.get()))
        .fetch_one(db)
        .await
}

/// Returns the entry count and star total for a single author.
pub async fn get_user_stats(db: &PgPool, user: UserId) -> Result<(i64, i64), sqlx::Error> {
    query_as::<_, (i64, i64)>(
        "SELECT COUNT(*), COALESCE(SUM(stars), 0)::BIGINT
         FROM starboard WHERE original_author_id = $1",
    )
    .bind(to_db(user.get()))
    .fetch_one(db)
    .await
}

pub async fn get_all_entries(db: &PgPool) -> Result<Vec<StarboardRow>, sqlx::Error> {
    query_as::<_, StarboardRow>("SELECT * FROM starboard").fetch_all(db).await
}

/// Entries whose starred message is a reply to `message`.
pub async fn get_entries_referencing(
    db: &PgPool,
    message: MessageId,
) -> Result<Vec<StarboardRow>, sqlx::Error> {
    query_as::<_, StarboardRow>("SELECT * FROM starboard WHERE referenced_message_id = $1")
        .bind(to_db(message.get()))
        .fetch_all(db)
        .await
}

pub async fn remove_entries_in_channel(
    db: &PgPool,
    channel: ChannelId,
) -> Result<Vec<StarboardRow>, sqlx::Error> {
    query_as::<_, StarboardRow>("DELETE FROM starboard WHERE original_channel_id = $1 RETURNING *")
        .bind(to_db(channel.get()))
        .fetch_all(db)
        .await
}

pub async fn remove_all_entries(db: &PgPool) -> Result<Vec<StarboardRow>, sqlx::Error> {
    query_as::<_, StarboardRow>("DELETE FROM starboard RETURNING *")
        .fetch_all(db)
        .await
}

pub async fn get_entries_missing_author(db: &PgPool) -> Result<Vec<StarboardRow>, sqlx::Error> {
    query_as::<_, StarboardRow>("SELECT * FROM starboard WHERE original_author_id = $1")
        .bind(UNKNOWN_AUTHOR)
        .fetch_all(db)
        .await
}

pub async fn set_author(
    db: &PgPool,
    original_message: MessageId,
    author: UserId,
) -> Result<(), sqlx::Error> {
    query("UPDATE starboard SET original_author_id = $1 WHERE original_message_id = $2")
        .bind(to_db(author.get()))
        .bind(to_db(original_message.get()))
        .execute(db)
        .await?;
    Ok(())
}

pub async fn get_top_entries(db: &PgPool, limit: i64) -> Result<Vec<StarboardRow>, sqlx::Error> {
    query_as::<_, StarboardRow>("SELECT * FROM starboard ORDER BY stars DESC, original_message_id ASC LIMIT $1")
        .bind(limit)
        .fetch_all(db)
        .await
}

pub async fn count_entries(db: &PgPool) -> Result<i64, sqlx::Error> {
    query_scalar::<_, i64>("SELECT COUNT(*) FROM starboard")
        .fetch_one(db)
        .await
}

pub async fn total_stars(db: &PgPool) -> Result<i64, sqlx::Error> {
    query_scalar::<_, i64>("SELECT COALESCE(SUM(stars), 0)::BIGINT FROM starboard")
        .fetch_one(db)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_authors_are_involved_too() {
        assert!(ENTRIES_INVOLVING.contains("original_author_id = $1"));
        assert!(ENTRIES_INVOLVING.contains("OR referenced_author_id = $1"));
    }
}
