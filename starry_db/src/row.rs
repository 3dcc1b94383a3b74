use serenity::model::id::{ChannelId, MessageId, UserId};
use sqlx::FromRow;

/// Author id stored for rows created before authors were tracked.
pub const UNKNOWN_AUTHOR: i64 = -1;

/// Postgres has no unsigned 64 bit integer, so snowflakes are stored bit-for-bit in a `bigint`.
#[inline]
pub fn to_db(id: u64) -> i64 {
    id as i64
}

#[inline]
pub fn from_db(id: i64) -> u64 {
    id as u64
}

/// One row of the `starboard` table.
///
/// Ids are never zero: every id written comes from a serenity id type.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StarboardRow {
    pub original_message_id: i64,
    pub original_channel_id: i64,
    pub original_author_id: i64,
    pub starboard_message_id: i64,
    pub referenced_message_id: Option<i64>,
    pub referenced_author_id: Option<i64>,
    pub stars: i16,
}

impl StarboardRow {
    pub fn original_message(&self) -> MessageId {
        MessageId::new(from_db(self.original_message_id))
    }

    pub fn original_channel(&self) -> ChannelId {
        ChannelId::new(from_db(self.original_channel_id))
    }

    /// `None` for legacy rows that are still waiting on the author backfill.
    pub fn original_author(&self) -> Option<UserId> {
        match self.original_author_id {
            UNKNOWN_AUTHOR | 0 => None,
            id => Some(UserId::new(from_db(id))),
        }
    }

    pub fn starboard_message(&self) -> MessageId {
        MessageId::new(from_db(self.starboard_message_id))
    }

    pub fn referenced_message(&self) -> Option<MessageId> {
        self.referenced_message_id
            .filter(|id| *id != 0)
            .map(|id| MessageId::new(from_db(id)))
    }

    pub fn referenced_author(&self) -> Option<UserId> {
        self.referenced_author_id
            .filter(|id| *id != 0)
            .map(|id| UserId::new(from_db(id)))
    }
}

/// Everything needed to insert a fresh entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewEntry {
    pub original_message: MessageId,
    pub original_channel: ChannelId,
    pub original_author: UserId,
    pub starboard_message: MessageId,
    pub referenced_message: Option<MessageId>,
    pub referenced_author: Option<UserId>,
    pub stars: i16,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> StarboardRow {
        StarboardRow {
            original_message_id: to_db(1_181_409_862_553_829_406),
            original_channel_id: to_db(1_100_000_000_000_000_001),
            original_author_id: to_db(661_660_243_033_456_652),
            starboard_message_id: to_db(1_181_409_900_000_000_000),
            referenced_message_id: None,
            referenced_author_id: None,
            stars: 4,
        }
    }

    #[test]
    fn snowflakes_above_i64_max_round_trip() {
        let huge = u64::MAX - 12;
        let stored = to_db(huge);
        assert!(stored < 0);
        assert_eq!(from_db(stored), huge);
    }

    #[test]
    fn typed_accessors() {
        let r = row();
        assert_eq!(r.original_message(), MessageId::new(1_181_409_862_553_829_406));
        assert_eq!(r.original_channel(), ChannelId::new(1_100_000_000_000_000_001));
        assert_eq!(r.original_author(), Some(UserId::new(661_660_243_033_456_652)));
        assert_eq!(r.starboard_message(), MessageId::new(1_181_409_900_000_000_000));
        assert_eq!(r.referenced_message(), None);
        assert_eq!(r.referenced_author(), None);
    }

    #[test]
    fn legacy_author_is_unknown() {
        let r = StarboardRow {
            original_author_id: UNKNOWN_AUTHOR,
            ..row()
        };
        assert_eq!(r.original_author(), None);
    }

    #[test]
    fn reply_ids_are_exposed() {
        let r = StarboardRow {
            referenced_message_id: Some(to_db(1_181_000_000_000_000_000)),
            referenced_author_id: Some(to_db(12_345)),
            ..row()
        };
        assert_eq!(
            r.referenced_message(),
            Some(MessageId::new(1_181_000_000_000_000_000))
        );
        assert_eq!(r.referenced_author(), Some(UserId::new(12_345)));
    }
}
