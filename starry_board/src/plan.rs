use starry_db::StarboardRow;

/// The star count a re-render shows, and whether it has to be written back first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarUpdate {
    Persist(i16),
    Keep(i16),
}

impl StarUpdate {
    pub fn stars(self) -> i16 {
        match self {
            StarUpdate::Persist(s) | StarUpdate::Keep(s) => s,
        }
    }
}

/// `counted` is `None` when nothing was recounted, e.g. after an edit.
pub fn plan_star_update(stored: i16, counted: Option<i16>) -> StarUpdate {
    match counted {
        Some(c) if c != stored => StarUpdate::Persist(c),
        Some(c) => StarUpdate::Keep(c),
        None => StarUpdate::Keep(stored),
    }
}

/// What happened when an existing post was edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Edited,
    /// The post was deleted by hand and its row dropped.
    PostGone,
}

/// `existing` is `None` when the message had no entry to begin with.
pub fn needs_new_post(existing: Option<EditOutcome>) -> bool {
    !matches!(existing, Some(EditOutcome::Edited))
}

/// A post to re-render after its message changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshTarget {
    /// The message's own entry.
    Entry(StarboardRow),
    /// An entry for a reply that quotes the message.
    ReplyTo(StarboardRow),
}

/// Every post showing a message: its own entry first, then the replies quoting it.
pub fn refresh_targets(
    own: Option<StarboardRow>,
    replies: Vec<StarboardRow>,
) -> Vec<RefreshTarget> {
    own.into_iter()
        .map(RefreshTarget::Entry)
        .chain(replies.into_iter().map(RefreshTarget::ReplyTo))
        .collect()
}
