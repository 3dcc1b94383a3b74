use serenity::model::channel::{MessageReaction, ReactionType};
use serenity::model::id::UserId;
use std::collections::HashSet;

const VARIATION_SELECTOR_16: char = '\u{FE0F}';

/// Whether `reaction` is the configured star.
///
/// Custom emoji never count. The emoji presentation selector is ignored on both sides since
/// Discord strips it from reactions but it often sneaks into configs.
pub fn is_star(reaction: &ReactionType, emoji: &str) -> bool {
    match reaction {
        ReactionType::Unicode(s) => {
            s.trim_end_matches(VARIATION_SELECTOR_16) == emoji.trim_end_matches(VARIATION_SELECTOR_16)
        }
        _ => false,
    }
}

/// Counts distinct reactors, leaving out the author when `exclude_self` is set.
pub fn count_qualifying<I>(reactors: I, author: UserId, exclude_self: bool) -> i16
where
    I: IntoIterator<Item = UserId>,
{
    let unique: HashSet<UserId> = reactors
        .into_iter()
        .filter(|u| !(exclude_self && *u == author))
        .collect();
    clamp_stars(unique.len() as u64)
}

pub fn clamp_stars(count: u64) -> i16 {
    i16::try_from(count).unwrap_or(i16::MAX)
}

/// Stars on a reaction when nobody is left out. Super reactions don't count, matching
/// what the reactor listing returns.
pub fn normal_stars(reaction: &MessageReaction) -> i16 {
    clamp_stars(reaction.count_details.normal)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarDecision {
    Qualifies,
    Below,
}

/// The minimum number of stars for a message to be on the starboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold(i16);

impl Threshold {
    pub fn new(minimum: i16) -> Self {
        Self(minimum.max(1))
    }

    pub fn evaluate(self, count: i16) -> StarDecision {
        if count >= self.0 {
            StarDecision::Qualifies
        } else {
            StarDecision::Below
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenity::model::id::EmojiId;

    #[test]
    fn only_the_configured_unicode_emoji_is_a_star() {
        assert!(is_star(&ReactionType::Unicode("⭐".to_string()), "⭐"));
        assert!(!is_star(&ReactionType::Unicode("🌟".to_string()), "⭐"));
        assert!(!is_star(&ReactionType::Unicode("⭐⭐".to_string()), "⭐"));
        let custom = ReactionType::Custom {
            animated: false,
            id: EmojiId::new(1_000_000_000_000_001),
            name: Some("⭐".to_string()),
        };
        assert!(!is_star(&custom, "⭐"));
    }

    #[test]
    fn presentation_selector_is_ignored() {
        assert!(is_star(&ReactionType::Unicode("⭐".to_string()), "⭐\u{FE0F}"));
        assert!(is_star(&ReactionType::Unicode("⭐\u{FE0F}".to_string()), "⭐"));
    }

    #[test]
    fn self_stars_are_excluded_on_request() {
        let author = UserId::new(1);
        let reactors = [UserId::new(1), UserId::new(2), UserId::new(3)];
        assert_eq!(count_qualifying(reactors, author, true), 2);
        assert_eq!(count_qualifying(reactors, author, false), 3);
    }

    #[test]
    fn duplicate_reactors_count_once() {
        let reactors = [UserId::new(2), UserId::new(2), UserId::new(3)];
        assert_eq!(count_qualifying(reactors, UserId::new(1), true), 2);
    }

    #[test]
    fn counts_are_clamped() {
        assert_eq!(clamp_stars(40_000), i16::MAX);
        assert_eq!(clamp_stars(7), 7);
    }

    #[test]
    fn threshold_is_inclusive() {
        let t = Threshold::new(3);
        assert_eq!(t.evaluate(2), StarDecision::Below);
        assert_eq!(t.evaluate(3), StarDecision::Qualifies);
        assert_eq!(t.evaluate(9), StarDecision::Qualifies);
        // an unstarred message never qualifies
        assert_eq!(Threshold::new(0).evaluate(0), StarDecision::Below);
        assert_eq!(Threshold::new(0).evaluate(1), StarDecision::Qualifies);
    }

    #[test]
    fn super_reactions_are_not_stars() {
        let reaction: MessageReaction = serenity::json::from_str(
            r#"{
                "count": 5,
                "count_details": { "burst": 2, "normal": 3 },
                "me": false,
                "me_burst": false,
                "emoji": { "id": null, "name": "⭐" },
                "burst_colors": []
            }"#,
        )
        .unwrap();
        assert_eq!(normal_stars(&reaction), 3);
    }
}
