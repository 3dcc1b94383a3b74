use serenity::model::id::{ChannelId, UserId};
use serenity::utils::{parse_channel_mention, parse_user_mention};

/// Accepts a mention (`<@id>` or `<@!id>`) or a bare id.
pub fn parse_user(s: &str) -> Option<UserId> {
    let s = s.trim();
    parse_user_mention(s)
        .or_else(|| s.parse::<UserId>().ok())
        .filter(|id| id.get() != 0)
}

/// Accepts a mention (`<#id>`) or a bare id.
pub fn parse_channel(s: &str) -> Option<ChannelId> {
    let s = s.trim();
    parse_channel_mention(s)
        .or_else(|| s.parse::<ChannelId>().ok())
        .filter(|id| id.get() != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn users() {
        let id = Some(UserId::new(80351110224678912));
        assert_eq!(parse_user("<@80351110224678912>"), id);
        assert_eq!(parse_user("<@!80351110224678912>"), id);
        assert_eq!(parse_user(" 80351110224678912 "), id);
        assert_eq!(parse_user("<#80351110224678912>"), None);
        assert_eq!(parse_user("0"), None);
        assert_eq!(parse_user("<@0>"), None);
        assert_eq!(parse_user("someone"), None);
    }

    #[test]
    fn channels() {
        let id = Some(ChannelId::new(381880193700069377));
        assert_eq!(parse_channel("<#381880193700069377>"), id);
        assert_eq!(parse_channel("381880193700069377"), id);
        assert_eq!(parse_channel("<@381880193700069377>"), None);
        assert_eq!(parse_channel(""), None);
        assert_eq!(parse_channel("<#0>"), None);
        assert_eq!(parse_channel("0"), None);
    }
}
