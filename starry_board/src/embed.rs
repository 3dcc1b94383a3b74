use serenity::builder::{CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter};
use serenity::model::channel::Message;
use serenity::model::id::GuildId;
use serenity::model::Timestamp;

/// Colour of the embed showing the message a starred reply answers.
pub const REFERENCED_COLOUR: u32 = 0xE3E5E8;
/// Discord's limit on embed descriptions, in characters.
pub const DESCRIPTION_LIMIT: usize = 4096;
/// Discord's limit on the text of all embeds in one message, in characters.
pub const MESSAGE_EMBED_LIMIT: usize = 6000;

const TITLE: &str = "Jump to Message";
const REFERENCED_FOOTER: &str = "Original Message";

/// The parts of a message that end up on the starboard.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedSource {
    pub author_name: String,
    pub avatar_url: String,
    pub jump_url: String,
    pub content: String,
    pub timestamp: Timestamp,
    pub image_url: Option<String>,
}

impl EmbedSource {
    /// Messages fetched over REST carry no guild id, so `guild` fills it in for the jump link.
    pub fn new(m: &Message, guild: Option<GuildId>) -> Self {
        Self {
            author_name: m
                .author
                .global_name
                .clone()
                .unwrap_or_else(|| m.author.name.clone()),
            avatar_url: m.author.face(),
            jump_url: m.id.link(m.channel_id, m.guild_id.or(guild)),
            content: m.content.clone(),
            timestamp: displayed_timestamp(m.timestamp, m.edited_timestamp),
            image_url: m.attachments.first().map(|a| a.url.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbedSpec {
    pub colour: u32,
    pub author: String,
    pub thumbnail: String,
    pub title: &'static str,
    pub url: String,
    pub footer: String,
    pub description: String,
    pub image: Option<String>,
    pub timestamp: Timestamp,
}

impl EmbedSpec {
    fn new(source: &EmbedSource, colour: u32, footer: String) -> Self {
        Self {
            colour,
            author: source.author_name.clone(),
            thumbnail: source.avatar_url.clone(),
            title: TITLE,
            url: source.jump_url.clone(),
            footer,
            description: truncate(source.content.trim(), DESCRIPTION_LIMIT),
            image: source.image_url.clone(),
            timestamp: source.timestamp,
        }
    }

    /// Characters counted against the message limit besides the description.
    fn fixed_len(&self) -> usize {
        self.title.chars().count() + self.author.chars().count() + self.footer.chars().count()
    }

    pub fn into_create_embed(self) -> CreateEmbed {
        let mut embed = CreateEmbed::new()
            .colour(self.colour)
            .author(CreateEmbedAuthor::new(self.author))
            .thumbnail(self.thumbnail)
            .title(self.title)
            .url(self.url)
            .footer(CreateEmbedFooter::new(self.footer))
            .timestamp(self.timestamp);
        // discord rejects empty descriptions
        if !self.description.is_empty() {
            embed = embed.description(self.description);
        }
        if let Some(image) = self.image {
            embed = embed.image(image);
        }
        embed
    }
}

/// Builds the embeds for a starboard post. A reply gets the message it answers shown above it.
pub fn render_embeds(
    original: &EmbedSource,
    referenced: Option<&EmbedSource>,
    stars: i16,
    emoji: &str,
    colour: u32,
) -> Vec<EmbedSpec> {
    let mut embeds = Vec::with_capacity(2);
    if let Some(referenced) = referenced {
        embeds.push(EmbedSpec::new(
            referenced,
            REFERENCED_COLOUR,
            REFERENCED_FOOTER.to_string(),
        ));
    }
    embeds.push(EmbedSpec::new(original, colour, format!("{} {}", stars, emoji)));
    fit_to_message(&mut embeds);
    embeds
}

/// Cuts descriptions until every embed fits in one message. The last embed is cut last.
pub fn fit_to_message(embeds: &mut [EmbedSpec]) {
    let fixed: usize = embeds.iter().map(EmbedSpec::fixed_len).sum();
    let mut budget = MESSAGE_EMBED_LIMIT.saturating_sub(fixed);
    for embed in embeds.iter_mut().rev() {
        let len = embed.description.chars().count();
        if len > budget {
            embed.description = truncate(&embed.description, budget);
        }
        budget = budget.saturating_sub(len);
    }
}

/// Total embed text of a message, as Discord counts it.
pub fn message_len(embeds: &[EmbedSpec]) -> usize {
    embeds
        .iter()
        .map(|e| e.fixed_len() + e.description.chars().count())
        .sum()
}

/// An edited message shows when it was last edited.
pub fn displayed_timestamp(created: Timestamp, edited: Option<Timestamp>) -> Timestamp {
    edited.unwrap_or(created)
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(content: &str) -> EmbedSource {
        EmbedSource {
            author_name: "someone".to_string(),
            avatar_url: "https://cdn.discordapp.com/embed/avatars/0.png".to_string(),
            jump_url: "https://discord.com/channels/1/2/3".to_string(),
            content: content.to_string(),
            timestamp: Timestamp::from_unix_timestamp(1_600_000_000).unwrap(),
            image_url: None,
        }
    }

    #[test]
    fn plain_message_gets_one_embed() {
        let embeds = render_embeds(&source("  hello  "), None, 5, "⭐", 0xFDD835);
        assert_eq!(embeds.len(), 1);
        let e = &embeds[0];
        assert_eq!(e.colour, 0xFDD835);
        assert_eq!(e.footer, "5 ⭐");
        assert_eq!(e.description, "hello");
        assert_eq!(e.title, "Jump to Message");
        assert_eq!(e.url, "https://discord.com/channels/1/2/3");
    }

    #[test]
    fn reply_shows_referenced_message_first() {
        let mut referenced = source("the question");
        referenced.image_url = Some("https://example.com/cat.png".to_string());
        let embeds = render_embeds(&source("the answer"), Some(&referenced), 3, "⭐", 1);
        assert_eq!(embeds.len(), 2);
        assert_eq!(embeds[0].colour, REFERENCED_COLOUR);
        assert_eq!(embeds[0].footer, "Original Message");
        assert_eq!(embeds[0].image.as_deref(), Some("https://example.com/cat.png"));
        assert_eq!(embeds[1].footer, "3 ⭐");
        assert_eq!(embeds[1].description, "the answer");
    }

    #[test]
    fn long_content_is_cut_on_char_boundaries() {
        let content = "é".repeat(DESCRIPTION_LIMIT + 10);
        let embeds = render_embeds(&source(&content), None, 3, "⭐", 1);
        assert_eq!(embeds[0].description.chars().count(), DESCRIPTION_LIMIT);
    }

    #[test]
    fn long_reply_to_long_message_fits_in_one_message() {
        let referenced = source(&"q".repeat(4000));
        let embeds = render_embeds(&source(&"a".repeat(4000)), Some(&referenced), 7, "⭐", 1);
        assert!(message_len(&embeds) <= MESSAGE_EMBED_LIMIT);
        // the starred message keeps its text, the quoted one gives way
        assert_eq!(embeds[1].description.chars().count(), 4000);
        assert!(embeds[0].description.chars().count() < 4000);
        assert!(!embeds[0].description.is_empty());
    }

    #[test]
    fn short_reply_is_not_cut() {
        let embeds = render_embeds(&source("yes"), Some(&source("really?")), 3, "⭐", 1);
        assert_eq!(embeds[0].description, "really?");
        assert_eq!(embeds[1].description, "yes");
    }

    #[test]
    fn jump_link_uses_the_resolved_guild() {
        // what `GET /channels/{id}/messages/{id}` returns: no guild_id
        let json = r#"{
            "id": "1181409862553829406",
            "channel_id": "1100000000000000001",
            "author": {
                "id": "80351110224678912",
                "username": "someone",
                "discriminator": "0",
                "global_name": "Someone",
                "avatar": null,
                "bot": false
            },
            "content": "hello",
            "timestamp": "2023-12-04T12:00:00.000000+00:00",
            "edited_timestamp": null,
            "tts": false,
            "mention_everyone": false,
            "mentions": [],
            "mention_roles": [],
            "attachments": [],
            "embeds": [],
            "pinned": false,
            "type": 0,
            "flags": 0
        }"#;
        let m: Message = serenity::json::from_str(json).unwrap();
        assert_eq!(m.guild_id, None);

        let src = EmbedSource::new(&m, Some(GuildId::new(1)));
        assert_eq!(
            src.jump_url,
            "https://discord.com/channels/1/1100000000000000001/1181409862553829406"
        );
        assert!(!src.jump_url.contains("@me"));
        assert_eq!(src.author_name, "Someone");
    }

    #[test]
    fn edits_replace_the_creation_time() {
        let created = Timestamp::from_unix_timestamp(1_600_000_000).unwrap();
        let edited = Timestamp::from_unix_timestamp(1_600_000_500).unwrap();
        assert_eq!(displayed_timestamp(created, None), created);
        assert_eq!(displayed_timestamp(created, Some(edited)), edited);
    }

    #[test]
    fn short_content_is_untouched() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("", 3), "");
    }
}
