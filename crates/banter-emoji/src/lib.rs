//! Shortcode → emoji resolution.
//!
//! Message content stores shortcodes like `:fire:` as plain text; they are
//! resolved to glyphs (or image URLs for custom emotes) at render time. The
//! custom set comes from a remote source through [`EmoteCache`] and shadows
//! the built-in table on code collisions.

mod cache;
mod matcher;
mod shortcode;
mod table;

pub use cache::{DEFAULT_EMOTE_TTL, EmoteCache, EmoteSource};
pub use matcher::{AUTOCOMPLETE_LIMIT, fuzzy_match, rank};
pub use shortcode::{CompletionContext, MIN_QUERY_LEN, Segment, completion_context, parse_segments};

use banter_types::CustomEmote;

/// A resolvable emoji: either a built-in unicode glyph or a custom
/// image-backed emote.
#[derive(Debug, Clone, PartialEq)]
pub struct Emoji {
    /// Shortcode without the colons, e.g. `fire`.
    pub code: String,
    /// Alt text for accessibility and fuzzy matching.
    pub alt: String,
    pub glyph: Glyph,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Glyph {
    Unicode(String),
    Image { url: String },
}

impl Emoji {
    pub fn is_custom(&self) -> bool {
        matches!(self.glyph, Glyph::Image { .. })
    }
}

impl From<CustomEmote> for Emoji {
    fn from(emote: CustomEmote) -> Self {
        Emoji {
            code: emote.code,
            alt: emote.alt,
            glyph: Glyph::Image { url: emote.url },
        }
    }
}

fn standard_emoji(entry: &(&str, &str, &str)) -> Emoji {
    Emoji {
        code: entry.0.to_string(),
        alt: entry.2.to_string(),
        glyph: Glyph::Unicode(entry.1.to_string()),
    }
}

/// Unified lookup over the built-in table and the cached custom set.
#[derive(Clone)]
pub struct EmojiIndex {
    cache: EmoteCache,
}

impl EmojiIndex {
    pub fn new(cache: EmoteCache) -> Self {
        Self { cache }
    }

    /// Refresh the custom set if stale. Resolution itself never awaits.
    pub async fn refresh(&self) {
        self.cache.get().await;
    }

    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    /// Resolve a shortcode (without colons). Custom emotes win collisions
    /// against the built-in table.
    pub fn resolve(&self, code: &str) -> Option<Emoji> {
        if let Some(emote) = self.cache.cached().iter().find(|e| e.code == code) {
            return Some(emote.clone().into());
        }
        table::STANDARD_EMOJIS
            .iter()
            .find(|(c, _, _)| *c == code)
            .map(standard_emoji)
    }

    /// Every known emoji, custom set first so stable sorts favor it.
    pub fn all(&self) -> Vec<Emoji> {
        let custom = self.cache.cached();
        custom
            .iter()
            .cloned()
            .map(Emoji::from)
            .chain(table::STANDARD_EMOJIS.iter().map(standard_emoji))
            .collect()
    }

    /// Custom emotes grouped by category for picker UIs. Uncategorized
    /// emotes land under `"custom"`.
    pub fn custom_categories(&self) -> Vec<(String, Vec<Emoji>)> {
        let mut categories: Vec<(String, Vec<Emoji>)> = Vec::new();
        for emote in self.cache.cached().iter() {
            let name = emote.category.clone().unwrap_or_else(|| "custom".to_string());
            match categories.iter_mut().find(|(c, _)| *c == name) {
                Some((_, emojis)) => emojis.push(emote.clone().into()),
                None => categories.push((name, vec![emote.clone().into()])),
            }
        }
        categories
    }

    /// Top-ranked candidates for an autocomplete query.
    pub fn autocomplete(&self, query: &str) -> Vec<Emoji> {
        rank(self.all(), query, AUTOCOMPLETE_LIMIT)
    }

    /// Parse message content into renderable segments.
    pub fn parse(&self, content: &str) -> Vec<Segment> {
        parse_segments(content, |code| self.resolve(code))
    }
}
