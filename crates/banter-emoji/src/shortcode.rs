use std::sync::LazyLock;

use regex::Regex;

use crate::Emoji;

/// Matches `:code:` tokens, e.g. `:smile:` or `:+1:`.
static SHORTCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([A-Za-z0-9_+\-]+):").expect("shortcode regex"));

/// Autocomplete only kicks in once the query has this many characters.
pub const MIN_QUERY_LEN: usize = 2;

/// One piece of a message after shortcode parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    Emoji(Emoji),
    /// A well-formed `:code:` token that resolved to nothing. Rendered
    /// verbatim so typos stay visible.
    UnknownCode(String),
}

/// Split message content into text and emoji segments, resolving each
/// shortcode through `resolve`.
pub fn parse_segments(content: &str, resolve: impl Fn(&str) -> Option<Emoji>) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in SHORTCODE.captures_iter(content) {
        let whole = caps.get(0).expect("match group 0");
        let code = &caps[1];

        if whole.start() > last {
            segments.push(Segment::Text(content[last..whole.start()].to_string()));
        }

        match resolve(code) {
            Some(emoji) => segments.push(Segment::Emoji(emoji)),
            None => segments.push(Segment::UnknownCode(whole.as_str().to_string())),
        }

        last = whole.end();
    }

    if last < content.len() || segments.is_empty() {
        segments.push(Segment::Text(content[last..].to_string()));
    }

    segments
}

/// An in-progress shortcode at the cursor, e.g. `have a :fi|` yields
/// query `fi` spanning the byte range of `:fi`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionContext {
    pub query: String,
    /// Byte offset of the opening `:`.
    pub start: usize,
    /// Byte offset of the cursor (end of the query).
    pub end: usize,
}

/// Detect whether the cursor sits inside an unterminated shortcode.
///
/// Scans back from the cursor for the opening `:`, giving up at whitespace.
/// Requires at least [`MIN_QUERY_LEN`] query characters, all from the
/// shortcode charset. `cursor` is a byte offset and must lie on a char
/// boundary; anything else returns `None`.
pub fn completion_context(value: &str, cursor: usize) -> Option<CompletionContext> {
    let before = value.get(..cursor)?;

    let mut colon = None;
    for (pos, ch) in before.char_indices().rev() {
        if ch.is_whitespace() {
            return None;
        }
        if ch == ':' {
            colon = Some(pos);
            break;
        }
    }
    let start = colon?;

    let query = &before[start + 1..];
    if query.chars().count() < MIN_QUERY_LEN {
        return None;
    }
    if !query.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-')) {
        return None;
    }

    Some(CompletionContext { query: query.to_string(), start, end: cursor })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Glyph;

    fn fire() -> Emoji {
        Emoji { code: "fire".into(), alt: "fire".into(), glyph: Glyph::Unicode("🔥".into()) }
    }

    fn resolve(code: &str) -> Option<Emoji> {
        (code == "fire").then(fire)
    }

    #[test]
    fn splits_text_around_shortcodes() {
        let segments = parse_segments("this is :fire: mate", resolve);
        assert_eq!(
            segments,
            vec![
                Segment::Text("this is ".into()),
                Segment::Emoji(fire()),
                Segment::Text(" mate".into()),
            ]
        );
    }

    #[test]
    fn unknown_codes_stay_verbatim() {
        let segments = parse_segments(":nope:", resolve);
        assert_eq!(segments, vec![Segment::UnknownCode(":nope:".into())]);
    }

    #[test]
    fn plain_text_is_a_single_segment() {
        assert_eq!(parse_segments("no emojis here", resolve), vec![Segment::Text(
            "no emojis here".into()
        )]);
        assert_eq!(parse_segments("", resolve), vec![Segment::Text(String::new())]);
    }

    #[test]
    fn adjacent_shortcodes_both_parse() {
        let segments = parse_segments(":fire::fire:", resolve);
        assert_eq!(segments, vec![Segment::Emoji(fire()), Segment::Emoji(fire())]);
    }

    #[test]
    fn context_found_mid_word() {
        let ctx = completion_context("have a :fi", 10).unwrap();
        assert_eq!(ctx.query, "fi");
        assert_eq!(ctx.start, 7);
        assert_eq!(ctx.end, 10);
    }

    #[test]
    fn context_requires_min_query_length() {
        assert!(completion_context(":f", 2).is_none());
        assert!(completion_context(":fi", 3).is_some());
    }

    #[test]
    fn whitespace_breaks_the_context() {
        assert!(completion_context(": fi", 4).is_none());
        assert!(completion_context("fi", 2).is_none());
    }

    #[test]
    fn invalid_charset_breaks_the_context() {
        assert!(completion_context(":fi!", 4).is_none());
    }

    #[test]
    fn cursor_off_char_boundary_is_none() {
        // Byte 1 lands inside the multi-byte emoji.
        assert!(completion_context("🔥:fi", 1).is_none());
    }
}
