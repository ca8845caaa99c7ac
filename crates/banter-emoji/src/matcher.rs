use crate::Emoji;

/// Cap on autocomplete results.
pub const AUTOCOMPLETE_LIMIT: usize = 10;

/// Score an emoji against an autocomplete query. Higher is better; `None`
/// means no match at all.
///
/// Tiers, best first:
/// 1. prefix match on the code (shorter codes rank higher),
/// 2. prefix match on the alt text,
/// 3. substring match on the code (earlier occurrence ranks higher),
/// 4. substring match on the alt text,
/// 5. in-order character match on the code, scored by how early each
///    query character lands.
///
/// The tier constants keep the tiers separated at typical shortcode
/// lengths; a code would need to run to dozens of characters before a
/// lower tier could catch up.
pub fn fuzzy_match(emoji: &Emoji, query: &str) -> Option<i32> {
    let query = query.to_lowercase();
    if query.is_empty() {
        return None;
    }
    let code = emoji.code.to_lowercase();
    let alt = emoji.alt.to_lowercase();

    if code.starts_with(&query) {
        return Some(1000 - code.chars().count() as i32);
    }
    if alt.starts_with(&query) {
        return Some(500 - alt.chars().count() as i32);
    }
    if let Some(pos) = code.find(&query) {
        return Some(200 - char_offset(&code, pos));
    }
    if let Some(pos) = alt.find(&query) {
        return Some(100 - char_offset(&alt, pos));
    }

    subsequence_score(&code, &query)
}

/// In-order character match: every query char must appear in the code in
/// order. Earlier hits score higher; a miss anywhere is no match.
fn subsequence_score(code: &str, query: &str) -> Option<i32> {
    let mut remaining = query.chars().peekable();
    let mut score = 0i32;

    for (i, c) in code.chars().enumerate() {
        let Some(&next) = remaining.peek() else { break };
        if c == next {
            score += 10 - i as i32;
            remaining.next();
        }
    }

    remaining.peek().is_none().then_some(score)
}

fn char_offset(s: &str, byte_pos: usize) -> i32 {
    s[..byte_pos].chars().count() as i32
}

/// Rank `candidates` by descending fuzzy score, dropping non-matches and
/// capping at `limit`. The sort is stable, so equal scores keep the input
/// order (custom emotes are listed ahead of built-ins by the caller).
pub fn rank(candidates: Vec<Emoji>, query: &str, limit: usize) -> Vec<Emoji> {
    let mut scored: Vec<(i32, Emoji)> = candidates
        .into_iter()
        .filter_map(|e| fuzzy_match(&e, query).map(|s| (s, e)))
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.truncate(limit);
    scored.into_iter().map(|(_, e)| e).collect()
}
