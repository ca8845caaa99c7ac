use std::collections::HashMap;

use uuid::Uuid;

use banter_types::Reaction;

/// Per-(message, emoji) rollup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReactionTally {
    pub count: usize,
    pub reacted_by_me: bool,
}

/// Map of message id → emoji token → tally.
pub type ReactionAggregates = HashMap<Uuid, HashMap<String, ReactionTally>>;

/// Fold the flat reaction set into per-message aggregates.
///
/// Pure and order-independent: always recomputed from the full set, never
/// patched incrementally, so it cannot drift from the source rows.
pub fn aggregate(reactions: &[Reaction], current_user: Option<Uuid>) -> ReactionAggregates {
    let mut aggregates: ReactionAggregates = HashMap::new();

    for reaction in reactions {
        let tally = aggregates
            .entry(reaction.message_id)
            .or_default()
            .entry(reaction.emoji.clone())
            .or_default();
        tally.count += 1;
        if current_user == Some(reaction.author_id) {
            tally.reacted_by_me = true;
        }
    }

    aggregates
}
