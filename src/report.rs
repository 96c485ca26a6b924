use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::selection::Selection;

/// Mention text for a fact's owner: the plain name, plus a user mention when
/// the battle tag has been registered.
pub fn mention_for(player_name: &str, battle_tag: &str, accounts: &BTreeMap<String, u64>) -> String {
    match accounts.get(battle_tag) {
        Some(user_id) => format!("{player_name} <@{user_id}>"),
        None => {
            warn!(battle_tag, "battle tag not found in scanned channels");
            player_name.to_string()
        }
    }
}

/// Weekly message: a dated header and up to `cap` numbered facts. `None` when
/// nothing was selected, so callers skip the post entirely.
pub fn compose_report(
    date: DateTime<Utc>,
    selected: &[Selection],
    accounts: &BTreeMap<String, u64>,
    cap: usize,
) -> Option<String> {
    if selected.is_empty() || cap == 0 {
        return None;
    }
    let mut message = format!("Weekly stats for {}:\n", date.format("%B %d, %Y"));
    for (i, pick) in selected.iter().take(cap).enumerate() {
        let fact = &pick.fact.fact;
        let mention = mention_for(&fact.player.player_name, &fact.player.battle_tag, accounts);
        let _ = writeln!(message, "{}. {mention} {fact}", i + 1);
    }
    Some(message)
}
