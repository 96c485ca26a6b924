use once_cell::sync::Lazy;
use regex::Regex;

use crate::guild_config::GuildConfig;

static BATTLE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w+\s*#\d{1,9}").expect("battle tag pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub author_id: u64,
    pub content: String,
}

/// First battle tag in `text`, with inner whitespace removed.
pub fn find_battle_tag(text: &str) -> Option<String> {
    let found = BATTLE_TAG.find(text)?;
    Some(found.as_str().split_whitespace().collect())
}

/// Tags posted in `messages` (oldest first), paired with their author.
/// At most `limit` messages are looked at.
pub fn harvest_accounts(messages: &[ChatMessage], limit: usize) -> Vec<(String, u64)> {
    messages
        .iter()
        .take(limit)
        .filter_map(|m| find_battle_tag(&m.content).map(|tag| (tag, m.author_id)))
        .collect()
}

/// Record harvested tags; a later post of the same tag takes ownership.
/// Returns how many tags were found.
pub fn register_accounts(config: &mut GuildConfig, found: &[(String, u64)]) -> usize {
    for (tag, author) in found {
        config.bnet_accounts.insert(tag.clone(), *author);
    }
    found.len()
}

/// Parse a message export: one `<author_id>\t<text>` per line. Lines without
/// a numeric author are skipped.
pub fn parse_message_export(raw: &str) -> Vec<ChatMessage> {
    raw.lines()
        .filter_map(|line| {
            let (author, content) = line.split_once('\t')?;
            let author_id = author.trim().parse::<u64>().ok()?;
            Some(ChatMessage {
                author_id,
                content: content.to_string(),
            })
        })
        .collect()
}
