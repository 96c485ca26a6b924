use anyhow::Result;
use chrono::{DateTime, TimeDelta, Utc};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::aggregate::extract_aggregate_events;
use crate::factoid::{Factoid, ScoredFact};
use crate::guild_config::GuildStore;
use crate::history::normalize_history;
use crate::match_events::extract_match_events;
use crate::model::{PlayerHistory, PlayerProfile, QUEUE_1V1};
use crate::provider::{ProviderResult, StatsProvider};
use crate::report::compose_report;
use crate::scanner::{ChatMessage, harvest_accounts, register_accounts};
use crate::selection::select_top_facts;
use crate::settings::Settings;

/// Every fact for one player in the window starting at `cutoff`: match facts
/// first, then rating-history aggregates.
pub fn extract_facts(
    profile: &PlayerProfile,
    history: &PlayerHistory,
    cutoff: DateTime<Utc>,
) -> Vec<Factoid> {
    let player = profile.identity();
    let mut facts =
        extract_match_events(&player, profile.current_rating(), history.matches(), cutoff);
    let samples = normalize_history(&history.columns(), cutoff, QUEUE_1V1);
    facts.extend(extract_aggregate_events(&player, &samples));
    facts
}

/// Search `term`, fetch the player's history and extract. An unknown player
/// yields no facts.
pub fn player_facts<P: StatsProvider + ?Sized>(
    provider: &P,
    term: &str,
    cutoff: DateTime<Utc>,
) -> ProviderResult<Vec<Factoid>> {
    let Some(profile) = provider.search_player(term)? else {
        return Ok(Vec::new());
    };
    let history = provider.player_history(profile.members.character.id)?;
    Ok(extract_facts(&profile, &history, cutoff))
}

pub fn score_facts(facts: Vec<Factoid>) -> Vec<ScoredFact> {
    facts.into_iter().map(ScoredFact::new).collect()
}

/// Facts for every term, scored. Players are fetched on a worker pool; a
/// player whose lookup fails is logged and left out.
pub fn collect_scored_facts<P: StatsProvider + ?Sized>(
    provider: &P,
    terms: &[String],
    cutoff: DateTime<Utc>,
    parallelism: usize,
) -> Vec<ScoredFact> {
    let per_player: Vec<Vec<Factoid>> = with_fetch_pool(parallelism, || {
        terms
            .par_iter()
            .map(|term| match player_facts(provider, term, cutoff) {
                Ok(facts) => {
                    debug!(term = term.as_str(), facts = facts.len(), "player facts extracted");
                    facts
                }
                Err(err) => {
                    warn!(term = term.as_str(), error = %err, "error getting player stats");
                    Vec::new()
                }
            })
            .collect()
    });
    score_facts(per_player.into_iter().flatten().collect())
}

fn with_fetch_pool<T>(threads: usize, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}

pub fn report_due(last_post: DateTime<Utc>, now: DateTime<Utc>, period: TimeDelta) -> bool {
    now.signed_duration_since(last_post) >= period
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildReport {
    pub guild_id: u64,
    pub channel_id: u64,
    pub message: String,
}

/// Build and record one guild's periodic report. `None` when the guild has
/// no report channel, is not due (unless `force`), has no registered
/// accounts, or nothing cleared the selection threshold.
pub fn run_guild_report<P: StatsProvider + ?Sized>(
    provider: &P,
    store: &GuildStore,
    guild_id: u64,
    now: DateTime<Utc>,
    settings: &Settings,
    force: bool,
) -> Result<Option<GuildReport>> {
    let mut config = store.load(guild_id)?;
    let Some(channel_id) = config.weekly_channel else {
        debug!(guild_id, "no weekly channel configured");
        return Ok(None);
    };
    if !force && !report_due(config.last_weekly_post, now, settings.report_period) {
        debug!(guild_id, "weekly report not due yet");
        return Ok(None);
    }
    if config.bnet_accounts.is_empty() {
        info!(guild_id, "no registered accounts, skipping report");
        return Ok(None);
    }

    info!(guild_id, players = config.bnet_accounts.len(), "building weekly report");
    let terms: Vec<String> = config.bnet_accounts.keys().cloned().collect();
    let facts = collect_scored_facts(
        provider,
        &terms,
        config.last_weekly_post,
        settings.fetch_parallelism,
    );
    let selected = select_top_facts(facts, &settings.selection);
    info!(guild_id, facts = selected.len(), "facts selected");

    let Some(message) = compose_report(
        now,
        &selected,
        &config.bnet_accounts,
        settings.selection.cap,
    ) else {
        return Ok(None);
    };

    config.last_weekly_post = now;
    store.save(guild_id, &config)?;
    Ok(Some(GuildReport {
        guild_id,
        channel_id,
        message,
    }))
}

/// Harvest battle tags from a guild's messages into its account table.
pub fn scan_guild(
    store: &GuildStore,
    guild_id: u64,
    messages: &[ChatMessage],
    limit: usize,
) -> Result<usize> {
    let mut config = store.load(guild_id)?;
    let found = harvest_accounts(messages, limit);
    for (tag, _) in &found {
        debug!(guild_id, tag = tag.as_str(), "found battle tag");
    }
    let count = register_accounts(&mut config, &found);
    store.save(guild_id, &config)?;
    info!(guild_id, count, "battle tags found");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::report_due;
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};

    #[test]
    fn never_posted_guild_is_due() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        assert!(report_due(DateTime::<Utc>::MIN_UTC, now, TimeDelta::days(7)));
    }

    #[test]
    fn due_exactly_at_period() {
        let last = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        assert!(!report_due(last, last + TimeDelta::days(6), TimeDelta::days(7)));
        assert!(report_due(last, last + TimeDelta::days(7), TimeDelta::days(7)));
    }
}
