use std::collections::BTreeMap;

use crate::factoid::{FactKind, Factoid, PlayerIdentity};
use crate::history::HistorySample;

pub const UNKNOWN_RACE: &str = "unknown";

pub fn count_games_by_race(samples: &[HistorySample]) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for sample in samples {
        let race = sample.race.as_deref().unwrap_or(UNKNOWN_RACE);
        *counts.entry(race.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Race-distribution facts over the window: one `SwitchRace` and one
/// `ManyGames`, stamped at the newest sample. Nothing when no games survive.
pub fn extract_aggregate_events(player: &PlayerIdentity, samples: &[HistorySample]) -> Vec<Factoid> {
    let Some(latest) = samples.iter().map(|s| s.timestamp).max() else {
        return Vec::new();
    };
    let games_by_race = count_games_by_race(samples);
    if games_by_race.values().sum::<u32>() == 0 {
        return Vec::new();
    }

    vec![
        Factoid {
            timestamp: latest,
            player: player.clone(),
            kind: FactKind::SwitchRace {
                games_by_race: games_by_race.clone(),
            },
        },
        Factoid {
            timestamp: latest,
            player: player.clone(),
            kind: FactKind::ManyGames { games_by_race },
        },
    ]
}
