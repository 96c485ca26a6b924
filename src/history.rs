use chrono::{DateTime, Utc};

use crate::model::{ColumnarHistory, parse_timestamp};

/// One row of the rating history.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySample {
    pub timestamp: DateTime<Utc>,
    pub race: Option<String>,
    pub queue_type: Option<u32>,
    pub league_type: Option<u8>,
    pub rating: Option<i32>,
    pub games: Option<u32>,
    pub wins: Option<u32>,
    pub season: Option<u32>,
    pub tier: Option<u8>,
    pub league_rank: Option<u64>,
    pub region_rank: Option<u64>,
    pub global_rank: Option<u64>,
}

/// Turn columnar history into rows, keeping provider order and only rows of
/// `queue` at or after `cutoff`.
pub fn normalize_history(
    columns: &ColumnarHistory,
    cutoff: DateTime<Utc>,
    queue: u32,
) -> Vec<HistorySample> {
    let rows = [
        columns.date_time.len(),
        columns.race.len(),
        columns.queue_type.len(),
        columns.league_type.len(),
        columns.rating.len(),
        columns.games.len(),
        columns.wins.len(),
        columns.season.len(),
        columns.tier.len(),
        columns.league_rank.len(),
        columns.region_rank.len(),
        columns.global_rank.len(),
    ]
    .into_iter()
    .max()
    .unwrap_or(0);

    let mut out = Vec::new();
    for i in 0..rows {
        let timestamp = cell(&columns.date_time, i)
            .map(|raw| parse_timestamp(&raw))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        if timestamp < cutoff {
            continue;
        }
        let queue_type = cell(&columns.queue_type, i);
        if queue_type != Some(queue) {
            continue;
        }

        out.push(HistorySample {
            timestamp,
            race: cell(&columns.race, i).map(|r| r.to_lowercase()),
            queue_type,
            league_type: cell(&columns.league_type, i),
            rating: cell(&columns.rating, i),
            games: cell(&columns.games, i),
            wins: cell(&columns.wins, i),
            season: cell(&columns.season, i),
            tier: cell(&columns.tier, i),
            league_rank: cell(&columns.league_rank, i),
            region_rank: cell(&columns.region_rank, i),
            global_rank: cell(&columns.global_rank, i),
        });
    }
    out
}

fn cell<T: Clone>(column: &[Option<T>], idx: usize) -> Option<T> {
    column.get(idx).cloned().flatten()
}
