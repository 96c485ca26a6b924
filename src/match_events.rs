//! Single pass over one player's match list, newest match first.
//!
//! The list must be ordered most recent to oldest. The pass starts from the
//! player's current rating and un-applies each game's rating change to recover
//! the rating before that game, which is only correct in that order.

use chrono::{DateTime, Utc};

use crate::factoid::{FactKind, Factoid, PlayerIdentity};
use crate::model::{MATCH_TYPE_1V1, MatchParticipant, MatchRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Streak {
    len: u32,
    won: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EloExtremes {
    max: i32,
    min: i32,
    // true when the max was the last extreme to move
    max_is_latest: bool,
}

impl EloExtremes {
    fn new(elo: i32) -> Self {
        Self {
            max: elo,
            min: elo,
            max_is_latest: true,
        }
    }

    fn observe(&mut self, elo: i32) {
        if elo > self.max {
            self.max = elo;
            self.max_is_latest = true;
        } else if elo < self.min {
            self.min = elo;
            self.max_is_latest = false;
        }
    }

    /// Oldest-moved extreme first, most recently moved extreme last.
    fn climb(&self) -> (i32, i32) {
        if self.max_is_latest {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        }
    }
}

/// Running state of one extraction pass. Never outlives the pass.
#[derive(Debug, Clone, Default)]
struct ExtractionState {
    current_elo: Option<i32>,
    streak: Option<Streak>,
    extremes: Option<EloExtremes>,
    max_league: Option<u8>,
    last_seen: Option<DateTime<Utc>>,
}

/// The two sides of a 1v1 from the player's point of view.
struct Sides<'a> {
    mine: &'a MatchParticipant,
    theirs: &'a MatchParticipant,
}

fn resolve_sides(record: &MatchRecord, character_id: u64) -> Option<Sides<'_>> {
    let [first, second] = record.participants.as_slice() else {
        return None;
    };
    first.members()?;
    second.members()?;
    if first.has_character(character_id) {
        Some(Sides {
            mine: first,
            theirs: second,
        })
    } else {
        Some(Sides {
            mine: second,
            theirs: first,
        })
    }
}

/// Extract per-match and end-of-pass facts for one player.
///
/// `matches` must be ordered newest first. Matches that are not 1v1, do not
/// have exactly two resolvable sides, or predate `cutoff` are skipped.
pub fn extract_match_events(
    player: &PlayerIdentity,
    current_rating: Option<i32>,
    matches: &[MatchRecord],
    cutoff: DateTime<Utc>,
) -> Vec<Factoid> {
    let mut state = ExtractionState {
        current_elo: current_rating,
        ..Default::default()
    };
    let mut out = Vec::new();
    let fact = |timestamp: DateTime<Utc>, kind: FactKind| Factoid {
        timestamp,
        player: player.clone(),
        kind,
    };

    for record in matches {
        let Some(sides) = resolve_sides(record, player.player_id) else {
            continue;
        };
        let timestamp = record.timestamp();
        if timestamp < cutoff {
            continue;
        }
        if record.info.match_type != MATCH_TYPE_1V1 {
            continue;
        }
        state.last_seen = Some(timestamp);

        let won = sides.mine.won();

        // Rating as it stood before this game.
        if let (Some(elo), Some(change)) =
            (state.current_elo, sides.mine.participant.rating_change)
        {
            let change = change.unsigned_abs();
            state.current_elo = Some(if won {
                elo.saturating_sub_unsigned(change)
            } else {
                elo.saturating_add_unsigned(change)
            });
        }

        // Either side reaching a higher league than seen so far counts.
        if let Some(league) = sides.mine.league_type().max(sides.theirs.league_type()) {
            match state.max_league {
                None => state.max_league = Some(league),
                Some(max) if league > max => {
                    state.max_league = Some(league);
                    out.push(fact(timestamp, FactKind::Promote { league }));
                }
                Some(_) => {}
            }
        }

        if let (Some(my_elo), Some(their_elo)) = (state.current_elo, sides.theirs.team_rating()) {
            out.push(fact(
                timestamp,
                FactKind::MismatchedGame {
                    won,
                    my_elo,
                    their_elo,
                },
            ));
        }

        if let Some(duration_secs) = record.duration_secs() {
            out.push(fact(timestamp, FactKind::LongGame { duration_secs, won }));
        }

        match state.streak {
            Some(streak) if streak.won == won => {
                state.streak = Some(Streak {
                    len: streak.len + 1,
                    won,
                });
            }
            Some(ended) => {
                out.push(fact(
                    timestamp,
                    FactKind::LongStreak {
                        streak: ended.len,
                        won: ended.won,
                    },
                ));
                state.streak = Some(Streak { len: 1, won });
            }
            None => state.streak = Some(Streak { len: 1, won }),
        }

        // Snapshot rating when the provider has it, otherwise our estimate.
        if let Some(elo) = sides.mine.team_rating().or(state.current_elo) {
            state
                .extremes
                .get_or_insert_with(|| EloExtremes::new(elo))
                .observe(elo);
        }
    }

    let Some(last_seen) = state.last_seen else {
        return out;
    };
    if let Some(streak) = state.streak {
        out.push(fact(
            last_seen,
            FactKind::LongStreak {
                streak: streak.len,
                won: streak.won,
            },
        ));
    }
    if let Some(extremes) = state.extremes {
        out.push(fact(last_seen, FactKind::EloHigh { elo: extremes.max }));
        let (elo_start, elo_end) = extremes.climb();
        out.push(fact(
            last_seen,
            FactKind::EloClimb {
                elo_start,
                elo_end,
            },
        ));
    }
    out
}
