//! Offline stand-in for the stats API. Every player's data is derived from a
//! seed built from the search term, so repeated runs are identical.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, TimeDelta, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::{
    Account, Character, ColumnarHistory, MATCH_TYPE_1V1, MatchInfo, MatchParticipant, MatchRecord,
    MatchTeam, ParticipantResult, PlayerHistory, PlayerProfile, ProfileMembers, QUEUE_1V1,
    RatingStats, TeamLeague, TeamMember,
};
use crate::provider::{ProviderResult, StatsProvider};

const RACES: [&str; 4] = ["PROTOSS", "TERRAN", "ZERG", "RANDOM"];

pub struct FakeProvider {
    anchor: DateTime<Utc>,
    matches_per_player: usize,
}

impl FakeProvider {
    /// Histories end at `anchor` and reach back about a week.
    pub fn new(anchor: DateTime<Utc>) -> Self {
        Self {
            anchor,
            matches_per_player: 40,
        }
    }

    pub fn with_matches_per_player(mut self, n: usize) -> Self {
        self.matches_per_player = n;
        self
    }

    fn rng_for(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    pub fn profile_for(&self, term: &str) -> PlayerProfile {
        let player_id = seed_of(term) % 1_000_000_000;
        let mut rng = Self::rng_for(player_id);
        let tag = term.split('#').next().unwrap_or(term).to_string();
        PlayerProfile {
            members: ProfileMembers {
                character: Character {
                    id: player_id,
                    name: format!("{tag}#{}", rng.gen_range(100..999)),
                    tag: tag.clone(),
                },
                account: Account {
                    battle_tag: if term.contains('#') {
                        term.to_string()
                    } else {
                        format!("{tag}#{}", rng.gen_range(1000..9999))
                    },
                    tag,
                },
            },
            current_stats: Some(RatingStats {
                rating: Some(rating_for(player_id)),
                games_played: Some(self.matches_per_player as u32),
            }),
            previous_stats: None,
            rating_max: None,
            league_max: None,
            total_games_played: None,
        }
    }

    pub fn history_for(&self, player_id: u64, current_rating: i32) -> PlayerHistory {
        let mut rng = Self::rng_for(player_id.wrapping_mul(31).wrapping_add(7));
        let primary = RACES[rng.gen_range(0..3)];
        let n = self.matches_per_player;

        let mut matches = Vec::with_capacity(n);
        let mut columns = ColumnarHistory::default();
        let mut elo = current_rating;
        let mut when = self.anchor;
        for i in 0..n {
            when -= TimeDelta::minutes(rng.gen_range(20..600));
            let their_elo = elo + rng.gen_range(-450..450);
            let won = rng.gen_bool(crate::elo::chance_to_win(elo, their_elo).clamp(0.1, 0.9));
            let change = rng.gen_range(8..30);
            let league = league_for(elo);

            matches.push(MatchRecord {
                info: MatchInfo {
                    id: Some(player_id * 1000 + i as u64),
                    date: when.to_rfc3339(),
                    match_type: MATCH_TYPE_1V1.to_string(),
                    duration: Some(rng.gen_range(240..2700)),
                },
                duration: None,
                participants: vec![
                    side(player_id, won, Some(elo), change, league),
                    side(
                        player_id + 1 + i as u64,
                        !won,
                        Some(their_elo),
                        change,
                        league_for(their_elo),
                    ),
                ],
            });

            let race = if rng.gen_bool(0.8) {
                primary
            } else {
                RACES[rng.gen_range(0..RACES.len())]
            };
            columns.date_time.push(Some(when.to_rfc3339()));
            columns.race.push(Some(race.to_string()));
            columns.queue_type.push(Some(QUEUE_1V1));
            columns.league_type.push(Some(league));
            columns.rating.push(Some(elo));

            elo = if won { elo - change } else { elo + change };
        }
        // provider order is oldest sample first
        reverse_columns(&mut columns);

        PlayerHistory {
            history: Some(columns),
            matches: Some(matches),
        }
    }
}

fn side(character_id: u64, won: bool, rating: Option<i32>, change: i32, league: u8) -> MatchParticipant {
    MatchParticipant {
        participant: ParticipantResult {
            player_character_id: Some(character_id),
            decision: if won { "WIN" } else { "LOSS" }.to_string(),
            rating_change: Some(if won { change } else { -change }),
        },
        team: Some(MatchTeam {
            rating,
            league: Some(TeamLeague {
                league_type: Some(league),
            }),
            league_type: None,
            members: Some(vec![TeamMember {
                character: Some(Character {
                    id: character_id,
                    ..Default::default()
                }),
            }]),
        }),
    }
}

fn rating_for(player_id: u64) -> i32 {
    StdRng::seed_from_u64(player_id ^ 0x5eed).gen_range(2200..5200)
}

fn league_for(elo: i32) -> u8 {
    match elo {
        i32::MIN..=1999 => 1,
        2000..=2599 => 2,
        2600..=3199 => 3,
        3200..=3899 => 4,
        3900..=4699 => 5,
        _ => 6,
    }
}

fn reverse_columns(c: &mut ColumnarHistory) {
    c.date_time.reverse();
    c.race.reverse();
    c.queue_type.reverse();
    c.league_type.reverse();
    c.rating.reverse();
}

fn seed_of(term: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    term.to_lowercase().hash(&mut hasher);
    hasher.finish()
}

impl StatsProvider for FakeProvider {
    fn search_player(&self, term: &str) -> ProviderResult<Option<PlayerProfile>> {
        if term.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(self.profile_for(term)))
    }

    fn player_history(&self, player_id: u64) -> ProviderResult<PlayerHistory> {
        Ok(self.history_for(player_id, rating_for(player_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn same_term_same_data() {
        let anchor = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let fake = FakeProvider::new(anchor);
        let a = fake.search_player("Pop101#1282").unwrap().unwrap();
        let b = fake.search_player("Pop101#1282").unwrap().unwrap();
        assert_eq!(a.members.character.id, b.members.character.id);
        assert_eq!(a.current_rating(), b.current_rating());
    }

    #[test]
    fn matches_are_newest_first() {
        let anchor = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let fake = FakeProvider::new(anchor).with_matches_per_player(12);
        let history = fake.player_history(42).unwrap();
        let stamps: Vec<_> = history.matches().iter().map(|m| m.timestamp()).collect();
        assert_eq!(stamps.len(), 12);
        assert!(stamps.windows(2).all(|w| w[0] > w[1]));
    }
}
