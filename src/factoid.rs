//! Interesting facts about a player, their raw magnitudes, calibrated scores
//! and one-line renderings.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::calibration;
use crate::elo::chance_to_win;

pub const LEAGUE_NAMES: [&str; 7] = [
    "Bronze",
    "Silver",
    "Gold",
    "Platinum",
    "Diamond",
    "Master",
    "Grandmaster",
];

// Probability cut points shared by mismatch scoring and rendering.
const UNDERDOG_CHANCE: f64 = 0.3;
const FAVOURITE_CHANCE: f64 = 0.7;

const STREAK_RAW_CAP: f64 = 135.0;
const VERY_LONG_GAME_MINS: u32 = 20;
const GAMES_FOR_MAX_INTEREST: f64 = 150.0;
const MANY_GAMES_WOW: u32 = 75;
const PRIMARY_RACE_STRONG_SHARE: f64 = 0.75;

/// Who a fact is about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PlayerIdentity {
    pub player_id: u64,
    pub battle_tag: String,
    pub player_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FactKind {
    MismatchedGame {
        won: bool,
        my_elo: i32,
        their_elo: i32,
    },
    LongGame {
        duration_secs: u32,
        won: bool,
    },
    LongStreak {
        streak: u32,
        won: bool,
    },
    EloHigh {
        elo: i32,
    },
    EloClimb {
        elo_start: i32,
        elo_end: i32,
    },
    Promote {
        league: u8,
    },
    SwitchRace {
        games_by_race: BTreeMap<String, u32>,
    },
    ManyGames {
        games_by_race: BTreeMap<String, u32>,
    },
}

/// One extracted fact. Never mutated after extraction; scores are derived.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Factoid {
    pub timestamp: DateTime<Utc>,
    pub player: PlayerIdentity,
    pub kind: FactKind,
}

impl FactKind {
    pub fn label(&self) -> &'static str {
        match self {
            FactKind::MismatchedGame { .. } => "mismatched_game",
            FactKind::LongGame { .. } => "long_game",
            FactKind::LongStreak { .. } => "long_streak",
            FactKind::EloHigh { .. } => "elo_high",
            FactKind::EloClimb { .. } => "elo_climb",
            FactKind::Promote { .. } => "promote",
            FactKind::SwitchRace { .. } => "switch_race",
            FactKind::ManyGames { .. } => "many_games",
        }
    }

    /// Inherent newsworthiness of the kind, in [0, 1].
    pub fn interest(&self) -> f64 {
        match self {
            FactKind::MismatchedGame { .. } => 0.8,
            FactKind::LongGame { .. } => 0.6,
            FactKind::LongStreak { .. } => 0.6,
            FactKind::EloHigh { .. } => 0.9,
            FactKind::EloClimb { .. } => 0.9,
            FactKind::Promote { .. } => 1.0,
            FactKind::SwitchRace { .. } => 0.7,
            FactKind::ManyGames { .. } => 0.6,
        }
    }

    /// Uncalibrated magnitude. Nominally 0..100, deliberately unclamped.
    pub fn raw_score(&self) -> f64 {
        match self {
            FactKind::MismatchedGame {
                won,
                my_elo,
                their_elo,
            } => mismatch_raw(*won, chance_to_win(*my_elo, *their_elo)),
            FactKind::LongGame { duration_secs, won } => {
                // 50 minutes = 100
                *duration_secs as f64 / 300.0 + if *won { 30.0 } else { 0.0 }
            }
            FactKind::LongStreak { streak, won } => {
                if *streak <= 1 {
                    return 0.0;
                }
                let bonus = if *won { 1.5 } else { 1.0 };
                (5.0 * 1.4_f64.powi(*streak as i32) * bonus).min(STREAK_RAW_CAP)
            }
            // 5000 elo = 100
            FactKind::EloHigh { elo } => *elo as f64 / 500.0,
            FactKind::EloClimb {
                elo_start,
                elo_end,
            } => {
                let delta = (i64::from(*elo_end) - i64::from(*elo_start)) as f64;
                (calibration::logistic(delta / 400.0) - 0.5).abs() * 300.0
            }
            FactKind::Promote { league } => {
                let top = (LEAGUE_NAMES.len() - 1) as f64;
                100.0 * (*league as f64 + 1.0) / top
            }
            FactKind::SwitchRace { games_by_race } => {
                let Some(share) = primary_share(games_by_race) else {
                    return 0.0;
                };
                calibration::peak(100.0 * (1.0 - share))
            }
            FactKind::ManyGames { games_by_race } => {
                let total = total_games(games_by_race) as f64;
                100.0 * (total / GAMES_FOR_MAX_INTEREST).clamp(0.0, 1.0)
            }
        }
    }
}

fn mismatch_raw(won: bool, chance: f64) -> f64 {
    if chance < 0.5 {
        // beating the odds; losing as the underdog is not news
        if !won {
            return 0.0;
        }
        let upset_bonus = if chance < UNDERDOG_CHANCE { 40.0 } else { 0.0 };
        (50.0 - 100.0 * chance).max(0.0) + upset_bonus
    } else if !won && chance > FAVOURITE_CHANCE {
        50.0 * chance
    } else {
        0.0
    }
}

pub fn total_games(games_by_race: &BTreeMap<String, u32>) -> u32 {
    games_by_race.values().sum()
}

/// Most played race and its game count. Ties go to the alphabetically first
/// race so the choice is stable.
pub fn primary_race(games_by_race: &BTreeMap<String, u32>) -> Option<(&str, u32)> {
    let mut best: Option<(&str, u32)> = None;
    for (race, games) in games_by_race {
        if best.is_none_or(|(_, top)| *games > top) {
            best = Some((race.as_str(), *games));
        }
    }
    best
}

fn primary_share(games_by_race: &BTreeMap<String, u32>) -> Option<f64> {
    let total = total_games(games_by_race);
    if total == 0 {
        return None;
    }
    let (_, games) = primary_race(games_by_race)?;
    Some(games as f64 / total as f64)
}

impl Factoid {
    pub fn interest(&self) -> f64 {
        self.kind.interest()
    }

    pub fn raw_score(&self) -> f64 {
        self.kind.raw_score()
    }

    pub fn impressiveness(&self) -> f64 {
        calibration::impressiveness(self.interest(), self.raw_score())
    }

    pub fn render(&self) -> String {
        self.kind.to_string()
    }
}

impl fmt::Display for FactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactKind::MismatchedGame {
                won,
                my_elo,
                their_elo,
            } => {
                let chance = chance_to_win(*my_elo, *their_elo);
                let pct = (100.0 * chance) as u32;
                let text = match (*won, chance) {
                    (true, c) if c < UNDERDOG_CHANCE => "Won against a much stronger opponent",
                    (true, c) if c > FAVOURITE_CHANCE => {
                        "Won against a much weaker opponent. Impressive."
                    }
                    (true, _) => "Won against an opponent of similar strength",
                    (false, c) if c < UNDERDOG_CHANCE => "Fought hard against a much stronger opponent",
                    (false, c) if c > FAVOURITE_CHANCE => {
                        "Bungled a game against a much weaker opponent. Unfortunate."
                    }
                    (false, _) => "Lost against an opponent of similar strength",
                };
                write!(f, "{text} (~{pct}% chance to win)")
            }
            FactKind::LongGame { duration_secs, won } => {
                let mins = duration_secs / 60;
                let very = if mins < VERY_LONG_GAME_MINS { "" } else { "very " };
                let verb = if *won { "Won" } else { "Lost" };
                write!(f, "{verb} a {very}long game ({mins} mins)")
            }
            FactKind::LongStreak { streak, won } => {
                let verb = if *won { "Won" } else { "Lost" };
                write!(f, "{verb} {streak} games in a row")
            }
            FactKind::EloHigh { elo } => write!(f, "Peaked at {elo} elo"),
            FactKind::EloClimb {
                elo_start,
                elo_end,
            } => {
                let diff = i64::from(*elo_end) - i64::from(*elo_start);
                if diff > 0 {
                    write!(
                        f,
                        "Climbed from {elo_start} to {elo_end} elo (+{diff} points)"
                    )
                } else if diff < 0 {
                    write!(
                        f,
                        "Dropped from {elo_start} to {elo_end} elo (-{} points)",
                        diff.abs()
                    )
                } else {
                    write!(f, "Held steady at {elo_end} elo")
                }
            }
            FactKind::Promote { league } => match LEAGUE_NAMES.get(*league as usize) {
                Some(name) => write!(f, "Promoted to {name} league"),
                None => write!(f, "Promoted to league {league}"),
            },
            FactKind::SwitchRace { games_by_race } => {
                let total = total_games(games_by_race);
                let Some((primary, primary_games)) = primary_race(games_by_race) else {
                    return write!(f, "Didn't play a single game");
                };
                if total == 0 {
                    return write!(f, "Didn't play a single game");
                }
                let offraces: Vec<String> = games_by_race
                    .iter()
                    .filter(|(race, games)| race.as_str() != primary && **games > 0)
                    .map(|(race, games)| {
                        let pct = 100 * games / total;
                        format!("{games} as {race} ({pct}%)")
                    })
                    .collect();
                if offraces.is_empty() {
                    return write!(f, "Played {primary_games} games as {primary}");
                }
                write!(f, "Played {}, normally {primary}", offraces.join(", "))
            }
            FactKind::ManyGames { games_by_race } => {
                let total = total_games(games_by_race);
                let Some((primary, primary_games)) = primary_race(games_by_race) else {
                    return write!(f, "Didn't play a single game");
                };
                if total == 0 {
                    return write!(f, "Didn't play a single game");
                }
                write!(f, "Played a total of {total} games")?;
                if primary_games as f64 / total as f64 > PRIMARY_RACE_STRONG_SHARE {
                    if primary_games == total {
                        write!(f, ", and all of them as {primary}")?;
                    } else {
                        write!(f, ", and {primary_games} of them as {primary}")?;
                    }
                }
                if total > MANY_GAMES_WOW {
                    write!(f, " (wow!)")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Factoid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

/// A fact with its impressiveness computed once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredFact {
    pub fact: Factoid,
    pub impressiveness: f64,
}

impl ScoredFact {
    pub fn new(fact: Factoid) -> Self {
        let impressiveness = fact.impressiveness();
        Self {
            fact,
            impressiveness,
        }
    }

    pub fn interest(&self) -> f64 {
        self.fact.interest()
    }

    pub fn player_id(&self) -> u64 {
        self.fact.player.player_id
    }
}

/// Ranking order: higher impressiveness first, ties broken by higher
/// interest.
pub fn rank_order(a: &ScoredFact, b: &ScoredFact) -> Ordering {
    b.impressiveness
        .total_cmp(&a.impressiveness)
        .then_with(|| b.interest().total_cmp(&a.interest()))
}

pub fn score_fact(fact: &Factoid) -> f64 {
    fact.impressiveness()
}

pub fn render_fact(fact: &Factoid) -> String {
    fact.render()
}
