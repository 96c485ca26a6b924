use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::factoid::PlayerIdentity;

/// Queue id of the ranked 1v1 ladder.
pub const QUEUE_1V1: u32 = 201;
pub const MATCH_TYPE_1V1: &str = "_1V1";

/// Parse a provider timestamp. Anything unreadable becomes the minimum date,
/// which every cutoff then filters out.
pub fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return naive.and_utc();
        }
    }
    DateTime::<Utc>::MIN_UTC
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub members: ProfileMembers,
    #[serde(default)]
    pub current_stats: Option<RatingStats>,
    #[serde(default)]
    pub previous_stats: Option<RatingStats>,
    #[serde(default)]
    pub rating_max: Option<i32>,
    #[serde(default)]
    pub league_max: Option<u8>,
    #[serde(default)]
    pub total_games_played: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileMembers {
    pub character: Character,
    #[serde(default)]
    pub account: Account,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Character {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tag: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(default)]
    pub battle_tag: String,
    #[serde(default)]
    pub tag: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingStats {
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub games_played: Option<u32>,
}

impl PlayerProfile {
    pub fn identity(&self) -> PlayerIdentity {
        let name = &self.members.character.name;
        // character names look like "Name#123"
        let player_name = name.split_once('#').map_or(name.as_str(), |(n, _)| n);
        PlayerIdentity {
            player_id: self.members.character.id,
            battle_tag: self.members.account.battle_tag.clone(),
            player_name: player_name.to_string(),
        }
    }

    pub fn current_rating(&self) -> Option<i32> {
        self.current_stats.as_ref().and_then(|s| s.rating)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerHistory {
    #[serde(default)]
    pub history: Option<ColumnarHistory>,
    #[serde(default)]
    pub matches: Option<Vec<MatchRecord>>,
}

impl PlayerHistory {
    pub fn columns(&self) -> ColumnarHistory {
        self.history.clone().unwrap_or_default()
    }

    pub fn matches(&self) -> &[MatchRecord] {
        self.matches.as_deref().unwrap_or_default()
    }
}

/// Rating history as parallel, same-keyed arrays. Columns may have uneven
/// lengths; missing trailing values read as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnarHistory {
    #[serde(default)]
    pub date_time: Vec<Option<String>>,
    #[serde(default)]
    pub race: Vec<Option<String>>,
    #[serde(default)]
    pub queue_type: Vec<Option<u32>>,
    #[serde(default)]
    pub league_type: Vec<Option<u8>>,
    #[serde(default)]
    pub rating: Vec<Option<i32>>,
    #[serde(default)]
    pub games: Vec<Option<u32>>,
    #[serde(default)]
    pub wins: Vec<Option<u32>>,
    #[serde(default)]
    pub season: Vec<Option<u32>>,
    #[serde(default)]
    pub tier: Vec<Option<u8>>,
    #[serde(default)]
    pub league_rank: Vec<Option<u64>>,
    #[serde(default)]
    pub region_rank: Vec<Option<u64>>,
    #[serde(default)]
    pub global_rank: Vec<Option<u64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(rename = "match")]
    pub info: MatchInfo,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub participants: Vec<MatchParticipant>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchInfo {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub date: String,
    #[serde(rename = "type", default)]
    pub match_type: String,
    #[serde(default)]
    pub duration: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchParticipant {
    pub participant: ParticipantResult,
    #[serde(default)]
    pub team: Option<MatchTeam>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantResult {
    #[serde(default)]
    pub player_character_id: Option<u64>,
    #[serde(default)]
    pub decision: String,
    #[serde(default)]
    pub rating_change: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchTeam {
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub league: Option<TeamLeague>,
    #[serde(default)]
    pub league_type: Option<u8>,
    #[serde(default)]
    pub members: Option<Vec<TeamMember>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamLeague {
    #[serde(rename = "type", default)]
    pub league_type: Option<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamMember {
    #[serde(default)]
    pub character: Option<Character>,
}

impl MatchRecord {
    pub fn timestamp(&self) -> DateTime<Utc> {
        parse_timestamp(&self.info.date)
    }

    pub fn duration_secs(&self) -> Option<u32> {
        self.info.duration.or(self.duration)
    }
}

impl MatchParticipant {
    pub fn won(&self) -> bool {
        self.participant.decision.eq_ignore_ascii_case("WIN")
    }

    /// Team members, or `None` when the provider did not resolve the team.
    pub fn members(&self) -> Option<&[TeamMember]> {
        self.team.as_ref()?.members.as_deref()
    }

    pub fn has_character(&self, character_id: u64) -> bool {
        self.members().is_some_and(|members| {
            members
                .iter()
                .any(|m| m.character.as_ref().is_some_and(|c| c.id == character_id))
        })
    }

    pub fn team_rating(&self) -> Option<i32> {
        self.team.as_ref()?.rating
    }

    pub fn league_type(&self) -> Option<u8> {
        let team = self.team.as_ref()?;
        team.league
            .as_ref()
            .and_then(|l| l.league_type)
            .or(team.league_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_accept_offsets_and_naive_forms() {
        let a = parse_timestamp("2024-03-01T10:00:00Z");
        let b = parse_timestamp("2024-03-01T12:00:00+02:00");
        let c = parse_timestamp("2024-03-01T10:00:00.000");
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn garbage_timestamp_is_minimum_date() {
        assert_eq!(parse_timestamp("not a date"), DateTime::<Utc>::MIN_UTC);
        assert_eq!(parse_timestamp(""), DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn identity_strips_character_discriminator() {
        let raw = r#"{"members":{"character":{"id":7,"name":"Pop#245","tag":"Pop"},
            "account":{"battleTag":"Pop101#1282","tag":"Pop101"}},
            "currentStats":{"rating":3190}}"#;
        let profile: PlayerProfile = serde_json::from_str(raw).unwrap();
        let id = profile.identity();
        assert_eq!(id.player_id, 7);
        assert_eq!(id.player_name, "Pop");
        assert_eq!(id.battle_tag, "Pop101#1282");
        assert_eq!(profile.current_rating(), Some(3190));
    }
}
