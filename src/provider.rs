use std::time::Duration;

use reqwest::blocking::{Client, Request};
use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::http_cache::{DEFAULT_MAX_ENTRIES, HttpCache, default_cache_path};
use crate::http_client::{RequestPacer, build_http_client};
use crate::model::{PlayerHistory, PlayerProfile};
use crate::settings::Settings;

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Source of player profiles and histories.
pub trait StatsProvider: Send + Sync {
    /// Best fuzzy match for `term`, or `None` when nothing matches.
    fn search_player(&self, term: &str) -> ProviderResult<Option<PlayerProfile>>;

    /// Rating history and recent matches, newest match first.
    fn player_history(&self, player_id: u64) -> ProviderResult<PlayerHistory>;
}

#[derive(Debug, Clone)]
pub struct PulseConfig {
    pub base_url: String,
    pub request_interval: Duration,
    pub search_ttl: Duration,
    pub history_ttl: Duration,
    pub history_depth: u32,
}

impl PulseConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            base_url: settings.pulse_base_url.clone(),
            request_interval: settings.request_interval,
            search_ttl: settings.search_ttl,
            history_ttl: settings.history_ttl,
            history_depth: settings.history_depth,
        }
    }
}

/// HTTP client for the ladder stats API, rate limited and cached.
pub struct PulseClient {
    client: Client,
    config: PulseConfig,
    pacer: RequestPacer,
    cache: HttpCache,
}

impl PulseClient {
    pub fn new(config: PulseConfig, cache: HttpCache) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_http_client()?,
            pacer: RequestPacer::new(config.request_interval),
            config,
            cache,
        })
    }

    /// Client with an on-disk cache in the user cache dir when one exists.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let cache = match default_cache_path() {
            Some(path) => HttpCache::persistent(path, DEFAULT_MAX_ENTRIES),
            None => HttpCache::in_memory(DEFAULT_MAX_ENTRIES),
        };
        Self::new(PulseConfig::from_settings(settings), cache)
    }

    fn search_request(&self, term: &str) -> ProviderResult<Request> {
        Ok(self
            .client
            .get(format!("{}/character/search", self.config.base_url))
            .query(&[("term", term)])
            .build()?)
    }

    fn history_request(&self, player_id: u64) -> ProviderResult<Request> {
        let depth = self.config.history_depth.to_string();
        Ok(self
            .client
            .get(format!("{}/character/{player_id}/common", self.config.base_url))
            .query(&[("matchType", ""), ("mmrHistoryDepth", depth.as_str())])
            .build()?)
    }

    /// Body for `request`, from the cache when fresh. The full URL is the
    /// cache key.
    fn fetch_cached(&self, request: Request, ttl: Duration) -> ProviderResult<String> {
        let url = request.url().as_str().to_string();
        if let Some(body) = self.cache.get(&url) {
            return Ok(body);
        }
        self.pacer.wait();
        debug!(url = url.as_str(), "provider request");
        let resp = self.client.execute(request)?;
        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }
        self.cache.insert(&url, body.clone(), ttl);
        Ok(body)
    }
}

impl StatsProvider for PulseClient {
    fn search_player(&self, term: &str) -> ProviderResult<Option<PlayerProfile>> {
        let request = self.search_request(term)?;
        let body = self.fetch_cached(request, self.config.search_ttl)?;
        let candidates = parse_search_json(&body)?;
        let best = best_match(term, candidates);
        if best.is_none() {
            warn!(term, "no player matched search");
        }
        Ok(best)
    }

    fn player_history(&self, player_id: u64) -> ProviderResult<PlayerHistory> {
        let request = self.history_request(player_id)?;
        let body = self.fetch_cached(request, self.config.history_ttl)?;
        parse_history_json(&body)
    }
}

pub fn parse_search_json(raw: &str) -> ProviderResult<Vec<PlayerProfile>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(trimmed)?)
}

pub fn parse_history_json(raw: &str) -> ProviderResult<PlayerHistory> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(PlayerHistory::default());
    }
    Ok(serde_json::from_str(trimmed)?)
}

/// How well one search result matches `term`: weighted similarity against
/// the character tag, the battle tag and the account tag.
pub fn search_score(term: &str, profile: &PlayerProfile) -> f64 {
    let members = &profile.members;
    let character = 0.65 * similarity(&members.character.tag, term);
    let battle_tag = 0.8 * similarity(&members.account.battle_tag, term);
    let account = 0.6 * similarity(&members.account.tag, term);
    character.max(battle_tag).max(account)
}

/// Highest scoring candidate; the earlier one wins a tie.
pub fn best_match(term: &str, candidates: Vec<PlayerProfile>) -> Option<PlayerProfile> {
    let mut best: Option<(f64, PlayerProfile)> = None;
    for candidate in candidates {
        let score = search_score(term, &candidate);
        if best.as_ref().is_none_or(|(top, _)| score > *top) {
            best = Some((score, candidate));
        }
    }
    best.map(|(_, profile)| profile)
}

/// Normalized indel similarity in [0, 1]: `(|a| + |b| - indel) / (|a| + |b|)`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    (total - indel_distance(&a, &b)) as f64 / total as f64
}

// Insertions and deletions only, so a substitution costs 2.
fn indel_distance(a: &[char], b: &[char]) -> usize {
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut row = vec![0usize; b.len() + 1];
    for i in 1..=a.len() {
        row[0] = i;
        for j in 1..=b.len() {
            row[j] = if a[i - 1] == b[j - 1] {
                prev[j - 1]
            } else {
                (prev[j] + 1).min(row[j - 1] + 1)
            };
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[b.len()]
}
