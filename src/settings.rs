use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;

use crate::selection::SelectionParams;

const DEFAULT_PULSE_BASE_URL: &str = "https://sc2pulse.nephest.com/sc2/api";

/// Runtime settings, read from the environment (and `.env` files loaded by
/// the binary).
#[derive(Debug, Clone)]
pub struct Settings {
    pub guild_config_dir: PathBuf,
    pub hours_between_scans: u64,
    pub max_messages_scanned: usize,
    pub report_period: TimeDelta,
    pub pulse_base_url: String,
    pub request_interval: Duration,
    pub search_ttl: Duration,
    pub history_ttl: Duration,
    pub history_depth: u32,
    pub selection: SelectionParams,
    pub fetch_parallelism: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            guild_config_dir: PathBuf::from("server_configs"),
            hours_between_scans: 24,
            max_messages_scanned: 1000,
            report_period: TimeDelta::days(7),
            pulse_base_url: DEFAULT_PULSE_BASE_URL.to_string(),
            request_interval: Duration::from_millis(500),
            search_ttl: Duration::from_secs(3 * 24 * 60 * 60),
            history_ttl: Duration::from_secs(24 * 60 * 60),
            history_depth: 180,
            selection: SelectionParams::default(),
            fetch_parallelism: 6,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let d = Self::default();
        let guild_config_dir = env::var("GUILD_CONFIG_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(d.guild_config_dir);
        let pulse_base_url = env::var("PULSE_BASE_URL")
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(d.pulse_base_url);

        Self {
            guild_config_dir,
            hours_between_scans: env_or("HOURS_BETWEEN_SCANS", d.hours_between_scans).clamp(1, 168),
            max_messages_scanned: env_or("MAX_MESSAGES_SCANNED", d.max_messages_scanned)
                .clamp(1, 100_000),
            report_period: TimeDelta::days(env_or("REPORT_PERIOD_DAYS", 7i64).clamp(1, 365)),
            pulse_base_url,
            request_interval: Duration::from_millis(
                env_or("PULSE_REQUEST_INTERVAL_MS", 500u64).clamp(0, 60_000),
            ),
            search_ttl: Duration::from_secs(env_or("PULSE_SEARCH_TTL_SECS", d.search_ttl.as_secs())),
            history_ttl: Duration::from_secs(env_or(
                "PULSE_HISTORY_TTL_SECS",
                d.history_ttl.as_secs(),
            )),
            history_depth: env_or("PULSE_HISTORY_DEPTH", d.history_depth).clamp(1, 10_000),
            selection: SelectionParams {
                min_impressiveness: env_or("MIN_IMPRESSIVENESS", d.selection.min_impressiveness),
                penalty_decay: env_or("PENALTY_DECAY", d.selection.penalty_decay).clamp(0.0, 1.0),
                cap: env_or("REPORT_CAP", d.selection.cap).clamp(1, 50),
            },
            fetch_parallelism: env_or("FETCH_PARALLELISM", d.fetch_parallelism).clamp(2, 32),
        }
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.hours_between_scans * 60 * 60)
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|val| val.trim().parse::<T>().ok())
        .unwrap_or(default)
}
