use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-guild settings and the battle tag -> chat user table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildConfig {
    #[serde(default)]
    pub weekly_channel: Option<u64>,
    #[serde(default)]
    pub scan_channel: Option<u64>,
    // never-posted guilds omit the field
    #[serde(default = "min_date", skip_serializing_if = "is_min_date")]
    pub last_weekly_post: DateTime<Utc>,
    #[serde(default)]
    pub bnet_accounts: BTreeMap<String, u64>,
}

fn min_date() -> DateTime<Utc> {
    DateTime::<Utc>::MIN_UTC
}

fn is_min_date(date: &DateTime<Utc>) -> bool {
    *date == DateTime::<Utc>::MIN_UTC
}

impl Default for GuildConfig {
    fn default() -> Self {
        Self {
            weekly_channel: None,
            scan_channel: None,
            last_weekly_post: min_date(),
            bnet_accounts: BTreeMap::new(),
        }
    }
}

/// One JSON file per guild under a directory.
#[derive(Debug, Clone)]
pub struct GuildStore {
    dir: PathBuf,
}

impl GuildStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, guild_id: u64) -> PathBuf {
        self.dir.join(format!("{guild_id}.json"))
    }

    /// Stored config, or the default when the guild has none yet.
    pub fn load(&self, guild_id: u64) -> Result<GuildConfig> {
        let path = self.path_for(guild_id);
        if !path.exists() {
            return Ok(GuildConfig::default());
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("read guild config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("invalid guild config {}", path.display()))
    }

    pub fn save(&self, guild_id: u64, config: &GuildConfig) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create {}", self.dir.display()))?;
        let path = self.path_for(guild_id);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(config).context("serialize guild config")?;
        fs::write(&tmp, json).context("write guild config")?;
        fs::rename(&tmp, &path).context("swap guild config")?;
        Ok(())
    }

    /// Guild ids with a stored config, ascending.
    pub fn list(&self) -> Result<Vec<u64>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err).with_context(|| format!("list {}", self.dir.display()));
            }
        };
        let mut ids = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".json")) else {
                continue;
            };
            if let Ok(id) = stem.parse::<u64>() {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: GuildConfig = serde_json::from_str(r#"{"weekly_channel": 5}"#).unwrap();
        assert_eq!(cfg.weekly_channel, Some(5));
        assert_eq!(cfg.last_weekly_post, DateTime::<Utc>::MIN_UTC);
        assert!(cfg.bnet_accounts.is_empty());
    }
}
