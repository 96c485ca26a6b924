use std::fs;
use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result};
use chrono::{TimeDelta, Utc};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ladder_digest::factoid::rank_order;
use ladder_digest::fake_provider::FakeProvider;
use ladder_digest::guild_config::GuildStore;
use ladder_digest::orchestrator::{player_facts, run_guild_report, scan_guild, score_facts};
use ladder_digest::provider::{PulseClient, StatsProvider};
use ladder_digest::scanner::parse_message_export;
use ladder_digest::settings::Settings;

#[derive(Parser)]
#[command(name = "ladder_digest", about = "Weekly ladder highlights for a community")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every scored fact for one player
    Facts {
        term: String,
        #[arg(long, default_value_t = 7)]
        days: i64,
        #[arg(long)]
        fake: bool,
        /// Print the scored facts as JSON
        #[arg(long)]
        json: bool,
    },
    /// Build one guild's report and print it
    Report {
        guild_id: u64,
        #[arg(long)]
        force: bool,
        #[arg(long)]
        fake: bool,
    },
    /// Harvest battle tags from a message export (`<author_id>\t<text>` per line)
    Scan { guild_id: u64, file: PathBuf },
    /// Set the report and/or scan channel of a guild
    SetChannel {
        guild_id: u64,
        #[arg(long)]
        weekly: Option<u64>,
        #[arg(long)]
        scan: Option<u64>,
    },
    /// Report every stored guild on a fixed interval
    Run {
        #[arg(long)]
        fake: bool,
        #[arg(long)]
        once: bool,
    },
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_logging();

    let cli = Cli::parse();
    let settings = Settings::from_env();
    let store = GuildStore::new(settings.guild_config_dir.clone());

    match cli.command {
        Commands::Facts {
            term,
            days,
            fake,
            json,
        } => {
            let provider = build_provider(&settings, fake)?;
            let cutoff = Utc::now() - TimeDelta::days(days.max(0));
            let facts = player_facts(provider.as_ref(), &term, cutoff)
                .with_context(|| format!("no data for {term}"))?;
            let mut scored = score_facts(facts);
            scored.sort_by(rank_order);
            if json {
                println!("{}", serde_json::to_string_pretty(&scored)?);
                return Ok(());
            }
            for (i, fact) in scored.iter().enumerate() {
                println!("event {i}: {}", fact.fact);
                println!(
                    "  kind={} score={:.2} raw={:.2}",
                    fact.fact.kind.label(),
                    fact.impressiveness,
                    fact.fact.raw_score()
                );
            }
        }
        Commands::Report {
            guild_id,
            force,
            fake,
        } => {
            let provider = build_provider(&settings, fake)?;
            match run_guild_report(provider.as_ref(), &store, guild_id, Utc::now(), &settings, force)? {
                Some(report) => {
                    println!("[channel {}]", report.channel_id);
                    print!("{}", report.message);
                }
                None => println!("No report for guild {guild_id}"),
            }
        }
        Commands::Scan { guild_id, file } => {
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("read {}", file.display()))?;
            let messages = parse_message_export(&raw);
            let found = scan_guild(&store, guild_id, &messages, settings.max_messages_scanned)?;
            println!("Found {found} BattleNet accounts in guild {guild_id}");
        }
        Commands::SetChannel {
            guild_id,
            weekly,
            scan,
        } => {
            let mut config = store.load(guild_id)?;
            if weekly.is_some() {
                config.weekly_channel = weekly;
            }
            if scan.is_some() {
                config.scan_channel = scan;
            }
            store.save(guild_id, &config)?;
            println!(
                "Guild {guild_id}: weekly={:?} scan={:?}",
                config.weekly_channel, config.scan_channel
            );
        }
        Commands::Run { fake, once } => {
            let provider = build_provider(&settings, fake)?;
            loop {
                run_all_guilds(provider.as_ref(), &store, &settings);
                if once {
                    break;
                }
                thread::sleep(settings.scan_interval());
            }
        }
    }

    Ok(())
}

fn run_all_guilds(provider: &dyn StatsProvider, store: &GuildStore, settings: &Settings) {
    let guilds = match store.list() {
        Ok(guilds) => guilds,
        Err(err) => {
            error!(error = %err, "unable to list guild configs");
            return;
        }
    };
    for guild_id in guilds {
        match run_guild_report(provider, store, guild_id, Utc::now(), settings, false) {
            Ok(Some(report)) => {
                info!(guild_id, channel = report.channel_id, "posting weekly report");
                print!("{}", report.message);
            }
            Ok(None) => {}
            Err(err) => error!(guild_id, error = %err, "weekly report failed"),
        }
    }
}

fn build_provider(settings: &Settings, fake: bool) -> Result<Box<dyn StatsProvider>> {
    if fake {
        return Ok(Box::new(FakeProvider::new(Utc::now())));
    }
    Ok(Box::new(PulseClient::from_settings(settings)?))
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ladder_digest=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
