pub mod aggregate;
pub mod calibration;
pub mod elo;
pub mod error;
pub mod factoid;
pub mod fake_provider;
pub mod guild_config;
pub mod history;
pub mod http_cache;
pub mod http_client;
pub mod match_events;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod report;
pub mod scanner;
pub mod selection;
pub mod settings;

pub use factoid::{FactKind, Factoid, PlayerIdentity, ScoredFact, render_fact, score_fact};
pub use orchestrator::extract_facts;
pub use selection::{Selection, SelectionParams, select_top_facts};
