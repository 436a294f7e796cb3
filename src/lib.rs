// Library root
// -----------
// The binary (`main.rs`) is a thin wrapper around these modules.
//
// Module responsibilities:
// - `api`: fetches JSON documents over HTTP (`JsonSource`, `HttpClient`).
// - `intent`: classifies a question into an intent and a player name.
// - `stats`: resolves player ids and hitting statistics.
// - `ui`: the query loop that ties the lookups together and prints answers.
// - `config` / `cli`: service endpoints and command-line flags.
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod intent;
pub mod stats;
pub mod ui;

pub use api::{HttpClient, JsonSource};
pub use config::Config;
pub use error::{ConfigError, FetchError, QueryError};
pub use stats::{Lookup, PlayerId, StatKey};
pub use ui::{Reply, Session};
