// Resolvers against the stats lookup service: player name -> player id,
// and player id + statistic key -> statistic value.

use crate::api::JsonSource;
use crate::config::Config;
use crate::error::ConfigError;
use serde_json::Value;
use std::fmt;
use url::Url;

const PLAYER_SEARCH_PATH: &str = "json/named.search_player_all.bam";
const HITTING_STATS_PATH: &str = "json/named.sport_hitting_tm.bam";

/// Placeholder printed where a value could not be resolved.
pub const SENTINEL: &str = "0";

/// Outcome of a lookup against an upstream service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    /// The service answered but the expected field was absent.
    NotFound,
    /// The request itself failed or the body was not JSON.
    UpstreamError(String),
}

impl<T: AsRef<str>> Lookup<T> {
    /// The found value, or `"0"` for both failure variants. This is what the
    /// operator sees; a genuine zero statistic prints the same way.
    pub fn or_sentinel(&self) -> &str {
        match self {
            Lookup::Found(v) => v.as_ref(),
            Lookup::NotFound | Lookup::UpstreamError(_) => SENTINEL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerId(pub String);

impl AsRef<str> for PlayerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hitting statistics the dispatcher knows how to ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKey {
    Avg,
    Hr,
}

impl StatKey {
    /// Field name in the hitting-statistics row.
    pub fn as_str(self) -> &'static str {
        match self {
            StatKey::Avg => "avg",
            StatKey::Hr => "hr",
        }
    }
}

pub fn player_search_url(config: &Config, name: &str) -> Result<Url, ConfigError> {
    let mut url = join(config, PLAYER_SEARCH_PATH)?;
    url.query_pairs_mut()
        .append_pair("sport_code", &quoted(&config.stats.sport_code))
        .append_pair("active_sw", if config.stats.active_only { "'Y'" } else { "'N'" })
        .append_pair("name_part", &quoted(name));
    Ok(url)
}

pub fn hitting_stats_url(config: &Config, id: &PlayerId) -> Result<Url, ConfigError> {
    let mut url = join(config, HITTING_STATS_PATH)?;
    url.query_pairs_mut()
        .append_pair("league_list_id", &quoted(&config.stats.league))
        .append_pair("game_type", &quoted(&config.stats.game_type))
        .append_pair("season", &quoted(&config.stats.season))
        .append_pair("player_id", &id.0);
    Ok(url)
}

/// Look up the id of the player called `name`. A search matching several
/// players returns a list of rows and is treated as not found, as is an id
/// of `"0"`.
pub fn resolve_player<S: JsonSource + ?Sized>(
    source: &S,
    config: &Config,
    name: &str,
) -> Lookup<PlayerId> {
    let url = match player_search_url(config, name) {
        Ok(url) => url,
        Err(e) => return Lookup::UpstreamError(e.to_string()),
    };

    let doc = match source.fetch_json(&url) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(player = name, error = %e, "player search failed");
            return Lookup::UpstreamError(e.to_string());
        }
    };

    let row = &doc["search_player_all"]["queryResults"]["row"];
    if let Value::Array(rows) = row {
        tracing::debug!(player = name, matches = rows.len(), "ambiguous player search");
        return Lookup::NotFound;
    }

    match scalar_string(&row["player_id"]) {
        Some(id) if id == SENTINEL => {
            tracing::debug!(player = name, "search returned the placeholder id");
            Lookup::NotFound
        }
        Some(id) => {
            tracing::info!(player = name, player_id = %id, "resolved player");
            Lookup::Found(PlayerId(id))
        }
        None => {
            tracing::debug!(player = name, "player_id missing from search result");
            Lookup::NotFound
        }
    }
}

/// Look up one hitting statistic for the configured season and league.
pub fn resolve_statistic<S: JsonSource + ?Sized>(
    source: &S,
    config: &Config,
    id: &PlayerId,
    key: StatKey,
) -> Lookup<String> {
    let url = match hitting_stats_url(config, id) {
        Ok(url) => url,
        Err(e) => return Lookup::UpstreamError(e.to_string()),
    };

    let doc = match source.fetch_json(&url) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(player_id = %id, stat = key.as_str(), error = %e, "stat lookup failed");
            return Lookup::UpstreamError(e.to_string());
        }
    };

    match scalar_string(&doc["sport_hitting_tm"]["queryResults"]["row"][key.as_str()]) {
        Some(value) => Lookup::Found(value),
        None => {
            tracing::debug!(player_id = %id, stat = key.as_str(), "stat missing from result");
            Lookup::NotFound
        }
    }
}

fn join(config: &Config, path: &str) -> Result<Url, ConfigError> {
    let base = config.stats_base()?;
    base.join(path).map_err(|source| ConfigError::InvalidUrl {
        field: "stats.base_url",
        source,
    })
}

fn quoted(value: &str) -> String {
    format!("'{}'", value)
}

// The service sends numbers as strings; bare numbers are accepted too.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
