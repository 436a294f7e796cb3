// Intent classification: send the raw query to the language-understanding
// service and pull out the top intent and the first entity (the player).

use crate::api::JsonSource;
use crate::config::Config;
use crate::error::QueryError;
use crate::stats::StatKey;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    FindBattingAverage,
    FindHomeRuns,
    /// Any other label, including the classifier's "None".
    Other(String),
}

impl Intent {
    pub fn from_label(label: &str) -> Self {
        match label {
            "FindBattingAverage" => Intent::FindBattingAverage,
            "FindHomeRuns" => Intent::FindHomeRuns,
            other => Intent::Other(other.to_string()),
        }
    }

    /// The statistic this intent asks for, if it is one we answer.
    pub fn stat_key(&self) -> Option<StatKey> {
        match self {
            Intent::FindBattingAverage => Some(StatKey::Avg),
            Intent::FindHomeRuns => Some(StatKey::Hr),
            Intent::Other(_) => None,
        }
    }
}

/// Top intent and player name extracted from a classifier response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentResult {
    pub intent: Intent,
    pub entity: String,
}

pub fn classification_url(config: &Config, text: &str) -> Result<Url, QueryError> {
    let mut url = Url::parse(&config.intent.endpoint)?;
    url.query_pairs_mut()
        .append_pair("verbose", if config.intent.verbose { "true" } else { "false" })
        .append_pair("timezoneOffset", &config.intent.timezone_offset.to_string())
        .append_pair("subscription-key", &config.intent.subscription_key)
        .append_pair("q", text);
    Ok(url)
}

/// Classify `text`. A failed request is treated as an empty response, so it
/// surfaces as a missing `topScoringIntent`.
pub fn classify<S: JsonSource + ?Sized>(
    source: &S,
    config: &Config,
    text: &str,
) -> Result<IntentResult, QueryError> {
    let url = classification_url(config, text)?;
    let doc = source.get_json(&url);

    let label = doc
        .get("topScoringIntent")
        .and_then(|t| t.get("intent"))
        .and_then(|i| i.as_str())
        .ok_or(QueryError::MissingField("topScoringIntent.intent"))?;

    let entity = doc
        .get("entities")
        .and_then(|e| e.get(0))
        .and_then(|e| e.get("entity"))
        .and_then(|e| e.as_str())
        .ok_or(QueryError::MissingField("entities[0].entity"))?;

    tracing::info!(intent = label, entity, "classified query");
    Ok(IntentResult {
        intent: Intent::from_label(label),
        entity: entity.to_string(),
    })
}
