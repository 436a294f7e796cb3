// UI layer: the interactive query loop. Each iteration reads one question,
// classifies it, resolves the player and the statistic, and prints a single
// line. Faults are printed and the loop carries on.

use crate::api::JsonSource;
use crate::config::Config;
use crate::error::QueryError;
use crate::intent::classify;
use crate::stats::{resolve_player, resolve_statistic, Lookup, StatKey};
use anyhow::{Context, Result};
use crossterm::style::Stylize;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::io::{self, BufRead, Write};
use std::time::Duration;

pub const NOT_FOUND_MESSAGE: &str = "Couldn't find that player. Please try again.";
pub const NOT_UNDERSTOOD_MESSAGE: &str =
    "\tCouldn't understand your query, to exit type 'quit' or press CTRL+C.";

/// Where queries come from.
pub trait QuerySource {
    /// The next line of input, or `None` once the operator is done.
    fn next_query(&mut self) -> Result<Option<String>>;
}

/// Interactive prompt backed by `dialoguer`. Ctrl+C at the prompt ends the
/// session instead of killing the process.
pub struct DialoguerPrompt;

impl QuerySource for DialoguerPrompt {
    fn next_query(&mut self) -> Result<Option<String>> {
        println!();
        let res: io::Result<String> = Input::new()
            .with_prompt("Please enter your query")
            .allow_empty(true)
            .interact_text();
        match res {
            Ok(line) => {
                println!();
                Ok(Some(line))
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(e).context("Failed to read query"),
        }
    }
}

/// Reads one query per line, e.g. from piped stdin.
pub struct LineSource<R> {
    reader: R,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        LineSource { reader }
    }
}

impl<R: BufRead> QuerySource for LineSource<R> {
    fn next_query(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).context("Failed to read query")?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// What one query produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Answer {
        player: String,
        stat: StatKey,
        value: String,
    },
    PlayerNotFound,
    NotUnderstood,
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Answer { player, stat: StatKey::Avg, value } => {
                write!(f, "\t{} is batting {}", player, value)
            }
            Reply::Answer { player, stat: StatKey::Hr, value } => {
                write!(f, "\t{} has {} home runs", player, value)
            }
            Reply::PlayerNotFound => f.write_str(NOT_FOUND_MESSAGE),
            Reply::NotUnderstood => f.write_str(NOT_UNDERSTOOD_MESSAGE),
        }
    }
}

/// Words that end the session when typed at the prompt.
pub fn is_exit_command(input: &str) -> bool {
    matches!(input.trim().to_ascii_lowercase().as_str(), "quit" | "exit")
}

/// A query session: upstream source, configuration and output sink.
pub struct Session<S, W> {
    source: S,
    config: Config,
    out: W,
    spinner: bool,
    color: bool,
}

impl<S: JsonSource, W: Write> Session<S, W> {
    pub fn new(source: S, config: Config, out: W) -> Self {
        Session {
            source,
            config,
            out,
            spinner: false,
            color: false,
        }
    }

    /// Show a spinner on stderr while lookups run.
    pub fn with_spinner(mut self, enabled: bool) -> Self {
        self.spinner = enabled;
        self
    }

    pub fn with_color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Answer a single query without printing anything.
    pub fn handle_query(&self, text: &str) -> Result<Reply, QueryError> {
        let parsed = classify(&self.source, &self.config, text)?;

        // The player is resolved before the intent is checked, so an
        // unknown player wins over an unrecognised intent.
        let id = match resolve_player(&self.source, &self.config, &parsed.entity) {
            Lookup::Found(id) => id,
            Lookup::NotFound => return Ok(Reply::PlayerNotFound),
            Lookup::UpstreamError(e) => {
                tracing::warn!(player = %parsed.entity, error = %e, "treating player as not found");
                return Ok(Reply::PlayerNotFound);
            }
        };

        let Some(stat) = parsed.intent.stat_key() else {
            tracing::debug!(intent = ?parsed.intent, "unrecognised intent");
            return Ok(Reply::NotUnderstood);
        };

        let value = resolve_statistic(&self.source, &self.config, &id, stat);
        Ok(Reply::Answer {
            player: parsed.entity,
            stat,
            value: value.or_sentinel().to_string(),
        })
    }

    /// Answer `text` and print the reply, or the fault if one occurred.
    pub fn answer(&mut self, text: &str) -> Result<()> {
        let pb = self.start_spinner();
        let result = self.handle_query(text);
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        match result {
            Ok(reply) => writeln!(self.out, "{}", reply)?,
            Err(e) => {
                tracing::debug!(error = %e, "query failed");
                let line = format!("error: {}", e);
                if self.color {
                    writeln!(self.out, "{}", line.as_str().red())?;
                } else {
                    writeln!(self.out, "{}", line)?;
                }
            }
        }
        self.out.flush()?;
        Ok(())
    }

    /// Loop until the input runs out or an exit command is entered.
    pub fn run(&mut self, input: &mut dyn QuerySource) -> Result<()> {
        while let Some(line) = input.next_query()? {
            let query = line.trim();
            if query.is_empty() {
                continue;
            }
            if is_exit_command(query) {
                break;
            }
            self.answer(query)?;
        }
        tracing::info!("session ended");
        Ok(())
    }

    pub fn print_banner(&mut self) -> Result<()> {
        let title = format!("diamond-query {}", env!("CARGO_PKG_VERSION"));
        let hint = format!(
            "Ask about a player's {} batting average or home runs. Type 'quit' to exit.",
            self.config.stats.season
        );
        if self.color {
            writeln!(self.out, "{}", title.as_str().bold())?;
            writeln!(self.out, "{}", hint.as_str().dim())?;
        } else {
            writeln!(self.out, "{}", title)?;
            writeln!(self.out, "{}", hint)?;
        }
        Ok(())
    }

    fn start_spinner(&self) -> Option<ProgressBar> {
        if !self.spinner {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            pb.set_style(style);
        }
        pb.set_message("Looking it up...");
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn exit_commands() {
        assert!(is_exit_command("quit"));
        assert!(is_exit_command("  EXIT "));
        assert!(!is_exit_command("quit now"));
    }

    #[test]
    fn replies_render_like_the_prompt_expects() {
        let hr = Reply::Answer {
            player: "mike trout".into(),
            stat: StatKey::Hr,
            value: "33".into(),
        };
        assert_eq!(hr.to_string(), "\tmike trout has 33 home runs");

        let avg = Reply::Answer {
            player: "jose altuve".into(),
            stat: StatKey::Avg,
            value: ".346".into(),
        };
        assert_eq!(avg.to_string(), "\tjose altuve is batting .346");

        assert_eq!(Reply::PlayerNotFound.to_string(), NOT_FOUND_MESSAGE);
        assert!(Reply::NotUnderstood.to_string().starts_with("\tCouldn't understand"));
    }

    #[test]
    fn line_source_strips_newlines_and_stops_at_eof() {
        let mut src = LineSource::new(Cursor::new("first\r\nsecond\n"));
        assert_eq!(src.next_query().unwrap().as_deref(), Some("first"));
        assert_eq!(src.next_query().unwrap().as_deref(), Some("second"));
        assert_eq!(src.next_query().unwrap(), None);
    }
}
