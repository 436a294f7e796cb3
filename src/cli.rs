use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "diamond-query",
    version,
    about = "Ask plain-English questions about MLB hitters"
)]
pub struct Cli {
    /// Answer this question and exit instead of starting the prompt
    pub query: Option<String>,

    /// Path to the config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Season to report on (overrides the config file)
    #[arg(long)]
    pub season: Option<String>,

    /// Request timeout in seconds (default: wait indefinitely)
    #[arg(short = 't', long)]
    pub timeout: Option<u64>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write the default config file and exit
    #[arg(long)]
    pub init_config: bool,
}

impl Cli {
    /// Log filter used when `RUST_LOG` is not set.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::Config::default_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_query_and_flags() {
        let cli = Cli::try_parse_from([
            "diamond-query",
            "--season",
            "2016",
            "-vv",
            "how many home runs does mike trout have",
        ])
        .unwrap();
        assert_eq!(cli.query.as_deref(), Some("how many home runs does mike trout have"));
        assert_eq!(cli.season.as_deref(), Some("2016"));
        assert_eq!(cli.log_level(), "debug");
        assert!(!cli.init_config);
    }

    #[test]
    fn defaults_to_interactive_warn_level() {
        let cli = Cli::try_parse_from(["diamond-query"]).unwrap();
        assert!(cli.query.is_none());
        assert!(cli.timeout.is_none());
        assert_eq!(cli.log_level(), "warn");
    }
}
