use clap::Parser;

use crate::models::SourceKind;

/// Fetch one source, forward new items to its Telegram channel, record them as seen.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Source to run
    #[arg(value_enum)]
    pub source: SourceKind,

    /// Optional config file (TOML, YAML or JSON) layered under the environment
    #[arg(short, long, env = "NEWS_BOTS_CONFIG")]
    pub config: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_source_keys() {
        let cli = Cli::parse_from(["news-bots", "gate-ahram"]);
        assert_eq!(cli.source, SourceKind::GateAhram);

        let cli = Cli::parse_from(["news-bots", "real-madrid", "--config", "bots.toml"]);
        assert_eq!(cli.source, SourceKind::RealMadrid);
        assert_eq!(cli.config.as_deref(), Some("bots.toml"));
    }

    #[test]
    fn rejects_unknown_source() {
        assert!(Cli::try_parse_from(["news-bots", "bbc"]).is_err());
    }
}
