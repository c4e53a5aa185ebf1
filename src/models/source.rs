use clap::ValueEnum;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum SourceKind {
    /// NIST National Vulnerability Database
    #[value(name = "nvd")]
    Nvd,
    /// Al-Ahram Gate urgent news
    #[value(name = "gate-ahram")]
    GateAhram,
    /// Diario AS, Real Madrid section
    #[value(name = "as")]
    As,
    /// Marca, Real Madrid section
    #[value(name = "marca")]
    Marca,
    /// realmadrid.com news
    #[value(name = "real-madrid")]
    RealMadrid,
}

impl SourceKind {
    pub const ALL: [SourceKind; 5] = [
        SourceKind::Nvd,
        SourceKind::GateAhram,
        SourceKind::As,
        SourceKind::Marca,
        SourceKind::RealMadrid,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            SourceKind::Nvd => "nvd",
            SourceKind::GateAhram => "gate-ahram",
            SourceKind::As => "as",
            SourceKind::Marca => "marca",
            SourceKind::RealMadrid => "real-madrid",
        }
    }

    /// Environment variable holding the bot token for this source's channel.
    pub fn token_variable(&self) -> &'static str {
        match self {
            SourceKind::Nvd => "TELEGRAM_TOKEN_CVE",
            SourceKind::GateAhram => "TELEGRAM_TOKEN_MASR_NEWS",
            SourceKind::As | SourceKind::Marca | SourceKind::RealMadrid => {
                "TELEGRAM_TOKEN_REAL_MADRID"
            }
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_match_cli_values() {
        for kind in SourceKind::ALL {
            let value = kind.to_possible_value().unwrap();
            assert_eq!(value.get_name(), kind.key());
            assert_eq!(kind.to_string(), kind.key());
        }
    }

    #[test]
    fn real_madrid_sources_share_a_token() {
        assert_eq!(SourceKind::As.token_variable(), SourceKind::Marca.token_variable());
        assert_eq!(SourceKind::Marca.token_variable(), SourceKind::RealMadrid.token_variable());
        assert_ne!(SourceKind::Nvd.token_variable(), SourceKind::GateAhram.token_variable());
    }
}
