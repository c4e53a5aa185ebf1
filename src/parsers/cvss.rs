//! CVSS vector parsing and score thresholds for vulnerability alerts.

use std::collections::HashMap;
use std::fmt;

/// Lowest base score that still produces an alert.
pub const MIN_BASE_SCORE: f64 = 7.0;

/// Scores at or above this are reported as critical.
pub const CRITICAL_BASE_SCORE: f64 = 9.0;

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityTier {
    Critical,
    High,
}

impl SeverityTier {
    pub fn from_score(base_score: f64) -> Self {
        if base_score >= CRITICAL_BASE_SCORE {
            SeverityTier::Critical
        } else {
            SeverityTier::High
        }
    }
}

impl fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeverityTier::Critical => write!(f, "CRITICAL"),
            SeverityTier::High => write!(f, "HIGH"),
        }
    }
}

/// Whether a base score clears the alert threshold. A missing score never does.
pub fn meets_threshold(base_score: Option<f64>) -> bool {
    matches!(base_score, Some(score) if score >= MIN_BASE_SCORE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackVector {
    Network,
    Adjacent,
    Local,
    Physical,
    Unknown,
}

impl AttackVector {
    fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("N") => AttackVector::Network,
            Some("A") => AttackVector::Adjacent,
            Some("L") => AttackVector::Local,
            Some("P") => AttackVector::Physical,
            _ => AttackVector::Unknown,
        }
    }
}

impl fmt::Display for AttackVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttackVector::Network => write!(f, "NETWORK"),
            AttackVector::Adjacent => write!(f, "ADJACENT"),
            AttackVector::Local => write!(f, "LOCAL"),
            AttackVector::Physical => write!(f, "PHYSICAL"),
            AttackVector::Unknown => write!(f, "{}", UNKNOWN),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivilegesRequired {
    None,
    Low,
    High,
    Unknown,
}

impl PrivilegesRequired {
    fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("N") => PrivilegesRequired::None,
            Some("L") => PrivilegesRequired::Low,
            Some("H") => PrivilegesRequired::High,
            _ => PrivilegesRequired::Unknown,
        }
    }
}

impl fmt::Display for PrivilegesRequired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrivilegesRequired::None => write!(f, "NONE"),
            PrivilegesRequired::Low => write!(f, "LOW"),
            PrivilegesRequired::High => write!(f, "HIGH"),
            PrivilegesRequired::Unknown => write!(f, "{}", UNKNOWN),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Complexity {
    Low,
    High,
    Unknown,
}

impl Complexity {
    fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("L") => Complexity::Low,
            Some("H") => Complexity::High,
            _ => Complexity::Unknown,
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Complexity::Low => write!(f, "LOW"),
            Complexity::High => write!(f, "HIGH"),
            Complexity::Unknown => write!(f, "{}", UNKNOWN),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExploitMaturity {
    NotDefined,
    Unproven,
    ProofOfConcept,
    Attacked,
    Unknown,
}

impl ExploitMaturity {
    fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("X") => ExploitMaturity::NotDefined,
            Some("U") => ExploitMaturity::Unproven,
            Some("P") => ExploitMaturity::ProofOfConcept,
            Some("A") => ExploitMaturity::Attacked,
            _ => ExploitMaturity::Unknown,
        }
    }
}

impl fmt::Display for ExploitMaturity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExploitMaturity::NotDefined => write!(f, "NOT_DEFINED"),
            ExploitMaturity::Unproven => write!(f, "UNPROVEN"),
            ExploitMaturity::ProofOfConcept => write!(f, "PROOF_OF_CONCEPT"),
            ExploitMaturity::Attacked => write!(f, "ATTACKED"),
            ExploitMaturity::Unknown => write!(f, "{}", UNKNOWN),
        }
    }
}

/// Confidentiality, integrity or availability impact on the vulnerable system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Impact {
    High,
    Low,
    None,
    Unknown,
}

impl Impact {
    fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("H") => Impact::High,
            Some("L") => Impact::Low,
            Some("N") => Impact::None,
            _ => Impact::Unknown,
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Impact::High => write!(f, "HIGH"),
            Impact::Low => write!(f, "LOW"),
            Impact::None => write!(f, "NONE"),
            Impact::Unknown => write!(f, "{}", UNKNOWN),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CvssReport {
    pub auth_required: PrivilegesRequired,
    pub attack_vector: AttackVector,
    pub complexity: Complexity,
    pub exploit_state: ExploitMaturity,
    pub confidentiality: Impact,
    pub integrity: Impact,
    pub availability: Impact,
}

/// Parse a `KEY:VALUE/KEY:VALUE/...` vector into labelled fields.
///
/// Segments without a colon are ignored. Anything unrecognised maps to the
/// `Unknown` variant of the matching field, so this never fails.
pub fn generate_report(vector_string: &str) -> CvssReport {
    let parts: HashMap<&str, &str> = vector_string
        .split('/')
        .filter(|part| part.contains(':'))
        .filter_map(|part| {
            let mut pieces = part.split(':');
            Some((pieces.next()?, pieces.next()?))
        })
        .collect();

    let code = |key: &str| parts.get(key).copied();

    CvssReport {
        auth_required: PrivilegesRequired::from_code(code("PR")),
        attack_vector: AttackVector::from_code(code("AV")),
        complexity: Complexity::from_code(code("AC")),
        exploit_state: ExploitMaturity::from_code(code("E")),
        confidentiality: Impact::from_code(code("VC")),
        integrity: Impact::from_code(code("VI")),
        availability: Impact::from_code(code("VA")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn full_v4_vector_maps_every_field() {
        let report = generate_report("CVSS:4.0/AV:N/AC:L/AT:N/PR:N/UI:N/VC:H/VI:L/VA:N/SC:N/SI:N/SA:N/E:P");
        assert_eq!(
            report,
            CvssReport {
                auth_required: PrivilegesRequired::None,
                attack_vector: AttackVector::Network,
                complexity: Complexity::Low,
                exploit_state: ExploitMaturity::ProofOfConcept,
                confidentiality: Impact::High,
                integrity: Impact::Low,
                availability: Impact::None,
            }
        );
    }

    #[test]
    fn labels_match_the_channel_vocabulary() {
        let report = generate_report("AV:P/PR:H/AC:H/E:X/VC:L/VI:N/VA:H");
        assert_eq!(report.attack_vector.to_string(), "PHYSICAL");
        assert_eq!(report.auth_required.to_string(), "HIGH");
        assert_eq!(report.complexity.to_string(), "HIGH");
        assert_eq!(report.exploit_state.to_string(), "NOT_DEFINED");
        assert_eq!(report.confidentiality.to_string(), "LOW");
        assert_eq!(report.integrity.to_string(), "NONE");
        assert_eq!(report.availability.to_string(), "HIGH");

        let report = generate_report("AV:A/E:U");
        assert_eq!(report.attack_vector.to_string(), "ADJACENT");
        assert_eq!(report.exploit_state.to_string(), "UNPROVEN");
        assert_eq!(generate_report("AV:L/E:A").exploit_state.to_string(), "ATTACKED");
        assert_eq!(generate_report("AV:L").attack_vector.to_string(), "LOCAL");
    }

    #[test]
    fn unknown_and_missing_codes_become_unknown() {
        let report = generate_report("AV:Z/PR:?/garbage//:/AC:");
        assert_eq!(report.attack_vector, AttackVector::Unknown);
        assert_eq!(report.auth_required, PrivilegesRequired::Unknown);
        assert_eq!(report.complexity, Complexity::Unknown);
        assert_eq!(report.exploit_state, ExploitMaturity::Unknown);
        assert_eq!(report.confidentiality.to_string(), "Unknown");

        let empty = generate_report("");
        assert_eq!(empty.integrity, Impact::Unknown);
        assert_eq!(empty.availability.to_string(), "Unknown");
    }

    #[test]
    fn v3_impact_keys_are_not_v4_keys() {
        let report = generate_report("CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H");
        assert_eq!(report.attack_vector, AttackVector::Network);
        assert_eq!(report.confidentiality, Impact::Unknown);
    }

    #[test]
    fn value_stops_at_second_colon() {
        assert_eq!(generate_report("AV:N:extra").attack_vector, AttackVector::Network);
    }

    #[test]
    fn threshold_keeps_exactly_seven() {
        assert!(meets_threshold(Some(7.0)));
        assert!(meets_threshold(Some(9.8)));
        assert!(!meets_threshold(Some(6.9)));
        assert!(!meets_threshold(Some(6.999)));
        assert!(!meets_threshold(None));
    }

    #[test]
    fn tier_splits_at_nine() {
        assert_eq!(SeverityTier::from_score(9.0), SeverityTier::Critical);
        assert_eq!(SeverityTier::from_score(8.9), SeverityTier::High);
        assert_eq!(SeverityTier::from_score(7.0).to_string(), "HIGH");
        assert_eq!(SeverityTier::Critical.to_string(), "CRITICAL");
    }
}
