//! Conflict resolution strategies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ChainError;

/// Policy for picking one rule among several fireable ones.
///
/// `Refraction` selects the first fireable rule that has not fired yet. The
/// fireable set already excludes fired rules, so it always agrees with
/// `FirstRule`; both are kept so knowledge bases written for either keep
/// working.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictResolutionStrategy {
    /// First fireable rule in declaration order.
    #[serde(rename = "first")]
    FirstRule,
    /// Maximum priority; ties go to the earlier rule.
    #[default]
    #[serde(rename = "priority")]
    HighestPriority,
    /// First fireable rule not yet executed.
    #[serde(rename = "refraction")]
    Refraction,
    /// Uniformly random among the fireable set.
    #[serde(rename = "random")]
    Random,
    /// Fewest antecedents (most general); ties go to the earlier rule.
    #[serde(rename = "general")]
    LeastAntecedents,
}

impl ConflictResolutionStrategy {
    pub const ALL: [Self; 5] = [
        Self::FirstRule,
        Self::HighestPriority,
        Self::Refraction,
        Self::Random,
        Self::LeastAntecedents,
    ];

    /// Short name used in configuration and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstRule => "first",
            Self::HighestPriority => "priority",
            Self::Refraction => "refraction",
            Self::Random => "random",
            Self::LeastAntecedents => "general",
        }
    }
}

impl fmt::Display for ConflictResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictResolutionStrategy {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first" | "first_rule" | "first-rule" => Ok(Self::FirstRule),
            "priority" | "highest_priority" | "highest-priority" => Ok(Self::HighestPriority),
            "refraction" => Ok(Self::Refraction),
            "random" => Ok(Self::Random),
            "general" | "least_antecedents" | "least-antecedents" => Ok(Self::LeastAntecedents),
            other => Err(ChainError::UnknownStrategy {
                name: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_short_names() {
        for strategy in ConflictResolutionStrategy::ALL {
            let parsed: ConflictResolutionStrategy = strategy.as_str().parse().unwrap();
            assert_eq!(parsed, strategy);
        }
    }

    #[test]
    fn parse_accepts_long_names() {
        assert_eq!(
            "HIGHEST_PRIORITY".parse::<ConflictResolutionStrategy>().unwrap(),
            ConflictResolutionStrategy::HighestPriority
        );
        assert_eq!(
            "least-antecedents".parse::<ConflictResolutionStrategy>().unwrap(),
            ConflictResolutionStrategy::LeastAntecedents
        );
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "loudest".parse::<ConflictResolutionStrategy>().unwrap_err();
        assert!(matches!(err, ChainError::UnknownStrategy { name } if name == "loudest"));
    }

    #[test]
    fn default_is_highest_priority() {
        assert_eq!(
            ConflictResolutionStrategy::default(),
            ConflictResolutionStrategy::HighestPriority
        );
    }
}
