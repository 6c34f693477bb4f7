//! Reasoning strategies
//!
//! Each strategy is a fixed communication topology that decides which
//! participants see which earlier outputs at every stage.

use crate::core::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The four fixed topologies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// Complete graph: everyone sees everyone's earlier responses.
    #[default]
    Debate,
    /// Bus: everyone reads from a shared, compacted pool of earlier responses.
    Memory,
    /// Star: peripherals report to the center, whose guidance flows back out.
    Report,
    /// Ring: each participant sees only its predecessor, then all verify.
    Relay,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Debate,
        Strategy::Memory,
        Strategy::Report,
        Strategy::Relay,
    ];

    /// Wire tag of the strategy
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Debate => "debate",
            Strategy::Memory => "memory",
            Strategy::Report => "report",
            Strategy::Relay => "relay",
        }
    }

    /// Name of the underlying topology
    pub fn topology(&self) -> &'static str {
        match self {
            Strategy::Debate => "complete-graph",
            Strategy::Memory => "bus",
            Strategy::Report => "star",
            Strategy::Relay => "ring",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Strategy::Debate => "Debate",
            Strategy::Memory => "Shared Memory",
            Strategy::Report => "Report",
            Strategy::Relay => "Relay",
        }
    }

    /// Number of stages this strategy runs for `participant_count` participants
    pub fn stage_count(&self, participant_count: usize) -> usize {
        match self {
            Strategy::Debate | Strategy::Memory | Strategy::Report => 3,
            Strategy::Relay => participant_count + 1,
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Strategy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debate" | "complete-graph" => Ok(Strategy::Debate),
            "memory" | "bus" => Ok(Strategy::Memory),
            "report" | "star" => Ok(Strategy::Report),
            "relay" | "ring" => Ok(Strategy::Relay),
            _ => Err(DomainError::UnknownStrategy(s.to_string())),
        }
    }
}

impl Serialize for Strategy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Strategy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
