//! Orchestration domain entities: stage plans
//!
//! A [`StagePlan`] is the ordered list of [`StageSpec`]s a strategy runs.
//! Plans are pure data: which participants are invoked, how, and which
//! prompt template ([`StageKind`]) each stage uses.

use crate::core::participant::ParticipantId;
use crate::orchestration::strategy::Strategy;
use serde::{Deserialize, Serialize};

/// How the participants of one stage are invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// All participants concurrently, joined before the stage closes
    Parallel,
    /// One at a time, in list order
    Sequential,
    /// Exactly one participant
    Single,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Parallel => "parallel",
            ExecutionMode::Sequential => "sequential",
            ExecutionMode::Single => "single",
        }
    }

    /// Whether invocations within the stage run concurrently
    pub fn is_concurrent(&self) -> bool {
        matches!(self, ExecutionMode::Parallel)
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which prompt template a stage uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageKind {
    DebateOpening,
    DebateRebuttal,
    DebateClosing,
    MemoryContribute,
    MemoryRecall,
    MemoryConsolidate,
    ReportDraft,
    ReportGuidance,
    ReportRevision,
    /// One hop of the ring; `hop` is 1-based
    RelayHop { hop: usize },
    RelayVerification,
}

/// Specification of one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSpec {
    /// 1-based stage number
    pub number: usize,
    pub title: String,
    pub description: String,
    pub mode: ExecutionMode,
    /// Participants invoked in this stage, in invocation order
    pub participants: Vec<ParticipantId>,
    pub kind: StageKind,
}

impl StageSpec {
    fn new(
        number: usize,
        title: impl Into<String>,
        description: impl Into<String>,
        mode: ExecutionMode,
        participants: Vec<ParticipantId>,
        kind: StageKind,
    ) -> Self {
        Self {
            number,
            title: title.into(),
            description: description.into(),
            mode,
            participants,
            kind,
        }
    }
}

/// Ordered stage specifications for one request
#[derive(Debug, Clone, PartialEq)]
pub struct StagePlan {
    strategy: Strategy,
    stages: Vec<StageSpec>,
}

impl StagePlan {
    /// Build the plan for `strategy` over `participants` (non-empty, in request order).
    pub fn new(strategy: Strategy, participants: &[ParticipantId]) -> Self {
        let all = participants.to_vec();
        let stages = match strategy {
            Strategy::Debate => vec![
                StageSpec::new(
                    1,
                    "Opening Positions",
                    "Every participant answers the question independently.",
                    ExecutionMode::Parallel,
                    all.clone(),
                    StageKind::DebateOpening,
                ),
                StageSpec::new(
                    2,
                    "Rebuttals",
                    "Every participant responds to all opening positions.",
                    ExecutionMode::Parallel,
                    all.clone(),
                    StageKind::DebateRebuttal,
                ),
                StageSpec::new(
                    3,
                    "Closing Statements",
                    "Every participant gives a final position over the whole debate.",
                    ExecutionMode::Parallel,
                    all,
                    StageKind::DebateClosing,
                ),
            ],
            Strategy::Memory => vec![
                StageSpec::new(
                    1,
                    "Contribute to Shared Memory",
                    "Every participant writes its answer into the shared pool.",
                    ExecutionMode::Parallel,
                    all.clone(),
                    StageKind::MemoryContribute,
                ),
                StageSpec::new(
                    2,
                    "Recall and Extend",
                    "Every participant reads the shared pool and extends it.",
                    ExecutionMode::Parallel,
                    all.clone(),
                    StageKind::MemoryRecall,
                ),
                StageSpec::new(
                    3,
                    "Consolidate",
                    "Every participant consolidates the full shared pool.",
                    ExecutionMode::Parallel,
                    all,
                    StageKind::MemoryConsolidate,
                ),
            ],
            Strategy::Report => {
                let center = participants[..1].to_vec();
                let peripherals = if participants.len() > 1 {
                    participants[1..].to_vec()
                } else {
                    center.clone()
                };
                vec![
                    StageSpec::new(
                        1,
                        "Field Reports",
                        "Peripheral participants report their analysis to the center.",
                        ExecutionMode::Parallel,
                        peripherals.clone(),
                        StageKind::ReportDraft,
                    ),
                    StageSpec::new(
                        2,
                        "Center Guidance",
                        "The center participant reviews all reports and issues guidance.",
                        ExecutionMode::Single,
                        center,
                        StageKind::ReportGuidance,
                    ),
                    StageSpec::new(
                        3,
                        "Revised Reports",
                        "Peripheral participants revise their reports under the guidance.",
                        ExecutionMode::Parallel,
                        peripherals,
                        StageKind::ReportRevision,
                    ),
                ]
            }
            Strategy::Relay => {
                let mut stages: Vec<StageSpec> = participants
                    .iter()
                    .enumerate()
                    .map(|(i, participant)| {
                        let description = if i == 0 {
                            "Starts the relay from the question alone.".to_string()
                        } else {
                            format!(
                                "Builds only on the output of {}.",
                                participants[i - 1]
                            )
                        };
                        StageSpec::new(
                            i + 1,
                            format!("Relay {}: {}", i + 1, participant),
                            description,
                            ExecutionMode::Sequential,
                            vec![participant.clone()],
                            StageKind::RelayHop { hop: i + 1 },
                        )
                    })
                    .collect();
                stages.push(StageSpec::new(
                    participants.len() + 1,
                    "Verification",
                    "Every participant verifies the complete relay chain.",
                    ExecutionMode::Parallel,
                    all,
                    StageKind::RelayVerification,
                ));
                stages
            }
        };

        Self { strategy, stages }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Total participant invocations across all stages
    pub fn invocation_count(&self) -> usize {
        self.stages.iter().map(|s| s.participants.len()).sum()
    }
}
