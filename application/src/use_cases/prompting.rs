//! Stage prompt construction
//!
//! [`StagePrompter`] decides which closed earlier responses a stage may
//! see, tags them with their author's persona, bounds them with the
//! [`CompactionPolicy`], and hands them to the matching [`PromptTemplate`].
//! Failed responses are never embedded; the prompt names the silent
//! participant instead.

use crate::ports::persona::PersonaDecorator;
use council_domain::{
    CompactionPolicy, ParticipantId, ParticipantResponse, PromptTemplate, ReasoningRequest,
    Stage, StageKind, StageSpec,
};

/// Builds the prompt of every invocation of one request
pub struct StagePrompter<'a> {
    request: &'a ReasoningRequest,
    compaction: &'a CompactionPolicy,
    persona: &'a dyn PersonaDecorator,
}

impl<'a> StagePrompter<'a> {
    pub fn new(
        request: &'a ReasoningRequest,
        compaction: &'a CompactionPolicy,
        persona: &'a dyn PersonaDecorator,
    ) -> Self {
        Self {
            request,
            compaction,
            persona,
        }
    }

    /// Prompt for `participant` in `spec`, given every stage closed so far
    pub fn prompt_for(&self, spec: &StageSpec, participant: &ParticipantId, prior: &[Stage]) -> String {
        let question = self.request.question().content();

        match spec.kind {
            StageKind::DebateOpening | StageKind::MemoryContribute => {
                PromptTemplate::opening(question)
            }
            StageKind::DebateRebuttal => {
                let openings = stage(prior, 1);
                let own = openings
                    .and_then(|s| s.response_for(participant))
                    .filter(|r| r.success)
                    .map(|r| self.single(participant, &r.content));
                let others: Vec<&Stage> = openings.into_iter().collect();
                let (peers, silent) = self.pool(&others, |id| id != participant.as_str());
                PromptTemplate::debate_rebuttal(question, own.as_deref(), &peers, &silent)
            }
            StageKind::DebateClosing => {
                let (transcript, silent) = self.labelled_pool(&stages(prior, &[1, 2]));
                PromptTemplate::debate_closing(question, &transcript, &silent)
            }
            StageKind::MemoryRecall => {
                let (pool, _) = self.pool(&stages(prior, &[1]), |_| true);
                PromptTemplate::memory_recall(question, &pool)
            }
            StageKind::MemoryConsolidate => {
                let (pool, _) = self.labelled_pool(&stages(prior, &[1, 2]));
                PromptTemplate::memory_consolidate(question, &pool)
            }
            StageKind::ReportDraft => {
                PromptTemplate::report_draft(question, self.request.summarizer().as_str())
            }
            StageKind::ReportGuidance => {
                let (reports, silent) = self.pool(&stages(prior, &[1]), |_| true);
                PromptTemplate::report_guidance(question, &reports, &silent)
            }
            StageKind::ReportRevision => {
                let center = self.request.summarizer();
                let own_draft = stage(prior, 1)
                    .and_then(|s| s.response_for(participant))
                    .filter(|r| r.success)
                    .map(|r| self.single(participant, &r.content));
                let guidance = stage(prior, 2)
                    .and_then(|s| s.response_for(center))
                    .filter(|r| r.success)
                    .map(|r| self.single(center, &r.content));
                PromptTemplate::report_revision(
                    question,
                    own_draft.as_deref(),
                    center.as_str(),
                    guidance.as_deref(),
                )
            }
            StageKind::RelayHop { hop } => {
                let total = self.request.participants().len();
                if hop <= 1 {
                    return PromptTemplate::relay_hop(question, hop, total, None);
                }
                // Only the immediately preceding hop is visible
                let previous = stage(prior, hop - 1).and_then(|s| s.responses.first());
                match previous {
                    Some(response) => {
                        let content = response
                            .success
                            .then(|| self.single(&response.participant, &response.content));
                        PromptTemplate::relay_hop(
                            question,
                            hop,
                            total,
                            Some((response.participant.as_str(), content.as_deref())),
                        )
                    }
                    None => PromptTemplate::relay_hop(question, hop, total, None),
                }
            }
            StageKind::RelayVerification => {
                let hops: Vec<&Stage> = prior
                    .iter()
                    .filter(|s| s.number < spec.number)
                    .collect();
                let (chain, silent) = self.hop_pool(&hops);
                PromptTemplate::relay_verification(question, &chain, &silent)
            }
        }
    }

    /// Prompt for the closing synthesis over every closed stage
    pub fn summary_prompt(&self, closed: &[Stage]) -> String {
        let sections: Vec<(String, Vec<(String, String)>)> = closed
            .iter()
            .map(|s| {
                let (entries, _) = self.pool(&[s], |_| true);
                (format!("Stage {}: {}", s.number, s.title), entries)
            })
            .collect();
        PromptTemplate::summary(
            self.request.question().content(),
            self.request.strategy(),
            &sections,
        )
    }

    /// Successful responses of `sources` accepted by `keep`, compacted as one
    /// pool, plus the participants that stayed silent.
    fn pool(
        &self,
        sources: &[&Stage],
        keep: impl Fn(&str) -> bool,
    ) -> (Vec<(String, String)>, Vec<String>) {
        self.collect(sources, |_, r| {
            keep(r.participant.as_str()).then(|| r.participant.to_string())
        })
    }

    /// Like [`pool`](Self::pool), with every label carrying its stage number
    fn labelled_pool(&self, sources: &[&Stage]) -> (Vec<(String, String)>, Vec<String>) {
        self.collect(sources, |stage, r| {
            Some(format!("{} (stage {})", r.participant, stage.number))
        })
    }

    fn hop_pool(&self, hops: &[&Stage]) -> (Vec<(String, String)>, Vec<String>) {
        self.collect(hops, |stage, r| {
            Some(format!("hop {}: {}", stage.number, r.participant))
        })
    }

    /// `label` returns `None` for responses to leave out entirely
    fn collect(
        &self,
        sources: &[&Stage],
        label: impl Fn(&Stage, &ParticipantResponse) -> Option<String>,
    ) -> (Vec<(String, String)>, Vec<String>) {
        let mut entries = Vec::new();
        let mut silent = Vec::new();
        for stage in sources {
            for response in &stage.responses {
                let Some(label) = label(stage, response) else {
                    continue;
                };
                if response.success {
                    entries.push((label, self.decorated(&response.participant, &response.content)));
                } else {
                    silent.push(label);
                }
            }
        }
        (self.compaction.compact_pool(&entries).entries, silent)
    }

    /// One embedded response, bounded by the per-response budget
    fn single(&self, author: &ParticipantId, content: &str) -> String {
        self.compaction.compact(
            &self.decorated(author, content),
            self.compaction.per_response_chars,
        )
    }

    fn decorated(&self, author: &ParticipantId, content: &str) -> String {
        match self.request.persona_for(author) {
            Some(persona) => self.persona.decorate(content, persona),
            None => content.to_string(),
        }
    }
}

fn stage(prior: &[Stage], number: usize) -> Option<&Stage> {
    prior.iter().find(|s| s.number == number)
}

fn stages<'s>(prior: &'s [Stage], numbers: &[usize]) -> Vec<&'s Stage> {
    numbers.iter().filter_map(|n| stage(prior, *n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::persona::{NoPersona, RolePrefix};
    use chrono::Utc;
    use council_domain::{ExecutionMode, Question, Strategy, TokenUsage};
    use std::time::Duration;

    fn id(name: &str) -> ParticipantId {
        ParticipantId::new(name).unwrap()
    }

    fn request(strategy: Strategy, names: &[&str]) -> ReasoningRequest {
        ReasoningRequest::new(
            Question::new("Is remote work beneficial?").unwrap(),
            names.iter().map(|n| id(n)).collect(),
            strategy,
        )
        .unwrap()
    }

    fn ok(name: &str, content: &str) -> ParticipantResponse {
        ParticipantResponse::success(id(name), content, TokenUsage::new(1, 1), Duration::ZERO)
    }

    fn failed(name: &str) -> ParticipantResponse {
        ParticipantResponse::failure(id(name), "boom", Duration::ZERO)
    }

    fn closed(number: usize, responses: Vec<ParticipantResponse>) -> Stage {
        Stage {
            number,
            title: format!("Stage {}", number),
            description: String::new(),
            mode: ExecutionMode::Parallel,
            responses,
            started_at: Utc::now(),
            ended_at: Utc::now(),
            duration_ms: 0,
        }
    }

    #[test]
    fn test_rebuttal_sees_own_and_peer_openings_but_not_failures() {
        let request = request(Strategy::Debate, &["a", "b", "c"]);
        let policy = CompactionPolicy::default();
        let prompter = StagePrompter::new(&request, &policy, &NoPersona);
        let plan = request.plan();
        let prior = vec![closed(
            1,
            vec![ok("a", "A opening"), ok("b", "B opening"), failed("c")],
        )];

        let prompt = prompter.prompt_for(&plan.stages()[1], &id("a"), &prior);

        assert!(prompt.contains("Your opening position:\nA opening"));
        assert!(prompt.contains("--- b ---\nB opening"));
        assert!(!prompt.contains("--- a ---"));
        assert!(prompt.contains("No response from: c."));
        assert!(!prompt.contains(council_domain::FAILURE_PLACEHOLDER));
    }

    #[test]
    fn test_relay_hop_sees_only_predecessor() {
        let request = request(Strategy::Relay, &["a", "b", "c"]);
        let policy = CompactionPolicy::default();
        let prompter = StagePrompter::new(&request, &policy, &NoPersona);
        let plan = request.plan();
        let prior = vec![
            closed(1, vec![ok("a", "first hop answer")]),
            closed(2, vec![ok("b", "second hop answer")]),
        ];

        let prompt = prompter.prompt_for(&plan.stages()[2], &id("c"), &prior);

        assert!(prompt.contains("second hop answer"));
        assert!(!prompt.contains("first hop answer"));
    }

    #[test]
    fn test_broken_relay_chain_does_not_reach_back() {
        let request = request(Strategy::Relay, &["a", "b", "c"]);
        let policy = CompactionPolicy::default();
        let prompter = StagePrompter::new(&request, &policy, &NoPersona);
        let plan = request.plan();
        let prior = vec![
            closed(1, vec![ok("a", "first hop answer")]),
            closed(2, vec![failed("b")]),
        ];

        let prompt = prompter.prompt_for(&plan.stages()[2], &id("c"), &prior);

        assert!(prompt.contains("chain is broken"));
        assert!(!prompt.contains("first hop answer"));
    }

    #[test]
    fn test_relay_verification_sees_whole_chain() {
        let request = request(Strategy::Relay, &["a", "b"]);
        let policy = CompactionPolicy::default();
        let prompter = StagePrompter::new(&request, &policy, &NoPersona);
        let plan = request.plan();
        let prior = vec![
            closed(1, vec![ok("a", "first hop answer")]),
            closed(2, vec![ok("b", "second hop answer")]),
        ];

        let prompt = prompter.prompt_for(&plan.stages()[2], &id("a"), &prior);

        assert!(prompt.contains("--- hop 1: a ---\nfirst hop answer"));
        assert!(prompt.contains("--- hop 2: b ---\nsecond hop answer"));
    }

    #[test]
    fn test_report_revision_folds_center_guidance() {
        let request = request(Strategy::Report, &["center", "b"]);
        let policy = CompactionPolicy::default();
        let prompter = StagePrompter::new(&request, &policy, &NoPersona);
        let plan = request.plan();
        let prior = vec![
            closed(1, vec![ok("b", "field report")]),
            closed(2, vec![ok("center", "focus on costs")]),
        ];

        let prompt = prompter.prompt_for(&plan.stages()[2], &id("b"), &prior);

        assert!(prompt.contains("Your earlier report:\nfield report"));
        assert!(prompt.contains("(center):\nfocus on costs"));
    }

    #[test]
    fn test_memory_pool_is_bounded_by_stage_budget() {
        let request = request(Strategy::Memory, &["a", "b", "c"]);
        let policy = CompactionPolicy::default()
            .with_per_response_chars(500)
            .with_stage_budget_chars(600)
            .with_digest_chars(100);
        let prompter = StagePrompter::new(&request, &policy, &NoPersona);
        let plan = request.plan();
        let long = "x".repeat(5000);
        let prior = vec![
            closed(1, vec![ok("a", &long), ok("b", &long), ok("c", &long)]),
            closed(2, vec![ok("a", &long), ok("b", &long), ok("c", &long)]),
        ];

        let prompt = prompter.prompt_for(&plan.stages()[2], &id("a"), &prior);
        let embedded = prompt.matches('x').count();

        assert!(embedded <= 600, "embedded {} chars", embedded);
    }

    #[test]
    fn test_persona_attributes_author_output_for_readers() {
        let request = request(Strategy::Debate, &["a", "b"])
            .with_persona(id("b"), "skeptic")
            .unwrap();
        let policy = CompactionPolicy::default();
        let prompter = StagePrompter::new(&request, &policy, &RolePrefix);
        let plan = request.plan();
        let prior = vec![closed(1, vec![ok("a", "A opening"), ok("b", "B opening")])];

        let prompt = prompter.prompt_for(&plan.stages()[1], &id("a"), &prior);

        assert!(prompt.contains("--- b ---\n[as skeptic] B opening"));
        assert!(!prompt.contains("Adopt"));
        assert!(prompt.contains("Your opening position:\nA opening"));

        let summary = prompter.summary_prompt(&prior);
        assert!(summary.contains("[as skeptic] B opening"));
        assert!(summary.contains("--- a ---\nA opening"));
    }

    #[test]
    fn test_summary_prompt_covers_every_stage() {
        let request = request(Strategy::Debate, &["a"]);
        let policy = CompactionPolicy::default();
        let prompter = StagePrompter::new(&request, &policy, &NoPersona);
        let prior = vec![closed(1, vec![ok("a", "one")]), closed(2, vec![failed("a")])];

        let prompt = prompter.summary_prompt(&prior);

        assert!(prompt.contains("## Stage 1: Stage 1"));
        assert!(prompt.contains("--- a ---\none"));
        assert!(prompt.contains("No successful responses"));
    }
}
