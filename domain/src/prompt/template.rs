//! Prompt templates for every topology stage
//!
//! Templates only format; choosing *which* earlier responses a stage may see
//! happens before they are called. Embedded responses arrive as
//! `(label, content)` pairs that have already been compacted.

use crate::orchestration::strategy::Strategy;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// Preamble shared by every participant prompt
    pub fn preamble() -> &'static str {
        r#"You are one of several expert participants in a structured, multi-stage reasoning exercise.
Reason carefully, state your assumptions, and keep your answer focused and well organized."#
    }

    /// Independent first answer (debate opening, memory contribution)
    pub fn opening(question: &str) -> String {
        format!(
            r#"{}

Question:
{}

Give your own well-reasoned answer. Other participants are answering independently."#,
            Self::preamble(),
            question
        )
    }

    /// Debate stage 2: respond to every opening position
    pub fn debate_rebuttal(
        question: &str,
        own: Option<&str>,
        peers: &[(String, String)],
        silent: &[String],
    ) -> String {
        let mut prompt = format!("{}\n\nQuestion:\n{}\n", Self::preamble(), question);

        if let Some(own) = own {
            prompt.push_str(&format!("\nYour opening position:\n{}\n", own));
        }

        if peers.is_empty() {
            prompt.push_str("\nNo other participant produced an opening position.\n");
        } else {
            prompt.push_str("\nOpening positions from the other participants:\n");
            push_entries(&mut prompt, peers);
        }
        push_silent(&mut prompt, silent);

        prompt.push_str(
            r#"
Respond to the other positions: point out where they are wrong or incomplete,
acknowledge where they are stronger than yours, and refine your own position."#,
        );
        prompt
    }

    /// Debate stage 3: final position over the whole debate
    pub fn debate_closing(
        question: &str,
        transcript: &[(String, String)],
        silent: &[String],
    ) -> String {
        let mut prompt = format!(
            "{}\n\nQuestion:\n{}\n\nThe debate so far:\n",
            Self::preamble(),
            question
        );
        push_entries(&mut prompt, transcript);
        push_silent(&mut prompt, silent);

        prompt.push_str(
            r#"
Give your closing statement: your final answer, the strongest objection to it,
and why you still hold (or have changed) your position."#,
        );
        prompt
    }

    /// Memory stage 2: read the shared pool and extend it
    pub fn memory_recall(question: &str, pool: &[(String, String)]) -> String {
        let mut prompt = format!(
            "{}\n\nQuestion:\n{}\n\nShared memory (every participant's contributions so far):\n",
            Self::preamble(),
            question
        );
        push_pool(&mut prompt, pool);

        prompt.push_str(
            r#"
Build on the shared memory: add facts, arguments, or perspectives that are missing,
and correct anything in it you believe is wrong."#,
        );
        prompt
    }

    /// Memory stage 3: consolidate the full pool
    pub fn memory_consolidate(question: &str, pool: &[(String, String)]) -> String {
        let mut prompt = format!(
            "{}\n\nQuestion:\n{}\n\nShared memory after two rounds:\n",
            Self::preamble(),
            question
        );
        push_pool(&mut prompt, pool);

        prompt.push_str(
            r#"
Consolidate the shared memory into one coherent answer. Keep what is well supported,
drop what was refuted, and flag open disagreements."#,
        );
        prompt
    }

    /// Report stage 1: a peripheral's field report
    pub fn report_draft(question: &str, center: &str) -> String {
        format!(
            r#"{}

Question:
{}

Write a report with your analysis. It will be reviewed by the coordinating participant ({}),
together with the reports of the other participants."#,
            Self::preamble(),
            question,
            center
        )
    }

    /// Report stage 2: the center reviews every report and issues guidance
    pub fn report_guidance(
        question: &str,
        reports: &[(String, String)],
        silent: &[String],
    ) -> String {
        let mut prompt = format!(
            "{}\n\nYou are the coordinating participant.\n\nQuestion:\n{}\n\nReports received:\n",
            Self::preamble(),
            question
        );
        if reports.is_empty() {
            prompt.push_str("\n(No reports were received.)\n");
        } else {
            push_entries(&mut prompt, reports);
        }
        push_silent(&mut prompt, silent);

        prompt.push_str(
            r#"
Issue guidance for the next round: which findings hold up, what each report missed,
and what the final answer should focus on."#,
        );
        prompt
    }

    /// Report stage 3: a peripheral revises its report under the guidance
    pub fn report_revision(
        question: &str,
        own_draft: Option<&str>,
        center: &str,
        guidance: Option<&str>,
    ) -> String {
        let mut prompt = format!("{}\n\nQuestion:\n{}\n", Self::preamble(), question);

        match own_draft {
            Some(draft) => prompt.push_str(&format!("\nYour earlier report:\n{}\n", draft)),
            None => prompt.push_str("\nYou did not submit an earlier report.\n"),
        }
        match guidance {
            Some(guidance) => prompt.push_str(&format!(
                "\nGuidance from the coordinating participant ({}):\n{}\n",
                center, guidance
            )),
            None => prompt.push_str(&format!(
                "\nThe coordinating participant ({}) did not issue guidance.\n",
                center
            )),
        }

        prompt.push_str("\nWrite your revised, final report.");
        prompt
    }

    /// Relay hop: sees only the immediately preceding hop
    ///
    /// `previous` is `None` for the first hop. `Some((label, None))` means the
    /// preceding participant did not produce output.
    pub fn relay_hop(
        question: &str,
        hop: usize,
        total: usize,
        previous: Option<(&str, Option<&str>)>,
    ) -> String {
        let mut prompt = format!(
            "{}\n\nYou are participant {} of {} in a relay.\n\nQuestion:\n{}\n",
            Self::preamble(),
            hop,
            total,
            question
        );

        match previous {
            None => prompt.push_str(
                "\nYou start the relay. Give a complete first answer for the next participant to build on.",
            ),
            Some((label, Some(content))) => {
                prompt.push_str(&format!(
                    "\nThe previous participant ({}) handed you this answer:\n\n--- {} ---\n{}\n",
                    label, label, content
                ));
                prompt.push_str(
                    "\nImprove it: fix errors, fill gaps, and hand on a complete answer.",
                );
            }
            Some((label, None)) => prompt.push_str(&format!(
                "\nThe previous participant ({}) did not produce an answer, so the chain is broken here.\nAnswer the question yourself for the next participant to build on.",
                label
            )),
        }
        prompt
    }

    /// Relay verification: everyone checks the full chain
    pub fn relay_verification(question: &str, chain: &[(String, String)], silent: &[String]) -> String {
        let mut prompt = format!(
            "{}\n\nQuestion:\n{}\n\nThe complete relay chain, in order:\n",
            Self::preamble(),
            question
        );
        push_entries(&mut prompt, chain);
        push_silent(&mut prompt, silent);

        prompt.push_str(
            r#"
Verify the chain: identify errors introduced or corrected along the way,
and state whether the final answer is correct and complete."#,
        );
        prompt
    }

    /// Closing synthesis over the full transcript
    pub fn summary(question: &str, strategy: Strategy, stages: &[(String, Vec<(String, String)>)]) -> String {
        let mut prompt = format!(
            r#"You are summarizing a multi-participant reasoning session ({} strategy).

Question:
{}
"#,
            strategy.display_name(),
            question
        );

        for (title, entries) in stages {
            prompt.push_str(&format!("\n## {}\n", title));
            if entries.is_empty() {
                prompt.push_str("\n(No successful responses in this stage.)\n");
            } else {
                push_entries(&mut prompt, entries);
            }
        }

        prompt.push_str(
            r#"
Based on the whole session above, provide:

1. **Conclusion**: the best-supported answer to the question
2. **Key Points**: the most important arguments that emerged (bullet list)
3. **Consensus**: where the participants agreed (bullet list)
4. **Disagreements**: where they did not, and which side is better supported (bullet list)

Format your response with clear markdown headers."#,
        );
        prompt
    }
}

fn push_entries(prompt: &mut String, entries: &[(String, String)]) {
    for (label, content) in entries {
        prompt.push_str(&format!("\n--- {} ---\n{}\n", label, content));
    }
}

fn push_pool(prompt: &mut String, pool: &[(String, String)]) {
    if pool.is_empty() {
        prompt.push_str("\n(The shared memory is empty.)\n");
    } else {
        push_entries(prompt, pool);
    }
}

fn push_silent(prompt: &mut String, silent: &[String]) {
    if !silent.is_empty() {
        prompt.push_str(&format!("\n(No response from: {}.)\n", silent.join(", ")));
    }
}
