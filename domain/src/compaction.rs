//! Content compaction: bounded, deterministic reduction of prior-stage text.
//!
//! Earlier participants' output is folded into later prompts. Two levels
//! keep that bounded:
//!
//! 1. **Head/tail** ([`CompactionPolicy::compact`]): a response longer than
//!    its budget keeps a leading and a trailing slice around
//!    [`TRUNCATION_MARKER`]; the middle is dropped.
//! 2. **Digest** ([`CompactionPolicy::compact_pool`]): if the head/tail
//!    forms of a whole pool still exceed the stage budget, every entry is
//!    cut down to a short prefix instead. The per-entry digest length is
//!    `min(digest_chars, stage_budget_chars / n)`, so the pool never exceeds
//!    the stage budget whatever the participant count.
//!
//! All lengths are in characters.

use crate::core::string::{char_len, head_chars, tail_chars, truncate};
use serde::{Deserialize, Serialize};

/// Inserted between the retained head and tail of a compacted text
pub const TRUNCATION_MARKER: &str = "\n[... truncated ...]\n";

/// Parameters of the two-level compaction rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompactionPolicy {
    /// Share of the budget kept from the start of the text
    pub head_ratio: f64,
    /// Share of the budget kept from the end of the text
    pub tail_ratio: f64,
    /// Budget for a single embedded response
    pub per_response_chars: usize,
    /// Budget for all responses embedded into one prompt section
    pub stage_budget_chars: usize,
    /// Upper bound of a digest entry
    pub digest_chars: usize,
}

impl Default for CompactionPolicy {
    fn default() -> Self {
        Self {
            head_ratio: 0.65,
            tail_ratio: 0.25,
            per_response_chars: 1500,
            stage_budget_chars: 6000,
            digest_chars: 250,
        }
    }
}

/// Result of compacting a pool of responses
#[derive(Debug, Clone, PartialEq)]
pub struct CompactedPool {
    /// `(participant, text)` pairs in input order
    pub entries: Vec<(String, String)>,
    /// Whether the digest pass replaced the head/tail pass
    pub digested: bool,
}

impl CompactedPool {
    /// Total characters across all entries
    pub fn total_chars(&self) -> usize {
        self.entries.iter().map(|(_, text)| char_len(text)).sum()
    }
}

impl CompactionPolicy {
    pub fn with_per_response_chars(mut self, chars: usize) -> Self {
        self.per_response_chars = chars;
        self
    }

    pub fn with_stage_budget_chars(mut self, chars: usize) -> Self {
        self.stage_budget_chars = chars;
        self
    }

    pub fn with_digest_chars(mut self, chars: usize) -> Self {
        self.digest_chars = chars;
        self
    }

    /// Reduce `text` to at most `max_len` characters.
    ///
    /// Text already within budget is returned unchanged.
    pub fn compact(&self, text: &str, max_len: usize) -> String {
        if char_len(text) <= max_len {
            return text.to_string();
        }

        let marker_len = char_len(TRUNCATION_MARKER);
        if max_len <= marker_len {
            return head_chars(text, max_len).to_string();
        }

        let room = max_len - marker_len;
        let head = share_of(max_len, self.head_ratio).min(room);
        let tail = share_of(max_len, self.tail_ratio).min(room - head);

        format!(
            "{}{}{}",
            head_chars(text, head),
            TRUNCATION_MARKER,
            tail_chars(text, tail)
        )
    }

    /// Compact a pool of `(participant, text)` entries destined for one prompt.
    pub fn compact_pool(&self, entries: &[(String, String)]) -> CompactedPool {
        let head_tail: Vec<(String, String)> = entries
            .iter()
            .map(|(id, text)| (id.clone(), self.compact(text, self.per_response_chars)))
            .collect();

        let pool = CompactedPool {
            entries: head_tail,
            digested: false,
        };
        if pool.total_chars() <= self.stage_budget_chars {
            return pool;
        }

        let digest_len = self.digest_len(entries.len());
        CompactedPool {
            entries: entries
                .iter()
                .map(|(id, text)| (id.clone(), truncate(text, digest_len)))
                .collect(),
            digested: true,
        }
    }

    /// Per-entry digest length for a pool of `count` entries
    pub fn digest_len(&self, count: usize) -> usize {
        (self.stage_budget_chars / count.max(1)).min(self.digest_chars)
    }
}

/// `floor(max_len * ratio)` with the ratio clamped to `[0, 1]`
fn share_of(max_len: usize, ratio: f64) -> usize {
    (max_len as f64 * ratio.clamp(0.0, 1.0)).floor() as usize
}

/// Compact with the default policy.
pub fn compact(text: &str, max_len: usize) -> String {
    CompactionPolicy::default().compact(text, max_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_text(len: usize) -> String {
        (0..len)
            .map(|i| char::from(b'a' + (i % 26) as u8))
            .collect()
    }

    #[test]
    fn test_short_text_is_unchanged() {
        assert_eq!(compact("short answer", 100), "short answer");
        assert_eq!(compact("exact", 5), "exact");
        assert_eq!(compact("", 0), "");
    }

    #[test]
    fn test_result_never_exceeds_budget() {
        let text = numbered_text(5000);
        for budget in [0, 1, 10, 20, 21, 22, 50, 100, 333, 1000, 4999] {
            let out = compact(&text, budget);
            assert!(
                char_len(&out) <= budget,
                "budget {} produced {} chars",
                budget,
                char_len(&out)
            );
        }
    }

    #[test]
    fn test_keeps_head_and_tail_around_marker() {
        let text = format!("BEGIN{}END", "x".repeat(2000));
        let out = compact(&text, 200);

        assert!(out.starts_with("BEGIN"));
        assert!(out.ends_with("END"));
        assert!(out.contains(TRUNCATION_MARKER));

        let (head, tail) = out.split_once(TRUNCATION_MARKER).unwrap();
        assert_eq!(char_len(head), 130); // 65% of 200
        // 25% of 200 would overflow the budget once the marker is counted
        assert_eq!(char_len(tail), 49);
        assert_eq!(char_len(&out), 200);
    }

    #[test]
    fn test_budget_smaller_than_marker_keeps_prefix_only() {
        let out = compact("abcdefghijklmnopqrstuvwxyz0123456789", 8);
        assert_eq!(out, "abcdefgh");
    }

    #[test]
    fn test_multibyte_text_is_cut_on_char_boundaries() {
        let text = "日本語".repeat(500);
        let out = compact(&text, 100);
        assert!(char_len(&out) <= 100);
        assert!(out.starts_with("日本語"));
    }

    #[test]
    fn test_compaction_is_deterministic() {
        let text = numbered_text(3000);
        assert_eq!(compact(&text, 700), compact(&text, 700));
    }

    #[test]
    fn test_pool_within_budget_uses_head_tail_only() {
        let policy = CompactionPolicy::default()
            .with_per_response_chars(100)
            .with_stage_budget_chars(1000);
        let entries = vec![
            ("openai".to_string(), numbered_text(500)),
            ("gemini".to_string(), "brief".to_string()),
        ];

        let pool = policy.compact_pool(&entries);

        assert!(!pool.digested);
        assert_eq!(pool.entries[1].1, "brief");
        assert!(char_len(&pool.entries[0].1) <= 100);
        assert_eq!(pool.entries[0].0, "openai");
    }

    #[test]
    fn test_pool_over_budget_falls_back_to_digests() {
        let policy = CompactionPolicy::default()
            .with_per_response_chars(1500)
            .with_stage_budget_chars(2000)
            .with_digest_chars(250);
        let entries: Vec<(String, String)> = (0..4)
            .map(|i| (format!("p{}", i), numbered_text(3000)))
            .collect();

        let pool = policy.compact_pool(&entries);

        assert!(pool.digested);
        assert_eq!(pool.entries.len(), 4);
        for (i, (id, text)) in pool.entries.iter().enumerate() {
            assert_eq!(id, &format!("p{}", i));
            assert!(char_len(text) <= 250);
            assert!(!text.contains(TRUNCATION_MARKER));
        }
    }

    #[test]
    fn test_pool_ceiling_is_independent_of_participant_count() {
        let policy = CompactionPolicy::default()
            .with_stage_budget_chars(600)
            .with_digest_chars(250);

        for count in 1..=12 {
            let entries: Vec<(String, String)> = (0..count)
                .map(|i| (format!("p{}", i), numbered_text(4000)))
                .collect();
            let pool = policy.compact_pool(&entries);
            assert!(
                pool.total_chars() <= 600,
                "{} entries produced {} chars",
                count,
                pool.total_chars()
            );
        }
    }

    #[test]
    fn test_digest_len() {
        let policy = CompactionPolicy::default()
            .with_stage_budget_chars(6000)
            .with_digest_chars(250);
        assert_eq!(policy.digest_len(2), 250);
        assert_eq!(policy.digest_len(0), 250);

        let tight = policy.with_stage_budget_chars(600);
        assert_eq!(tight.digest_len(6), 100);
    }
}
