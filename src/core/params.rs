use serde::{Deserialize, Serialize};

/// Tuning knobs for sentence-pattern mining.
///
/// `Default` holds the standard mining thresholds; the two optional
/// caps are unset by default, which keeps every bucket unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowParams
{
    /// Sentence kept iff its trimmed length (UTF-16 units) exceeds this
    pub min_sentence_chars: usize,

    /// Continuations a root needs before it can head a tree
    pub min_continuations: usize,

    /// Number of trees produced
    pub max_roots: usize,

    /// Positions 1..=score_window feed the distinct-pair score
    pub score_window: usize,

    /// Weight of the raw continuation count in the root score
    pub count_weight: f64,

    /// Strong (count > 1) groups needed to drop singletons entirely
    pub strong_branch_min: usize,

    /// Cap on branches in strong-only mode
    pub max_strong_branches: usize,

    /// Target branch total when singletons top up the strong groups
    pub fallback_branches: usize,

    /// Levels deeper than this are silently truncated
    pub max_depth: usize,

    /// Index at most this many sentences (corpus order)
    pub max_sentences: Option<usize>,

    /// Retain at most this many continuations per root (first seen)
    pub max_continuations_per_root: Option<usize>,
}

impl Default for FlowParams
{
    fn default() -> Self
    {
        Self {
            min_sentence_chars: 10,
            min_continuations: 5,
            max_roots: 5,
            score_window: 5,
            count_weight: 0.05,
            strong_branch_min: 3,
            max_strong_branches: 8,
            fallback_branches: 5,
            max_depth: 50,
            max_sentences: None,
            max_continuations_per_root: None,
        }
    }
}

impl FlowParams
{
    /// Stable textual fingerprint, part of the memo key.
    pub(crate) fn fingerprint(&self) -> String
    {
        format!(
            "{}:{}:{}:{}:{}:{}:{}:{}:{}:{:?}:{:?}",
            self.min_sentence_chars,
            self.min_continuations,
            self.max_roots,
            self.score_window,
            self.count_weight.to_bits(),
            self.strong_branch_min,
            self.max_strong_branches,
            self.fallback_branches,
            self.max_depth,
            self.max_sentences,
            self.max_continuations_per_root,
        )
    }
}
