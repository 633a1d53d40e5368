//! Root candidate mining and scoring.
//!
//! Every token position that leaves at least one following token opens a
//! continuation: the suffix of the sentence starting there. Continuations are
//! bucketed by their first token (the root). Buckets with too few members are
//! discarded, the rest are scored by how varied their first few positions are.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, instrument, trace};

use crate::core::params::FlowParams;
use crate::core::sentence::Sentence;

/// Token suffix starting at a root occurrence; borrows the sentence.
pub type Continuation<'a> = &'a [String];

/// A root that passed the continuation threshold, with its score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredRoot<'a>
{
    pub root: &'a str,
    pub score: f64,
    #[serde(serialize_with = "serialize_len")]
    pub continuations: Vec<Continuation<'a>>,
}

fn serialize_len<S: serde::Serializer>(
    v: &[Continuation<'_>],
    s: S,
) -> Result<S::Ok, S::Error>
{
    s.serialize_u64(v.len() as u64)
}

/// Whether `token` may head a tree: two letters or more, or exactly "i" / "a".
pub fn is_root_eligible(token: &str) -> bool
{
    token.len() >= 2 || token == "i" || token == "a"
}

/// Root → continuations, in first-seen root order.
pub type RootBuckets<'a> = IndexMap<&'a str, Vec<Continuation<'a>>>;

/// Index every qualifying (sentence, position) pair into its root bucket.
#[instrument(level = "debug", skip_all, fields(sentences = sentences.len()))]
pub fn index_roots<'a>(
    sentences: &'a [Sentence],
    params: &FlowParams,
) -> RootBuckets<'a>
{
    let cap = params
        .max_continuations_per_root
        .unwrap_or(usize::MAX);
    let mut buckets: RootBuckets<'a> = IndexMap::new();

    for words in sentences
    {
        // Last token never starts a continuation
        for i in 0..words.len().saturating_sub(1)
        {
            let root = words[i].as_str();
            if !is_root_eligible(root)
            {
                continue;
            }

            let bucket = buckets
                .entry(root)
                .or_default();
            if bucket.len() < cap
            {
                bucket.push(&words[i..]);
            }
        }
    }

    debug!(roots = buckets.len(), "indexed root buckets");
    buckets
}

/// Distinct `(position, word)` pairs over positions `1..=window`, plus a
/// weighted continuation count.
///
/// Positions past the end of a short continuation contribute nothing.
pub fn score_root(
    continuations: &[Continuation<'_>],
    params: &FlowParams,
) -> f64
{
    let mut unique: HashSet<(usize, &str)> = HashSet::new();
    for words in continuations
    {
        for (k, w) in words
            .iter()
            .enumerate()
            .take(params.score_window + 1)
            .skip(1)
        {
            unique.insert((k, w.as_str()));
        }
    }

    unique.len() as f64 + continuations.len() as f64 * params.count_weight
}

/// Top `max_roots` qualifying roots, best score first; ties keep first-seen order.
#[instrument(level = "debug", skip_all)]
pub fn select_roots<'a>(
    buckets: RootBuckets<'a>,
    params: &FlowParams,
) -> Vec<ScoredRoot<'a>>
{
    let mut scored: Vec<ScoredRoot<'a>> = buckets
        .into_iter()
        .filter(|(_, list)| list.len() >= params.min_continuations)
        .map(|(root, continuations)| {
            let score = score_root(&continuations, params);
            trace!(root, score, count = continuations.len(), "scored root");
            ScoredRoot { root, score, continuations }
        })
        .collect();

    // Stable sort keeps insertion order among equal scores
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(params.max_roots);

    debug!(selected = scored.len(), "selected roots");
    scored
}

/// Index and select in one pass.
pub fn mine_roots<'a>(
    sentences: &'a [Sentence],
    params: &FlowParams,
) -> Vec<ScoredRoot<'a>>
{
    select_roots(index_roots(sentences, params), params)
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn sentences(lines: &[&str]) -> Vec<Sentence>
    {
        lines
            .iter()
            .map(|l| l.split(' ').map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn eligibility_keeps_single_letter_exceptions()
    {
        assert!(is_root_eligible("i"));
        assert!(is_root_eligible("a"));
        assert!(is_root_eligible("to"));
        assert!(!is_root_eligible("x"));
        assert!(!is_root_eligible(""));
    }

    #[test]
    fn last_token_never_opens_a_continuation()
    {
        let s = sentences(&["we go home"]);
        let b = index_roots(&s, &FlowParams::default());
        assert_eq!(b.keys().copied().collect::<Vec<_>>(), vec!["we", "go"]);
        assert_eq!(b["go"], vec![&s[0][1..]]);
    }

    #[test]
    fn repeated_root_in_one_sentence_counts_each_position()
    {
        let s = sentences(&["so we so we so"]);
        let b = index_roots(&s, &FlowParams::default());
        assert_eq!(b["so"].len(), 2);
        assert_eq!(b["we"].len(), 2);
    }

    #[test]
    fn score_counts_distinct_position_words_and_skips_missing_positions()
    {
        let s = sentences(&["go far", "go far away", "go home now"]);
        let conts: Vec<Continuation<'_>> = s.iter().map(|w| w.as_slice()).collect();
        // 1_far, 1_home, 2_away, 2_now -> 4 unique; + 3 * 0.05
        let score = score_root(&conts, &FlowParams::default());
        assert!((score - 4.15).abs() < 1e-9);
    }

    #[test]
    fn threshold_and_stable_ordering()
    {
        let s = sentences(&[
            "aa x", "aa x", "aa x", "aa x", "aa x",
            "bb x", "bb x", "bb x", "bb x", "bb x",
            "cc x", "cc x", "cc x", "cc x",
        ]);
        let roots = mine_roots(&s, &FlowParams::default());
        let names: Vec<&str> = roots.iter().map(|r| r.root).collect();
        // equal scores keep first-seen order; cc has only four continuations
        assert_eq!(names, vec!["aa", "bb"]);
    }

    #[test]
    fn per_root_cap_bounds_bucket_size()
    {
        let s = sentences(&["aa b", "aa c", "aa d"]);
        let p = FlowParams { max_continuations_per_root: Some(2), ..FlowParams::default() };
        assert_eq!(index_roots(&s, &p)["aa"].len(), 2);
    }
}
