//! Sentence splitting and token cleaning.
//!
//! Each comment is cut on runs of `.`, `!` or `?`; fragments whose trimmed
//! length does not exceed `min_sentence_chars` are dropped. Surviving
//! sentences are lowercased, split on whitespace, and every token is reduced
//! to its ASCII `a-z` letters. Tokens that end up empty are discarded.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use crate::core::params::FlowParams;
use crate::parsers::comments::Comment;

/// Cleaned token list of one sentence
pub type Sentence = Vec<String>;

static SENTENCE_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[.!?]+").unwrap_or_else(|e| unreachable!("static pattern: {e}"))
});

/// Raw sentence fragments of `text` longer than `min_chars` once trimmed.
///
/// Length is measured in UTF-16 code units so that counts agree with the
/// browser dashboards producing the exports.
pub fn split_sentences(
    text: &str,
    min_chars: usize,
) -> impl Iterator<Item = &str>
{
    SENTENCE_BREAK
        .split(text)
        .filter(move |s| s.trim().encode_utf16().count() > min_chars)
}

/// Lowercase, whitespace-split, letters-only tokens of one sentence.
pub fn tokenize(sentence: &str) -> Sentence
{
    sentence
        .trim()
        .to_lowercase()
        .split_whitespace()
        .map(|w| w.chars().filter(char::is_ascii_lowercase).collect::<String>())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Token lists for every usable sentence of every comment, in corpus order.
///
/// Comments without a usable sentence contribute nothing. When
/// `max_sentences` is set, indexing stops after that many sentences.
#[instrument(level = "debug", skip_all, fields(comments = comments.len()))]
pub fn extract_sentences(
    comments: &[Comment],
    params: &FlowParams,
) -> Vec<Sentence>
{
    let limit = params
        .max_sentences
        .unwrap_or(usize::MAX);

    let sentences: Vec<Sentence> = comments
        .iter()
        .flat_map(|c| split_sentences(c.text(), params.min_sentence_chars))
        .take(limit)
        .map(tokenize)
        .collect();

    debug!(sentences = sentences.len(), "extracted sentences");
    sentences
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn splits_on_punctuation_runs_and_drops_short_fragments()
    {
        let got: Vec<&str> =
            split_sentences("Short one. This sentence is long enough!?! ok? Another long sentence", 10)
                .collect();
        assert_eq!(got, vec![" This sentence is long enough", " Another long sentence"]);
    }

    #[test]
    fn length_threshold_is_strict_and_trimmed()
    {
        // exactly ten characters after trimming is dropped
        assert_eq!(split_sentences("   abcdefghij   ", 10).count(), 0);
        assert_eq!(split_sentences("abcdefghijk", 10).count(), 1);
    }

    #[test]
    fn tokens_keep_only_ascii_letters()
    {
        assert_eq!(
            tokenize("  I'm  GOING to the café, 2nite -- ok  "),
            vec!["im", "going", "to", "the", "caf", "nite", "ok"]
        );
    }

    #[test]
    fn sentence_with_only_symbols_yields_no_tokens()
    {
        assert!(tokenize("123 456 -- ### 789").is_empty());
    }

    #[test]
    fn extracts_across_comments_and_honours_sentence_cap()
    {
        let comments = vec![
            Comment::from_body("First sentence here. Second sentence here."),
            Comment::default(),
            Comment::from_body("Third sentence here"),
        ];
        let all = extract_sentences(&comments, &FlowParams::default());
        assert_eq!(all.len(), 3);
        assert_eq!(all[2], vec!["third", "sentence", "here"]);

        let capped = FlowParams { max_sentences: Some(2), ..FlowParams::default() };
        assert_eq!(extract_sentences(&comments, &capped).len(), 2);
    }
}
