//! Comment records and the export formats they arrive in.
//!
//! Accepted shapes:
//! - a JSON array of records: `[{"body": "..."}, ...]`
//! - a user export object carrying the array: `{"comments": [...], ...}`
//! - JSON Lines, one record per non-blank line
//!
//! Only the `comment` / `body` text fields are read; everything else in a
//! record is ignored.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// A single comment-like record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment
{
    /// Primary text field used by dashboard exports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Raw API field, used when `comment` is absent or empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl Comment
{
    /// Build a record from body text alone.
    pub fn from_body(text: impl Into<String>) -> Self
    {
        Self { comment: None, body: Some(text.into()) }
    }

    /// Text of the record: `comment` when non-empty, else `body`, else "".
    pub fn text(&self) -> &str
    {
        self.comment
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.body.as_deref())
            .unwrap_or("")
    }
}

impl From<&str> for Comment
{
    fn from(text: &str) -> Self
    {
        Self::from_body(text)
    }
}

/// Input decoding failures.
#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum InputError
{
    #[error("input is not a JSON array, export object, or JSON Lines: {source}")]
    #[diagnostic(
        code(commentflow::input::json),
        help("expected `[{{\"body\": ...}}]`, `{{\"comments\": [...]}}`, or one record per line")
    )]
    Json
    {
        #[source]
        source: serde_json::Error,
    },

    #[error("export object has no `comments` array")]
    #[diagnostic(
        code(commentflow::input::missing_comments),
        help("user exports must carry their records under a top-level `comments` key")
    )]
    MissingComments,

    #[error("invalid record on line {line}: {source}")]
    #[diagnostic(code(commentflow::input::jsonl))]
    Line
    {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
struct Export
{
    comments: Option<Vec<Comment>>,
}

/// Decode comment records from any supported export shape.
///
/// Blank input decodes to an empty list; "no comments" is not an error.
#[instrument(level = "debug", skip(input), fields(bytes = input.len()))]
pub fn parse_comments(input: &str) -> Result<Vec<Comment>, InputError>
{
    let trimmed = input.trim_start();

    let comments = match trimmed.chars().next()
    {
        None => Vec::new(),
        Some('[') => serde_json::from_str::<Vec<Comment>>(trimmed)
            .map_err(|source| InputError::Json { source })?,
        Some('{') => parse_object_or_lines(trimmed)?,
        Some(_) => parse_lines(trimmed)?,
    };

    debug!(records = comments.len(), "decoded comment records");
    Ok(comments)
}

/// A leading `{` is either one export object or the first JSON Lines record.
fn parse_object_or_lines(input: &str) -> Result<Vec<Comment>, InputError>
{
    match serde_json::from_str::<serde_json::Value>(input)
    {
        Ok(serde_json::Value::Object(map)) if map.contains_key("comments") =>
        {
            let export: Export = serde_json::from_value(serde_json::Value::Object(map))
                .map_err(|source| InputError::Json { source })?;
            export
                .comments
                .ok_or(InputError::MissingComments)
        }
        Ok(serde_json::Value::Object(map)) =>
        {
            if map.contains_key("comment") || map.contains_key("body")
            {
                // A single bare record
                let one: Comment = serde_json::from_value(serde_json::Value::Object(map))
                    .map_err(|source| InputError::Json { source })?;
                Ok(vec![one])
            }
            else
            {
                Err(InputError::MissingComments)
            }
        }
        Ok(_) => Err(InputError::MissingComments),
        // Several objects in a row: JSON Lines
        Err(_) => parse_lines(input),
    }
}

fn parse_lines(input: &str) -> Result<Vec<Comment>, InputError>
{
    input
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(i, l)| {
            serde_json::from_str::<Comment>(l.trim())
                .map_err(|source| InputError::Line { line: i + 1, source })
        })
        .collect()
}
