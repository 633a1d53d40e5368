//! Shared test utilities for integration tests
//!
//! Provides the small comment corpora and temp-dir fixtures
//! used across multiple test files.

#![allow(dead_code)]

use assert_fs::prelude::*;
use commentflow::Comment;

/// Five comments sharing "i love ..." openings; yields trees for
/// "i" and "love".
pub const FOOD: [&str; 5] = [
    "I love pizza and I love tacos.",
    "I love pizza with cheese!",
    "I love pizza always",
    "I love sushi too",
    "I love running daily?",
];

pub fn comments(lines: &[&str]) -> Vec<Comment>
{
    lines
        .iter()
        .map(|&l| Comment::from(l))
        .collect()
}

/// Temp dir holding `comments.json` as a plain JSON array.
pub fn corpus_dir(lines: &[&str]) -> assert_fs::TempDir
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    let records: Vec<serde_json::Value> = lines
        .iter()
        .map(|l| serde_json::json!({ "comment": l }))
        .collect();
    tmp.child("comments.json")
        .write_str(&serde_json::to_string(&records).expect("encode"))
        .expect("write comments.json");
    tmp
}
