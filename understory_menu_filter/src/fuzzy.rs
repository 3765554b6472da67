// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Subsequence fuzzy matching.

use smallvec::SmallVec;

/// Bonus when two query characters match adjacent target characters.
const CONSECUTIVE: i32 = 10;
/// Bonus when a query character matches the start of a word.
const WORD_START: i32 = 5;
/// Largest penalty charged for one gap between matches.
const MAX_GAP: usize = 10;
/// Bonus when the label starts with the query.
const PREFIX: i32 = 25;
/// Bonus when the label equals the query.
const EXACT: i32 = 100;
/// Penalty applied to matches that only hit a keyword.
const KEYWORD: i32 = 3;

/// A successful match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuzzyMatch {
    /// Higher is better.
    pub score: i32,
    /// Character positions in the target that matched, ascending.
    pub positions: SmallVec<[usize; 8]>,
}

/// Match `query` as a case-insensitive subsequence of `target`.
///
/// Consecutive matches and matches at word starts score higher; gaps between
/// matched characters cost up to ten points each. Returns `None` for an empty
/// query or when some query character is missing.
pub fn fuzzy_match(query: &str, target: &str) -> Option<FuzzyMatch> {
    let query: SmallVec<[char; 16]> = query.chars().flat_map(char::to_lowercase).collect();
    if query.is_empty() {
        return None;
    }
    let mut positions = SmallVec::new();
    let mut score = 0_i32;
    let mut qi = 0;
    let mut prev: Option<usize> = None;
    let mut prev_char: Option<char> = None;
    for (i, c) in target.chars().flat_map(char::to_lowercase).enumerate() {
        if qi < query.len() && c == query[qi] {
            if let Some(p) = prev {
                if i == p + 1 {
                    score += CONSECUTIVE;
                } else {
                    score -= gap_penalty(i - p - 1);
                }
            }
            if prev_char.is_none_or(|pc| !pc.is_alphanumeric()) {
                score += WORD_START;
            }
            score += 1;
            positions.push(i);
            prev = Some(i);
            qi += 1;
        }
        prev_char = Some(c);
    }
    (qi == query.len()).then_some(FuzzyMatch { score, positions })
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "the gap is clamped to a small constant first"
)]
fn gap_penalty(gap: usize) -> i32 {
    gap.min(MAX_GAP) as i32
}

/// Score a node's label and keywords against `query`.
///
/// The best of the label score and the keyword scores wins; keyword-only
/// matches rank slightly below an equal label match. Exact and prefix label
/// matches receive a bonus so that typing an item's full name ranks it first.
pub fn score_node<'a>(
    query: &str,
    label: &str,
    keywords: impl IntoIterator<Item = &'a str>,
) -> Option<i32> {
    let query = query.trim();
    let mut best = fuzzy_match(query, label).map(|m| {
        let (label, query) = (label.to_lowercase(), query.to_lowercase());
        if label == query {
            m.score + EXACT
        } else if label.starts_with(&query) {
            m.score + PREFIX
        } else {
            m.score
        }
    });
    for kw in keywords {
        if let Some(m) = fuzzy_match(query, kw) {
            let s = m.score - KEYWORD;
            best = Some(best.map_or(s, |b| b.max(s)));
        }
    }
    best
}
