//! Swappable heuristics behind the predictor: intent inference and emphasis selection.
//!
//! The lexical defaults are intentionally approximate. A learned model can replace either
//! one without touching the rate, pause or pitch arithmetic.

use crate::prosody::lexicon::{self, Word};
use crate::prosody::Intent;

pub trait IntentClassifier: Send + Sync {
    /// Infers the communicative intent of `text`, `None` when nothing matches.
    fn classify(&self, text: &str) -> Option<Intent>;
}

pub trait EmphasisStrategy: Send + Sync {
    /// Picks up to `count` word indices to stress. The predictor sorts and dedups the result.
    fn select(&self, words: &[Word<'_>], count: usize) -> Vec<usize>;
}

/// Cue phrases checked in order; the first hit wins.
const INTENT_CUES: &[(Intent, &[&str])] = &[
    (
        Intent::Contain,
        &[
            "breathe",
            "breath",
            "you're safe",
            "you are safe",
            "i'm here",
            "i am here",
            "take your time",
            "slow down",
        ],
    ),
    (
        Intent::Blessing,
        &[
            "may you",
            "bless",
            "blessed",
            "blessing",
            "blessings",
            "wishing you",
        ],
    ),
    (
        Intent::Boundary,
        &[
            "i can't",
            "i cannot",
            "i won't",
            "not able to",
            "boundary",
            "not something i",
        ],
    ),
    (
        Intent::Mirror,
        &[
            "it sounds like",
            "i hear",
            "you feel",
            "you're feeling",
            "it seems like",
        ],
    ),
    (
        Intent::Reframe,
        &[
            "what if",
            "another way",
            "instead",
            "on the other hand",
            "look at it",
        ],
    ),
    (
        Intent::Invite,
        &[
            "would you like",
            "invite",
            "if you want",
            "feel free",
            "you might",
        ],
    ),
    (
        Intent::Story,
        &["once upon", "imagine", "there was", "long ago", "story"],
    ),
    (
        Intent::Instruction,
        &["let's", "step", "try", "first", "next", "start by", "make sure"],
    ),
];

const QUESTION_OPENERS: &[&str] = &["what", "why", "how", "when", "where", "who", "which"];

/// Keyword and punctuation based intent inference.
#[derive(Clone, Copy, Debug, Default)]
pub struct LexicalIntentClassifier;

impl LexicalIntentClassifier {
    pub fn new() -> Self {
        Self
    }
}

fn contains_phrase(words: &[String], phrase: &str) -> bool {
    let needle: Vec<&str> = phrase.split_whitespace().collect();
    if needle.is_empty() || needle.len() > words.len() {
        return false;
    }
    words
        .windows(needle.len())
        .any(|window| window.iter().zip(&needle).all(|(w, n)| w == n))
}

impl IntentClassifier for LexicalIntentClassifier {
    fn classify(&self, text: &str) -> Option<Intent> {
        let trimmed = text.trim_end();
        if trimmed.ends_with('?') {
            return Some(Intent::Question);
        }

        let words: Vec<String> = lexicon::tokenize(trimmed)
            .into_iter()
            .map(lexicon::normalize)
            .filter(|w| !w.is_empty())
            .collect();

        for (intent, cues) in INTENT_CUES {
            if cues.iter().any(|cue| contains_phrase(&words, cue)) {
                return Some(*intent);
            }
        }

        match words.first() {
            Some(first) if QUESTION_OPENERS.contains(&first.as_str()) => Some(Intent::Question),
            _ => None,
        }
    }
}

/// Stop-word aware, length tiered emphasis scoring.
#[derive(Clone, Copy, Debug, Default)]
pub struct LexicalEmphasis;

impl LexicalEmphasis {
    pub fn new() -> Self {
        Self
    }

    pub fn score(word: &Word<'_>) -> f64 {
        if word.core.is_empty() || word.is_stop_word() {
            return 0.0;
        }
        match word.char_len() {
            n if n >= 7 => 2.0,
            n if n >= 5 => 1.2,
            _ => 0.8,
        }
    }
}

impl EmphasisStrategy for LexicalEmphasis {
    fn select(&self, words: &[Word<'_>], count: usize) -> Vec<usize> {
        let mut scored: Vec<(usize, f64, bool)> = words
            .iter()
            .map(|w| (w.index, Self::score(w), !w.core.is_empty()))
            .collect();
        // Stable sort keeps earlier words ahead on ties; symbol-only tokens fill last.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(b.2.cmp(&a.2)));

        let mut picked: Vec<usize> =
            scored.into_iter().take(count).map(|(i, _, _)| i).collect();
        picked.sort_unstable();
        picked
    }
}
