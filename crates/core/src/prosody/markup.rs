//! Plain-text prosody hints for synthesizers without structured prosody input.
//!
//! Word tokens and their order are never changed; only delimiters, breath marks and
//! punctuation are added.

use crate::prosody::lexicon::{self, CLOSING_MARKS, STRONG_PUNCTUATION};
use crate::prosody::ProsodyControls;

const EMPHASIS_DELIMITER: char = '*';
const BREATH_MARK: &str = "\u{2026}";
const LONG_DASH: &str = " \u{2014}";

/// Emphasis becomes `*word*`, breath slots become an ellipsis token, semicolons become a
/// long dash, and a final rise without closing `?`/`!` gets a trailing `?`.
pub fn markup(text: &str, controls: &ProsodyControls) -> String {
    let tokens = lexicon::tokenize(text);
    let mut parts: Vec<String> =
        Vec::with_capacity(tokens.len() + controls.breath_after_word_idx.len());

    for (idx, token) in tokens.iter().enumerate() {
        let (body, trailing) = lexicon::split_trailing_punctuation(token);

        let mut piece = String::with_capacity(token.len() + 4);
        let (lead, core, tail) = lexicon::split_core(body);
        if controls.emphasis_word_idx.contains(&idx) && !core.is_empty() {
            piece.push_str(lead);
            piece.push(EMPHASIS_DELIMITER);
            piece.push_str(core);
            piece.push(EMPHASIS_DELIMITER);
            piece.push_str(tail);
        } else {
            piece.push_str(body);
        }
        for c in trailing.chars() {
            if c == ';' {
                piece.push_str(LONG_DASH);
            } else {
                piece.push(c);
            }
        }
        parts.push(piece);

        if controls.breath_after_word_idx.contains(&idx)
            && !lexicon::ends_with_strong_punctuation(token)
        {
            parts.push(BREATH_MARK.to_owned());
        }
    }

    let mut out = tidy_spacing(&parts.join(" "));
    let closed = out.trim_end_matches(CLOSING_MARKS).ends_with(['!', '?']);
    if controls.pitch.final_rise && !out.is_empty() && !closed {
        out.push('?');
    }
    out
}

/// Collapses whitespace runs and pulls detached punctuation back onto the previous word.
/// Punctuation that leads into a word is left alone so tokens never merge.
fn tidy_spacing(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            if !out.is_empty() && !out.ends_with(' ') {
                out.push(' ');
            }
            continue;
        }
        let detached = match chars.peek() {
            Some(next) => next.is_whitespace() || STRONG_PUNCTUATION.contains(next),
            None => true,
        };
        if STRONG_PUNCTUATION.contains(&c) && detached {
            while out.ends_with(' ') {
                out.pop();
            }
        }
        out.push(c);
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}
