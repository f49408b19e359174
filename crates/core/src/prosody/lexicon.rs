//! Whitespace tokenization and the lexical heuristics built on it.
//!
//! Syllable counts here only pace breathing; they make no claim to linguistic accuracy.

/// Trailing marks that already imply a pause in the synthesized speech.
pub const STRONG_PUNCTUATION: [char; 6] = [',', '.', ';', ':', '!', '?'];

/// Quotes and brackets that may close a token after its punctuation.
pub const CLOSING_MARKS: [char; 7] = ['"', '\'', '\u{201D}', '\u{2019}', ')', ']', '}'];

const VOWELS: [char; 6] = ['a', 'e', 'i', 'o', 'u', 'y'];

const STOP_WORDS: &[&str] = &[
    "a", "about", "all", "am", "an", "and", "are", "as", "at", "be", "been", "but", "by", "can",
    "could", "did", "do", "does", "for", "from", "had", "has", "have", "he", "her", "here", "him",
    "his", "i", "if", "in", "into", "is", "it", "it's", "its", "just", "let's", "lets", "me",
    "my", "no", "not", "of", "on", "or", "our", "out", "she", "should", "so", "some", "than",
    "that", "the", "their", "them", "then", "there", "these", "they", "this", "those", "to", "up",
    "us", "was", "we", "were", "what", "when", "which", "who", "will", "with", "would", "you",
    "your",
];

#[derive(Clone, Debug, PartialEq)]
pub struct Word<'a> {
    pub index: usize,
    /// Token as it appears in the text, punctuation included.
    pub raw: &'a str,
    /// Token stripped of surrounding punctuation and symbols.
    pub core: &'a str,
    pub syllables: f64,
}

impl Word<'_> {
    pub fn char_len(&self) -> usize {
        self.core.chars().count()
    }

    pub fn is_stop_word(&self) -> bool {
        is_stop_word(self.core)
    }
}

pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

pub fn words(text: &str) -> Vec<Word<'_>> {
    tokenize(text)
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let core = core_of(raw);
            Word {
                index,
                raw,
                core,
                syllables: estimate_syllables(core),
            }
        })
        .collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '\'' || c == '\u{2019}'
}

fn core_of(token: &str) -> &str {
    token
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .trim_end_matches(|c: char| !is_word_char(c) || c == '\'' || c == '\u{2019}')
}

/// Lowercased core with typographic apostrophes folded to ASCII.
pub fn normalize(token: &str) -> String {
    core_of(token)
        .chars()
        .map(|c| if c == '\u{2019}' { '\'' } else { c })
        .flat_map(char::to_lowercase)
        .collect()
}

/// Counts vowel runs, discounting half a syllable for a silent trailing "e". Never below one.
pub fn estimate_syllables(word: &str) -> f64 {
    let lower = word.to_lowercase();
    let mut runs = 0u32;
    let mut in_run = false;
    for c in lower.chars().filter(|c| c.is_alphabetic()) {
        let vowel = VOWELS.contains(&c);
        if vowel && !in_run {
            runs += 1;
        }
        in_run = vowel;
    }
    let mut count = f64::from(runs);
    if lower.ends_with('e') {
        count -= 0.5;
    }
    count.max(1.0)
}

pub fn is_stop_word(word: &str) -> bool {
    let normalized = normalize(word);
    STOP_WORDS.contains(&normalized.as_str())
}

/// Splits `token` into its body and any trailing run of strong punctuation.
pub fn split_trailing_punctuation(token: &str) -> (&str, &str) {
    let body = token.trim_end_matches(|c: char| STRONG_PUNCTUATION.contains(&c));
    (body, &token[body.len()..])
}

/// Splits `token` into leading symbols, its word core and trailing symbols.
pub fn split_core(token: &str) -> (&str, &str, &str) {
    let core = core_of(token);
    let start = token.len() - token.trim_start_matches(|c: char| !c.is_alphanumeric()).len();
    let end = start + core.len();
    (&token[..start], core, &token[end..])
}

/// Whether `token` ends in strong punctuation, looking past closing quotes and brackets.
pub fn ends_with_strong_punctuation(token: &str) -> bool {
    token
        .trim_end_matches(CLOSING_MARKS)
        .ends_with(STRONG_PUNCTUATION)
}
