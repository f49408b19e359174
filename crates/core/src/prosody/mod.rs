pub mod lexicon;
mod markup;
mod predictor;
pub mod strategy;


use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub use markup::markup;
pub use predictor::{predict, ProsodyPredictor, WPM_MAX, WPM_MIN};
pub use strategy::{EmphasisStrategy, IntentClassifier, LexicalEmphasis, LexicalIntentClassifier};

/// Named style bucket selecting the baseline timing and pitch tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceRegister {
    /// Grounded: slowest rate, lowest pitch, falling contour.
    Earth,
    /// Flowing: tapering energy.
    Water,
    /// Energetic: fastest rate, widest range.
    Fire,
    Air,
    Ether,
    Metal,
}

impl VoiceRegister {
    pub const ALL: [VoiceRegister; 6] = [
        VoiceRegister::Earth,
        VoiceRegister::Water,
        VoiceRegister::Fire,
        VoiceRegister::Air,
        VoiceRegister::Ether,
        VoiceRegister::Metal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VoiceRegister::Earth => "earth",
            VoiceRegister::Water => "water",
            VoiceRegister::Fire => "fire",
            VoiceRegister::Air => "air",
            VoiceRegister::Ether => "ether",
            VoiceRegister::Metal => "metal",
        }
    }

    pub fn is_airy(self) -> bool {
        matches!(self, VoiceRegister::Air | VoiceRegister::Ether)
    }

    pub fn is_grounded(self) -> bool {
        self == VoiceRegister::Earth
    }
}

impl fmt::Display for VoiceRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown voice register: {0:?}")]
pub struct ParseRegisterError(pub String);

impl FromStr for VoiceRegister {
    type Err = ParseRegisterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        VoiceRegister::ALL
            .into_iter()
            .find(|r| r.as_str() == needle)
            .ok_or_else(|| ParseRegisterError(s.to_owned()))
    }
}

/// Communicative intent of the utterance being voiced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Question,
    Instruction,
    Blessing,
    Mirror,
    Boundary,
    Story,
    Reframe,
    Invite,
    Contain,
}

impl Intent {
    pub const ALL: [Intent; 9] = [
        Intent::Question,
        Intent::Instruction,
        Intent::Blessing,
        Intent::Mirror,
        Intent::Boundary,
        Intent::Story,
        Intent::Reframe,
        Intent::Invite,
        Intent::Contain,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Question => "question",
            Intent::Instruction => "instruction",
            Intent::Blessing => "blessing",
            Intent::Mirror => "mirror",
            Intent::Boundary => "boundary",
            Intent::Story => "story",
            Intent::Reframe => "reframe",
            Intent::Invite => "invite",
            Intent::Contain => "contain",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown intent: {0:?}")]
pub struct ParseIntentError(pub String);

impl FromStr for Intent {
    type Err = ParseIntentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Intent::ALL
            .into_iter()
            .find(|i| i.as_str() == needle)
            .ok_or_else(|| ParseIntentError(s.to_owned()))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProsodyInput {
    pub text: String,
    pub register: VoiceRegister,
    /// Activation intensity, expected in [0, 1].
    pub arousal: f64,
    /// Positivity, expected in [0, 1].
    pub valence: f64,
    /// Inferred from the text when absent.
    #[serde(default)]
    pub intent: Option<Intent>,
    /// Replaces the computed rate; still clamped to the supported range.
    #[serde(default)]
    pub wpm_override: Option<u32>,
}

impl ProsodyInput {
    pub fn new<S: Into<String>>(text: S, register: VoiceRegister) -> Self {
        Self {
            text: text.into(),
            register,
            arousal: 0.5,
            valence: 0.5,
            intent: None,
            wpm_override: None,
        }
    }

    pub fn with_affect(mut self, arousal: f64, valence: f64) -> Self {
        self.arousal = arousal;
        self.valence = valence;
        self
    }

    pub fn with_intent(mut self, intent: Intent) -> Self {
        self.intent = Some(intent);
        self
    }

    pub fn with_wpm(mut self, wpm: u32) -> Self {
        self.wpm_override = Some(wpm);
        self
    }
}

/// Pause budget in milliseconds per boundary kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseMs {
    pub comma: u32,
    pub dash: u32,
    pub period: u32,
    pub paragraph: u32,
    pub breath: u32,
}

impl Default for PauseMs {
    fn default() -> Self {
        Self {
            comma: 140,
            dash: 220,
            period: 380,
            paragraph: 600,
            breath: 420,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchControls {
    pub baseline_hz: f64,
    /// Negative values fall over the utterance.
    pub slope: f64,
    pub range_semitones: f64,
    pub final_rise: bool,
}

impl Default for PitchControls {
    fn default() -> Self {
        Self {
            baseline_hz: 170.0,
            slope: 0.0,
            range_semitones: 3.2,
            final_rise: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyProfile {
    #[default]
    Even,
    Taper,
    Crescendo,
}

/// Advisory acoustic controls for one utterance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProsodyControls {
    pub wpm: u32,
    pub pause_ms: PauseMs,
    pub pitch: PitchControls,
    /// Ascending, distinct word positions.
    pub emphasis_word_idx: Vec<usize>,
    /// Ascending word positions followed by a breath.
    pub breath_after_word_idx: Vec<usize>,
    pub energy_profile: EnergyProfile,
}

impl Default for ProsodyControls {
    fn default() -> Self {
        Self {
            wpm: 150,
            pause_ms: PauseMs::default(),
            pitch: PitchControls::default(),
            emphasis_word_idx: Vec::new(),
            breath_after_word_idx: Vec::new(),
            energy_profile: EnergyProfile::default(),
        }
    }
}

impl ProsodyControls {
    /// Rough spoken length of `text` under these controls: words at `wpm` plus the pause
    /// budget for punctuation, paragraph breaks and breath slots.
    pub fn estimate_duration(&self, text: &str) -> Duration {
        let tokens = lexicon::tokenize(text);
        let word_count = tokens.iter().filter(|t| !lexicon::normalize(t).is_empty()).count();
        let speech_ms = word_count as f64 * 60_000.0 / f64::from(self.wpm.max(1));

        let p = &self.pause_ms;
        let mut pause_ms = 0u64;
        for token in &tokens {
            let (body, trailing) = lexicon::split_trailing_punctuation(token);
            pause_ms += if trailing.contains(['.', '!', '?']) {
                u64::from(p.period)
            } else if trailing.contains([';', ':'])
                || matches!(body, "-" | "\u{2013}" | "\u{2014}")
            {
                u64::from(p.dash)
            } else if trailing.contains(',') {
                u64::from(p.comma)
            } else {
                0
            };
        }

        let paragraphs = text.split("\n\n").filter(|s| !s.trim().is_empty()).count();
        pause_ms += paragraphs.saturating_sub(1) as u64 * u64::from(p.paragraph);
        pause_ms += self.breath_after_word_idx.len() as u64 * u64::from(p.breath);

        Duration::from_millis(speech_ms.round() as u64 + pause_ms)
    }
}
