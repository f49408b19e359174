use crate::prosody::lexicon::{self, Word};
use crate::prosody::strategy::{
    EmphasisStrategy, IntentClassifier, LexicalEmphasis, LexicalIntentClassifier,
};
use crate::prosody::{
    markup, EnergyProfile, Intent, PauseMs, PitchControls, ProsodyControls, ProsodyInput,
    VoiceRegister,
};
use crate::util::clamp01;

pub const WPM_MIN: u32 = 105;
pub const WPM_MAX: u32 = 200;

const PITCH_HZ_MIN: f64 = 120.0;
const PITCH_HZ_MAX: f64 = 240.0;
const RANGE_ST_MIN: f64 = 2.0;
const RANGE_ST_MAX: f64 = 6.0;

fn base_wpm(register: VoiceRegister) -> f64 {
    match register {
        VoiceRegister::Earth => 130.0,
        VoiceRegister::Water => 140.0,
        VoiceRegister::Metal => 150.0,
        VoiceRegister::Ether => 152.0,
        VoiceRegister::Air => 158.0,
        VoiceRegister::Fire => 170.0,
    }
}

fn pause_scale(register: VoiceRegister) -> f64 {
    match register {
        VoiceRegister::Earth => 1.15,
        VoiceRegister::Water => 1.10,
        VoiceRegister::Ether => 1.05,
        VoiceRegister::Metal => 1.0,
        VoiceRegister::Air => 0.95,
        VoiceRegister::Fire => 0.85,
    }
}

fn pitch_offset_hz(register: VoiceRegister) -> f64 {
    match register {
        VoiceRegister::Air | VoiceRegister::Ether => 10.0,
        VoiceRegister::Earth => -10.0,
        VoiceRegister::Water | VoiceRegister::Fire | VoiceRegister::Metal => 0.0,
    }
}

fn range_offset_st(register: VoiceRegister) -> f64 {
    match register {
        VoiceRegister::Earth => -0.6,
        VoiceRegister::Fire => 0.6,
        VoiceRegister::Water | VoiceRegister::Air | VoiceRegister::Ether | VoiceRegister::Metal => {
            0.0
        }
    }
}

/// Maps text plus an affect signal to advisory prosody controls.
///
/// Intent inference and emphasis selection are delegated to the two strategies; everything
/// else is fixed arithmetic over the register tables.
#[derive(Clone, Debug, Default)]
pub struct ProsodyPredictor<C = LexicalIntentClassifier, E = LexicalEmphasis> {
    classifier: C,
    emphasis: E,
}

impl ProsodyPredictor {
    pub fn new() -> Self {
        Self {
            classifier: LexicalIntentClassifier::new(),
            emphasis: LexicalEmphasis::new(),
        }
    }
}

impl<C, E> ProsodyPredictor<C, E>
where
    C: IntentClassifier,
    E: EmphasisStrategy,
{
    pub fn with_strategies(classifier: C, emphasis: E) -> Self {
        Self {
            classifier,
            emphasis,
        }
    }

    /// The explicit intent, or the classifier's guess from the text.
    pub fn resolve_intent(&self, input: &ProsodyInput) -> Option<Intent> {
        input
            .intent
            .or_else(|| self.classifier.classify(&input.text))
    }

    pub fn predict(&self, input: &ProsodyInput) -> ProsodyControls {
        let words = lexicon::words(&input.text);
        if words.is_empty() {
            tracing::debug!(register = %input.register, "empty text, using default controls");
            return ProsodyControls::default();
        }

        let arousal = clamp01(input.arousal);
        let valence = clamp01(input.valence);
        let register = input.register;
        let intent = self.resolve_intent(input);

        let controls = ProsodyControls {
            wpm: speaking_rate(register, arousal, intent, input.wpm_override),
            pause_ms: pauses(register, valence, intent),
            pitch: pitch(register, arousal, valence, intent, &input.text),
            emphasis_word_idx: self.emphasis_points(&words),
            breath_after_word_idx: breath_points(&words, arousal),
            energy_profile: energy_profile(register, intent),
        };

        tracing::debug!(
            %register,
            intent = intent.map(Intent::as_str).unwrap_or("none"),
            words = words.len(),
            wpm = controls.wpm,
            breaths = controls.breath_after_word_idx.len(),
            "prosody predicted"
        );
        controls
    }

    pub fn markup(&self, text: &str, controls: &ProsodyControls) -> String {
        markup(text, controls)
    }

    fn emphasis_points(&self, words: &[Word<'_>]) -> Vec<usize> {
        let count = ((words.len() as f64 / 12.0).round() as usize).clamp(1, 3);
        let mut picked = self.emphasis.select(words, count);
        picked.retain(|&i| i < words.len());
        picked.sort_unstable();
        picked.dedup();
        picked.truncate(count);
        picked
    }
}

/// Predicts with the lexical default strategies.
pub fn predict(input: &ProsodyInput) -> ProsodyControls {
    ProsodyPredictor::new().predict(input)
}

fn speaking_rate(
    register: VoiceRegister,
    arousal: f64,
    intent: Option<Intent>,
    wpm_override: Option<u32>,
) -> u32 {
    if let Some(wpm) = wpm_override {
        return wpm.clamp(WPM_MIN, WPM_MAX);
    }

    let mut wpm = base_wpm(register) * (0.85 + 0.30 * arousal);
    wpm *= match intent {
        Some(Intent::Blessing | Intent::Contain) => 0.92,
        Some(Intent::Instruction | Intent::Reframe) => 1.05,
        _ => 1.0,
    };
    (wpm.round() as u32).clamp(WPM_MIN, WPM_MAX)
}

fn pauses(register: VoiceRegister, valence: f64, intent: Option<Intent>) -> PauseMs {
    let mut scale = pause_scale(register);
    if matches!(intent, Some(Intent::Question | Intent::Instruction)) {
        scale *= 0.95;
    }
    if valence < 0.35 {
        scale *= 1.10;
    }

    let scaled = |base: u32| ((f64::from(base) * scale).round() as u32).max(1);
    let base = PauseMs::default();
    PauseMs {
        comma: scaled(base.comma),
        dash: scaled(base.dash),
        period: scaled(base.period),
        paragraph: scaled(base.paragraph),
        breath: scaled(base.breath),
    }
}

fn pitch(
    register: VoiceRegister,
    arousal: f64,
    valence: f64,
    intent: Option<Intent>,
    text: &str,
) -> PitchControls {
    let baseline_hz = (170.0 + pitch_offset_hz(register) + (valence - 0.5) * 20.0)
        .clamp(PITCH_HZ_MIN, PITCH_HZ_MAX);
    let range_semitones =
        (3.2 + 2.0 * arousal + range_offset_st(register)).clamp(RANGE_ST_MIN, RANGE_ST_MAX);

    let mut slope = 0.0;
    if intent == Some(Intent::Instruction) || register.is_grounded() {
        slope -= 0.5;
    }
    if intent == Some(Intent::Question) || register.is_airy() {
        slope += 0.4;
    }

    let final_rise = intent == Some(Intent::Question)
        || text.trim_end().ends_with(['?', '!'])
        || (register.is_airy() && arousal >= 0.4);

    PitchControls {
        baseline_hz,
        slope: f64::clamp(slope, -1.0, 1.0),
        range_semitones,
        final_rise,
    }
}

/// Calmer speech accumulates more syllables between breaths.
fn breath_points(words: &[Word<'_>], arousal: f64) -> Vec<usize> {
    let threshold = (18.0 - 6.0 * arousal).clamp(10.0, 18.0);
    let mut acc = 0.0;
    let mut points = Vec::new();
    for word in words {
        acc += word.syllables;
        if acc >= threshold {
            points.push(word.index);
            acc = 0.0;
        }
    }
    points
}

fn energy_profile(register: VoiceRegister, intent: Option<Intent>) -> EnergyProfile {
    if register == VoiceRegister::Earth || intent == Some(Intent::Contain) {
        EnergyProfile::Even
    } else if register == VoiceRegister::Water || intent == Some(Intent::Blessing) {
        EnergyProfile::Taper
    } else {
        EnergyProfile::Crescendo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_scales_with_arousal_and_intent() {
        assert_eq!(speaking_rate(VoiceRegister::Water, 0.5, None, None), 140);
        assert_eq!(speaking_rate(VoiceRegister::Water, 0.0, None, None), 119);
        assert_eq!(speaking_rate(VoiceRegister::Water, 1.0, None, None), 161);
        assert_eq!(
            speaking_rate(VoiceRegister::Water, 0.5, Some(Intent::Contain), None),
            129
        );
        assert_eq!(
            speaking_rate(VoiceRegister::Water, 0.5, Some(Intent::Reframe), None),
            147
        );
    }

    #[test]
    fn rate_override_is_clamped() {
        assert_eq!(speaking_rate(VoiceRegister::Fire, 1.0, None, Some(90)), WPM_MIN);
        assert_eq!(speaking_rate(VoiceRegister::Fire, 1.0, None, Some(400)), WPM_MAX);
        assert_eq!(speaking_rate(VoiceRegister::Earth, 0.0, None, Some(160)), 160);
    }

    #[test]
    fn pauses_compose_register_intent_and_mood() {
        let metal = pauses(VoiceRegister::Metal, 0.5, None);
        assert_eq!(metal, PauseMs::default());

        let low_mood_question = pauses(VoiceRegister::Metal, 0.2, Some(Intent::Question));
        // 380 * 0.95 * 1.10 = 397.1
        assert_eq!(low_mood_question.period, 397);

        let fire = pauses(VoiceRegister::Fire, 0.9, None);
        assert_eq!(fire.comma, 119);
        assert_eq!(fire.breath, 357);
    }

    #[test]
    fn pitch_slope_and_rise() {
        let grounded_instruction =
            pitch(VoiceRegister::Earth, 0.2, 0.5, Some(Intent::Instruction), "Do this.");
        assert_eq!(grounded_instruction.slope, -0.5);
        assert!(!grounded_instruction.final_rise);
        assert_eq!(grounded_instruction.baseline_hz, 160.0);

        let airy_question = pitch(VoiceRegister::Air, 0.1, 1.0, Some(Intent::Question), "Why");
        assert!((airy_question.slope - 0.4).abs() < 1e-9);
        assert!(airy_question.final_rise);
        assert_eq!(airy_question.baseline_hz, 190.0);

        let exclaim = pitch(VoiceRegister::Metal, 0.0, 0.5, None, "Look!");
        assert!(exclaim.final_rise);

        let airy_lively = pitch(VoiceRegister::Ether, 0.4, 0.5, None, "Onward.");
        assert!(airy_lively.final_rise);
    }

    #[test]
    fn range_tracks_arousal_within_bounds() {
        let calm = pitch(VoiceRegister::Earth, 0.0, 0.5, None, "x");
        assert!((calm.range_semitones - 2.6).abs() < 1e-9);
        let intense = pitch(VoiceRegister::Fire, 1.0, 0.5, None, "x");
        assert!((intense.range_semitones - 5.8).abs() < 1e-9);
    }

    #[test]
    fn breath_threshold_depends_on_arousal() {
        let text = "one two three four five six seven eight nine ten eleven twelve";
        let words = lexicon::words(text);
        // Calm: threshold 18 syllables; lively: threshold 12.
        let calm = breath_points(&words, 0.0);
        let lively = breath_points(&words, 1.0);
        assert!(lively.len() >= calm.len());
        assert!(calm.windows(2).all(|w| w[0] < w[1]));
        assert!(breath_points(&lexicon::words("short"), 0.5).is_empty());
    }

    #[test]
    fn energy_profile_rules() {
        assert_eq!(energy_profile(VoiceRegister::Earth, None), EnergyProfile::Even);
        assert_eq!(
            energy_profile(VoiceRegister::Fire, Some(Intent::Contain)),
            EnergyProfile::Even
        );
        assert_eq!(energy_profile(VoiceRegister::Water, None), EnergyProfile::Taper);
        assert_eq!(
            energy_profile(VoiceRegister::Air, Some(Intent::Blessing)),
            EnergyProfile::Taper
        );
        assert_eq!(energy_profile(VoiceRegister::Fire, None), EnergyProfile::Crescendo);
    }
}
