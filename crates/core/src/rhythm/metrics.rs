use crate::rhythm::{RhythmMetrics, Tempo, Utterance};
use crate::util::{clamp01, mean, std_dev};

const DEFAULT_AVERAGE_PAUSE_MS: f64 = 1000.0;
const DEFAULT_LATENCY_MS: f64 = 2000.0;
const NEUTRAL_SCORE: f64 = 0.5;
const BREATH_PAUSE_MS: std::ops::RangeInclusive<f64> = 2000.0..=4000.0;
const LONG_PAUSE_MS: f64 = 3000.0;

/// Fast, medium and slow need both rate and pause to agree; anything else is dynamic.
pub fn classify_tempo(words_per_minute: f64, average_pause_ms: f64) -> Tempo {
    if words_per_minute > 180.0 && average_pause_ms < 1500.0 {
        Tempo::Fast
    } else if words_per_minute > 120.0 && average_pause_ms < 2500.0 {
        Tempo::Medium
    } else if words_per_minute < 80.0 && average_pause_ms > 3000.0 {
        Tempo::Slow
    } else {
        Tempo::Dynamic
    }
}

/// Pure metrics over a window of utterances, oldest first.
///
/// An empty window yields the neutral defaults with `total_utterances` passed through.
pub fn compute_metrics(
    window: &[&Utterance],
    last_speech_end_ms: Option<u64>,
    last_response_ms: Option<u64>,
    total_utterances: u64,
) -> RhythmMetrics {
    let turn_taking_latency_ms = match (last_response_ms, last_speech_end_ms) {
        (Some(response), Some(end)) => response.saturating_sub(end) as f64,
        _ => DEFAULT_LATENCY_MS,
    };

    if window.is_empty() {
        let latency = DEFAULT_LATENCY_MS;
        return RhythmMetrics {
            tempo: Tempo::Medium,
            words_per_minute: 0.0,
            rhythm_coherence: NEUTRAL_SCORE,
            breath_alignment: NEUTRAL_SCORE,
            silence_comfort: NEUTRAL_SCORE,
            average_pause_ms: DEFAULT_AVERAGE_PAUSE_MS,
            turn_taking_latency_ms: latency,
            total_utterances,
            intensity_level: intensity(0.0, NEUTRAL_SCORE, latency),
        };
    }

    let words: usize = window.iter().map(|u| u.word_count).sum();
    let spoken_ms: u64 = window.iter().map(|u| u.duration_ms).sum();
    let words_per_minute = if spoken_ms > 0 {
        words as f64 / (spoken_ms as f64 / 60_000.0)
    } else {
        0.0
    };

    let pauses: Vec<f64> = window
        .iter()
        .filter(|u| u.pause_before_ms > 0)
        .map(|u| u.pause_before_ms as f64)
        .collect();
    let mean_pause = mean(&pauses);
    let average_pause_ms = mean_pause.unwrap_or(DEFAULT_AVERAGE_PAUSE_MS);

    let (breath_alignment, silence_comfort) = match mean_pause {
        Some(mean_pause) => {
            let n = pauses.len() as f64;
            let in_breath = pauses.iter().filter(|p| BREATH_PAUSE_MS.contains(*p)).count();
            let long = pauses.iter().filter(|p| **p > LONG_PAUSE_MS).count();
            let comfort = (long as f64 / n + (mean_pause / 5000.0).min(1.0)) / 2.0;
            (clamp01(in_breath as f64 / n), clamp01(comfort))
        }
        None => (NEUTRAL_SCORE, NEUTRAL_SCORE),
    };

    let rhythm_coherence = coherence(window);

    RhythmMetrics {
        tempo: classify_tempo(words_per_minute, average_pause_ms),
        words_per_minute,
        rhythm_coherence,
        breath_alignment,
        silence_comfort,
        average_pause_ms,
        turn_taking_latency_ms,
        total_utterances,
        intensity_level: intensity(words_per_minute, rhythm_coherence, turn_taking_latency_ms),
    }
}

/// One minus the coefficient of variation of start-to-start intervals.
fn coherence(window: &[&Utterance]) -> f64 {
    if window.len() < 3 {
        return NEUTRAL_SCORE;
    }
    let intervals: Vec<f64> = window
        .windows(2)
        .map(|pair| pair[1].started_at_ms.saturating_sub(pair[0].started_at_ms) as f64)
        .collect();
    match (mean(&intervals), std_dev(&intervals)) {
        (Some(m), Some(sd)) if m > 0.0 => clamp01(1.0 - sd / m),
        _ => NEUTRAL_SCORE,
    }
}

fn intensity(words_per_minute: f64, coherence: f64, latency_ms: f64) -> f64 {
    let pace = (words_per_minute / 200.0).min(1.0);
    let responsiveness = (1.0 - latency_ms / 5000.0).max(0.0);
    clamp01(0.4 * pace + 0.3 * coherence + 0.3 * responsiveness)
}
