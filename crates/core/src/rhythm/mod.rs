mod metrics;
mod tracker;


use futures::channel::mpsc::UnboundedSender;
use serde::{Deserialize, Serialize};

pub use metrics::{classify_tempo, compute_metrics};
pub use tracker::RhythmTracker;

/// One completed user utterance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utterance {
    pub started_at_ms: u64,
    pub ended_at_ms: u64,
    pub transcript: String,
    pub word_count: usize,
    pub duration_ms: u64,
    /// Gap since the previous utterance ended, zero for the first.
    pub pause_before_ms: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tempo {
    Slow,
    #[default]
    Medium,
    Fast,
    Dynamic,
}

impl Tempo {
    pub fn as_str(self) -> &'static str {
        match self {
            Tempo::Slow => "slow",
            Tempo::Medium => "medium",
            Tempo::Fast => "fast",
            Tempo::Dynamic => "dynamic",
        }
    }
}

impl std::fmt::Display for Tempo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive snapshot of the conversation's timing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RhythmMetrics {
    pub tempo: Tempo,
    pub words_per_minute: f64,
    /// Regularity of utterance spacing, in [0, 1].
    pub rhythm_coherence: f64,
    /// Share of pauses in the natural breath range, in [0, 1].
    pub breath_alignment: f64,
    /// Tolerance for long pauses, in [0, 1].
    pub silence_comfort: f64,
    pub average_pause_ms: f64,
    pub turn_taking_latency_ms: f64,
    /// Lifetime count, not capped by the history buffer.
    pub total_utterances: u64,
    /// Blend for visualization, in [0, 1].
    pub intensity_level: f64,
}

impl Default for RhythmMetrics {
    fn default() -> Self {
        compute_metrics(&[], None, None, 0)
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerWarning {
    #[error("speech ended without a matching speech start; utterance dropped")]
    SpeechEndWithoutStart,
}

/// Result of feeding an event to the tracker. Warnings are advisory only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventOutcome {
    Recorded,
    Ignored(TrackerWarning),
}

impl EventOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, EventOutcome::Recorded)
    }

    pub fn warning(&self) -> Option<TrackerWarning> {
        match self {
            EventOutcome::Recorded => None,
            EventOutcome::Ignored(w) => Some(*w),
        }
    }
}

/// Receives every freshly computed metrics snapshot.
pub trait MetricsSink {
    fn publish(&mut self, metrics: &RhythmMetrics);
}

impl<F> MetricsSink for F
where
    F: FnMut(&RhythmMetrics),
{
    fn publish(&mut self, metrics: &RhythmMetrics) {
        self(metrics)
    }
}

/// Discards snapshots; for callers that only poll `current_metrics`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl MetricsSink for NullSink {
    fn publish(&mut self, _metrics: &RhythmMetrics) {}
}

/// Forwards snapshots into an unbounded futures channel.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    tx: UnboundedSender<RhythmMetrics>,
    receiver_gone: bool,
}

impl ChannelSink {
    pub fn new(tx: UnboundedSender<RhythmMetrics>) -> Self {
        Self {
            tx,
            receiver_gone: false,
        }
    }
}

impl MetricsSink for ChannelSink {
    fn publish(&mut self, metrics: &RhythmMetrics) {
        if self.tx.unbounded_send(metrics.clone()).is_err() && !self.receiver_gone {
            self.receiver_gone = true;
            tracing::debug!("metrics receiver dropped, snapshots will be discarded");
        }
    }
}
