use crate::clock::{Clock, SystemClock};
use crate::config::TrackerConfig;
use crate::rhythm::{
    compute_metrics, EventOutcome, MetricsSink, NullSink, RhythmMetrics, TrackerWarning,
    Utterance,
};
use crate::util::RingBuffer;

/// Live conversational timing derived from speech lifecycle events.
///
/// Events are expected from one logical timeline: one tracker per conversation. Every
/// completed utterance or assistant response republishes metrics to the sink.
pub struct RhythmTracker<C = SystemClock, S = NullSink> {
    clock: C,
    sink: S,
    config: TrackerConfig,
    history: RingBuffer<Utterance>,
    speech_started_at: Option<u64>,
    last_speech_end_at: Option<u64>,
    last_response_at: Option<u64>,
    total_utterances: u64,
}

impl<C, S> RhythmTracker<C, S>
where
    C: Clock,
    S: MetricsSink,
{
    pub fn new(clock: C, sink: S) -> Self {
        Self::with_config(clock, sink, TrackerConfig::default())
    }

    pub fn with_config(clock: C, sink: S, config: TrackerConfig) -> Self {
        Self {
            clock,
            sink,
            config,
            history: RingBuffer::new(config.history_capacity),
            speech_started_at: None,
            last_speech_end_at: None,
            last_response_at: None,
            total_utterances: 0,
        }
    }

    /// A second start before the matching end replaces the first.
    pub fn on_speech_start(&mut self) {
        let now = self.clock.now_ms();
        if let Some(previous) = self.speech_started_at.replace(now) {
            tracing::warn!(
                previous_ms = previous,
                now_ms = now,
                "speech start overwrote a pending start"
            );
        }
    }

    pub fn on_speech_end(&mut self, transcript: &str) -> EventOutcome {
        let Some(started_at) = self.speech_started_at.take() else {
            let warning = TrackerWarning::SpeechEndWithoutStart;
            tracing::warn!(%warning, "ignoring speech end");
            return EventOutcome::Ignored(warning);
        };

        let now = self.clock.now_ms();
        let pause_before_ms = self
            .history
            .last()
            .map_or(0, |prev| started_at.saturating_sub(prev.ended_at_ms));
        let utterance = Utterance {
            started_at_ms: started_at,
            ended_at_ms: now,
            word_count: transcript.split_whitespace().count(),
            transcript: transcript.to_owned(),
            duration_ms: now.saturating_sub(started_at),
            pause_before_ms,
        };

        if let Some(evicted) = self.history.push(utterance) {
            tracing::trace!(started_at_ms = evicted.started_at_ms, "utterance evicted");
        }
        self.last_speech_end_at = Some(now);
        self.total_utterances += 1;
        self.publish();
        EventOutcome::Recorded
    }

    /// The assistant began responding; latency is measured from the last speech end.
    pub fn on_assistant_response(&mut self) {
        self.last_response_at = Some(self.clock.now_ms());
        self.publish();
    }

    /// Starts a new session. Nothing is published.
    pub fn reset(&mut self) {
        self.history.clear();
        self.speech_started_at = None;
        self.last_speech_end_at = None;
        self.last_response_at = None;
        self.total_utterances = 0;
    }

    pub fn current_metrics(&self) -> RhythmMetrics {
        let window: Vec<&Utterance> = self.history.newest(self.config.metrics_window).collect();
        compute_metrics(
            &window,
            self.last_speech_end_at,
            self.last_response_at,
            self.total_utterances,
        )
    }

    pub fn is_user_speaking(&self) -> bool {
        self.speech_started_at.is_some()
    }

    /// Retained utterances, oldest first.
    pub fn utterances(&self) -> impl Iterator<Item = &Utterance> {
        self.history.iter()
    }

    pub fn total_utterances(&self) -> u64 {
        self.total_utterances
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    fn publish(&mut self) {
        let metrics = self.current_metrics();
        tracing::debug!(
            tempo = %metrics.tempo,
            wpm = metrics.words_per_minute,
            coherence = metrics.rhythm_coherence,
            latency_ms = metrics.turn_taking_latency_ms,
            total = metrics.total_utterances,
            "rhythm metrics updated"
        );
        self.sink.publish(&metrics);
    }
}
