#![deny(warnings)]

use anyhow::Context;
use cadence_core::clock::ManualClock;
use cadence_core::config::{StdEnv, TrackerConfig};
use cadence_core::prosody::{
    Intent, ProsodyControls, ProsodyInput, ProsodyPredictor, VoiceRegister,
};
use cadence_core::rhythm::{ChannelSink, EventOutcome, RhythmTracker};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cadence")]
#[command(about = "Prosody prediction and conversational rhythm tracking")]
struct Args {
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Predict prosody controls for one utterance and print them as JSON.
    Predict(PredictArgs),
    /// Replay newline-delimited JSON speech events from stdin and print each metrics snapshot.
    Replay(ReplayArgs),
}

#[derive(clap::Args, Debug)]
struct PredictArgs {
    #[arg(long)]
    text: String,

    #[arg(long, default_value = "metal")]
    register: VoiceRegister,

    #[arg(long, default_value_t = 0.5)]
    arousal: f64,

    #[arg(long, default_value_t = 0.5)]
    valence: f64,

    /// Inferred from the text when omitted.
    #[arg(long)]
    intent: Option<Intent>,

    #[arg(long)]
    wpm: Option<u32>,

    /// Also emit the marked-up text.
    #[arg(long)]
    markup: bool,
}

#[derive(clap::Args, Debug)]
struct ReplayArgs {
    #[arg(long)]
    history_capacity: Option<usize>,

    #[arg(long)]
    metrics_window: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictOutput<'a> {
    intent: Option<Intent>,
    controls: &'a ProsodyControls,
    estimated_duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    markup: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ReplayEvent {
    at_ms: u64,
    #[serde(flatten)]
    kind: EventKind,
}

#[derive(Deserialize, Debug)]
#[serde(tag = "event", rename_all = "snake_case")]
enum EventKind {
    SpeechStart,
    SpeechEnd {
        #[serde(default)]
        transcript: String,
    },
    Response,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    match args.command {
        Command::Predict(predict) => run_predict(predict),
        Command::Replay(replay) => run_replay(replay).await,
    }
}

fn run_predict(args: PredictArgs) -> anyhow::Result<()> {
    let mut input =
        ProsodyInput::new(args.text, args.register).with_affect(args.arousal, args.valence);
    input.intent = args.intent;
    input.wpm_override = args.wpm;

    let predictor = ProsodyPredictor::new();
    let intent = predictor.resolve_intent(&input);
    let controls = predictor.predict(&input);
    let estimated = controls.estimate_duration(&input.text);

    tracing::info!(
        register = %input.register,
        intent = intent.map(Intent::as_str).unwrap_or("none"),
        wpm = controls.wpm,
        "prediction ready"
    );

    let output = PredictOutput {
        intent,
        controls: &controls,
        estimated_duration_ms: u64::try_from(estimated.as_millis()).unwrap_or(u64::MAX),
        markup: args
            .markup
            .then(|| predictor.markup(&input.text, &controls)),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run_replay(args: ReplayArgs) -> anyhow::Result<()> {
    let config = TrackerConfig::resolve(args.history_capacity, args.metrics_window, &StdEnv)
        .context("invalid tracker configuration")?;
    tracing::info!(
        history_capacity = config.history_capacity,
        metrics_window = config.metrics_window,
        "config loaded"
    );

    let (tx, mut rx) = futures::channel::mpsc::unbounded();
    let clock = ManualClock::new(0);
    let mut tracker = RhythmTracker::with_config(clock.clone(), ChannelSink::new(tx), config);

    let printer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(metrics) = rx.next().await {
            let mut line = serde_json::to_string(&metrics)?;
            line.push('\n');
            stdout.write_all(line.as_bytes()).await?;
        }
        stdout.flush().await?;
        anyhow::Ok(())
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut line_no = 0usize;
    let mut last_at = 0u64;
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        let event: ReplayEvent = serde_json::from_str(&line)
            .with_context(|| format!("invalid event on line {line_no}"))?;

        if event.at_ms < last_at {
            tracing::warn!(
                line = line_no,
                at_ms = event.at_ms,
                last_at,
                "event timestamp went backwards"
            );
        }
        last_at = event.at_ms;
        clock.set(event.at_ms);

        match event.kind {
            EventKind::SpeechStart => tracker.on_speech_start(),
            EventKind::SpeechEnd { transcript } => {
                if let EventOutcome::Ignored(_) = tracker.on_speech_end(&transcript) {
                    tracing::debug!(line = line_no, "speech end skipped");
                }
            }
            EventKind::Response => tracker.on_assistant_response(),
        }
    }

    let total = tracker.total_utterances();
    // Dropping the tracker closes the channel so the printer can finish.
    drop(tracker);
    printer.await.context("metrics printer panicked")??;

    tracing::info!(total_utterances = total, "replay finished");
    Ok(())
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .with_context(|| format!("invalid --log-level: {level}"))?,
        )
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_events_parse() {
        let start: ReplayEvent =
            serde_json::from_str(r#"{"at_ms":10,"event":"speech_start"}"#).expect("valid");
        assert_eq!(start.at_ms, 10);
        assert!(matches!(start.kind, EventKind::SpeechStart));

        let end: ReplayEvent = serde_json::from_str(
            r#"{"at_ms":900,"event":"speech_end","transcript":"hello there"}"#,
        )
        .expect("valid");
        assert!(matches!(
            end.kind,
            EventKind::SpeechEnd { ref transcript } if transcript == "hello there"
        ));

        let response: ReplayEvent =
            serde_json::from_str(r#"{"at_ms":1200,"event":"response"}"#).expect("valid");
        assert!(matches!(response.kind, EventKind::Response));

        assert!(serde_json::from_str::<ReplayEvent>(r#"{"at_ms":1,"event":"cough"}"#).is_err());
    }

    #[test]
    fn predict_args_parse_registers_and_intents() {
        let args = Args::try_parse_from([
            "cadence",
            "predict",
            "--text",
            "Let's begin",
            "--register",
            "earth",
            "--intent",
            "instruction",
            "--markup",
        ])
        .expect("valid args");
        match args.command {
            Command::Predict(p) => {
                assert_eq!(p.register, VoiceRegister::Earth);
                assert_eq!(p.intent, Some(Intent::Instruction));
                assert!(p.markup);
            }
            Command::Replay(_) => panic!("expected predict"),
        }

        let bad = Args::try_parse_from(["cadence", "predict", "--text", "x", "--register", "lava"]);
        assert!(bad.is_err());
    }
}
