use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use ferrex_playback::{
    InMemoryUserDataApi, ItemId, MediaEngine, PlaybackConfig, PlaybackSession, Presentation,
    SessionCommand, SessionEvent, SimulatedEngine, UserItemData,
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "playback-replay",
    about = "Replay a scripted interaction against a simulated player"
)]
struct Cli {
    /// Script of timed session commands (TOML)
    script: PathBuf,
    /// Playback configuration (TOML); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Extra time to keep the session alive after the last step
    #[arg(long, default_value_t = 6_000)]
    settle_ms: u64,
    /// Print events and presentation changes as JSON lines
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Deserialize)]
struct ReplayScript {
    #[serde(default)]
    media: MediaSetup,
    #[serde(default)]
    items: Vec<UserItemData>,
    #[serde(default)]
    steps: Vec<ReplayStep>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct MediaSetup {
    runtime_secs: u64,
    position_secs: u64,
    playing: bool,
    live: bool,
    api_latency_ms: u64,
}

impl Default for MediaSetup {
    fn default() -> Self {
        Self {
            runtime_secs: 5_400,
            position_secs: 0,
            playing: true,
            live: false,
            api_latency_ms: 150,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReplayStep {
    at_ms: u64,
    command: SessionCommand,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Line<'a> {
    Event {
        at_ms: u128,
        event: &'a SessionEvent,
    },
    Presentation {
        at_ms: u128,
        presentation: &'a Presentation,
    },
    UserData {
        at_ms: u128,
        item: &'a ItemId,
        data: &'a UserItemData,
    },
}

fn load_script(path: &Path) -> Result<ReplayScript> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    let mut script: ReplayScript =
        toml::from_str(&raw).with_context(|| format!("parsing script {}", path.display()))?;
    script.steps.sort_by_key(|step| step.at_ms);
    Ok(script)
}

fn build_engine(media: &MediaSetup) -> SimulatedEngine {
    let engine = if media.live {
        SimulatedEngine::live()
    } else {
        SimulatedEngine::new(Duration::from_secs(media.runtime_secs))
            .with_position(Duration::from_secs(media.position_secs))
    };
    if media.playing { engine.playing() } else { engine }
}

fn print_line(json: bool, line: &Line<'_>) {
    if json {
        match serde_json::to_string(line) {
            Ok(text) => println!("{text}"),
            Err(err) => warn!(error = %err, "failed to encode output line"),
        }
        return;
    }
    match line {
        Line::Event { at_ms, event } => match event {
            SessionEvent::Toast(toast) => println!("{at_ms:>7}ms toast    {toast}"),
            other => println!("{at_ms:>7}ms event    {other:?}"),
        },
        Line::Presentation {
            at_ms,
            presentation,
        } => {
            let state = &presentation.state;
            println!(
                "{at_ms:>7}ms overlay  visible={} controls={} supplement={} locked={} scrubbing={}{}",
                state.overlay_visible,
                presentation.controls_visible,
                state
                    .supplement_selection
                    .as_ref()
                    .map_or("-", |id| id.as_str()),
                state.is_gesture_locked,
                state.is_scrubbing,
                presentation
                    .fade
                    .map(|fade| format!(" fade={}ms", fade.as_millis()))
                    .unwrap_or_default(),
            );
        }
        Line::UserData { at_ms, item, data } => println!(
            "{at_ms:>7}ms userdata {item} favorite={} played={} plays={}",
            data.is_favorite, data.played, data.play_count
        ),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ferrex_playback=info,playback_replay=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PlaybackConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PlaybackConfig::default(),
    };
    let script = load_script(&cli.script)?;
    info!(
        steps = script.steps.len(),
        items = script.items.len(),
        "replaying script"
    );

    let api = Arc::new(InMemoryUserDataApi::with_latency(Duration::from_millis(
        script.media.api_latency_ms,
    )));
    for item in &script.items {
        api.insert(item.clone()).await;
    }

    let engine = build_engine(&script.media);
    let (session, mut events) = PlaybackSession::new(config, engine, api);
    let mut presentation = session.subscribe_presentation();
    let mut user_data = session.subscribe_user_data();
    let handle = session.spawn();

    let started = Instant::now();
    let json = cli.json;
    let (done_tx, mut done_rx) = mpsc::channel::<()>(1);

    let printer = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                Some(event) = events.recv() => {
                    let at_ms = started.elapsed().as_millis();
                    print_line(json, &Line::Event { at_ms, event: &event });
                }
                Ok(()) = presentation.changed() => {
                    let at_ms = started.elapsed().as_millis();
                    let snapshot = presentation.borrow_and_update().clone();
                    print_line(json, &Line::Presentation { at_ms, presentation: &snapshot });
                }
                Ok(update) = user_data.recv() => {
                    let at_ms = started.elapsed().as_millis();
                    print_line(json, &Line::UserData {
                        at_ms,
                        item: &update.key,
                        data: &update.value,
                    });
                }
                _ = done_rx.recv() => break,
            }
        }
    });

    for step in script.steps {
        tokio::time::sleep_until(started + Duration::from_millis(step.at_ms)).await;
        handle
            .send(step.command)
            .await
            .context("session stopped before the script finished")?;
    }

    tokio::time::sleep(Duration::from_millis(cli.settle_ms)).await;
    let engine = handle.shutdown().await?;
    let _ = done_tx.send(()).await;
    printer.await.context("output task failed")?;

    info!(
        position_ms = engine.position().as_millis() as u64,
        seeks = engine.seeks().len(),
        "replay finished"
    );
    Ok(())
}
