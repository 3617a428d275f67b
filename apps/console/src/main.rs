use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use draw_core::{load_config, DrawController, RandomSource, SeededRandom, ThreadRandom};
use shared::protocol::{DrawEvent, DrawPhase};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod input;
mod render;
mod ticker;

use input::{parse_input, ConsoleInput, HELP};
use ticker::RollingTicker;

#[derive(Parser, Debug)]
#[command(about = "Annual lottery draw stage for the terminal")]
struct Args {
    /// Path to a lottery TOML config (defaults to ./lottery.toml if present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for a reproducible rehearsal draw.
    #[arg(long)]
    seed: Option<u64>,
    /// Run the whole ceremony without input.
    #[arg(long)]
    auto: bool,
    /// How long each draw rolls in --auto mode.
    #[arg(long, default_value_t = 1500)]
    roll_ms: u64,
    /// Print events and snapshots as JSON lines.
    #[arg(long)]
    json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    let random: Box<dyn RandomSource + Send> = match args.seed {
        Some(seed) => Box::new(SeededRandom::new(seed)),
        None => Box::new(ThreadRandom),
    };
    let controller = DrawController::new_with_random(config, random)?;
    info!(seed = ?args.seed, auto = args.auto, "lottery stage ready");

    let presenter = spawn_presenter(&controller, args.json);
    let result = if args.auto {
        run_auto(&controller, Duration::from_millis(args.roll_ms)).await
    } else {
        run_interactive(&controller, args.json).await
    };

    controller.shutdown().await;
    presenter.abort();
    result
}

fn spawn_presenter(controller: &Arc<DrawController>, json: bool) -> JoinHandle<()> {
    let mut events = controller.subscribe_events();
    let controller = Arc::clone(controller);
    tokio::spawn(async move {
        let mut ticker = RollingTicker::default();
        if !json {
            println!("{}", render::render_stage(&controller.snapshot().await));
        }
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "presenter fell behind draw events");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            if json {
                match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(err) => warn!(%err, "failed to encode draw event"),
                }
                continue;
            }

            match event {
                DrawEvent::RollingStarted { .. } => {
                    ticker.start(controller.snapshot().await.remaining);
                }
                DrawEvent::WinnerDrawn { winner, .. } => {
                    ticker.stop();
                    let snapshot = controller.snapshot().await;
                    println!("{}", render::render_winner_reveal(&snapshot, &winner));
                }
                DrawEvent::TierAdvanceScheduled { delay_ms, .. } => {
                    println!("  (next tier in {:.1}s)", delay_ms as f64 / 1000.0);
                }
                DrawEvent::TierChanged { .. } | DrawEvent::AllComplete => {
                    if ticker.is_running() {
                        ticker.stop();
                    }
                    println!("{}", render::render_stage(&controller.snapshot().await));
                }
            }
        }
    })
}

async fn run_interactive(controller: &Arc<DrawController>, json: bool) -> Result<()> {
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        match parse_input(&line) {
            ConsoleInput::Command(command) => controller.dispatch(command).await,
            ConsoleInput::Status => {
                let snapshot = controller.snapshot().await;
                if json {
                    println!("{}", serde_json::to_string(&snapshot)?);
                } else {
                    println!("{}", render::render_stage(&snapshot));
                }
            }
            ConsoleInput::Help => println!("{HELP}"),
            ConsoleInput::Quit => break,
            ConsoleInput::Unknown(message) => println!("{message}"),
        }
    }
    Ok(())
}

/// Draws every tier in order, waiting out each auto-advance.
async fn run_auto(controller: &Arc<DrawController>, roll: Duration) -> Result<()> {
    let mut events = controller.subscribe_events();

    loop {
        let snapshot = controller.snapshot().await;
        if snapshot.is_all_complete {
            break;
        }

        if snapshot.is_current_tier_full {
            if snapshot.phase != DrawPhase::TierComplete {
                warn!(tier = %snapshot.current_tier, "tier is full with no advance pending; stopping");
                break;
            }
            wait_for_tier_change(&mut events).await?;
            continue;
        }

        if let Err(reason) = controller.start_draw().await {
            warn!(%reason, "cannot continue the ceremony");
            break;
        }
        tokio::time::sleep(roll).await;
        controller.stop_draw().await?;
    }

    let snapshot = controller.snapshot().await;
    info!(winners = snapshot.winners.len(), "ceremony finished");
    Ok(())
}

async fn wait_for_tier_change(events: &mut broadcast::Receiver<DrawEvent>) -> Result<()> {
    loop {
        match events.recv().await {
            Ok(DrawEvent::TierChanged { .. } | DrawEvent::AllComplete) => return Ok(()),
            Ok(_) | Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => anyhow::bail!("draw controller closed its event stream"),
        }
    }
}
