use std::{
    sync::{Arc, Mutex as StdMutex, PoisonError, Weak},
    time::Duration,
};

use shared::{
    domain::PrizeTier,
    error::{ConfigError, DrawRejected},
    protocol::{DrawCommand, DrawEvent, DrawSnapshot},
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info};

use crate::{
    config::LotteryConfig,
    engine::{AdvanceOutcome, AdvanceTicket, DrawEngine, StopOutcome, ToggleOutcome},
    selection::{RandomSource, ThreadRandom},
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Owns one [`DrawEngine`] on a tokio runtime and drives its auto-advance
/// timer. Dropping the controller (or calling [`DrawController::shutdown`])
/// aborts any pending timer.
pub struct DrawController {
    engine: Mutex<DrawEngine>,
    advance_task: StdMutex<Option<JoinHandle<()>>>,
    auto_advance_delay_ms: u64,
    events: broadcast::Sender<DrawEvent>,
}

impl DrawController {
    pub fn new(config: LotteryConfig) -> Result<Arc<Self>, ConfigError> {
        Self::new_with_random(config, Box::new(ThreadRandom))
    }

    pub fn new_with_random(
        config: LotteryConfig,
        random: Box<dyn RandomSource + Send>,
    ) -> Result<Arc<Self>, ConfigError> {
        let engine = DrawEngine::new(&config, random)?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Arc::new(Self {
            engine: Mutex::new(engine),
            advance_task: StdMutex::new(None),
            auto_advance_delay_ms: config.auto_advance_delay_ms,
            events,
        }))
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DrawEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> DrawSnapshot {
        self.engine.lock().await.snapshot()
    }

    pub async fn start_draw(&self) -> Result<PrizeTier, DrawRejected> {
        let mut engine = self.engine.lock().await;
        let tier = engine.start_draw()?;
        self.abort_advance_task();
        self.emit(DrawEvent::RollingStarted { tier });
        Ok(tier)
    }

    pub async fn stop_draw(self: &Arc<Self>) -> Result<StopOutcome, DrawRejected> {
        let mut engine = self.engine.lock().await;
        let outcome = engine.stop_draw()?;
        self.after_stop(&outcome);
        Ok(outcome)
    }

    pub async fn toggle(self: &Arc<Self>) -> Result<ToggleOutcome, DrawRejected> {
        let mut engine = self.engine.lock().await;
        let outcome = engine.toggle()?;
        match &outcome {
            ToggleOutcome::Started(tier) => {
                self.abort_advance_task();
                self.emit(DrawEvent::RollingStarted { tier: *tier });
            }
            ToggleOutcome::Stopped(stopped) => self.after_stop(stopped),
        }
        Ok(outcome)
    }

    pub async fn select_tier(&self, tier: PrizeTier) -> Result<PrizeTier, DrawRejected> {
        let mut engine = self.engine.lock().await;
        let tier = engine.select_tier(tier)?;
        self.abort_advance_task();
        self.emit(DrawEvent::TierChanged { tier });
        Ok(tier)
    }

    /// Applies a front-end intent. Rejected intents are logged and dropped.
    pub async fn dispatch(self: &Arc<Self>, command: DrawCommand) {
        let result = match command {
            DrawCommand::StartDraw => self.start_draw().await.map(|_| ()),
            DrawCommand::StopDraw => self.stop_draw().await.map(|_| ()),
            DrawCommand::Toggle => self.toggle().await.map(|_| ()),
            DrawCommand::SelectTier { tier } => self.select_tier(tier).await.map(|_| ()),
        };
        if let Err(reason) = result {
            debug!(?command, %reason, "draw command ignored");
        }
    }

    /// Cancels the pending auto-advance. Safe to call more than once.
    pub async fn shutdown(&self) {
        self.abort_advance_task();
        self.engine.lock().await.cancel_pending_advance();
        info!("draw controller shut down");
    }

    pub fn has_pending_advance(&self) -> bool {
        self.advance_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    fn after_stop(self: &Arc<Self>, outcome: &StopOutcome) {
        self.emit(DrawEvent::WinnerDrawn {
            winner: outcome.winner.clone(),
            forced: outcome.selection.is_forced(),
        });
        if let Some(ticket) = outcome.advance {
            self.schedule_advance(ticket);
            self.emit(DrawEvent::TierAdvanceScheduled {
                tier: outcome.winner.tier,
                delay_ms: self.auto_advance_delay_ms,
            });
        }
    }

    fn schedule_advance(self: &Arc<Self>, ticket: AdvanceTicket) {
        let controller: Weak<Self> = Arc::downgrade(self);
        let delay = Duration::from_millis(self.auto_advance_delay_ms);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(controller) = controller.upgrade() {
                controller.fire_advance(ticket).await;
            }
        });

        let previous = self
            .advance_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    async fn fire_advance(&self, ticket: AdvanceTicket) {
        let mut engine = self.engine.lock().await;
        match engine.apply_advance(ticket) {
            AdvanceOutcome::Stale => return,
            AdvanceOutcome::Advanced(tier) => self.emit(DrawEvent::TierChanged { tier }),
            AdvanceOutcome::AllComplete => self.emit(DrawEvent::AllComplete),
        }
        // This task is the one stored in the slot; detach it.
        self.advance_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    fn abort_advance_task(&self) {
        let task = self
            .advance_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.abort();
            debug!("aborted auto-advance timer");
        }
    }

    fn emit(&self, event: DrawEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

impl Drop for DrawController {
    fn drop(&mut self) {
        let slot = self
            .advance_task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = slot.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
