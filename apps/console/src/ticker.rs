//! Cycling highlight shown while a draw is rolling. Purely visual.

use std::{
    io::{self, Write},
    time::Duration,
};

use draw_core::{RandomSource, ThreadRandom};
use tokio::task::JoinHandle;

const TICK: Duration = Duration::from_millis(50);

#[derive(Default)]
pub struct RollingTicker {
    task: Option<JoinHandle<()>>,
}

impl RollingTicker {
    pub fn start(&mut self, names: Vec<String>) {
        self.stop();
        if names.is_empty() {
            return;
        }
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK);
            let mut random = ThreadRandom;
            loop {
                interval.tick().await;
                let name = &names[random.pick(names.len())];
                let mut stdout = io::stdout().lock();
                let _ = write!(stdout, "\r  >> {name:<12}");
                let _ = stdout.flush();
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            println!();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for RollingTicker {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
