//! Draw engine for the annual lottery: the tier state machine, winner
//! selection, configuration loading, and an async controller that owns the
//! auto-advance timer.

pub mod config;
pub mod controller;
pub mod engine;
pub mod selection;

pub use config::{load_config, parse_candidate_list, LotteryConfig};
pub use controller::DrawController;
pub use engine::{AdvanceOutcome, AdvanceTicket, DrawEngine, StopOutcome, ToggleOutcome};
pub use selection::{RandomSource, SeededRandom, Selection, ThreadRandom};
