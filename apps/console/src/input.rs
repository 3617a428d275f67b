//! Line commands typed at the console.

use shared::{domain::PrizeTier, protocol::DrawCommand};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Command(DrawCommand),
    Status,
    Help,
    Quit,
    Unknown(String),
}

pub const HELP: &str = "\
commands:
  <enter> | t | space   start / stop the draw
  start | stop          explicit start or stop
  tier <name>           jump to a tier (third, second, first, grand)
  status                redraw the stage
  help                  show this help
  q                     quit";

pub fn parse_input(line: &str) -> ConsoleInput {
    let trimmed = line.trim();
    let mut parts = trimmed.split_whitespace();
    let head = parts.next().unwrap_or_default().to_ascii_lowercase();

    match head.as_str() {
        "" | "t" | "toggle" | "space" => ConsoleInput::Command(DrawCommand::Toggle),
        "start" => ConsoleInput::Command(DrawCommand::StartDraw),
        "stop" => ConsoleInput::Command(DrawCommand::StopDraw),
        "tier" => match parts.next().map(str::parse::<PrizeTier>) {
            Some(Ok(tier)) => ConsoleInput::Command(DrawCommand::SelectTier { tier }),
            Some(Err(err)) => ConsoleInput::Unknown(err.to_string()),
            None => ConsoleInput::Unknown("usage: tier <third|second|first|grand>".into()),
        },
        "status" | "s" => ConsoleInput::Status,
        "help" | "h" | "?" => ConsoleInput::Help,
        "q" | "quit" | "exit" => ConsoleInput::Quit,
        _ => ConsoleInput::Unknown(format!("unknown command '{trimmed}'; type 'help'")),
    }
}
