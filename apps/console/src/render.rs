//! Plain-text rendering of a draw snapshot.

use std::fmt::Write as _;

use shared::{domain::Winner, protocol::DrawSnapshot};

const GRID_COLUMNS: usize = 6;
const CHIP_WIDTH: usize = 10;
const PENDING: &str = "待揭晓 / PENDING...";

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let mut out = text.to_string();
    out.extend(std::iter::repeat(' ').take(width.saturating_sub(len)));
    out
}

/// Tier tabs, top tier first. The active tab is bracketed with `<>`.
pub fn render_tabs(snapshot: &DrawSnapshot) -> String {
    snapshot
        .tiers
        .iter()
        .rev()
        .map(|progress| {
            let label = progress.short_label();
            if progress.tier == snapshot.current_tier && !snapshot.is_all_complete {
                format!("<{label}>")
            } else {
                format!("[{label}]")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_header(snapshot: &DrawSnapshot) -> String {
    if snapshot.is_all_complete {
        return "SYSTEM SHUTDOWN".to_string();
    }
    let status = if snapshot.is_rolling {
        "ROLLING..."
    } else if snapshot.is_current_tier_full {
        "ZONE COMPLETED"
    } else {
        "SCANNING ARRAY..."
    };
    format!("{}\n  {status}", snapshot.current_tier_label)
}

/// Candidate chips in configured order. The last winner is wrapped in `*`,
/// earlier winners in parentheses.
pub fn render_grid(snapshot: &DrawSnapshot) -> String {
    let mut out = String::new();
    for row in snapshot.candidates.chunks(GRID_COLUMNS) {
        let line = row
            .iter()
            .map(|name| {
                let chip = if snapshot.last_winner.as_deref() == Some(name.as_str()) {
                    format!("*{name}*")
                } else if snapshot.has_won(name) {
                    format!("({name})")
                } else {
                    format!(" {name} ")
                };
                pad(&chip, CHIP_WIDTH)
            })
            .collect::<String>();
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

pub fn render_hall_of_fame(snapshot: &DrawSnapshot) -> String {
    let mut out = String::from("获奖名人堂 / HALL OF FAME\n");
    for progress in snapshot.tiers.iter().rev() {
        let marker = if progress.tier == snapshot.current_tier {
            '>'
        } else {
            ' '
        };
        let _ = writeln!(
            out,
            "{marker} {}  {}/{}",
            progress.label,
            progress.winners.len(),
            progress.quota
        );
        if progress.winners.is_empty() {
            let _ = writeln!(out, "    {PENDING}");
            continue;
        }
        for (idx, name) in progress.winners.iter().enumerate() {
            let _ = writeln!(out, "    {:>2}. {name}", idx + 1);
        }
        for _ in 0..progress.open_slots() {
            let _ = writeln!(out, "    --");
        }
    }
    out
}

pub fn render_winner_banner(winner: &Winner, label: &str) -> String {
    format!("TARGET ACQUIRED // PRIZE: {label}\n  >>> {} <<<", winner.name)
}

/// Banner, grid and hall of fame for a fresh winner. The grid highlight comes
/// from `winner`, since the snapshot may already have moved to the next tier.
pub fn render_winner_reveal(snapshot: &DrawSnapshot, winner: &Winner) -> String {
    let label = snapshot
        .tier(winner.tier)
        .map(|progress| progress.label.clone())
        .unwrap_or_else(|| winner.tier.to_string());
    let mut view = snapshot.clone();
    view.last_winner = Some(winner.name.clone());
    format!(
        "{}\n{}\n{}",
        render_winner_banner(winner, &label),
        render_grid(&view),
        render_hall_of_fame(&view)
    )
}

pub fn render_stage(snapshot: &DrawSnapshot) -> String {
    format!(
        "{}\n\n{}\n\n{}\n{}",
        render_tabs(snapshot),
        render_header(snapshot),
        render_grid(snapshot),
        render_hall_of_fame(snapshot)
    )
}
