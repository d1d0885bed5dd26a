//! Plain-text rendering of nominations, outcomes and errors.

use townsquare_core::{ErrorKind, NominationView, VoteCell, VoteRow};
use townsquare_engine::{Outcome, SessionError};

pub fn cell(cell: &VoteCell) -> String {
    match cell {
        VoteCell::Struck => "(no vote)".to_string(),
        VoteCell::Hidden => "?".to_string(),
        VoteCell::ConfirmedYes { running_total } => format!("YES ({running_total})"),
        VoteCell::ConfirmedNo => "NO".to_string(),
        VoteCell::Pending(text) => format!("\"{text}\""),
        VoteCell::NotVoted => "-".to_string(),
    }
}

pub fn row(row: &VoteRow) -> String {
    let cursor = if row.current_voter { "> " } else { "  " };
    let nominator = if row.is_nominator { " [nominator]" } else { "" };
    let dead = if row.dead { " [dead]" } else { "" };
    format!("{cursor}{}{nominator}{dead}: {}", row.alias, cell(&row.cell))
}

pub fn nomination(view: &NominationView) -> String {
    let mut out = format!("{} nominated {}", view.nominator, view.nominee);
    if view.finished {
        out.push_str(" (finished)");
    }
    out.push_str(&format!("\nAccusation: {}", view.accusation));
    out.push_str(&format!("\nDefense: {}", view.defense));
    match view.tally {
        Some(tally) => out.push_str(&format!(
            "\nVotes: {tally} of {} needed",
            view.votes_needed
        )),
        None => out.push_str(&format!("\nVotes: hidden, {} needed", view.votes_needed)),
    }
    for r in &view.rows {
        out.push('\n');
        out.push_str(&row(r));
    }
    out
}

pub fn outcome(outcome: &Outcome) -> Vec<String> {
    let mut lines: Vec<String> = outcome.log.iter().map(|entry| format!("log {entry}")).collect();
    if let Some(notice) = &outcome.notice {
        lines.push(format!("note: {notice}"));
    }
    lines
}

pub fn error(err: &SessionError) -> String {
    let label = match err.kind() {
        ErrorKind::Validation => "invalid",
        ErrorKind::NotAuthorized => "denied",
        ErrorKind::NotFound => "not found",
        ErrorKind::Ambiguous => "ambiguous",
        ErrorKind::IllegalState => "not now",
        ErrorKind::NotVoted | ErrorKind::UnrecognizedVote => "note",
        ErrorKind::Persistence => "SAVE FAILED",
    };
    format!("{label}: {err}")
}
