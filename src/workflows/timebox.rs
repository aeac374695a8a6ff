//! Time-window selection for milestones and iterations.
//!
//! Automatic mode picks the record whose window contains today, preferring
//! the one that expires soonest. Manual mode defers the choice to the
//! prompter and resolves the answer back by exact label match.

use crate::error::AppError;
use crate::models::TimeWindowed;
use crate::services::Prompter;
use chrono::NaiveDate;

/// Pick the active record with the earliest due date.
///
/// Ties keep the first-encountered record. No active record is a fatal
/// lookup failure; there is no silent default.
pub fn select_active<T: TimeWindowed + Clone>(
    records: &[T],
    today: NaiveDate,
    kind: &str,
) -> Result<T, AppError> {
    let mut best: Option<&T> = None;
    for record in records.iter().filter(|r| r.is_active_on(today)) {
        match best {
            // Strict comparison keeps the earlier of equals.
            Some(current) if record.due_date() < current.due_date() => best = Some(record),
            None => best = Some(record),
            _ => {}
        }
    }
    best.cloned()
        .ok_or_else(|| AppError::lookup(format!("no active {} for {}", kind, today)))
}

/// Let the user pick from the full (unfiltered) list.
///
/// Resolution is by exact label match, first match wins. An aborted prompt
/// or unmatched label yields `None`.
pub fn select_manual<T: TimeWindowed + Clone>(
    records: &[T],
    prompter: &dyn Prompter,
    message: &str,
) -> Result<Option<T>, AppError> {
    let labels: Vec<String> = records.iter().map(|r| r.label()).collect();
    let chosen = match prompter.select(message, &labels)? {
        Some(label) => label,
        None => return Ok(None),
    };
    Ok(records.iter().find(|r| r.label() == chosen).cloned())
}
