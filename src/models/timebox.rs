//! Time-windowed records: milestones and iterations.
//!
//! Both carry an optional start/due date window. A record is "active" when
//! today falls inside the window; the selector in `workflows::timebox`
//! builds on the [`TimeWindowed`] trait so milestones and iterations share
//! one implementation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Anything with an id, a display label and an optional date window.
pub trait TimeWindowed {
    fn id(&self) -> i64;
    fn label(&self) -> String;
    fn start_date(&self) -> Option<NaiveDate>;
    fn due_date(&self) -> Option<NaiveDate>;

    /// Whether the window contains `today`. Records missing either date are
    /// never active.
    fn is_active_on(&self, today: NaiveDate) -> bool {
        match (self.start_date(), self.due_date()) {
            (Some(start), Some(due)) => start <= today && today <= due,
            _ => false,
        }
    }
}

/// GitLab group milestone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub id: i64,
    pub title: String,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
}

impl TimeWindowed for Milestone {
    fn id(&self) -> i64 {
        self.id
    }

    fn label(&self) -> String {
        self.title.clone()
    }

    fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }
}

/// GitLab group iteration (cadence-generated, often untitled).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Iteration {
    pub id: i64,
    pub title: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
}

impl TimeWindowed for Iteration {
    fn id(&self) -> i64 {
        self.id
    }

    /// Iterations generated by a cadence have no title; fall back to the
    /// date range so the picker has something to show.
    fn label(&self) -> String {
        match (&self.title, self.start_date, self.due_date) {
            (Some(title), _, _) if !title.is_empty() => title.clone(),
            (_, Some(start), Some(due)) => format!("{} - {}", start, due),
            _ => format!("iteration {}", self.id),
        }
    }

    fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }
}
