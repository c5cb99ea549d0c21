//! Core types for Rotasky

use serde::{Deserialize, Serialize};

/// Maximum number of entries retained in the recency history.
///
/// 220 entries covers 110 days at two posts per day before the rotation
/// pool is allowed to repeat.
pub const RECENT_HISTORY_CAP: usize = 220;

/// A post anchored to an annual calendar date.
///
/// The `date` keeps its original year for record-keeping, but matching only
/// looks at the month and day so the entry fires every year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledPost {
    pub date: String,
    pub text: String,
    #[serde(default)]
    pub posted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_at: Option<String>,
}

impl ScheduledPost {
    pub fn new(date: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            text: text.into(),
            posted: false,
            posted_at: None,
        }
    }

    /// The `MM-DD` portion of the entry's date, or `None` if the date is
    /// too short to carry one. Matching is lenient on purpose: a malformed
    /// date never matches, it does not fail the run.
    pub fn month_day(&self) -> Option<&str> {
        self.date.get(5..10)
    }

    /// Mark the entry as sent this year, stamping the send time.
    pub fn mark_posted(&mut self, posted_at: String) {
        self.posted = true;
        self.posted_at = Some(posted_at);
    }

    /// Clear the sent flag for a new annual cycle. Returns true if the
    /// entry actually changed.
    pub fn reset(&mut self) -> bool {
        if self.posted {
            self.posted = false;
            self.posted_at = None;
            true
        } else {
            false
        }
    }
}

/// What a single run ended up posting.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunOutcome {
    /// A date-anchored post fired for today's month-day.
    Scheduled {
        month_day: String,
        text: String,
        post_id: String,
    },
    /// A generic post was drawn from the rotation pool.
    Rotation {
        text: String,
        post_id: String,
        /// True when the pool was exhausted and the history restarted
        /// with this post.
        cycle_restarted: bool,
    },
}

impl RunOutcome {
    pub fn text(&self) -> &str {
        match self {
            RunOutcome::Scheduled { text, .. } => text,
            RunOutcome::Rotation { text, .. } => text,
        }
    }

    pub fn post_id(&self) -> &str {
        match self {
            RunOutcome::Scheduled { post_id, .. } => post_id,
            RunOutcome::Rotation { post_id, .. } => post_id,
        }
    }
}
