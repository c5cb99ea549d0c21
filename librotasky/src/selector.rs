//! Post selection logic
//!
//! Pure functions over loaded state: the annual reset pass, the date match
//! against the scheduled collection, and the rotation draw with its
//! exhaustion handling. Everything here is deterministic given the inputs
//! and the injected random generator, so the whole decision surface is unit
//! testable without I/O.

use chrono::{Datelike, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::types::ScheduledPost;

/// The `MM-DD` key used to match scheduled posts against today's date.
pub fn month_day_key(date: NaiveDate) -> String {
    format!("{:02}-{:02}", date.month(), date.day())
}

/// Whether `date` is the day the annual reset pass runs.
pub fn is_reset_day(date: NaiveDate) -> bool {
    date.month() == 1 && date.day() == 1
}

/// Clear the `posted` flag on every sent entry, starting a new annual
/// cycle. Returns how many entries changed; zero means the pass was a
/// no-op and nothing needs persisting.
pub fn annual_reset(posts: &mut [ScheduledPost]) -> usize {
    let mut reset_count = 0;
    for post in posts.iter_mut() {
        if post.reset() {
            reset_count += 1;
        }
    }
    if reset_count > 0 {
        info!("New year: reset {} scheduled posts", reset_count);
    }
    reset_count
}

/// Find today's scheduled post: the first entry in storage order whose
/// month-day matches `today_key` and which has not been sent this year.
///
/// Entries matching the key but already posted are skipped; if several
/// entries share a month-day, the first unposted one wins and the rest are
/// left for next year.
pub fn find_scheduled(posts: &[ScheduledPost], today_key: &str) -> Option<usize> {
    for (index, post) in posts.iter().enumerate() {
        match post.month_day() {
            Some(month_day) if month_day == today_key => {
                if post.posted {
                    info!("Scheduled post for {} was already sent this year", today_key);
                    continue;
                }
                info!("Found scheduled post for {}", today_key);
                return Some(index);
            }
            _ => {}
        }
    }
    None
}

/// A rotation draw: the chosen text, plus whether the recency history must
/// restart because every pool entry had been used recently.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationPick {
    pub text: String,
    pub history_reset: bool,
}

/// Draw one post from the rotation pool, avoiding anything in the recency
/// history (exact string match). When the whole pool sits in the history,
/// the pool is made available again and the history restarts with the
/// post about to be chosen.
///
/// Returns `None` only when the pool itself is empty.
pub fn pick_rotation<R: Rng + ?Sized>(
    pool: &[String],
    history: &[String],
    rng: &mut R,
) -> Option<RotationPick> {
    if pool.is_empty() {
        return None;
    }

    let available: Vec<&String> = pool.iter().filter(|&post| !history.contains(post)).collect();

    let (candidates, history_reset) = if available.is_empty() {
        info!("All {} rotation posts used recently, restarting cycle", pool.len());
        (pool.iter().collect::<Vec<_>>(), true)
    } else {
        debug!(
            "{} of {} rotation posts available ({} recent)",
            available.len(),
            pool.len(),
            history.len()
        );
        (available, false)
    };

    let text = (*candidates.choose(rng)?).clone();
    Some(RotationPick {
        text,
        history_reset,
    })
}

/// What a run decided to post, carrying enough loaded state for the commit
/// that follows a confirmed dispatch.
#[derive(Debug, Clone)]
pub enum Selection {
    /// Today's date-anchored entry, with the collection it was found in.
    Scheduled {
        posts: Vec<ScheduledPost>,
        index: usize,
    },
    /// A rotation draw, with the history loaded at selection time.
    Rotation {
        pick: RotationPick,
        history: Vec<String>,
    },
}

impl Selection {
    pub fn text(&self) -> &str {
        match self {
            Selection::Scheduled { posts, index } => &posts[*index].text,
            Selection::Rotation { pick, .. } => &pick.text,
        }
    }
}
