//! Single-run posting orchestration
//!
//! One `Runner::run` call is one invocation of the bot: annual reset check,
//! selection, dispatch, then state persistence. State driven by the
//! selection is only written after the platform confirms the send, so a
//! failed dispatch leaves every file exactly as it was and the next run
//! retries the same candidate.

use chrono::{NaiveDate, Utc};
use rand::RngCore;
use tracing::{info, warn};

use crate::error::{Result, RotaskyError};
use crate::platforms::Platform;
use crate::selector::{annual_reset, find_scheduled, is_reset_day, month_day_key, pick_rotation, Selection};
use crate::store::{PostStore, RecencyStore};
use crate::types::RunOutcome;

pub struct Runner {
    posts: Box<dyn PostStore>,
    recency: Box<dyn RecencyStore>,
    platform: Box<dyn Platform>,
    rng: Box<dyn RngCore>,
}

impl Runner {
    pub fn new(
        posts: Box<dyn PostStore>,
        recency: Box<dyn RecencyStore>,
        platform: Box<dyn Platform>,
        rng: Box<dyn RngCore>,
    ) -> Self {
        Self {
            posts,
            recency,
            platform,
            rng,
        }
    }

    /// Run one full posting cycle for `today`.
    pub async fn run(&mut self, today: NaiveDate) -> Result<RunOutcome> {
        if is_reset_day(today) {
            self.run_annual_reset();
        }

        let selection = self.select(today)?;
        let text = selection.text().to_string();

        self.platform.validate_content(&text)?;
        self.platform.authenticate().await?;
        let post_id = self.platform.post(&text).await?;

        let outcome = self.commit(selection, post_id);
        info!(
            "Posted to {}: {}",
            self.platform.name(),
            outcome.post_id()
        );
        Ok(outcome)
    }

    /// The January 1st pass: clear all sent flags so annual posts can fire
    /// again. Persisted immediately when anything changed; a second run on
    /// the same day finds nothing to do.
    fn run_annual_reset(&mut self) {
        let mut posts = self.posts.load_scheduled();
        if annual_reset(&mut posts) > 0 {
            if let Err(e) = self.posts.save_scheduled(&posts) {
                warn!("Could not persist annual reset: {}", e);
            }
        }
    }

    /// Decide what to post today without sending anything.
    ///
    /// A date-anchored entry for today's month-day wins; otherwise a draw
    /// from the rotation pool. `NoContent` when neither source has
    /// anything.
    pub fn select(&mut self, today: NaiveDate) -> Result<Selection> {
        let today_key = month_day_key(today);

        let posts = self.posts.load_scheduled();
        if let Some(index) = find_scheduled(&posts, &today_key) {
            return Ok(Selection::Scheduled { posts, index });
        }

        info!("No scheduled post for {}, using rotation", today_key);

        let pool = self.posts.load_pool();
        let history = self.recency.load_history();
        let pick =
            pick_rotation(&pool, &history, &mut *self.rng).ok_or(RotaskyError::NoContent)?;

        Ok(Selection::Rotation { pick, history })
    }

    /// Record a confirmed send. Storage failures here are logged, not
    /// fatal: the post is already out.
    fn commit(&mut self, selection: Selection, post_id: String) -> RunOutcome {
        match selection {
            Selection::Scheduled { mut posts, index } => {
                posts[index].mark_posted(Utc::now().to_rfc3339());
                let month_day = posts[index].month_day().unwrap_or_default().to_string();
                let text = posts[index].text.clone();

                if let Err(e) = self.posts.save_scheduled(&posts) {
                    warn!("Could not record scheduled post as sent: {}", e);
                }

                RunOutcome::Scheduled {
                    month_day,
                    text,
                    post_id,
                }
            }
            Selection::Rotation { pick, mut history } => {
                if pick.history_reset {
                    history.clear();
                }
                history.push(pick.text.clone());

                if let Err(e) = self.recency.save_history(&history) {
                    warn!("Could not save recency state: {}", e);
                }

                RunOutcome::Rotation {
                    text: pick.text,
                    post_id,
                    cycle_restarted: pick.history_reset,
                }
            }
        }
    }
}
