//! Platform abstraction and implementations
//!
//! The runner only sees this trait; the real Bluesky client and the mock
//! used in tests both live behind it. Any error coming out of `post` is a
//! dispatch failure for the run, so no state written before the call is
//! ever rolled back and no state after it is written early.

use async_trait::async_trait;

use crate::error::Result;

pub mod bluesky;

// Mock platform is available for all builds (not just tests) to support
// integration tests
pub mod mock;

/// A social platform the bot can post to.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Authenticate with the platform. Must be called before `post`.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Authentication` on invalid credentials or a
    /// failed login exchange.
    async fn authenticate(&mut self) -> Result<()>;

    /// Post `content` and return the platform-specific post id.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Authentication` when not logged in,
    /// `PlatformError::Posting`/`Network`/`RateLimit` when the send fails.
    async fn post(&self, content: &str) -> Result<String>;

    /// Check `content` against platform rules before any network call.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Validation` for empty or over-limit content.
    fn validate_content(&self, content: &str) -> Result<()>;

    /// Lowercase platform identifier (e.g. "bluesky")
    fn name(&self) -> &str;

    /// Maximum post length, or `None` if the platform has no hard limit
    fn character_limit(&self) -> Option<usize>;
}
