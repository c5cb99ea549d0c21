//! Bluesky platform implementation

use async_trait::async_trait;
use bsky_sdk::BskyAgent;
use secrecy::ExposeSecret;

use crate::config::Credentials;
use crate::error::{PlatformError, Result};
use crate::platforms::Platform;

const CHARACTER_LIMIT: usize = 300;

/// Map Bluesky/AT Protocol errors to PlatformError.
///
/// The SDK surfaces XRPC failures as display strings carrying the HTTP
/// status and the AT Protocol error code, so classification goes by
/// pattern.
fn map_bluesky_error<E: std::fmt::Display + std::fmt::Debug>(
    error: E,
    context: &str,
) -> PlatformError {
    let error_msg = format!("{}", error);
    let debug_msg = format!("{:?}", error);

    // Authentication errors (401/403 or auth-related AT Protocol codes)
    if error_msg.contains("401")
        || error_msg.contains("403")
        || error_msg.contains("AuthenticationRequired")
        || error_msg.contains("InvalidToken")
        || error_msg.contains("ExpiredToken")
        || error_msg.contains("InvalidCredentials")
        || error_msg.contains("AccountNotFound")
        || debug_msg.contains("Unauthorized")
        || debug_msg.contains("Forbidden")
    {
        return PlatformError::Authentication(format!(
            "Bluesky authentication failed during {}: {}. Check your handle and app password.",
            context, error_msg
        ));
    }

    // Validation errors (400 or record rejections)
    if error_msg.contains("400")
        || error_msg.contains("InvalidRequest")
        || error_msg.contains("InvalidRecord")
        || debug_msg.contains("BadRequest")
    {
        return PlatformError::Validation(format!(
            "Bluesky rejected the request during {}: {}",
            context, error_msg
        ));
    }

    // Rate limiting (429)
    if error_msg.contains("429")
        || error_msg.contains("RateLimitExceeded")
        || error_msg.contains("TooManyRequests")
        || debug_msg.contains("RateLimit")
    {
        return PlatformError::RateLimit(format!(
            "Bluesky rate limit exceeded during {}: {}",
            context, error_msg
        ));
    }

    // Network/connection errors (PDS unreachable, timeouts)
    if error_msg.contains("connection")
        || error_msg.contains("network")
        || error_msg.contains("timeout")
        || error_msg.contains("unreachable")
        || error_msg.contains("dns")
        || debug_msg.contains("Connect")
        || debug_msg.contains("Timeout")
    {
        return PlatformError::Network(format!(
            "Network error while reaching the Bluesky PDS during {}: {}",
            context, error_msg
        ));
    }

    PlatformError::Posting(format!(
        "Bluesky operation failed during {}: {}",
        context, error_msg
    ))
}

pub struct BlueskyClient {
    agent: BskyAgent,
    credentials: Credentials,
    authenticated: bool,
}

impl BlueskyClient {
    /// Create a new Bluesky client for the given account.
    pub async fn new(credentials: Credentials) -> Result<Self> {
        let agent = BskyAgent::builder()
            .build()
            .await
            .map_err(|e| PlatformError::Authentication(format!("Failed to create agent: {}", e)))?;

        Ok(Self {
            agent,
            credentials,
            authenticated: false,
        })
    }
}

#[async_trait]
impl Platform for BlueskyClient {
    async fn authenticate(&mut self) -> Result<()> {
        tracing::debug!("Creating Bluesky session for {}", self.credentials.handle);

        self.agent
            .login(
                &self.credentials.handle,
                self.credentials.app_password.expose_secret(),
            )
            .await
            .map_err(|e| map_bluesky_error(e, "authentication"))?;

        self.authenticated = true;
        tracing::info!("Authenticated as {}", self.credentials.handle);

        Ok(())
    }

    async fn post(&self, content: &str) -> Result<String> {
        use bsky_sdk::api::app::bsky::feed::post::RecordData;
        use bsky_sdk::api::types::string::Datetime;

        if !self.authenticated {
            return Err(PlatformError::Authentication("Not authenticated".to_string()).into());
        }

        tracing::debug!("Posting to Bluesky: {} characters", content.len());

        let record = RecordData {
            created_at: Datetime::now(),
            embed: None,
            entities: None,
            facets: None,
            labels: None,
            langs: None,
            reply: None,
            tags: None,
            text: content.to_string(),
        };

        let response = self
            .agent
            .create_record(record)
            .await
            .map_err(|e| map_bluesky_error(e, "posting"))?;

        let at_uri = response.uri.to_string();
        tracing::debug!("Posted to Bluesky: {}", at_uri);

        Ok(at_uri)
    }

    fn validate_content(&self, content: &str) -> Result<()> {
        validate(content)
    }

    fn name(&self) -> &str {
        "bluesky"
    }

    fn character_limit(&self) -> Option<usize> {
        Some(CHARACTER_LIMIT)
    }
}

fn validate(content: &str) -> Result<()> {
    if content.is_empty() {
        return Err(PlatformError::Validation("Content cannot be empty".to_string()).into());
    }

    if content.len() > CHARACTER_LIMIT {
        return Err(PlatformError::Validation(format!(
            "Content exceeds Bluesky's {} character limit (current: {} characters)",
            CHARACTER_LIMIT,
            content.len()
        ))
        .into());
    }

    Ok(())
}
