//! Resilient canonical-URL resolution.
//!
//! Each legacy URL runs through a small per-URL state machine: a cache hit
//! short-circuits everything; otherwise up to three fetch attempts, where a
//! 404 is a definitive miss, a login-prompt body triggers re-authentication
//! on the shared session, an HTTP error status burns an attempt, and a clean
//! response records the post-redirect URL in the cache.

use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::auth::{AuthError, Authenticator};
use crate::cache::CanonicalUrlCache;
use crate::config::Config;
use crate::login_page;
use crate::network::{PageResponse, Transport};

/// Classification of one fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Clean response; carries the final URL after redirects.
    Success(String),
    /// HTTP 404: definitive, never retried, never cached.
    NotFound,
    /// The body is a login prompt; the session lapsed server-side.
    SessionExpired,
    /// Any other HTTP error status; carries the status code.
    TransientError(u16),
}

/// Classify an obtained response. Order matters: a 404 is definitive even
/// if its body happens to carry a login prompt, and a login prompt wins
/// over whatever status it was served with.
fn classify(response: &PageResponse) -> FetchOutcome {
    if response.status == 404 {
        return FetchOutcome::NotFound;
    }
    if login_page::is_login_prompt(&response.body) {
        return FetchOutcome::SessionExpired;
    }
    if !response.is_success() {
        return FetchOutcome::TransientError(response.status);
    }
    FetchOutcome::Success(response.final_url.clone())
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Got no response for URL {url} with {attempts_left} retries left")]
    NoResponse { url: String, attempts_left: u32 },

    /// Re-authentication during a fetch failed; fatal for the whole run.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Tuning knobs for [`resolve_canonical`]. Tests shrink the delay to zero.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub max_attempts: u32,
    pub courtesy_delay: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_attempts: Config::MAX_FETCH_ATTEMPTS,
            courtesy_delay: Duration::from_millis(Config::COURTESY_DELAY_MS),
        }
    }
}

/// Resolve `url` to its canonical (post-redirect) form.
///
/// Returns `Ok(Some(canonical))` on success, `Ok(None)` when the URL is
/// definitively broken (404, or the retry budget ran out) - the batch
/// carries on without it. `Err` means either no response was obtainable at
/// the network level, or re-authentication failed.
pub async fn resolve_canonical<T: Transport + ?Sized>(
    url: &str,
    cache: &mut CanonicalUrlCache,
    transport: &T,
    authenticator: &Authenticator,
    options: &FetchOptions,
) -> Result<Option<String>, FetchError> {
    // Fast path: no network I/O for anything already resolved.
    if let Some(canonical) = cache.get(url) {
        debug!(%url, %canonical, "Cache hit");
        return Ok(Some(canonical.to_string()));
    }

    let mut attempts_left = options.max_attempts;

    while attempts_left > 0 {
        if attempts_left < options.max_attempts {
            info!(%url, attempts_left, "Retrying fetch");
        }

        let response = match transport.get(url).await {
            Ok(response) => response,
            Err(e) => {
                warn!(%url, error = %e, "No response obtained");
                return Err(FetchError::NoResponse {
                    url: url.to_string(),
                    attempts_left,
                });
            }
        };

        let outcome = classify(&response);

        if outcome == FetchOutcome::NotFound {
            warn!(%url, "Unexpected 404");
            return Ok(None);
        }

        // One request at a time, and not back-to-back: the legacy site is
        // small and slow.
        sleep(options.courtesy_delay).await;

        match outcome {
            FetchOutcome::Success(final_url) => {
                cache.insert(url.to_string(), final_url.clone());
                return Ok(Some(final_url));
            }
            FetchOutcome::NotFound => return Ok(None),
            FetchOutcome::SessionExpired => {
                warn!(%url, "Session expired, logging in again before retrying");
                authenticator.authenticate(transport).await?;
                attempts_left -= 1;
            }
            FetchOutcome::TransientError(status) => {
                warn!(%url, status, "HTTP error status");
                attempts_left -= 1;
            }
        }
    }

    warn!(%url, "Broken legacy URL");
    Ok(None)
}
