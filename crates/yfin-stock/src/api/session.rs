//! Cookie and crumb handshake required by the Yahoo query hosts

use reqwest::Client;
use reqwest::header::REFERER;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::StockConfig;
use crate::error::{Result, StockError};

const FINANCE_REFERER: &str = "https://finance.yahoo.com/";

/// Crumb shared by every request of one client
///
/// The session cookie itself lives in the reqwest cookie jar.
#[derive(Debug, Default)]
pub(crate) struct CrumbSession {
    crumb: Mutex<Option<String>>,
}

impl CrumbSession {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Current crumb, performing the handshake on first use
    pub(crate) async fn crumb(&self, http: &Client, config: &StockConfig) -> Result<String> {
        let mut guard = self.crumb.lock().await;
        if let Some(crumb) = guard.as_ref() {
            return Ok(crumb.clone());
        }

        let crumb = handshake(http, config).await?;
        *guard = Some(crumb.clone());
        Ok(crumb)
    }

    /// Forget the crumb so the next request repeats the handshake
    pub(crate) async fn invalidate(&self) {
        *self.crumb.lock().await = None;
    }
}

async fn handshake(http: &Client, config: &StockConfig) -> Result<String> {
    // The cookie page answers 404 but still sets the session cookie
    let response = http
        .get(&config.cookie_url)
        .header(REFERER, FINANCE_REFERER)
        .send()
        .await?;
    debug!(status = %response.status(), "Fetched Yahoo session cookie");

    for endpoint in config.crumb_urls() {
        let response = match http.get(&endpoint).header(REFERER, FINANCE_REFERER).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(endpoint = %endpoint, error = %e, "Crumb request failed");
                continue;
            }
        };

        if !response.status().is_success() {
            warn!(endpoint = %endpoint, status = %response.status(), "Crumb request rejected");
            continue;
        }

        let body = response.text().await?;
        let body = body.trim();
        if body.to_lowercase().contains("too many requests") {
            return Err(StockError::YahooFinanceError(
                "rate limited while fetching crumb".to_string(),
            ));
        }
        if is_valid_crumb(body) {
            debug!(endpoint = %endpoint, "Obtained Yahoo crumb");
            return Ok(body.to_string());
        }
    }

    Err(StockError::YahooFinanceError(
        "failed to obtain a crumb from any query host".to_string(),
    ))
}

/// A crumb is a short token; HTML error pages and prose are rejected
fn is_valid_crumb(body: &str) -> bool {
    !body.is_empty()
        && body.len() < 100
        && !body.contains(' ')
        && !body.contains("<html")
        && !body.contains("<!DOCTYPE")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_crumb() {
        assert!(is_valid_crumb("a1B2c3D4e5F"));
        assert!(is_valid_crumb("x/y.z"));
        assert!(!is_valid_crumb(""));
        assert!(!is_valid_crumb("<!DOCTYPE html><html></html>"));
        assert!(!is_valid_crumb("Too Many Requests"));
        assert!(!is_valid_crumb(&"a".repeat(120)));
    }

    #[tokio::test]
    async fn test_invalidate_clears_crumb() {
        let session = CrumbSession::new();
        *session.crumb.lock().await = Some("cached".to_string());

        session.invalidate().await;
        assert!(session.crumb.lock().await.is_none());
    }
}
