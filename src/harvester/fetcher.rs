//! HTTP page fetcher
//!
//! This module performs the single network call the rest of the
//! harvester is built around: fetch one page reference, classify the
//! outcome. Classification:
//!
//! | Condition | Outcome |
//! |-----------|---------|
//! | Timeout, connection error | Transient |
//! | HTTP 500, server-error-fatal on | Fatal for the collection |
//! | HTTP 500, server-error-fatal off | Transient |
//! | Any other non-success status | Transient |
//! | Malformed page payload | Fatal for the collection |

use crate::catalog::{decode_page, ItemPage, PageRef};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// A classified fetch failure
///
/// Transient failures are consumed by the retry budget; fatal ones abort
/// the collection immediately.
#[derive(Debug)]
pub enum FetchError {
    Transient { reason: String },
    Fatal { reason: String },
}

impl FetchError {
    pub fn reason(&self) -> &str {
        match self {
            Self::Transient { reason } | Self::Fatal { reason } => reason,
        }
    }
}

/// Builds the HTTP client shared by all workers
///
/// # Arguments
///
/// * `request_timeout` - Per-request timeout in seconds; the only
///   timeout in the system (there is no per-collection or per-run one)
pub fn build_http_client(request_timeout: u64) -> Result<Client, reqwest::Error> {
    let user_agent = format!("monty-harvest/{}", env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(request_timeout))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches and decodes one page
///
/// # Arguments
///
/// * `client` - The shared HTTP client
/// * `page_ref` - The page to fetch
/// * `server_error_fatal` - Whether HTTP 500 aborts the collection
///   instead of being retried
///
/// # Returns
///
/// * `Ok(ItemPage)` - The decoded page
/// * `Err(FetchError)` - A classified failure
pub async fn fetch_page(
    client: &Client,
    page_ref: &PageRef,
    server_error_fatal: bool,
) -> Result<ItemPage, FetchError> {
    let response = match client.get(page_ref.as_str()).send().await {
        Ok(response) => response,
        Err(e) => {
            let reason = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                "Connection failed".to_string()
            } else {
                e.to_string()
            };
            return Err(FetchError::Transient { reason });
        }
    };

    let status = response.status();

    if status == StatusCode::INTERNAL_SERVER_ERROR && server_error_fatal {
        return Err(FetchError::Fatal {
            reason: "HTTP 500".to_string(),
        });
    }

    if !status.is_success() {
        return Err(FetchError::Transient {
            reason: format!("HTTP {}", status.as_u16()),
        });
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            return Err(FetchError::Transient {
                reason: format!("Failed to read response body: {}", e),
            })
        }
    };

    decode_page(&body).map_err(|e| FetchError::Fatal {
        reason: format!("Malformed page payload: {}", e),
    })
}
