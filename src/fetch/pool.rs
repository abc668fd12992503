//! Shared HTTP client
//!
//! One `reqwest::Client` is created on first use and handed out to every
//! caller. A transport failure that points at a dead connection pool
//! invalidates it, and the next caller builds a fresh one.

use crate::fetch::{build_http_client, FetchError};
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Lazily created HTTP client shared across fetches
#[derive(Debug)]
pub struct ClientPool {
    user_agent: String,
    client: Mutex<Option<Client>>,
    creations: AtomicU64,
}

impl ClientPool {
    /// Creates an empty pool; no client is built until first use
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            client: Mutex::new(None),
            creations: AtomicU64::new(0),
        }
    }

    /// Returns the shared client, building it if necessary
    ///
    /// Concurrent first callers wait on the lock, so exactly one client is
    /// built.
    pub async fn client(&self) -> Result<Client, FetchError> {
        let mut slot = self.client.lock().await;

        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        let client =
            build_http_client(&self.user_agent).map_err(|e| FetchError::ClientBuild(e.to_string()))?;
        let generation = self.creations.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("Created HTTP client (generation {})", generation);

        *slot = Some(client.clone());
        Ok(client)
    }

    /// Drops the shared client so the next caller builds a new one
    pub async fn invalidate(&self) {
        let mut slot = self.client.lock().await;
        if slot.take().is_some() {
            tracing::debug!("Invalidated shared HTTP client");
        }
    }

    /// Number of clients built so far
    pub fn generation(&self) -> u64 {
        self.creations.load(Ordering::SeqCst)
    }

    /// User agent sent by pooled clients
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}
