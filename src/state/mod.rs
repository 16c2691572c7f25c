pub mod store;

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::error::AppResult;
use crate::state::store::{RecordKind, StateStore};

/// In-memory bundle bookkeeping mirrored to durable storage.
///
/// The three sets overlap on purpose: a Failed bundle stays Unconfirmed so a
/// later run retries it, while a Confirmed bundle is removed from
/// Unconfirmed by the caller. Every mutation rewrites the backing record
/// before returning, so an interrupted run loses at most the in-flight
/// bundle's result.
pub struct StateRecorder {
    store: Arc<dyn StateStore>,
    unconfirmed: RwLock<HashSet<String>>,
    failed: RwLock<HashSet<String>>,
    confirmed: RwLock<HashSet<String>>,
}

impl StateRecorder {
    pub fn new(
        store: Arc<dyn StateStore>,
        unconfirmed: Vec<String>,
        failed: Vec<String>,
        confirmed: Vec<String>,
    ) -> Self {
        Self {
            store,
            unconfirmed: RwLock::new(unconfirmed.into_iter().collect()),
            failed: RwLock::new(failed.into_iter().collect()),
            confirmed: RwLock::new(confirmed.into_iter().collect()),
        }
    }

    /// Add the bundle to the Failed set. Does not touch Unconfirmed.
    pub async fn mark_failed(&self, bundle: &str) -> AppResult<()> {
        let mut failed = self.failed.write().await;
        failed.insert(bundle.to_string());
        self.store.write(RecordKind::Failed, &failed).await?;
        info!("Recorded {} as failed", bundle);
        Ok(())
    }

    /// Add the bundle to the Confirmed set.
    pub async fn mark_confirmed(&self, bundle: &str) -> AppResult<()> {
        let mut confirmed = self.confirmed.write().await;
        confirmed.insert(bundle.to_string());
        self.store.write(RecordKind::Confirmed, &confirmed).await?;
        info!("Recorded {} as confirmed", bundle);
        Ok(())
    }

    /// Drop the bundle from the Unconfirmed working set.
    pub async fn remove_from_unconfirmed(&self, bundle: &str) -> AppResult<()> {
        let mut unconfirmed = self.unconfirmed.write().await;
        unconfirmed.remove(bundle);
        self.store
            .write(RecordKind::Unconfirmed, &unconfirmed)
            .await?;
        Ok(())
    }

    pub async fn unconfirmed(&self) -> HashSet<String> {
        self.unconfirmed.read().await.clone()
    }

    pub async fn failed(&self) -> HashSet<String> {
        self.failed.read().await.clone()
    }

    pub async fn confirmed(&self) -> HashSet<String> {
        self.confirmed.read().await.clone()
    }
}
