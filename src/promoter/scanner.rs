use chrono::{Duration, Utc};
use tracing::{debug, warn};

use crate::ledger::client::NodeClient;
use crate::ledger::models::Transaction;

/// Finds the first tail that can actually anchor a promotion.
///
/// Promotability alone is not enough: the network's max-depth rule rejects a
/// promotion referencing a transaction attached too long ago, so both gates
/// must hold.
pub struct ConsistencyScanner {
    max_depth: Duration,
}

impl ConsistencyScanner {
    pub fn new(max_depth_minutes: i64) -> Self {
        Self {
            max_depth: Duration::minutes(max_depth_minutes),
        }
    }

    /// First tail (in list order) that is both promotable and recent enough.
    ///
    /// A remote error aborts the scan and yields `None` so the caller falls
    /// back to reattachment; scan errors are never propagated.
    pub async fn find_consistent_tail<'a>(
        &self,
        client: &dyn NodeClient,
        tails: &'a [Transaction],
    ) -> Option<&'a Transaction> {
        let now = Utc::now();
        for tail in tails {
            let promotable = match client.is_promotable(&tail.hash).await {
                Ok(state) => state,
                Err(e) => {
                    warn!("Consistency check for {} failed, giving up scan: {}", tail.hash, e);
                    return None;
                }
            };
            if !promotable {
                debug!("Tail {} is not promotable, skipping", tail.hash);
                continue;
            }
            if !tail.is_within_depth(self.max_depth, now) {
                debug!("Tail {} is older than the max depth window, skipping", tail.hash);
                continue;
            }
            return Some(tail);
        }
        None
    }
}
