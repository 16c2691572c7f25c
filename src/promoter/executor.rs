use std::sync::Arc;

use tracing::{info, warn};

use crate::error::AppError;
use crate::ledger::client::NodeClient;
use crate::ledger::models::{PromoteOptions, SpamTransfer, Transaction};

/// How a promotion or reattachment attempt resolved. `Failed` tells the
/// orchestrator to record the bundle; the executor itself never touches
/// bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Promoted,
    Reattached,
    Failed,
}

/// Issues promotions and reattachments against a chosen anchor tail.
pub struct PromotionExecutor {
    client: Arc<dyn NodeClient>,
    depth: u8,
    reattach_depth: u8,
    min_weight_magnitude: u8,
}

impl PromotionExecutor {
    pub fn new(
        client: Arc<dyn NodeClient>,
        depth: u8,
        reattach_depth: u8,
        min_weight_magnitude: u8,
    ) -> Self {
        Self {
            client,
            depth,
            reattach_depth,
            min_weight_magnitude,
        }
    }

    /// Promote the bundle via `tail`. An inconsistent-subtangle rejection
    /// falls back to a single reattachment at the smaller depth; any other
    /// rejection is non-recoverable for this pass.
    pub async fn promote(&self, bundle: &str, tail: &Transaction) -> ExecutionOutcome {
        let result = self
            .client
            .promote(
                &tail.hash,
                self.depth,
                self.min_weight_magnitude,
                &SpamTransfer::promotion(),
                PromoteOptions::default(),
            )
            .await;

        match result {
            Ok(()) => {
                info!("Promoted bundle {} via tail {}", bundle, tail.hash);
                ExecutionOutcome::Promoted
            }
            Err(AppError::Node(e)) if e.is_inconsistent_subtangle() => {
                warn!(
                    "Subtangle inconsistent for tail {}, falling back to reattachment",
                    tail.hash
                );
                self.reattach(bundle, tail).await
            }
            Err(e) => {
                warn!("Promotion of bundle {} rejected: {}", bundle, e);
                ExecutionOutcome::Failed
            }
        }
    }

    /// Re-issue the whole bundle referencing `tail`.
    pub async fn reattach(&self, bundle: &str, tail: &Transaction) -> ExecutionOutcome {
        match self
            .client
            .replay(&tail.hash, self.reattach_depth, self.min_weight_magnitude)
            .await
        {
            Ok(()) => {
                info!("Reattached bundle {} via tail {}", bundle, tail.hash);
                ExecutionOutcome::Reattached
            }
            Err(e) => {
                warn!("Reattachment of bundle {} failed: {}", bundle, e);
                ExecutionOutcome::Failed
            }
        }
    }
}
