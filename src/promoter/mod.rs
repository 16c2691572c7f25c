pub mod executor;
pub mod scanner;

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::ledger::client::NodeClient;
use crate::ledger::models::Transaction;
use crate::nodes::NodeRotator;
use crate::promoter::executor::{ExecutionOutcome, PromotionExecutor};
use crate::promoter::scanner::ConsistencyScanner;
use crate::state::StateRecorder;

/// Promotion parameters shared by the scanner and the executor.
#[derive(Debug, Clone, Copy)]
pub struct PromoteSettings {
    pub depth: u8,
    pub reattach_depth: u8,
    pub min_weight_magnitude: u8,
    pub max_depth_minutes: i64,
}

impl From<&crate::config::Config> for PromoteSettings {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            depth: config.depth,
            reattach_depth: config.reattach_depth,
            min_weight_magnitude: config.min_weight_magnitude,
            max_depth_minutes: config.max_depth_minutes,
        }
    }
}

/// Terminal classification of one bundle for this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleOutcome {
    Promoted,
    Reattached,
    Confirmed,
    Failed,
}

/// Counters for one full pass over the active list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub processed: usize,
    pub promoted: usize,
    pub reattached: usize,
    pub confirmed: usize,
    pub failed: usize,
}

/// Drives one sequential pass over the active bundle list: for each bundle,
/// fetch its transactions, check inclusion, scan for a usable anchor,
/// promote or reattach, record the outcome, rotate the node, advance.
///
/// Exactly one bundle is in flight at a time; a bundle is never retried
/// within the same run.
pub struct Promoter {
    client: Arc<dyn NodeClient>,
    rotator: NodeRotator,
    recorder: Arc<StateRecorder>,
    scanner: ConsistencyScanner,
    executor: PromotionExecutor,
    active: Vec<String>,
}

impl Promoter {
    /// Validates inputs and fixes the active list for the run: the whole
    /// unconfirmed list when `promote_all`, otherwise only the
    /// previously-failed bundles.
    pub fn new(
        client: Arc<dyn NodeClient>,
        rotator: NodeRotator,
        recorder: Arc<StateRecorder>,
        unconfirmed: Vec<String>,
        failed: Vec<String>,
        promote_all: bool,
        settings: PromoteSettings,
    ) -> AppResult<Self> {
        if client.endpoint().is_empty() {
            return Err(AppError::InvalidInput(
                "no node endpoint provided".to_string(),
            ));
        }
        if unconfirmed.is_empty() {
            return Err(AppError::InvalidInput(
                "unconfirmed bundle list is empty".to_string(),
            ));
        }
        if !promote_all && failed.is_empty() {
            return Err(AppError::InvalidInput(
                "no previously-failed bundles to process (set PROMOTE_ALL to process everything)"
                    .to_string(),
            ));
        }

        let active = if promote_all { unconfirmed } else { failed };
        let executor = PromotionExecutor::new(
            client.clone(),
            settings.depth,
            settings.reattach_depth,
            settings.min_weight_magnitude,
        );
        Ok(Self {
            client,
            rotator,
            recorder,
            scanner: ConsistencyScanner::new(settings.max_depth_minutes),
            executor,
            active,
        })
    }

    /// Process every bundle in the active list, in order, to completion.
    /// Per-bundle remote failures become Failed bookkeeping; only state
    /// persistence faults abort the run.
    pub async fn run(&self) -> AppResult<RunSummary> {
        let run_id = Uuid::new_v4();
        let mut summary = RunSummary {
            run_id,
            processed: 0,
            promoted: 0,
            reattached: 0,
            confirmed: 0,
            failed: 0,
        };

        let last_index = self.active.len() - 1;
        for (index, bundle) in self.active.iter().enumerate() {
            info!(
                "[{}] Processing bundle {} ({}/{})",
                run_id,
                bundle,
                index + 1,
                self.active.len()
            );

            match self.process_bundle(bundle).await? {
                BundleOutcome::Promoted => summary.promoted += 1,
                BundleOutcome::Reattached => summary.reattached += 1,
                BundleOutcome::Confirmed => summary.confirmed += 1,
                BundleOutcome::Failed => summary.failed += 1,
            }
            summary.processed += 1;

            if index < last_index {
                let next = self.rotator.select();
                self.client.switch_endpoint(next);
                info!("Switched to node {}", next);
            }
        }

        info!(
            "[{}] Run complete: {} processed, {} promoted, {} reattached, {} confirmed, {} failed",
            run_id,
            summary.processed,
            summary.promoted,
            summary.reattached,
            summary.confirmed,
            summary.failed
        );
        Ok(summary)
    }

    async fn process_bundle(&self, bundle: &str) -> AppResult<BundleOutcome> {
        let transactions = match self.client.find_transaction_objects(bundle).await {
            Ok(transactions) => transactions,
            Err(e) => {
                warn!("Fetching transactions for {} failed: {}", bundle, e);
                self.recorder.mark_failed(bundle).await?;
                return Ok(BundleOutcome::Failed);
            }
        };

        let tails: Vec<Transaction> = transactions.into_iter().filter(|t| t.is_tail()).collect();

        if !tails.is_empty() {
            let hashes: Vec<String> = tails.iter().map(|t| t.hash.clone()).collect();
            let states = match self.client.get_latest_inclusion(&hashes).await {
                Ok(states) => states,
                Err(e) => {
                    warn!("Inclusion check for {} failed: {}", bundle, e);
                    self.recorder.mark_failed(bundle).await?;
                    return Ok(BundleOutcome::Failed);
                }
            };
            if states.iter().any(|included| *included) {
                info!("Bundle {} is already confirmed", bundle);
                self.recorder.mark_confirmed(bundle).await?;
                self.recorder.remove_from_unconfirmed(bundle).await?;
                return Ok(BundleOutcome::Confirmed);
            }
        }

        let outcome = match self.scanner.find_consistent_tail(&*self.client, &tails).await {
            Some(anchor) => self.executor.promote(bundle, anchor).await,
            None => match tails.first() {
                // No promotable anchor; reattach via the original tail
                Some(first) => self.executor.reattach(bundle, first).await,
                None => {
                    warn!("Bundle {} has no tail to reference", bundle);
                    self.recorder.mark_failed(bundle).await?;
                    return Ok(BundleOutcome::Failed);
                }
            },
        };

        match outcome {
            ExecutionOutcome::Promoted => Ok(BundleOutcome::Promoted),
            ExecutionOutcome::Reattached => Ok(BundleOutcome::Reattached),
            ExecutionOutcome::Failed => {
                self.recorder.mark_failed(bundle).await?;
                Ok(BundleOutcome::Failed)
            }
        }
    }
}
