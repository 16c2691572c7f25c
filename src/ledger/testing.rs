//! Scripted `NodeClient` used across the promoter tests.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::Mutex;

use crate::error::{AppResult, NodeError};
use crate::ledger::client::NodeClient;
use crate::ledger::models::{PromoteOptions, SpamTransfer, Transaction};

/// One observed call, recorded in program order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FindTransactions(String),
    GetLatestInclusion(Vec<String>),
    IsPromotable(String),
    Promote(String),
    Replay(String),
    SwitchEndpoint(String),
}

fn api_error(command: &str, message: &str) -> NodeError {
    NodeError::Api {
        command: command.to_string(),
        message: message.to_string(),
    }
}

/// Mock node with per-command scripted outcomes. Unscripted calls answer
/// with benign defaults (no transactions, nothing included, nothing
/// promotable, promote/replay succeed).
#[derive(Default)]
pub struct ScriptedNode {
    transactions: Mutex<HashMap<String, Result<Vec<Transaction>, String>>>,
    inclusion: Mutex<VecDeque<Result<Vec<bool>, String>>>,
    promotable: Mutex<HashMap<String, Result<bool, String>>>,
    promote_results: Mutex<VecDeque<Result<(), String>>>,
    replay_results: Mutex<VecDeque<Result<(), String>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transactions(self, bundle: &str, txs: Vec<Transaction>) -> Self {
        self.transactions
            .lock()
            .insert(bundle.to_string(), Ok(txs));
        self
    }

    pub fn fail_transactions(self, bundle: &str, message: &str) -> Self {
        self.transactions
            .lock()
            .insert(bundle.to_string(), Err(message.to_string()));
        self
    }

    pub fn push_inclusion(self, states: Vec<bool>) -> Self {
        self.inclusion.lock().push_back(Ok(states));
        self
    }

    pub fn fail_inclusion(self, message: &str) -> Self {
        self.inclusion.lock().push_back(Err(message.to_string()));
        self
    }

    pub fn set_promotable(self, tail: &str, state: bool) -> Self {
        self.promotable.lock().insert(tail.to_string(), Ok(state));
        self
    }

    pub fn fail_promotable(self, tail: &str, message: &str) -> Self {
        self.promotable
            .lock()
            .insert(tail.to_string(), Err(message.to_string()));
        self
    }

    pub fn push_promote_error(self, message: &str) -> Self {
        self.promote_results
            .lock()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn push_replay_error(self, message: &str) -> Self {
        self.replay_results
            .lock()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| matches(c)).count()
    }
}

#[async_trait]
impl NodeClient for ScriptedNode {
    async fn find_transaction_objects(&self, bundle_hash: &str) -> AppResult<Vec<Transaction>> {
        self.calls
            .lock()
            .push(Call::FindTransactions(bundle_hash.to_string()));
        match self.transactions.lock().get(bundle_hash) {
            Some(Ok(txs)) => Ok(txs.clone()),
            Some(Err(message)) => Err(api_error("findTransactionObjects", message).into()),
            None => Ok(Vec::new()),
        }
    }

    async fn get_latest_inclusion(&self, tail_hashes: &[String]) -> AppResult<Vec<bool>> {
        self.calls
            .lock()
            .push(Call::GetLatestInclusion(tail_hashes.to_vec()));
        match self.inclusion.lock().pop_front() {
            Some(Ok(states)) => Ok(states),
            Some(Err(message)) => Err(api_error("getLatestInclusion", &message).into()),
            None => Ok(vec![false; tail_hashes.len()]),
        }
    }

    async fn is_promotable(&self, tail_hash: &str) -> AppResult<bool> {
        self.calls
            .lock()
            .push(Call::IsPromotable(tail_hash.to_string()));
        match self.promotable.lock().get(tail_hash) {
            Some(Ok(state)) => Ok(*state),
            Some(Err(message)) => Err(api_error("checkConsistency", message).into()),
            None => Ok(false),
        }
    }

    async fn promote(
        &self,
        tail_hash: &str,
        _depth: u8,
        _min_weight_magnitude: u8,
        _transfer: &SpamTransfer,
        _options: PromoteOptions,
    ) -> AppResult<()> {
        self.calls.lock().push(Call::Promote(tail_hash.to_string()));
        match self.promote_results.lock().pop_front() {
            Some(Ok(())) => Ok(()),
            Some(Err(message)) => Err(api_error("promoteTransaction", &message).into()),
            None => Ok(()),
        }
    }

    async fn replay(
        &self,
        tail_hash: &str,
        _depth: u8,
        _min_weight_magnitude: u8,
    ) -> AppResult<()> {
        self.calls.lock().push(Call::Replay(tail_hash.to_string()));
        match self.replay_results.lock().pop_front() {
            Some(Ok(())) => Ok(()),
            Some(Err(message)) => Err(api_error("replayBundle", &message).into()),
            None => Ok(()),
        }
    }

    fn switch_endpoint(&self, url: &str) {
        self.calls.lock().push(Call::SwitchEndpoint(url.to_string()));
    }

    fn endpoint(&self) -> String {
        "https://scripted-node.test".to_string()
    }
}

/// A tail attached `age_minutes` ago.
pub fn tail(hash: &str, bundle: &str, age_minutes: i64) -> Transaction {
    Transaction {
        hash: hash.to_string(),
        bundle: bundle.to_string(),
        current_index: 0,
        last_index: 0,
        attachment_timestamp: (Utc::now() - Duration::minutes(age_minutes)).timestamp_millis(),
    }
}

/// A non-tail transaction of the same bundle.
pub fn body_tx(hash: &str, bundle: &str, index: u64) -> Transaction {
    Transaction {
        hash: hash.to_string(),
        bundle: bundle.to_string(),
        current_index: index,
        last_index: index,
        attachment_timestamp: Utc::now().timestamp_millis(),
    }
}
