use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// All-nines address used as the target of zero-value spam transfers.
pub const SPAM_ADDRESS: &str =
    "999999999999999999999999999999999999999999999999999999999999999999999999999999999";

/// A transaction as returned by the node for a bundle lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: String,
    pub bundle: String,
    /// Position within the bundle; 0 is the tail
    pub current_index: u64,
    pub last_index: u64,
    /// Milliseconds since the epoch at which the transaction entered the ledger
    pub attachment_timestamp: i64,
}

impl Transaction {
    /// Only tails are valid anchors for promotion or reattachment.
    pub fn is_tail(&self) -> bool {
        self.current_index == 0
    }

    /// Whether the attachment is recent enough to still be accepted as a
    /// promotion anchor under the network's max-depth rule.
    pub fn is_within_depth(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        let attached_at = DateTime::<Utc>::from_timestamp_millis(self.attachment_timestamp);
        match attached_at {
            Some(attached_at) => now.signed_duration_since(attached_at) <= max_age,
            // An unrepresentable timestamp is never a usable anchor
            None => false,
        }
    }
}

/// The zero-value, empty-payload transfer issued by a promotion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpamTransfer {
    pub address: String,
    pub value: u64,
    pub message: String,
    pub tag: String,
}

impl SpamTransfer {
    pub fn promotion() -> Self {
        Self {
            address: SPAM_ADDRESS.to_string(),
            value: 0,
            message: String::new(),
            tag: String::new(),
        }
    }
}

/// Non-interrupting, no-delay promotion options.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PromoteOptions {
    pub delay: u64,
    pub interrupt: bool,
}

impl Default for PromoteOptions {
    fn default() -> Self {
        Self {
            delay: 0,
            interrupt: false,
        }
    }
}
