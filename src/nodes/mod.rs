use parking_lot::Mutex;
use rand::Rng;
use serde::Deserialize;
use tracing::info;

use crate::error::{AppError, AppResult};

/// How the rotator walks the endpoint pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RotationStrategy {
    RoundRobin,
    Random,
}

/// Selects a node endpoint from the configured pool before each bundle, so
/// that no single node serves every request.
pub struct NodeRotator {
    pool: Vec<String>,
    strategy: RotationStrategy,
    cursor: Mutex<usize>,
}

impl NodeRotator {
    pub fn new(pool: Vec<String>, strategy: RotationStrategy) -> AppResult<Self> {
        if pool.is_empty() {
            return Err(AppError::InvalidInput(
                "node endpoint pool is empty".to_string(),
            ));
        }
        info!(
            "Node pool has {} endpoint(s), rotation: {:?}",
            pool.len(),
            strategy
        );
        Ok(Self {
            pool,
            strategy,
            cursor: Mutex::new(0),
        })
    }

    /// Pick the endpoint for the next bundle.
    pub fn select(&self) -> &str {
        match self.strategy {
            RotationStrategy::RoundRobin => {
                let mut cursor = self.cursor.lock();
                let endpoint = &self.pool[*cursor % self.pool.len()];
                *cursor = cursor.wrapping_add(1);
                endpoint
            }
            RotationStrategy::Random => {
                let index = rand::rng().random_range(0..self.pool.len());
                &self.pool[index]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn pool() -> Vec<String> {
        vec![
            "https://node-a.example".to_string(),
            "https://node-b.example".to_string(),
            "https://node-c.example".to_string(),
        ]
    }

    #[test]
    fn empty_pool_is_rejected() {
        assert!(matches!(
            NodeRotator::new(Vec::new(), RotationStrategy::RoundRobin),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn round_robin_cycles_the_pool() {
        let rotator = NodeRotator::new(pool(), RotationStrategy::RoundRobin).unwrap();
        let picks: Vec<_> = (0..6).map(|_| rotator.select().to_string()).collect();
        assert_eq!(picks[0], picks[3]);
        assert_eq!(picks[1], picks[4]);
        assert_eq!(picks[2], picks[5]);
        assert_eq!(picks[..3].iter().collect::<HashSet<_>>().len(), 3);
    }

    #[test]
    fn random_does_not_pin_a_single_endpoint() {
        let rotator = NodeRotator::new(pool(), RotationStrategy::Random).unwrap();
        let seen: HashSet<String> = (0..200).map(|_| rotator.select().to_string()).collect();
        assert!(seen.len() > 1);
    }

    #[test]
    fn single_entry_pool_always_selects_it() {
        let rotator = NodeRotator::new(
            vec!["https://only.example".to_string()],
            RotationStrategy::RoundRobin,
        )
        .unwrap();
        assert_eq!(rotator.select(), "https://only.example");
        assert_eq!(rotator.select(), "https://only.example");
    }
}
