use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::error::AppResult;
use crate::ledger::client::{HttpNodeClient, NodeClient};
use crate::nodes::NodeRotator;
use crate::promoter::{PromoteSettings, Promoter};
use crate::state::store::{FileStateStore, RecordKind, StateStore};
use crate::state::StateRecorder;

/// Wire config, store, node client and rotator into a ready-to-run promoter.
pub async fn initialize_promoter(config: &Config) -> AppResult<Promoter> {
    info!("Initializing promoter components ...");

    let store: Arc<dyn StateStore> = Arc::new(FileStateStore::new(&config.state_dir));
    let unconfirmed = store.load(RecordKind::Unconfirmed).await?;
    let failed = store.load(RecordKind::Failed).await?;
    let confirmed = store.load(RecordKind::Confirmed).await?;
    info!(
        "Loaded bundle records: {} unconfirmed, {} failed, {} confirmed",
        unconfirmed.len(),
        failed.len(),
        confirmed.len()
    );

    let rotator = NodeRotator::new(config.node_urls.clone(), config.rotation_strategy)?;
    let client = Arc::new(HttpNodeClient::new(rotator.select().to_string()));
    info!("Starting against node {}", client.endpoint());

    let recorder = Arc::new(StateRecorder::new(
        store,
        unconfirmed.clone(),
        failed.clone(),
        confirmed,
    ));

    Promoter::new(
        client,
        rotator,
        recorder,
        unconfirmed,
        failed,
        config.promote_all,
        PromoteSettings::from(config),
    )
}
