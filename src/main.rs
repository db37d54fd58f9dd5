use alloy_primitives::Address;
use anyhow::Result;
use buyback_burner::{
    config::AppConfig,
    dex::{self, Dex, PoolSnapshot},
    engine::{ConfigStore, EngineState, ExecutionGate, OriginCheck, PriceGuard},
    errors::EngineError,
    models::CallContext,
    utils,
};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Read-only monitor: reports whether a buyback submitted right now would pass
/// the execution gate and the price guard. It never sends a transaction.
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::init_logging();

    let cfg = AppConfig::load()?;
    let mut store = match &cfg.state_path {
        Some(path) => EngineState::load(path)?.store,
        None => {
            let mut store = ConfigStore::new();
            store.initialize(Address::ZERO, cfg.params)?;
            store
        }
    };
    let params = store.params()?;

    tracing::info!(
        pool = %cfg.pool_address,
        version = store.version(),
        last_action = store.last_action_timestamp(),
        max_deviation_bps = params.max_deviation_bps,
        min_action_delay = params.min_action_delay,
        max_amount = %utils::format_units(params.max_amount_per_action, 18),
        "[INIT] buyback-monitor starting"
    );

    let dex = Dex::new(cfg.rpc_url.as_str(), cfg.pool_address).await?;
    let (mut pool_rx, watcher) =
        dex::spawn_snapshot_watcher(dex, cfg.twap_window_secs, cfg.poll_interval_secs).await?;
    tracing::info!(
        interval_secs = cfg.poll_interval_secs,
        "[INIT] pool snapshot watcher started"
    );

    let guard = PriceGuard::new(cfg.twap_window_secs)?;
    // The monitor is its own originator; relayed calls are not modelled here.
    let gate = ExecutionGate::new(OriginCheck::Disabled);

    let state_path = cfg.state_path.clone();
    let evaluator = tokio::spawn(async move {
        loop {
            let snapshot = pool_rx.borrow_and_update().clone();
            if let Some(path) = &state_path {
                store = reload_store(path, store);
            }
            evaluate(&gate, &guard, &store, &snapshot);
            if pool_rx.changed().await.is_err() {
                tracing::warn!("[HEARTBEAT] pool watcher stopped");
                break;
            }
        }
    });

    let _ = futures::join!(watcher, evaluator);
    Ok(())
}

/// Latest persisted configuration, or `current` when the file cannot be read.
fn reload_store(path: &Path, current: ConfigStore) -> ConfigStore {
    match EngineState::load(path) {
        Ok(state) => state.store,
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "[HEARTBEAT] keeping last known state");
            current
        }
    }
}

fn evaluate(gate: &ExecutionGate, guard: &PriceGuard, store: &ConfigStore, snapshot: &PoolSnapshot) {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs();
    let ctx = CallContext::direct(store.owner(), now);

    if let Err(e) = gate.admit(&ctx, store) {
        tracing::info!(error = %e, "[HEARTBEAT] gate closed");
        return;
    }

    let max_deviation_bps = match store.max_deviation_bps() {
        Ok(bps) => bps,
        Err(e) => {
            tracing::warn!(error = %e, "[HEARTBEAT] configuration unavailable");
            return;
        }
    };

    match guard.compute_limit(snapshot, snapshot.pool, max_deviation_bps) {
        Ok((observation, limit)) => tracing::info!(
            current_tick = observation.current_tick,
            mean_tick = observation.reference_mean_tick,
            limit_tick = limit.tick,
            sqrt_price_limit_x96 = %limit.sqrt_price_x96,
            "[HEARTBEAT] buyback would be admitted"
        ),
        Err(EngineError::PriceDeviationExceeded {
            current_tick,
            reference_tick,
            max_deviation_bps,
        }) => tracing::warn!(
            current_tick,
            reference_tick,
            max_deviation_bps,
            "[HEARTBEAT] price guard would reject"
        ),
        Err(e) => tracing::warn!(error = %e, "[HEARTBEAT] guard evaluation failed"),
    }
}
