//! Buyback-and-burn engine: wiring of the gate, guard, harvester, executor
//! and sink behind the public entrypoints.
//!
//! Every entrypoint takes `&mut self` and `&mut H`, so actions are applied one
//! at a time. Each runs inside a checkpointed boundary that restores
//! both the host state and the configuration store if any step fails.

use alloy_primitives::{Address, U256};
use tracing::{info, warn};

use crate::errors::{EngineError, EngineResult};
use crate::host::Host;
use crate::models::{BuybackReceipt, CallContext};

pub mod burn;
pub mod gate;
pub mod harvest;
pub mod price_guard;
pub mod state;
pub mod store;
pub mod swap;

pub use burn::BurnSink;
pub use gate::{ExecutionGate, OriginCheck};
pub use harvest::{FeeHarvester, FeeSource, FeeSourceRegistry};
pub use price_guard::{DEFAULT_WINDOW_SECS, PriceGuard};
pub use state::EngineState;
pub use store::{ConfigStore, RiskParams};
pub use swap::{SwapExecutor, SwapRoute};

/// Fixed wiring of an engine instance.
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    /// Address holding engine custody (harvest recipient, trader, burner).
    pub custody: Address,
    /// Pool the price guard observes.
    pub pool: Address,
    pub route: SwapRoute,
    pub origin_check: OriginCheck,
    pub twap_window_secs: u32,
}

pub struct BuybackEngine {
    settings: EngineSettings,
    store: ConfigStore,
    fee_sources: FeeSourceRegistry,
    gate: ExecutionGate,
    guard: PriceGuard,
    harvester: FeeHarvester,
    executor: SwapExecutor,
    sink: BurnSink,
}

impl BuybackEngine {
    /// Builds an engine and initializes its configuration at version 1.
    pub fn initialize(
        settings: EngineSettings,
        owner: Address,
        params: RiskParams,
    ) -> EngineResult<Self> {
        let mut store = ConfigStore::new();
        store.initialize(owner, params)?;
        Self::with_store(settings, store)
    }

    /// Builds an engine around an existing configuration with no fee sources.
    pub fn with_store(settings: EngineSettings, store: ConfigStore) -> EngineResult<Self> {
        Self::with_state(settings, EngineState::new(store, FeeSourceRegistry::default()))
    }

    /// Builds an engine from reloaded state, fee sources included.
    pub fn with_state(settings: EngineSettings, state: EngineState) -> EngineResult<Self> {
        state.validate()?;
        let EngineState { store, fee_sources } = state;
        if !store.is_initialized() {
            return Err(EngineError::NotInitialized);
        }
        let guard = PriceGuard::new(settings.twap_window_secs)?;
        info!(
            custody = %settings.custody,
            pool = %settings.pool,
            version = store.version(),
            fee_sources = fee_sources.len(),
            origin_check = ?settings.origin_check,
            "[INIT] buyback engine ready"
        );
        Ok(Self {
            gate: ExecutionGate::new(settings.origin_check),
            harvester: FeeHarvester::new(settings.custody),
            executor: SwapExecutor::new(settings.route),
            sink: BurnSink::new(settings.route.target_token),
            guard,
            settings,
            store,
            fee_sources,
        })
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn fee_sources(&self) -> &FeeSourceRegistry {
        &self.fee_sources
    }

    /// Owner-managed state to persist between runs.
    pub fn state(&self) -> EngineState {
        EngineState::new(self.store.clone(), self.fee_sources.clone())
    }

    pub fn burn_destination(&self) -> Address {
        self.sink.destination()
    }

    // ---------- public entrypoints ----------

    /// Harvest from the default fee source, then buy back and burn.
    pub fn harvest_and_swap<H: Host>(
        &mut self,
        host: &mut H,
        ctx: &CallContext,
    ) -> EngineResult<BuybackReceipt> {
        self.atomically(host, |engine, host| {
            engine.gate.admit(ctx, &engine.store)?;
            let source = engine.fee_sources.default_source()?.clone();
            engine.harvester.harvest(host, &source)?;
            engine.buyback(host, ctx, true)
        })
    }

    /// Harvest from the named fee source, then buy back and burn.
    pub fn harvest_and_swap_from<H: Host>(
        &mut self,
        host: &mut H,
        ctx: &CallContext,
        source_name: &str,
    ) -> EngineResult<BuybackReceipt> {
        self.atomically(host, |engine, host| {
            engine.gate.admit(ctx, &engine.store)?;
            let source = engine.fee_sources.get(source_name)?.clone();
            engine.harvester.harvest(host, &source)?;
            engine.buyback(host, ctx, true)
        })
    }

    /// Buy back and burn with whatever base asset is already in custody.
    pub fn swap_only<H: Host>(
        &mut self,
        host: &mut H,
        ctx: &CallContext,
    ) -> EngineResult<BuybackReceipt> {
        self.atomically(host, |engine, host| {
            engine.gate.admit(ctx, &engine.store)?;
            engine.buyback(host, ctx, false)
        })
    }

    /// Permissionless harvest of a single source.
    pub fn harvest<H: Host>(&mut self, host: &mut H, source: &FeeSource) -> EngineResult<()> {
        self.atomically(host, |engine, host| engine.harvester.harvest(host, source))
    }

    /// Permissionless harvest of a registered source.
    pub fn harvest_named<H: Host>(&mut self, host: &mut H, source_name: &str) -> EngineResult<()> {
        self.atomically(host, |engine, host| {
            let source = engine.fee_sources.get(source_name)?.clone();
            engine.harvester.harvest(host, &source)
        })
    }

    /// Permissionless harvest of several sources; all succeed or none apply.
    pub fn harvest_batch<H: Host>(
        &mut self,
        host: &mut H,
        sources: &[FeeSource],
    ) -> EngineResult<()> {
        self.atomically(host, |engine, host| engine.harvester.harvest_all(host, sources))
    }

    // ---------- administrative surface ----------

    pub fn set_params(&mut self, caller: Address, params: RiskParams) -> EngineResult<()> {
        self.store.set_params(caller, params)
    }

    pub fn set_max_amount_per_action(
        &mut self,
        caller: Address,
        amount: U256,
    ) -> EngineResult<()> {
        self.store.set_max_amount_per_action(caller, amount)
    }

    pub fn set_min_action_delay(&mut self, caller: Address, delay: u64) -> EngineResult<()> {
        self.store.set_min_action_delay(caller, delay)
    }

    pub fn set_max_deviation_bps(&mut self, caller: Address, bps: u16) -> EngineResult<()> {
        self.store.set_max_deviation_bps(caller, bps)
    }

    pub fn set_paused(&mut self, caller: Address, paused: bool) -> EngineResult<()> {
        self.store.set_paused(caller, paused)
    }

    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> EngineResult<()> {
        self.store.transfer_ownership(caller, new_owner)
    }

    /// Apply an upgrade step under a strictly higher version.
    pub fn upgrade(&mut self, caller: Address, version: u64, params: RiskParams) -> EngineResult<()> {
        self.store.reinitialize(caller, version, params)
    }

    pub fn register_fee_source(
        &mut self,
        caller: Address,
        name: &str,
        source: FeeSource,
    ) -> EngineResult<()> {
        self.store.ensure_owner(caller)?;
        self.fee_sources.register(name, source)?;
        info!(name, "[CONFIG] fee source registered");
        Ok(())
    }

    pub fn remove_fee_source(&mut self, caller: Address, name: &str) -> EngineResult<FeeSource> {
        self.store.ensure_owner(caller)?;
        let removed = self.fee_sources.remove(name).ok_or_else(|| {
            EngineError::InvalidFeeSourceConfiguration(format!("unknown fee source {name}"))
        })?;
        info!(name, "[CONFIG] fee source removed");
        Ok(removed)
    }

    pub fn set_default_fee_source(&mut self, caller: Address, name: &str) -> EngineResult<()> {
        self.store.ensure_owner(caller)?;
        self.fee_sources.set_default(name)?;
        info!(name, "[CONFIG] default fee source updated");
        Ok(())
    }

    // ---------- internals ----------

    /// Guard, swap, burn and stamp. Callers have already admitted the action.
    fn buyback<H: Host>(
        &mut self,
        host: &mut H,
        ctx: &CallContext,
        harvested: bool,
    ) -> EngineResult<BuybackReceipt> {
        let params = self.store.params()?;
        let (observation, limit) =
            self.guard
                .compute_limit(&*host, self.settings.pool, params.max_deviation_bps)?;
        let fill = self
            .executor
            .swap(host, self.settings.custody, &params, &limit)?;
        self.sink
            .dispose(host, self.settings.custody, fill.amount_out)?;
        self.store.record_action(ctx.now);

        Ok(BuybackReceipt {
            harvested,
            amount_in: fill.amount_in,
            amount_spent: fill.amount_spent,
            amount_out: fill.amount_out,
            observation,
            limit,
            timestamp: ctx.now,
        })
    }

    /// Runs `action` as one indivisible step: on error the host and the
    /// configuration store are put back exactly as they were.
    fn atomically<H, T, F>(&mut self, host: &mut H, action: F) -> EngineResult<T>
    where
        H: Host,
        F: FnOnce(&mut Self, &mut H) -> EngineResult<T>,
    {
        let host_checkpoint = host.checkpoint();
        let store_checkpoint = self.store.clone();
        let registry_checkpoint = self.fee_sources.clone();

        match action(self, host) {
            Ok(value) => Ok(value),
            Err(err) => {
                host.restore(host_checkpoint);
                self.store = store_checkpoint;
                self.fee_sources = registry_checkpoint;
                warn!(error = %err, "[ENGINE] action rolled back");
                Err(err)
            }
        }
    }
}
