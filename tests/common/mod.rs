//! In-memory chain used by the integration scenarios.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use alloy_primitives::{Address, U256};
use buyback_burner::engine::{
    BuybackEngine, DEFAULT_WINDOW_SECS, EngineSettings, OriginCheck, RiskParams, SwapRoute,
};
use buyback_burner::errors::{EngineError, EngineResult};
use buyback_burner::host::{
    Checkpoint, LegacyFeeCustodian, RewardFeeCustodian, SwapVenue, TickOracle, TokenLedger,
};
use buyback_burner::models::{BURN_ADDRESS, TradeRequest};

pub const ONE: u128 = 1_000_000_000_000_000_000;

pub fn owner() -> Address {
    Address::repeat_byte(0xa0)
}

pub fn keeper() -> Address {
    Address::repeat_byte(0xa1)
}

pub fn custody() -> Address {
    Address::repeat_byte(0xee)
}

pub fn base() -> Address {
    Address::repeat_byte(0xb0)
}

pub fn target() -> Address {
    Address::repeat_byte(0xc0)
}

pub fn pool() -> Address {
    Address::repeat_byte(0xd0)
}

pub fn eth(units: u128) -> U256 {
    U256::from(units * ONE)
}

/// 1e18 per action, one hour apart, 10 ticks of deviation.
pub fn default_params() -> RiskParams {
    RiskParams {
        max_amount_per_action: eth(1),
        min_action_delay: 3600,
        max_deviation_bps: 10,
        paused: false,
    }
}

pub fn settings(origin_check: OriginCheck) -> EngineSettings {
    EngineSettings {
        custody: custody(),
        pool: pool(),
        route: SwapRoute {
            base_token: base(),
            target_token: target(),
            fee_tier: 3000,
        },
        origin_check,
        twap_window_secs: DEFAULT_WINDOW_SECS,
    }
}

pub fn engine() -> BuybackEngine {
    BuybackEngine::initialize(settings(OriginCheck::Enforced), owner(), default_params())
        .expect("engine initializes")
}

/// Token balances, one pool, and fee custodians of both generations.
///
/// The pool pays `rate` target units per base unit and absorbs at most
/// `fill_capacity` base before its price limit is reached.
#[derive(Debug, Clone, Default)]
pub struct MockChain {
    pub balances: HashMap<(Address, Address), U256>,
    pub tick: i32,
    /// Look-back the cumulatives were recorded over; `observe` serves nothing else.
    pub window_secs: u32,
    pub tick_cumulatives: [i64; 2],
    pub rate: U256,
    pub fill_capacity: Option<U256>,
    pub trades: Vec<TradeRequest>,
    pub legacy_fees: HashMap<(Address, U256), U256>,
    pub legacy_collectors: HashSet<Address>,
    pub reward_fees: HashMap<(Address, U256), U256>,
    pub reward_recipients: HashMap<Address, Address>,
    pub reject_transfers_to: Option<Address>,
}

impl MockChain {
    /// Pool at `tick` whose mean over the default window is `mean_tick`.
    pub fn with_ticks(tick: i32, mean_tick: i32) -> Self {
        Self::with_window(tick, mean_tick, DEFAULT_WINDOW_SECS)
    }

    /// Pool at `tick` whose mean over `window_secs` is `mean_tick`.
    pub fn with_window(tick: i32, mean_tick: i32, window_secs: u32) -> Self {
        let start = 1_000_000i64;
        Self {
            tick,
            window_secs,
            tick_cumulatives: [start, start + mean_tick as i64 * window_secs as i64],
            rate: U256::from(2u64),
            ..Self::default()
        }
    }

    pub fn credit(&mut self, token: Address, holder: Address, amount: U256) {
        let entry = self.balances.entry((token, holder)).or_default();
        *entry += amount;
    }

    pub fn balance(&self, token: Address, holder: Address) -> U256 {
        self.balance_of(token, holder)
    }

    pub fn add_legacy_fees(&mut self, custodian: Address, position_id: u64, amount: U256) {
        self.legacy_fees
            .insert((custodian, U256::from(position_id)), amount);
    }

    pub fn add_reward_fees(
        &mut self,
        custodian: Address,
        recipient: Address,
        position_id: u64,
        amount: U256,
    ) {
        self.reward_recipients.insert(custodian, recipient);
        self.reward_fees
            .insert((custodian, U256::from(position_id)), amount);
    }

    fn pay_out(
        fees: &mut HashMap<(Address, U256), U256>,
        custodian: Address,
        position_id: U256,
    ) -> EngineResult<U256> {
        fees.remove(&(custodian, position_id)).ok_or_else(|| {
            EngineError::ExternalCall(format!("custodian {custodian} has no position {position_id}"))
        })
    }
}

impl TokenLedger for MockChain {
    fn balance_of(&self, token: Address, holder: Address) -> U256 {
        self.balances
            .get(&(token, holder))
            .copied()
            .unwrap_or_default()
    }

    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> EngineResult<()> {
        if from == BURN_ADDRESS {
            return Err(EngineError::ExternalCall("burn address cannot spend".into()));
        }
        if self.reject_transfers_to == Some(to) {
            return Err(EngineError::ExternalCall(format!("transfer to {to} rejected")));
        }
        let balance = self.balance_of(token, from);
        let rest = balance
            .checked_sub(amount)
            .ok_or_else(|| EngineError::ExternalCall("transfer amount exceeds balance".into()))?;
        self.balances.insert((token, from), rest);
        self.credit(token, to, amount);
        Ok(())
    }
}

impl TickOracle for MockChain {
    fn current_tick(&self, pool_address: Address) -> EngineResult<i32> {
        if pool_address != pool() {
            return Err(EngineError::ExternalCall("unknown pool".into()));
        }
        Ok(self.tick)
    }

    fn observe(&self, pool_address: Address, seconds_agos: [u32; 2]) -> EngineResult<[i64; 2]> {
        if pool_address != pool() {
            return Err(EngineError::ExternalCall("unknown pool".into()));
        }
        if seconds_agos != [self.window_secs, 0] {
            return Err(EngineError::ExternalCall(format!(
                "no observation for {seconds_agos:?}"
            )));
        }
        Ok(self.tick_cumulatives)
    }
}

impl SwapVenue for MockChain {
    fn trade(&mut self, request: &TradeRequest) -> EngineResult<U256> {
        self.trades.push(request.clone());
        let spent = match self.fill_capacity {
            Some(capacity) => request.amount_in.min(capacity),
            None => request.amount_in,
        };
        let balance = self.balance_of(request.token_in, request.recipient);
        let rest = balance
            .checked_sub(spent)
            .ok_or_else(|| EngineError::ExternalCall("STF".into()))?;
        self.balances.insert((request.token_in, request.recipient), rest);
        let amount_out = spent * self.rate;
        self.credit(request.token_out, request.recipient, amount_out);
        Ok(amount_out)
    }
}

impl LegacyFeeCustodian for MockChain {
    fn collect_fees(
        &mut self,
        custodian: Address,
        recipient: Address,
        position_id: U256,
    ) -> EngineResult<()> {
        let amount = Self::pay_out(&mut self.legacy_fees, custodian, position_id)?;
        self.credit(base(), recipient, amount);
        Ok(())
    }

    fn collect_fees_batch(
        &mut self,
        collector: Address,
        recipient: Address,
        positions: &[(Address, U256)],
    ) -> EngineResult<()> {
        if !self.legacy_collectors.contains(&collector) {
            return Err(EngineError::ExternalCall(format!("no collector at {collector}")));
        }
        for (custodian, position_id) in positions {
            self.collect_fees(*custodian, recipient, *position_id)?;
        }
        Ok(())
    }
}

impl RewardFeeCustodian for MockChain {
    fn collect_rewards(&mut self, custodian: Address, position_id: U256) -> EngineResult<()> {
        let recipient = *self
            .reward_recipients
            .get(&custodian)
            .ok_or_else(|| EngineError::ExternalCall("no registered recipient".into()))?;
        let amount = Self::pay_out(&mut self.reward_fees, custodian, position_id)?;
        self.credit(base(), recipient, amount);
        Ok(())
    }

    fn collect_rewards_batch(
        &mut self,
        custodian: Address,
        position_ids: &[U256],
    ) -> EngineResult<()> {
        for position_id in position_ids {
            self.collect_rewards(custodian, *position_id)?;
        }
        Ok(())
    }
}

impl Checkpoint for MockChain {
    type Snapshot = MockChain;

    fn checkpoint(&self) -> Self::Snapshot {
        self.clone()
    }

    fn restore(&mut self, snapshot: Self::Snapshot) {
        *self = snapshot;
    }
}
