use alloy_primitives::{Address, U256};
use tracing::info;

use crate::errors::EngineResult;
use crate::host::TokenLedger;
use crate::models::BURN_ADDRESS;

/// Sends purchased target asset to an address nobody controls.
#[derive(Debug, Clone, Copy)]
pub struct BurnSink {
    token: Address,
    destination: Address,
}

impl BurnSink {
    pub fn new(token: Address) -> Self {
        Self {
            token,
            destination: BURN_ADDRESS,
        }
    }

    pub fn destination(&self) -> Address {
        self.destination
    }

    pub fn dispose<L>(&self, ledger: &mut L, from: Address, amount: U256) -> EngineResult<()>
    where
        L: TokenLedger + ?Sized,
    {
        ledger.transfer(self.token, from, self.destination, amount)?;
        info!(%amount, token = %self.token, "[BURN] target asset burned");
        Ok(())
    }
}
