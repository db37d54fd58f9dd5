use crate::dex::state::PoolSnapshot;
use crate::errors::{AppError, Result};
use alloy_primitives::{Address, U256};
use ethers::{
    contract::{ContractCall, abigen},
    providers::{Http, Middleware, Provider},
    types::{BlockId, BlockNumber},
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

abigen!(
    UniswapV3Pool,
    r"[
        function slot0() view returns (uint160 sqrtPriceX96, int24 tick, uint16 observationIndex, uint16 observationCardinality, uint16 observationCardinalityNext, uint8 feeProtocol, bool unlocked)
        function observe(uint32[] secondsAgos) view returns (int56[] tickCumulatives, uint160[] secondsPerLiquidityCumulativeX128s)
        function fee() view returns (uint24)
    ]",
);

type PoolCall<D> = ContractCall<Provider<Http>, D>;

/// The three pool reads behind one snapshot.
struct PinnedReads {
    slot0: PoolCall<(ethers::types::U256, i32, u16, u16, u16, u8, bool)>,
    observe: PoolCall<(Vec<i64>, Vec<ethers::types::U256>)>,
    fee: PoolCall<u32>,
}

/// Handle for reading a specific Uniswap V3 pool.
#[derive(Clone)]
pub struct Dex {
    provider: Arc<Provider<Http>>,
    pool: UniswapV3Pool<Provider<Http>>,
    address: Address,
}

impl Dex {
    pub async fn new(rpc_url: &str, pool_addr: Address) -> Result<Self> {
        let provider = Arc::new(Provider::<Http>::try_from(rpc_url).map_err(|e| {
            AppError::Config(format!("invalid RPC url {rpc_url}: {e}"))
        })?);
        let pool = UniswapV3Pool::new(
            ethers::types::Address::from(pool_addr.0.0),
            provider.clone(),
        );
        pool.slot_0().call().await?; // sanity-check
        Ok(Self {
            provider,
            pool,
            address: pool_addr,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Capture tick, sqrt price and the cumulatives over `[window_secs, 0]`,
    /// all read at the same block.
    pub async fn snapshot(&self, window_secs: u32) -> Result<PoolSnapshot> {
        let block_number = self.provider.get_block_number().await?;
        let block: BlockId = BlockNumber::Number(block_number).into();

        let reads = self.reads_at(window_secs, block);

        let (sqrt_price_x96, tick, _, _, _, _fee_protocol, _unlocked) = reads.slot0.call().await?;
        let (tick_cumulatives, _seconds_per_liquidity) = reads.observe.call().await?;
        let fee = reads.fee.call().await?;

        let &[previous, current] = tick_cumulatives.as_slice() else {
            return Err(AppError::Config(format!(
                "observe returned {} cumulatives, expected 2",
                tick_cumulatives.len()
            )));
        };

        debug!(
            block = block_number.as_u64(),
            tick,
            previous,
            current,
            window_secs,
            "[DEX] snapshot captured"
        );

        Ok(PoolSnapshot {
            pool: self.address,
            tick,
            sqrt_price_x96: ethers_to_alloy(sqrt_price_x96),
            window_secs,
            tick_cumulatives: [previous, current],
            fee,
        })
    }

    fn reads_at(&self, window_secs: u32, block: BlockId) -> PinnedReads {
        PinnedReads {
            slot0: self.pool.slot_0().block(block),
            observe: self.pool.observe(vec![window_secs, 0]).block(block),
            fee: self.pool.fee().block(block),
        }
    }
}

/// Spawn a background task that refreshes the pool snapshot every `interval_secs`.
pub async fn spawn_snapshot_watcher(
    dex: Dex,
    window_secs: u32,
    interval_secs: u64,
) -> Result<(watch::Receiver<PoolSnapshot>, tokio::task::JoinHandle<()>)> {
    let initial = dex.snapshot(window_secs).await?;
    let (tx, rx) = watch::channel(initial);

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        loop {
            ticker.tick().await;
            match dex.snapshot(window_secs).await {
                Ok(state) => {
                    let _ = tx.send(state);
                }
                Err(e) => {
                    warn!(error = %e, "[DEX] failed to refresh pool snapshot");
                }
            }
        }
    });

    Ok((rx, handle))
}

fn ethers_to_alloy(value: ethers::types::U256) -> U256 {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    U256::from_be_bytes(bytes)
}
