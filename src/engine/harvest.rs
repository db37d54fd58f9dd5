//! Fee collection from both custodian generations into engine custody.

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{EngineError, EngineResult};
use crate::host::{LegacyFeeCustodian, RewardFeeCustodian};

/// Where fee revenue is pulled from. The two custodian generations are not
/// interchangeable: legacy custodians take the recipient as an argument,
/// reward custodians pay out to the address registered with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeeSource {
    Legacy {
        custodian: Address,
        position_id: U256,
    },
    LegacyBatch {
        collector: Address,
        positions: Vec<(Address, U256)>,
    },
    Reward {
        custodian: Address,
        position_id: U256,
    },
    RewardBatch {
        custodian: Address,
        position_ids: Vec<U256>,
    },
}

impl FeeSource {
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |reason: &str| Err(EngineError::InvalidFeeSourceConfiguration(reason.into()));
        match self {
            FeeSource::Legacy { custodian, .. } | FeeSource::Reward { custodian, .. } => {
                if custodian.is_zero() {
                    return invalid("custodian is unset");
                }
            }
            FeeSource::LegacyBatch {
                collector,
                positions,
            } => {
                if collector.is_zero() {
                    return invalid("batch collector is unset");
                }
                if positions.is_empty() {
                    return invalid("batch has no positions");
                }
                if positions.iter().any(|(custodian, _)| custodian.is_zero()) {
                    return invalid("batch references an unset custodian");
                }
            }
            FeeSource::RewardBatch {
                custodian,
                position_ids,
            } => {
                if custodian.is_zero() {
                    return invalid("custodian is unset");
                }
                if position_ids.is_empty() {
                    return invalid("batch has no positions");
                }
            }
        }
        Ok(())
    }

    fn position_count(&self) -> usize {
        match self {
            FeeSource::Legacy { .. } | FeeSource::Reward { .. } => 1,
            FeeSource::LegacyBatch { positions, .. } => positions.len(),
            FeeSource::RewardBatch { position_ids, .. } => position_ids.len(),
        }
    }
}

/// Named fee sources with an optional default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSourceRegistry {
    sources: BTreeMap<String, FeeSource>,
    default: Option<String>,
}

impl FeeSourceRegistry {
    /// Registers or replaces `name`. The first source registered becomes the default.
    pub fn register(&mut self, name: impl Into<String>, source: FeeSource) -> EngineResult<()> {
        source.validate()?;
        let name = name.into();
        if self.default.is_none() {
            self.default = Some(name.clone());
        }
        self.sources.insert(name, source);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<FeeSource> {
        let removed = self.sources.remove(name);
        if self.default.as_deref() == Some(name) {
            self.default = None;
        }
        removed
    }

    pub fn set_default(&mut self, name: &str) -> EngineResult<()> {
        if !self.sources.contains_key(name) {
            return Err(EngineError::InvalidFeeSourceConfiguration(format!(
                "unknown fee source {name}"
            )));
        }
        self.default = Some(name.to_string());
        Ok(())
    }

    pub fn get(&self, name: &str) -> EngineResult<&FeeSource> {
        self.sources.get(name).ok_or_else(|| {
            EngineError::InvalidFeeSourceConfiguration(format!("unknown fee source {name}"))
        })
    }

    pub fn default_source(&self) -> EngineResult<&FeeSource> {
        let name = self.default.as_deref().ok_or_else(|| {
            EngineError::InvalidFeeSourceConfiguration("no default fee source registered".into())
        })?;
        self.get(name)
    }

    pub fn default_name(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Every source is well formed and the default, if any, is registered.
    pub fn validate(&self) -> EngineResult<()> {
        for source in self.sources.values() {
            source.validate()?;
        }
        match self.default.as_deref() {
            Some(name) if !self.sources.contains_key(name) => Err(
                EngineError::InvalidFeeSourceConfiguration(format!(
                    "default fee source {name} is not registered"
                )),
            ),
            _ => Ok(()),
        }
    }
}

/// Pulls fees into `custody`. Anyone may trigger it: funds only move inward.
#[derive(Debug, Clone, Copy)]
pub struct FeeHarvester {
    custody: Address,
}

impl FeeHarvester {
    pub fn new(custody: Address) -> Self {
        Self { custody }
    }

    pub fn harvest<H>(&self, host: &mut H, source: &FeeSource) -> EngineResult<()>
    where
        H: LegacyFeeCustodian + RewardFeeCustodian + ?Sized,
    {
        source.validate()?;
        match source {
            FeeSource::Legacy {
                custodian,
                position_id,
            } => host.collect_fees(*custodian, self.custody, *position_id)?,
            FeeSource::LegacyBatch {
                collector,
                positions,
            } => host.collect_fees_batch(*collector, self.custody, positions)?,
            FeeSource::Reward {
                custodian,
                position_id,
            } => host.collect_rewards(*custodian, *position_id)?,
            FeeSource::RewardBatch {
                custodian,
                position_ids,
            } => host.collect_rewards_batch(*custodian, position_ids)?,
        }
        info!(
            positions = source.position_count(),
            ?source,
            "[HARVEST] fees collected"
        );
        Ok(())
    }

    /// Harvests every source in order, stopping at the first failure.
    pub fn harvest_all<H>(&self, host: &mut H, sources: &[FeeSource]) -> EngineResult<()>
    where
        H: LegacyFeeCustodian + RewardFeeCustodian + ?Sized,
    {
        if sources.is_empty() {
            return Err(EngineError::InvalidFeeSourceConfiguration(
                "no fee sources given".into(),
            ));
        }
        // Validate up front so a bad entry fails before any call goes out.
        for source in sources {
            source.validate()?;
        }
        for source in sources {
            self.harvest(host, source)?;
        }
        Ok(())
    }
}
