//! Everything an engine needs to resume after a restart.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::harvest::FeeSourceRegistry;
use crate::engine::store::ConfigStore;
use crate::errors::{EngineResult, Result};

/// Owner-managed state: risk configuration plus the registered fee sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineState {
    pub store: ConfigStore,
    #[serde(default)]
    pub fee_sources: FeeSourceRegistry,
}

impl EngineState {
    pub fn new(store: ConfigStore, fee_sources: FeeSourceRegistry) -> Self {
        Self { store, fee_sources }
    }

    pub fn validate(&self) -> EngineResult<()> {
        self.store.check_consistency()?;
        self.fee_sources.validate()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let state: Self = serde_json::from_str(raw)?;
        state.validate()?;
        Ok(state)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}
