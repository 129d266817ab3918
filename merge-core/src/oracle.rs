//! Synchronous reads from the Merge contract.

use crate::serialization::decimal_u256;
use anyhow::{anyhow, Context as _, Result};
use primitive_types::U256;
use serde::Deserialize;
use std::{collections::HashMap, fs::File, io::Read, path::Path};

#[cfg_attr(test, mockall::automock)]
pub trait MergeContractReading {
    /// `getValueOf(tokenId)` as of the block being indexed.
    fn packed_value(&self, token_id: U256) -> Result<U256>;
}

/// Packed values recorded ahead of time, for replaying an event log without
/// access to a node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PackedValues(HashMap<U256, U256>);

#[derive(Deserialize)]
struct Decimal(#[serde(with = "decimal_u256")] U256);

impl PackedValues {
    pub fn insert(&mut self, token_id: U256, packed_value: U256) {
        self.0.insert(token_id, packed_value);
    }

    /// Reads a JSON object mapping decimal token ids to decimal packed values.
    pub fn read(reader: impl Read) -> Result<Self> {
        let raw: HashMap<String, Decimal> = serde_json::from_reader(reader)?;
        raw.into_iter()
            .map(|(token_id, Decimal(value))| {
                let token_id = U256::from_dec_str(&token_id)
                    .map_err(|err| anyhow!("invalid token id '{}': {:?}", token_id, err))?;
                Ok((token_id, value))
            })
            .collect::<Result<_>>()
            .map(PackedValues)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("couldn't open {}", path.display()))?;
        Self::read(file).with_context(|| format!("failed to read packed values from {}", path.display()))
    }
}

impl MergeContractReading for PackedValues {
    fn packed_value(&self, token_id: U256) -> Result<U256> {
        self.0
            .get(&token_id)
            .copied()
            .ok_or_else(|| anyhow!("no packed value recorded for token {}", token_id))
    }
}
