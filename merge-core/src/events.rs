//! Events emitted by the Merge contract, as delivered by the indexing host.

use anyhow::{ensure, Context as _, Result};
use primitive_types::{H160, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod event_data {
    use crate::serialization::decimal_u256;
    use primitive_types::{H160, U256};
    use serde::{Deserialize, Serialize};

    /// ERC721 `Transfer(from, to, tokenId)`.
    #[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Transfer {
        pub from: H160,
        pub to: H160,
        #[serde(with = "decimal_u256")]
        pub token_id: U256,
    }

    /// `AlphaMassUpdate(tokenId, alphaMass)`, emitted whenever the token with
    /// the largest mass changes or grows.
    #[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AlphaMassUpdate {
        #[serde(with = "decimal_u256")]
        pub token_id: U256,
        #[serde(with = "decimal_u256")]
        pub alpha_mass: U256,
    }

    /// `MassUpdate(tokenIdBurned, tokenIdPersist, mass)`, emitted when one
    /// token absorbs another.
    #[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MassUpdate {
        #[serde(with = "decimal_u256")]
        pub token_id_burned: U256,
        #[serde(with = "decimal_u256")]
        pub token_id_persist: U256,
        #[serde(with = "decimal_u256")]
        pub mass: U256,
    }

    /// Call trace of `whitelistUpdate(address_, status)`. Not a log event but
    /// delivered through the same ordered stream.
    #[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WhitelistUpdate {
        pub address: H160,
        pub status: bool,
    }
}

use self::event_data::*;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "name", content = "params")]
pub enum Event {
    Transfer(Transfer),
    AlphaMassUpdate(AlphaMassUpdate),
    MassUpdate(MassUpdate),
    WhitelistUpdate(WhitelistUpdate),
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Transfer(_) => "Transfer",
            Event::AlphaMassUpdate(_) => "AlphaMassUpdate",
            Event::MassUpdate(_) => "MassUpdate",
            Event::WhitelistUpdate(_) => "WhitelistUpdate",
        }
    }
}

/// Position of an event in the chain. Events are applied in ascending order of
/// this key.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "camelCase")]
pub struct EventSortKey {
    pub block_number: u64,
    pub log_index: u64,
}

impl fmt::Display for EventSortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block_number, self.log_index)
    }
}

/// Block metadata the host attaches to every event.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockContext {
    pub block_number: u64,
    pub log_index: u64,
    /// Block timestamp in seconds since the unix epoch.
    pub timestamp: u64,
}

impl BlockContext {
    pub fn sort_key(&self) -> EventSortKey {
        EventSortKey {
            block_number: self.block_number,
            log_index: self.log_index,
        }
    }
}

/// Entity id of an address: lowercase hex with `0x` prefix.
pub fn address_id(address: H160) -> String {
    format!("{:#x}", address)
}

/// Entity id of a token: its decimal representation.
pub fn token_id(token_id: U256) -> String {
    token_id.to_string()
}

/// Parses a `0x` prefixed (or bare) 40 digit hex address.
pub fn parse_address(value: &str) -> Result<H160> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    ensure!(
        digits.len() == 40,
        "address '{}' must have 40 hex digits",
        value
    );
    let bytes = hex::decode(digits).with_context(|| format!("invalid address '{}'", value))?;
    Ok(H160::from_slice(&bytes))
}
