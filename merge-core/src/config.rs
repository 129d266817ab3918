use crate::events::address_id;
use primitive_types::H160;
use serde::{Deserialize, Serialize};

/// The Merge contract on mainnet, which also keys the `Collection` entity.
pub const MERGE_CONTRACT: H160 = H160([
    0xc3, 0xf8, 0xa0, 0xf5, 0x84, 0x1a, 0xbf, 0xf7, 0x77, 0xd3, 0xee, 0xfa, 0x50, 0x47, 0xe8, 0xd4,
    0x13, 0xa1, 0xc9, 0xab,
]);

/// Nifty Gateway omnibus wallet. Every token is minted to it before being
/// distributed to collectors.
pub const NIFTY_GATEWAY_OMNIBUS: H160 = H160([
    0xe0, 0x52, 0x11, 0x3b, 0xd7, 0xd7, 0x70, 0x0d, 0x62, 0x34, 0x14, 0xa0, 0xa4, 0x58, 0x5b, 0xca,
    0xe7, 0x54, 0xe9, 0xd5,
]);

/// `0x000000000000000000000000000000000000dEaD`
pub const DEAD_ADDRESS: H160 = H160([
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0xde, 0xad,
]);

/// The addresses and static collection data the handlers depend on.
///
/// The zero address is not configurable: it is the ERC721 mint/burn marker.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexerConfig {
    pub collection_address: H160,
    pub collection_name: String,
    pub token_standard: String,
    pub distributor: H160,
    pub dead_address: H160,
}

impl IndexerConfig {
    pub fn collection_id(&self) -> String {
        address_id(self.collection_address)
    }
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            collection_address: MERGE_CONTRACT,
            collection_name: "merge.".to_string(),
            token_standard: "ERC721".to_string(),
            distributor: NIFTY_GATEWAY_OMNIBUS,
            dead_address: DEAD_ADDRESS,
        }
    }
}
