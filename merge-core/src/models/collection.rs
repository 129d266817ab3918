use super::Tier;
use serde::{Deserialize, Serialize};

/// Running totals over the whole collection. There is exactly one, keyed by
/// the contract address.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub token_standard: String,
    pub total_unique_owner_addresses: i64,
    /// Number of tokens ever minted.
    #[serde(rename = "initialNFTTotal")]
    pub initial_nft_total: i64,
    /// Number of tokens that have not been burned.
    #[serde(rename = "currentNFTCount")]
    pub current_nft_count: i64,
    pub total_burns: i64,
    pub total_merges: i64,
    pub tier1_totals: i64,
    pub tier2_totals: i64,
    pub tier3_totals: i64,
    pub tier4_totals: i64,
    pub total_mass: i64,
    /// Mass at mint time, never decremented.
    pub original_mass: i64,
    pub alpha_token_id: Option<String>,
}

impl Collection {
    pub fn new(id: String, name: String, token_standard: String) -> Self {
        Collection {
            id,
            name,
            token_standard,
            total_unique_owner_addresses: 0,
            initial_nft_total: 0,
            current_nft_count: 0,
            total_burns: 0,
            total_merges: 0,
            tier1_totals: 0,
            tier2_totals: 0,
            tier3_totals: 0,
            tier4_totals: 0,
            total_mass: 0,
            original_mass: 0,
            alpha_token_id: None,
        }
    }

    pub fn tier_totals(&self, tier: Tier) -> i64 {
        match tier {
            Tier::One => self.tier1_totals,
            Tier::Two => self.tier2_totals,
            Tier::Three => self.tier3_totals,
            Tier::Four => self.tier4_totals,
        }
    }

    pub fn tier_totals_mut(&mut self, tier: Tier) -> &mut i64 {
        match tier {
            Tier::One => &mut self.tier1_totals,
            Tier::Two => &mut self.tier2_totals,
            Tier::Three => &mut self.tier3_totals,
            Tier::Four => &mut self.tier4_totals,
        }
    }

    pub fn tier_totals_sum(&self) -> i64 {
        Tier::ALL.iter().map(|tier| self.tier_totals(*tier)).sum()
    }
}
