use super::{Color, DecodedValue, PackedValue, Tier};
use crate::{error::IndexError, serialization::decimal_u256};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// One absorption in the merge history of a token.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRecord {
    pub absorbed_nft: String,
    pub timestamp: u64,
}

/// A Merge token.
///
/// Records are never removed. A burned token keeps its last known value and
/// tier with `burned` set, a token absorbed by another one points to it via
/// `merged_into` and keeps the mass it had when it was absorbed.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Nft {
    pub id: String,
    /// Id of the owning `User`, or the zero address once burned.
    pub owner: String,
    #[serde(with = "decimal_u256")]
    pub value: U256,
    pub mass: u64,
    pub tier: Tier,
    pub color: Color,
    pub is_alpha: bool,
    pub merge_count: u32,
    pub merges: Vec<MergeRecord>,
    pub merged_into: Option<String>,
    pub burned: bool,
    /// Every owner the token was assigned, oldest first.
    pub owners: Vec<String>,
}

impl Nft {
    pub fn mint(id: String, owner: String, value: PackedValue) -> Result<Self, IndexError> {
        let DecodedValue { tier, mass } = value.decode()?;
        Ok(Nft {
            id,
            owners: vec![owner.clone()],
            owner,
            value: value.0,
            mass,
            tier,
            color: Color::of(tier, false),
            is_alpha: false,
            merge_count: 0,
            merges: Vec::new(),
            merged_into: None,
            burned: false,
        })
    }

    /// Absorbed tokens no longer change owner or mass.
    pub fn is_terminal(&self) -> bool {
        self.merged_into.is_some()
    }

    pub fn transfer_to(&mut self, owner: String) {
        self.owners.push(owner.clone());
        self.owner = owner;
    }

    /// Adds the mass of `burned` to this token's value and records the merge.
    pub fn absorb(&mut self, burned: &Nft, timestamp: u64) -> Result<(), IndexError> {
        let updated = PackedValue(U256::from(burned.mass) + self.value);
        let DecodedValue { tier, mass } = updated.decode()?;
        self.value = updated.0;
        self.mass = mass;
        self.tier = tier;
        self.color = Color::of(tier, self.is_alpha);
        self.merges.push(MergeRecord {
            absorbed_nft: burned.id.clone(),
            timestamp,
        });
        self.merge_count += 1;
        Ok(())
    }

    /// Sets the mass reported for the alpha, keeping the tier.
    pub fn refresh_alpha_mass(&mut self, mass: U256) -> Result<(), IndexError> {
        let value = PackedValue::encode(self.tier, mass)?;
        self.value = value.0;
        self.mass = mass.low_u64();
        Ok(())
    }

    pub fn promote_to_alpha(&mut self, mass: U256) -> Result<(), IndexError> {
        self.refresh_alpha_mass(mass)?;
        self.is_alpha = true;
        self.color = Color::of(self.tier, true);
        Ok(())
    }

    pub fn demote_from_alpha(&mut self) {
        self.is_alpha = false;
        self.color = Color::of(self.tier, false);
    }

    /// Ids of the absorbed tokens, in merge order (`absorbedNFTs`).
    pub fn absorbed_nfts(&self) -> impl Iterator<Item = &str> + '_ {
        self.merges.iter().map(|record| record.absorbed_nft.as_str())
    }

    /// Timestamps of the merges, parallel to `absorbed_nfts` (`mergeTimes`).
    pub fn merge_times(&self) -> impl Iterator<Item = u64> + '_ {
        self.merges.iter().map(|record| record.timestamp)
    }
}
