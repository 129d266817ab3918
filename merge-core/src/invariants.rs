//! Consistency checks over a reconciled projection.
//!
//! These hold after every successfully applied event and are used by replays
//! to catch reconciliation bugs as close as possible to the offending event.

use crate::{
    config::IndexerConfig,
    error::IndexError,
    models::{PackedValue, Tier},
    store::InMemoryStore,
};
use primitive_types::U256;
use thiserror::Error;

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum InvariantViolation {
    #[error("tier totals add up to {tier_sum} but the current token count is {current}")]
    TierTotals { tier_sum: i64, current: i64 },
    #[error("tokens {0:?} are all flagged as alpha")]
    MultipleAlphas(Vec<String>),
    #[error("collection points to alpha {pointer:?} but the flagged alpha is {flagged:?}")]
    AlphaPointer {
        pointer: Option<String>,
        flagged: Option<String>,
    },
    #[error("token {id} with value {value} records tier {tier} and mass {mass}")]
    PackedValue {
        id: String,
        value: U256,
        tier: Tier,
        mass: u64,
    },
    #[error("token {id} has an undecodable value: {source}")]
    UndecodableValue { id: String, source: IndexError },
    #[error("token {id} has {records} merge records but a merge count of {merge_count}")]
    MergeHistory {
        id: String,
        records: usize,
        merge_count: u32,
    },
}

pub fn check_invariants(
    store: &InMemoryStore,
    config: &IndexerConfig,
) -> Result<(), InvariantViolation> {
    for nft in store.nfts() {
        let decoded =
            PackedValue(nft.value)
                .decode()
                .map_err(|source| InvariantViolation::UndecodableValue {
                    id: nft.id.clone(),
                    source,
                })?;
        if decoded.tier != nft.tier || decoded.mass != nft.mass {
            return Err(InvariantViolation::PackedValue {
                id: nft.id.clone(),
                value: nft.value,
                tier: nft.tier,
                mass: nft.mass,
            });
        }
        if nft.merges.len() != nft.merge_count as usize {
            return Err(InvariantViolation::MergeHistory {
                id: nft.id.clone(),
                records: nft.merges.len(),
                merge_count: nft.merge_count,
            });
        }
    }

    let mut alphas = store
        .nfts()
        .filter(|nft| nft.is_alpha)
        .map(|nft| nft.id.clone())
        .collect::<Vec<_>>();
    if alphas.len() > 1 {
        return Err(InvariantViolation::MultipleAlphas(alphas));
    }
    let flagged = alphas.pop();

    let collection = match store.collection(&config.collection_id()) {
        Some(collection) => collection,
        None if flagged.is_none() => return Ok(()),
        None => {
            return Err(InvariantViolation::AlphaPointer {
                pointer: None,
                flagged,
            })
        }
    };
    if collection.alpha_token_id != flagged {
        return Err(InvariantViolation::AlphaPointer {
            pointer: collection.alpha_token_id.clone(),
            flagged,
        });
    }
    let tier_sum = collection.tier_totals_sum();
    if tier_sum != collection.current_nft_count {
        return Err(InvariantViolation::TierTotals {
            tier_sum,
            current: collection.current_nft_count,
        });
    }
    Ok(())
}
