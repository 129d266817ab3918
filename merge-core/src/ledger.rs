//! Aggregate bookkeeping on the singleton `Collection`.
//!
//! Reconciliation produces one `CollectionDelta` per event, computed from the
//! entity state as it was before the event touched it. The delta is applied
//! to the collection in a single step.

use crate::{
    models::{Collection, Tier},
    scenario::Scenario,
};
use std::ops::{Add, AddAssign};

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CollectionDelta {
    pub unique_owners: i64,
    pub minted: i64,
    pub current: i64,
    pub burns: i64,
    pub merges: i64,
    /// Indexed by `Tier::class() - 1`.
    pub tier_totals: [i64; 4],
    pub total_mass: i64,
    pub original_mass: i64,
    /// New alpha pointer. When deltas are combined the later one wins.
    pub alpha_token_id: Option<String>,
}

fn tier_index(tier: Tier) -> usize {
    (tier.class() - 1) as usize
}

// Masses are remainders of `CLASS_MULTIPLIER` and always fit.
fn signed(mass: u64) -> i64 {
    mass as i64
}

impl CollectionDelta {
    /// A `User` entity was created for an address seen for the first time.
    pub fn new_owner() -> Self {
        CollectionDelta {
            unique_owners: 1,
            ..Default::default()
        }
    }

    pub fn mint(tier: Tier, mass: u64) -> Self {
        let mut delta = CollectionDelta {
            minted: 1,
            current: 1,
            total_mass: signed(mass),
            original_mass: signed(mass),
            ..Default::default()
        };
        delta.tier_totals[tier_index(tier)] = 1;
        delta
    }

    /// Removal of a live token of `tier` and `mass`. Scenarios that are not
    /// burns yield an empty delta.
    pub fn burn(scenario: Scenario, tier: Tier, mass: u64) -> Self {
        if !scenario.is_burn() {
            return Self::default();
        }
        let mut delta = CollectionDelta {
            current: -1,
            burns: 1,
            ..Default::default()
        };
        delta.tier_totals[tier_index(tier)] = -1;
        match scenario {
            Scenario::ExternalBurn => delta.unique_owners = -1,
            Scenario::DirectBurn => {
                delta.unique_owners = -1;
                delta.total_mass = -signed(mass);
            }
            _ => {}
        }
        delta
    }

    pub fn merge() -> Self {
        CollectionDelta {
            merges: 1,
            ..Default::default()
        }
    }

    /// A live token moved from one tier to another because its mass grew
    /// past a class boundary.
    pub fn retier(from: Tier, to: Tier) -> Self {
        let mut delta = CollectionDelta::default();
        if from != to {
            delta.tier_totals[tier_index(from)] -= 1;
            delta.tier_totals[tier_index(to)] += 1;
        }
        delta
    }

    pub fn alpha(token_id: String) -> Self {
        CollectionDelta {
            alpha_token_id: Some(token_id),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl AddAssign for CollectionDelta {
    fn add_assign(&mut self, rhs: Self) {
        self.unique_owners += rhs.unique_owners;
        self.minted += rhs.minted;
        self.current += rhs.current;
        self.burns += rhs.burns;
        self.merges += rhs.merges;
        for (total, rhs) in self.tier_totals.iter_mut().zip(rhs.tier_totals.iter()) {
            *total += rhs;
        }
        self.total_mass += rhs.total_mass;
        self.original_mass += rhs.original_mass;
        if rhs.alpha_token_id.is_some() {
            self.alpha_token_id = rhs.alpha_token_id;
        }
    }
}

impl Add for CollectionDelta {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl Collection {
    pub fn apply(&mut self, delta: &CollectionDelta) {
        self.total_unique_owner_addresses += delta.unique_owners;
        self.initial_nft_total += delta.minted;
        self.current_nft_count += delta.current;
        self.total_burns += delta.burns;
        self.total_merges += delta.merges;
        for tier in Tier::ALL.iter() {
            *self.tier_totals_mut(*tier) += delta.tier_totals[tier_index(*tier)];
        }
        self.total_mass += delta.total_mass;
        self.original_mass += delta.original_mass;
        if let Some(alpha_token_id) = &delta.alpha_token_id {
            self.alpha_token_id = Some(alpha_token_id.clone());
        }
    }
}
