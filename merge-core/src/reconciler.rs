//! Create-or-update logic for `User` and `NFT` records, one method per
//! scenario.
//!
//! Every method reads and writes through the event's `Transaction` and
//! returns the `CollectionDelta` its changes imply, computed from the records
//! as they were loaded and before they were mutated.

use crate::{
    config::IndexerConfig,
    error::IndexError,
    events::{
        address_id,
        event_data::{AlphaMassUpdate, MassUpdate, Transfer, WhitelistUpdate},
        token_id,
    },
    ledger::CollectionDelta,
    models::{Nft, PackedValue, User},
    oracle::MergeContractReading,
    scenario::Scenario,
    store::Transaction,
};
use anyhow::{Context as _, Result};
use log::{debug, info, warn};
use primitive_types::{H160, U256};

pub struct Reconciler<'t, 's> {
    transaction: &'t mut Transaction<'s>,
    contract: &'t dyn MergeContractReading,
    config: &'t IndexerConfig,
}

impl<'t, 's> Reconciler<'t, 's> {
    pub fn new(
        transaction: &'t mut Transaction<'s>,
        contract: &'t dyn MergeContractReading,
        config: &'t IndexerConfig,
    ) -> Self {
        Reconciler {
            transaction,
            contract,
            config,
        }
    }

    /// Makes sure a `User` exists for the receiving side of a transfer. The
    /// zero address is never materialized.
    pub fn receive(&mut self, to: H160) -> Result<CollectionDelta> {
        if to.is_zero() {
            return Ok(CollectionDelta::default());
        }
        let id = address_id(to);
        let whitelist = to == self.config.distributor;
        let (user, created) = self
            .transaction
            .get_or_create(&id, || User::new(id.clone(), whitelist))?;
        if !created {
            return Ok(CollectionDelta::default());
        }
        info!("new user {} (whitelisted: {})", user.id, user.whitelist);
        self.transaction.save(user);
        Ok(CollectionDelta::new_owner())
    }

    pub fn mint(&mut self, transfer: &Transfer) -> Result<CollectionDelta> {
        let id = token_id(transfer.token_id);
        if self.transaction.load::<Nft>(&id)?.is_some() {
            return Err(IndexError::TokenAlreadyMinted(id).into());
        }
        let value = self
            .contract
            .packed_value(transfer.token_id)
            .with_context(|| format!("failed to read packed value of token {}", id))?;
        let nft = Nft::mint(id, address_id(transfer.to), PackedValue(value))?;
        info!(
            "minted token {} with tier {} and mass {}",
            nft.id, nft.tier, nft.mass
        );
        let delta = CollectionDelta::mint(nft.tier, nft.mass);
        self.transaction.save(nft);
        Ok(delta)
    }

    /// Retires a live token. The record stays with its last known tier and
    /// mass and the burn marker set.
    pub fn burn(&mut self, scenario: Scenario, transfer: &Transfer) -> Result<CollectionDelta> {
        let mut nft: Nft = self
            .transaction
            .load_existing(&token_id(transfer.token_id))?;
        if nft.burned {
            return Err(IndexError::TokenAlreadyBurned(nft.id).into());
        }
        let delta = CollectionDelta::burn(scenario, nft.tier, nft.mass);

        if !nft.is_terminal() {
            nft.transfer_to(address_id(transfer.to));
        }
        nft.burned = true;
        debug!("token {} burned ({})", nft.id, scenario);
        self.transaction.save(nft);
        Ok(delta)
    }

    pub fn transfer(&mut self, transfer: &Transfer) -> Result<CollectionDelta> {
        let mut nft: Nft = self
            .transaction
            .load_existing(&token_id(transfer.token_id))?;
        if nft.burned {
            return Err(IndexError::TokenAlreadyBurned(nft.id).into());
        }
        if let Some(merged_into) = &nft.merged_into {
            // The contract moves absorbed tokens around on their way to the
            // zero address. They keep the owner they had when absorbed.
            debug!(
                "ignoring owner change of token {} absorbed by {}",
                nft.id, merged_into
            );
            return Ok(CollectionDelta::default());
        }
        nft.transfer_to(address_id(transfer.to));
        self.transaction.save(nft);
        Ok(CollectionDelta::default())
    }

    pub fn merge(&mut self, event: &MassUpdate, timestamp: u64) -> Result<CollectionDelta> {
        let burned_id = token_id(event.token_id_burned);
        let persist_id = token_id(event.token_id_persist);
        if burned_id == persist_id {
            return Err(IndexError::SelfMerge(burned_id).into());
        }

        let mut burned: Nft = self.transaction.load_existing(&burned_id)?;
        let mut persist: Nft = self.transaction.load_existing(&persist_id)?;
        for nft in &[&burned, &persist] {
            if nft.is_terminal() {
                return Err(IndexError::TerminalToken(nft.id.clone()).into());
            }
            if nft.burned {
                return Err(IndexError::TokenAlreadyBurned(nft.id.clone()).into());
            }
        }

        let tier_before = persist.tier;
        persist.absorb(&burned, timestamp)?;
        if U256::from(persist.mass) != event.mass {
            warn!(
                "token {} absorbed token {} for a mass of {} but the contract reported {}",
                persist.id, burned.id, persist.mass, event.mass
            );
        }
        burned.merged_into = Some(persist.id.clone());
        debug!(
            "token {} merged into token {} (merge count {})",
            burned.id, persist.id, persist.merge_count
        );

        let delta = CollectionDelta::merge() + CollectionDelta::retier(tier_before, persist.tier);
        self.transaction.save(burned);
        self.transaction.save(persist);
        Ok(delta)
    }

    /// `previous_alpha` is the collection's alpha pointer before this event.
    pub fn alpha_change(
        &mut self,
        event: &AlphaMassUpdate,
        previous_alpha: Option<&str>,
    ) -> Result<CollectionDelta> {
        let id = token_id(event.token_id);
        let mut nft: Nft = self.transaction.load_existing(&id)?;
        if nft.is_terminal() {
            return Err(IndexError::TerminalToken(id).into());
        }
        if nft.burned {
            return Err(IndexError::TokenAlreadyBurned(id).into());
        }

        if nft.is_alpha {
            nft.refresh_alpha_mass(event.alpha_mass)?;
            debug!("alpha token {} now has mass {}", nft.id, nft.mass);
            self.transaction.save(nft);
            return Ok(CollectionDelta::default());
        }

        if let Some(previous_id) = previous_alpha {
            let mut previous: Nft = self.transaction.load_existing(previous_id)?;
            previous.demote_from_alpha();
            self.transaction.save(previous);
        }
        nft.promote_to_alpha(event.alpha_mass)?;
        info!(
            "token {} replaces {} as alpha with mass {}",
            nft.id,
            previous_alpha.unwrap_or("nothing"),
            nft.mass
        );
        self.transaction.save(nft);
        Ok(CollectionDelta::alpha(id))
    }

    /// Whitelist changes are only issued for addresses that already hold or
    /// held a token, so an unknown user is an error.
    pub fn whitelist_update(&mut self, event: &WhitelistUpdate) -> Result<()> {
        let mut user: User = self.transaction.load_existing(&address_id(event.address))?;
        user.whitelist = event.status;
        self.transaction.save(user);
        Ok(())
    }
}
