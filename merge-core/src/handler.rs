//! Per-event entry point and the ordered, atomic application of its results.

use crate::{
    config::IndexerConfig,
    error::IndexError,
    events::{
        event_data::{AlphaMassUpdate, MassUpdate, Transfer},
        BlockContext, Event, EventSortKey,
    },
    models::Collection,
    oracle::MergeContractReading,
    reconciler::Reconciler,
    scenario::{Scenario, ScenarioClassifier},
    store::{EntityOperation, EntityStore, Transaction},
};
use anyhow::{Context as _, Result};
use log::{debug, info};

#[cfg_attr(test, mockall::automock)]
pub trait EventHandler {
    /// Computes the entity writes for a single event against the current
    /// state of `store`. The store itself is left untouched.
    fn process_event(
        &self,
        block: &BlockContext,
        event: &Event,
        store: &dyn EntityStore,
    ) -> Result<Vec<EntityOperation>>;
}

pub struct MergeEventHandler {
    config: IndexerConfig,
    classifier: ScenarioClassifier,
    contract: Box<dyn MergeContractReading>,
}

impl MergeEventHandler {
    pub fn new(config: IndexerConfig, contract: Box<dyn MergeContractReading>) -> Self {
        MergeEventHandler {
            classifier: ScenarioClassifier::new(&config),
            config,
            contract,
        }
    }

    fn reconciler<'t, 's>(&'t self, transaction: &'t mut Transaction<'s>) -> Reconciler<'t, 's> {
        Reconciler::new(transaction, self.contract.as_ref(), &self.config)
    }

    fn transfer(&self, transaction: &mut Transaction, transfer: &Transfer) -> Result<()> {
        let collection_id = self.config.collection_id();
        let (mut collection, created) = transaction.get_or_create(&collection_id, || {
            Collection::new(
                collection_id.clone(),
                self.config.collection_name.clone(),
                self.config.token_standard.clone(),
            )
        })?;
        if created {
            info!("created collection {}", collection.id);
        }

        let scenario = self.classifier.classify_transfer(transfer);
        debug!("token {} transfer is a {}", transfer.token_id, scenario);

        let mut reconciler = self.reconciler(transaction);
        let mut delta = reconciler.receive(transfer.to)?;
        delta += match scenario {
            Scenario::Mint => reconciler.mint(transfer)?,
            Scenario::NormalTransfer => reconciler.transfer(transfer)?,
            // Transfers classify into mints, burns and normal transfers only.
            burn => reconciler.burn(burn, transfer)?,
        };

        collection.apply(&delta);
        transaction.save(collection);
        Ok(())
    }

    fn mass_update(
        &self,
        transaction: &mut Transaction,
        block: &BlockContext,
        event: &MassUpdate,
    ) -> Result<()> {
        let mut collection: Collection =
            transaction.load_existing(&self.config.collection_id())?;
        let delta = self
            .reconciler(transaction)
            .merge(event, block.timestamp)?;
        collection.apply(&delta);
        transaction.save(collection);
        Ok(())
    }

    fn alpha_mass_update(
        &self,
        transaction: &mut Transaction,
        event: &AlphaMassUpdate,
    ) -> Result<()> {
        let mut collection: Collection =
            transaction.load_existing(&self.config.collection_id())?;
        let delta = self
            .reconciler(transaction)
            .alpha_change(event, collection.alpha_token_id.as_deref())?;
        if !delta.is_empty() {
            collection.apply(&delta);
            transaction.save(collection);
        }
        Ok(())
    }
}

impl EventHandler for MergeEventHandler {
    fn process_event(
        &self,
        block: &BlockContext,
        event: &Event,
        store: &dyn EntityStore,
    ) -> Result<Vec<EntityOperation>> {
        let mut transaction = Transaction::new(store);
        let result = match event {
            Event::Transfer(transfer) => self.transfer(&mut transaction, transfer),
            Event::MassUpdate(event) => self.mass_update(&mut transaction, block, event),
            Event::AlphaMassUpdate(event) => self.alpha_mass_update(&mut transaction, event),
            Event::WhitelistUpdate(event) => {
                self.reconciler(&mut transaction).whitelist_update(event)
            }
        };
        result.with_context(|| {
            format!(
                "failed to handle {} event at {}",
                event.name(),
                block.sort_key()
            )
        })?;
        Ok(transaction.into_operations())
    }
}

/// Applies events to a store one at a time, in strictly increasing chain
/// order. The writes of an event are committed together or not at all.
pub struct Indexer<S> {
    store: S,
    handler: Box<dyn EventHandler>,
    last_handled: Option<EventSortKey>,
}

impl<S: EntityStore> Indexer<S> {
    pub fn new(store: S, handler: Box<dyn EventHandler>) -> Self {
        Indexer {
            store,
            handler,
            last_handled: None,
        }
    }

    pub fn handle_event(&mut self, block: &BlockContext, event: &Event) -> Result<()> {
        let received = block.sort_key();
        if let Some(last) = self.last_handled {
            if received <= last {
                return Err(IndexError::OutOfOrderEvent { last, received }.into());
            }
        }

        let operations = self.handler.process_event(block, event, &self.store)?;
        debug!(
            "committing {} entity operations for {} at {}",
            operations.len(),
            event.name(),
            received
        );
        self.store.apply(operations)?;
        self.last_handled = Some(received);
        Ok(())
    }

    pub fn last_handled(&self) -> Option<EventSortKey> {
        self.last_handled
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
