//! Reconciliation core of the Merge collection subgraph.
//!
//! Contract events are folded, one at a time and in chain order, into a
//! projection of `User`, `NFT` and `Collection` entities.

// Mockall triggers this warning for every mocked trait.
#![cfg_attr(test, allow(clippy::unused_unit))]

#[macro_use]
pub mod macros;

pub mod config;
pub mod error;
pub mod event_log;
pub mod events;
pub mod handler;
pub mod invariants;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod oracle;
pub mod reconciler;
pub mod scenario;
pub mod serialization;
pub mod store;

pub use self::{
    config::IndexerConfig,
    error::IndexError,
    events::{BlockContext, Event, EventSortKey},
    handler::{EventHandler, Indexer, MergeEventHandler},
    store::{EntityStore, InMemoryStore},
};
