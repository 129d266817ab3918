use crate::{events::EventSortKey, store::EntityKey};
use primitive_types::U256;
use thiserror::Error;

/// Reasons for which an event cannot be applied to the projection.
///
/// Every one of these is fatal to the event being processed: none of its
/// writes are committed and index construction must halt.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum IndexError {
    #[error("{0} does not exist")]
    MissingEntity(EntityKey),
    #[error("{0} is stored with a different entity type")]
    EntityTypeMismatch(EntityKey),
    #[error("packed value {0} does not encode one of the four tiers")]
    UnknownTier(U256),
    #[error("mass {0} does not fit below the class multiplier")]
    MassOutOfRange(U256),
    #[error("token {0} has already been minted")]
    TokenAlreadyMinted(String),
    #[error("token {0} has already been burned")]
    TokenAlreadyBurned(String),
    #[error("token {0} was merged into another token")]
    TerminalToken(String),
    #[error("token {0} cannot be merged into itself")]
    SelfMerge(String),
    #[error("event {received} does not come after already handled event {last}")]
    OutOfOrderEvent {
        last: EventSortKey,
        received: EventSortKey,
    },
}
