//! Entity storage as provided by the indexing host.
//!
//! Handlers never write to an `EntityStore` directly. They read through a
//! `Transaction` scoped to one event and hand the resulting operations back
//! to the caller, which commits them all at once.

mod memory;
mod transaction;

pub use self::{memory::InMemoryStore, transaction::Transaction};

use crate::models::{Collection, Nft, User};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum EntityType {
    User,
    #[serde(rename = "NFT")]
    Nft,
    Collection,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityType::User => "User",
            EntityType::Nft => "NFT",
            EntityType::Collection => "Collection",
        })
    }
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EntityKey {
    pub entity_type: EntityType,
    pub id: String,
}

impl EntityKey {
    pub fn new(entity_type: EntityType, id: impl Into<String>) -> Self {
        EntityKey {
            entity_type,
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.entity_type, self.id)
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "__typename")]
pub enum Entity {
    User(User),
    #[serde(rename = "NFT")]
    Nft(Nft),
    Collection(Collection),
}

impl Entity {
    pub fn key(&self) -> EntityKey {
        match self {
            Entity::User(user) => user.key(),
            Entity::Nft(nft) => nft.key(),
            Entity::Collection(collection) => collection.key(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EntityOperation {
    Set { key: EntityKey, data: Entity },
}

/// Typed access to the records of one entity type.
pub trait StoredEntity: Sized {
    const ENTITY_TYPE: EntityType;

    fn id(&self) -> &str;
    fn into_entity(self) -> Entity;
    fn from_entity(entity: Entity) -> Option<Self>;

    fn key(&self) -> EntityKey {
        EntityKey::new(Self::ENTITY_TYPE, self.id())
    }
}

macro_rules! stored_entity {
    ($type:ident, $variant:ident) => {
        impl StoredEntity for $type {
            const ENTITY_TYPE: EntityType = EntityType::$variant;

            fn id(&self) -> &str {
                &self.id
            }

            fn into_entity(self) -> Entity {
                Entity::$variant(self)
            }

            fn from_entity(entity: Entity) -> Option<Self> {
                match entity {
                    Entity::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

stored_entity!(User, User);
stored_entity!(Nft, Nft);
stored_entity!(Collection, Collection);

#[cfg_attr(test, mockall::automock)]
pub trait EntityStore {
    fn get(&self, key: &EntityKey) -> Result<Option<Entity>>;

    /// Writes all operations or, if any of them is rejected, none of them.
    fn apply(&mut self, operations: Vec<EntityOperation>) -> Result<()>;
}
