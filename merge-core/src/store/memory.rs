use super::*;
use crate::error::IndexError;
use std::collections::BTreeMap;

/// An `EntityStore` keeping every record in memory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InMemoryStore {
    entities: BTreeMap<EntityKey, Entity>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn user(&self, id: &str) -> Option<&User> {
        match self.entities.get(&EntityKey::new(EntityType::User, id))? {
            Entity::User(user) => Some(user),
            _ => None,
        }
    }

    pub fn nft(&self, id: &str) -> Option<&Nft> {
        match self.entities.get(&EntityKey::new(EntityType::Nft, id))? {
            Entity::Nft(nft) => Some(nft),
            _ => None,
        }
    }

    pub fn collection(&self, id: &str) -> Option<&Collection> {
        match self.entities.get(&EntityKey::new(EntityType::Collection, id))? {
            Entity::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    pub fn users(&self) -> impl Iterator<Item = &User> + '_ {
        self.entities.values().filter_map(|entity| match entity {
            Entity::User(user) => Some(user),
            _ => None,
        })
    }

    pub fn nfts(&self) -> impl Iterator<Item = &Nft> + '_ {
        self.entities.values().filter_map(|entity| match entity {
            Entity::Nft(nft) => Some(nft),
            _ => None,
        })
    }
}

impl EntityStore for InMemoryStore {
    fn get(&self, key: &EntityKey) -> Result<Option<Entity>> {
        Ok(self.entities.get(key).cloned())
    }

    fn apply(&mut self, operations: Vec<EntityOperation>) -> Result<()> {
        // Validate everything up front so a rejected operation leaves the
        // store untouched.
        for operation in &operations {
            let EntityOperation::Set { key, data } = operation;
            if *key != data.key() {
                return Err(IndexError::EntityTypeMismatch(key.clone()).into());
            }
        }
        for operation in operations {
            let EntityOperation::Set { key, data } = operation;
            self.entities.insert(key, data);
        }
        Ok(())
    }
}
