use super::*;
use crate::error::IndexError;
use std::collections::BTreeMap;

/// Reads and writes of the event currently being handled.
///
/// Writes are buffered and shadow the underlying store, so a load after a
/// save of the same key observes the saved record. Nothing reaches the store
/// until the caller applies `into_operations`; dropping the transaction
/// discards every write.
pub struct Transaction<'a> {
    store: &'a dyn EntityStore,
    writes: BTreeMap<EntityKey, Entity>,
}

impl<'a> Transaction<'a> {
    pub fn new(store: &'a dyn EntityStore) -> Self {
        Transaction {
            store,
            writes: BTreeMap::new(),
        }
    }

    pub fn load<T: StoredEntity>(&self, id: &str) -> Result<Option<T>> {
        let key = EntityKey::new(T::ENTITY_TYPE, id);
        let entity = match self.writes.get(&key) {
            Some(entity) => Some(entity.clone()),
            None => self.store.get(&key)?,
        };
        match entity {
            Some(entity) => T::from_entity(entity)
                .map(Some)
                .ok_or_else(|| IndexError::EntityTypeMismatch(key).into()),
            None => Ok(None),
        }
    }

    /// Loads a record that must exist for the event to make sense.
    pub fn load_existing<T: StoredEntity>(&self, id: &str) -> Result<T> {
        self.load(id)?.ok_or_else(|| {
            IndexError::MissingEntity(EntityKey::new(T::ENTITY_TYPE, id)).into()
        })
    }

    /// Loads a record or builds a new one with `create`. The flag tells
    /// whether the record was created, which is the caller's cue to account
    /// for it exactly once. Created records still have to be saved.
    pub fn get_or_create<T: StoredEntity>(
        &self,
        id: &str,
        create: impl FnOnce() -> T,
    ) -> Result<(T, bool)> {
        Ok(match self.load(id)? {
            Some(entity) => (entity, false),
            None => (create(), true),
        })
    }

    pub fn save<T: StoredEntity>(&mut self, entity: T) {
        let key = entity.key();
        self.writes.insert(key, entity.into_entity());
    }

    pub fn into_operations(self) -> Vec<EntityOperation> {
        self.writes
            .into_iter()
            .map(|(key, data)| EntityOperation::Set { key, data })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_user(id: &str, whitelist: bool) -> InMemoryStore {
        let user = User::new(id.to_string(), whitelist);
        let mut store = InMemoryStore::new();
        store
            .apply(vec![EntityOperation::Set {
                key: user.key(),
                data: user.into_entity(),
            }])
            .unwrap();
        store
    }

    #[test]
    fn loads_observe_earlier_saves() {
        let store = store_with_user("0xa", false);
        let mut transaction = Transaction::new(&store);

        let mut user: User = transaction.load_existing("0xa").unwrap();
        assert!(!user.whitelist);
        user.whitelist = true;
        transaction.save(user);

        let reloaded: User = transaction.load_existing("0xa").unwrap();
        assert!(reloaded.whitelist);
        // The store itself is untouched until the operations are applied.
        assert!(!store.user("0xa").unwrap().whitelist);
    }

    #[test]
    fn missing_entities_are_reported_with_their_key() {
        let store = InMemoryStore::new();
        let transaction = Transaction::new(&store);

        assert_eq!(transaction.load::<Nft>("7").unwrap(), None);
        let err = transaction.load_existing::<Nft>("7").unwrap_err();
        assert_eq!(
            err.downcast_ref::<IndexError>(),
            Some(&IndexError::MissingEntity(EntityKey::new(
                EntityType::Nft,
                "7"
            )))
        );
    }

    #[test]
    fn get_or_create_reports_creation() {
        let store = store_with_user("0xa", true);
        let transaction = Transaction::new(&store);

        let (user, created) = transaction
            .get_or_create("0xa", || User::new("0xa".to_string(), false))
            .unwrap();
        assert!(!created);
        assert!(user.whitelist);

        let (user, created) = transaction
            .get_or_create("0xb", || User::new("0xb".to_string(), false))
            .unwrap();
        assert!(created);
        assert_eq!(user.id, "0xb");
        // Not saved yet.
        assert_eq!(transaction.load::<User>("0xb").unwrap(), None);
    }

    #[test]
    fn operations_contain_last_write_per_key() {
        let store = InMemoryStore::new();
        let mut transaction = Transaction::new(&store);
        transaction.save(User::new("0xa".to_string(), false));
        transaction.save(User::new("0xa".to_string(), true));
        transaction.save(User::new("0xb".to_string(), false));

        let operations = transaction.into_operations();
        assert_eq!(operations.len(), 2);
        assert_eq!(
            operations[0],
            EntityOperation::Set {
                key: EntityKey::new(EntityType::User, "0xa"),
                data: Entity::User(User::new("0xa".to_string(), true)),
            }
        );
    }

    #[test]
    fn store_errors_propagate() {
        let mut store = MockEntityStore::new();
        store
            .expect_get()
            .returning(|_| Err(anyhow::anyhow!("connection lost")));
        let transaction = Transaction::new(&store);

        let err = transaction.load::<User>("0xa").unwrap_err();
        assert_eq!(err.to_string(), "connection lost");
    }
}
