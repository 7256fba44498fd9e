use std::collections::HashMap;
use std::hash::Hash;

use async_trait::async_trait;

use crate::retry::StoreFailure;

/// Blocking storage client.
///
/// Calls either complete or fail with `Self::Error`; deadline failures must
/// report `is_deadline_exceeded() == true` so they grow the backoff.
pub trait Datastore {
    type Key: Eq + Hash;
    type Entity;
    type Error: StoreFailure;

    fn delete(&self, key: &Self::Key) -> Result<(), Self::Error>;

    fn delete_many(&self, keys: &[Self::Key]) -> Result<(), Self::Error>;

    /// Store one entity, returning its key.
    fn put(&self, entity: &Self::Entity) -> Result<Self::Key, Self::Error>;

    /// Store entities in one backend call, returning keys in input order.
    fn put_many(&self, entities: &[Self::Entity]) -> Result<Vec<Self::Key>, Self::Error>;

    /// Fetch entities by key. Missing keys are absent from the map.
    fn get_many(
        &self,
        keys: &[Self::Key],
    ) -> Result<HashMap<Self::Key, Self::Entity>, Self::Error>;
}

/// Deferred storage client. Each call returns in-flight work; awaiting it
/// joins the work and yields the outcome.
#[async_trait]
pub trait AsyncDatastore: Send + Sync {
    type Key: Eq + Hash + Send + Sync;
    type Entity: Send + Sync;
    type Error: StoreFailure;

    async fn delete(&self, key: &Self::Key) -> Result<(), Self::Error>;

    async fn delete_many(&self, keys: &[Self::Key]) -> Result<(), Self::Error>;

    async fn put(&self, entity: &Self::Entity) -> Result<Self::Key, Self::Error>;

    async fn put_many(&self, entities: &[Self::Entity]) -> Result<Vec<Self::Key>, Self::Error>;

    async fn get_many(
        &self,
        keys: &[Self::Key],
    ) -> Result<HashMap<Self::Key, Self::Entity>, Self::Error>;
}
