//! Retrying wrappers for single datastore calls.
//!
//! Each method performs exactly one client call per attempt and hands it to
//! the executor; there is no retry logic of its own here.

use std::collections::HashMap;
use std::sync::Arc;

use super::client::{AsyncDatastore, Datastore};
use super::diagnostics::{trace_call, CallLogging};
use crate::config::StoreConfig;
use crate::retry::{RetryError, RetryExecutor};

/// A storage client wrapped with retry, backoff and optional call logging.
pub struct RetryingStore<C> {
    executor: RetryExecutor<C>,
    logging: CallLogging,
}

impl<C> RetryingStore<C> {
    /// Default policy, call logging off.
    pub fn new(client: C) -> Self {
        Self::with_executor(RetryExecutor::new(client), CallLogging::default())
    }

    pub fn with_executor(executor: RetryExecutor<C>, logging: CallLogging) -> Self {
        Self { executor, logging }
    }

    /// Build from loaded configuration; a missing `[retry]` section means defaults.
    pub fn from_config(client: Arc<C>, cfg: &StoreConfig) -> anyhow::Result<Self> {
        let executor = RetryExecutor::with_shared(client).with_policy(cfg.retry_policy()?);
        Ok(Self::with_executor(executor, CallLogging::new(cfg.call_logging)))
    }

    pub fn executor(&self) -> &RetryExecutor<C> {
        &self.executor
    }

    /// The diagnostics switch; flip it at runtime through this handle or a clone.
    pub fn call_logging(&self) -> &CallLogging {
        &self.logging
    }
}

impl<C: Datastore> RetryingStore<C> {
    pub fn remove(&self, key: &C::Key) -> Result<(), RetryError<C::Error>> {
        let logging = self.logging.is_enabled();
        self.executor.execute(|store| {
            if logging {
                trace_call("remove");
            }
            store.delete(key)
        })
    }

    pub fn remove_many(&self, keys: &[C::Key]) -> Result<(), RetryError<C::Error>> {
        let logging = self.logging.is_enabled();
        self.executor.execute(|store| {
            if logging {
                trace_call("remove_many");
            }
            store.delete_many(keys)
        })
    }

    pub fn put(&self, entity: &C::Entity) -> Result<C::Key, RetryError<C::Error>> {
        let logging = self.logging.is_enabled();
        self.executor.execute(|store| {
            if logging {
                trace_call("put");
            }
            store.put(entity)
        })
    }

    pub fn put_many(&self, entities: &[C::Entity]) -> Result<Vec<C::Key>, RetryError<C::Error>> {
        let logging = self.logging.is_enabled();
        self.executor.execute(|store| {
            if logging {
                trace_call("put_many");
            }
            store.put_many(entities)
        })
    }

    pub fn get_many(
        &self,
        keys: &[C::Key],
    ) -> Result<HashMap<C::Key, C::Entity>, RetryError<C::Error>> {
        let logging = self.logging.is_enabled();
        self.executor.execute(|store| {
            if logging {
                trace_call("get_many");
            }
            store.get_many(keys)
        })
    }
}

impl<C: AsyncDatastore> RetryingStore<C> {
    pub async fn remove_async(&self, key: &C::Key) -> Result<(), RetryError<C::Error>> {
        let logging = self.logging.is_enabled();
        self.executor
            .execute_async(move |store| async move {
                if logging {
                    trace_call("remove_async");
                }
                store.delete(key).await
            })
            .await
    }

    pub async fn remove_many_async(&self, keys: &[C::Key]) -> Result<(), RetryError<C::Error>> {
        let logging = self.logging.is_enabled();
        self.executor
            .execute_async(move |store| async move {
                if logging {
                    trace_call("remove_many_async");
                }
                store.delete_many(keys).await
            })
            .await
    }

    pub async fn put_async(&self, entity: &C::Entity) -> Result<C::Key, RetryError<C::Error>> {
        let logging = self.logging.is_enabled();
        self.executor
            .execute_async(move |store| async move {
                if logging {
                    trace_call("put_async");
                }
                store.put(entity).await
            })
            .await
    }

    pub async fn put_many_async(
        &self,
        entities: &[C::Entity],
    ) -> Result<Vec<C::Key>, RetryError<C::Error>> {
        let logging = self.logging.is_enabled();
        self.executor
            .execute_async(move |store| async move {
                if logging {
                    trace_call("put_many_async");
                }
                store.put_many(entities).await
            })
            .await
    }

    pub async fn get_many_async(
        &self,
        keys: &[C::Key],
    ) -> Result<HashMap<C::Key, C::Entity>, RetryError<C::Error>> {
        let logging = self.logging.is_enabled();
        self.executor
            .execute_async(move |store| async move {
                if logging {
                    trace_call("get_many_async");
                }
                store.get_many(keys).await
            })
            .await
    }
}
