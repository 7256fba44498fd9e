//! In-memory datastore that fails according to a script, for integration tests.
//!
//! Every client call (blocking or async) first pops the next scripted failure;
//! once the script is empty calls hit the in-memory map.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use dsretry_core::store::{AsyncDatastore, Datastore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub key: String,
    pub value: String,
}

impl Record {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

type CallHook = Box<dyn Fn(usize) + Send + Sync>;

#[derive(Default)]
pub struct ScriptedStore {
    rows: Mutex<HashMap<String, Record>>,
    script: Mutex<VecDeque<StoreError>>,
    calls: AtomicUsize,
    on_call: Mutex<Option<CallHook>>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose next calls fail with `failures`, in order.
    pub fn failing_with(failures: Vec<StoreError>) -> Self {
        let store = Self::new();
        store.script.lock().unwrap().extend(failures);
        store
    }

    pub fn push_failures(&self, failures: impl IntoIterator<Item = StoreError>) {
        self.script.lock().unwrap().extend(failures);
    }

    /// Run `hook` with the 1-based call number at the start of every client call.
    pub fn on_call(&self, hook: impl Fn(usize) + Send + Sync + 'static) {
        *self.on_call.lock().unwrap() = Some(Box::new(hook));
    }

    /// Total client calls so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn next_call(&self) -> Result<(), StoreError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(hook) = self.on_call.lock().unwrap().as_ref() {
            hook(n);
        }
        match self.script.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn do_delete(&self, keys: &[String]) -> Result<(), StoreError> {
        self.next_call()?;
        let mut rows = self.rows.lock().unwrap();
        for key in keys {
            rows.remove(key);
        }
        Ok(())
    }

    fn do_put(&self, entities: &[Record]) -> Result<Vec<String>, StoreError> {
        self.next_call()?;
        let mut rows = self.rows.lock().unwrap();
        Ok(entities
            .iter()
            .map(|e| {
                rows.insert(e.key.clone(), e.clone());
                e.key.clone()
            })
            .collect())
    }

    fn do_get(&self, keys: &[String]) -> Result<HashMap<String, Record>, StoreError> {
        self.next_call()?;
        let rows = self.rows.lock().unwrap();
        Ok(keys
            .iter()
            .filter_map(|k| rows.get(k).map(|r| (k.clone(), r.clone())))
            .collect())
    }
}

impl Datastore for ScriptedStore {
    type Key = String;
    type Entity = Record;
    type Error = StoreError;

    fn delete(&self, key: &String) -> Result<(), StoreError> {
        self.do_delete(std::slice::from_ref(key))
    }

    fn delete_many(&self, keys: &[String]) -> Result<(), StoreError> {
        self.do_delete(keys)
    }

    fn put(&self, entity: &Record) -> Result<String, StoreError> {
        let mut keys = self.do_put(std::slice::from_ref(entity))?;
        Ok(keys.remove(0))
    }

    fn put_many(&self, entities: &[Record]) -> Result<Vec<String>, StoreError> {
        self.do_put(entities)
    }

    fn get_many(&self, keys: &[String]) -> Result<HashMap<String, Record>, StoreError> {
        self.do_get(keys)
    }
}

#[async_trait]
impl AsyncDatastore for ScriptedStore {
    type Key = String;
    type Entity = Record;
    type Error = StoreError;

    async fn delete(&self, key: &String) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        self.do_delete(std::slice::from_ref(key))
    }

    async fn delete_many(&self, keys: &[String]) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        self.do_delete(keys)
    }

    async fn put(&self, entity: &Record) -> Result<String, StoreError> {
        tokio::task::yield_now().await;
        let mut keys = self.do_put(std::slice::from_ref(entity))?;
        Ok(keys.remove(0))
    }

    async fn put_many(&self, entities: &[Record]) -> Result<Vec<String>, StoreError> {
        tokio::task::yield_now().await;
        self.do_put(entities)
    }

    async fn get_many(&self, keys: &[String]) -> Result<HashMap<String, Record>, StoreError> {
        tokio::task::yield_now().await;
        self.do_get(keys)
    }
}
