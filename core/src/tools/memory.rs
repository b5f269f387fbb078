//! Memory tools backed by the session's state store. The backing map lives
//! under one persistent key, so remembered values survive across sessions.

use crate::agent::ExecContext;
use crate::schema::{FieldType, ObjectSchema};
use crate::state::{StateKey, StateStore};
use crate::traits::{Empty, TypedTool};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

pub static MEMORY_KEY: StateKey<BTreeMap<String, String>> =
    StateKey::persistent("memory", BTreeMap::new);

pub struct StoreMemoryTool {
    store: Arc<Mutex<StateStore>>,
}

impl StoreMemoryTool {
    pub fn new(store: Arc<Mutex<StateStore>>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Deserialize)]
pub struct StoreMemoryArgs {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct StoreMemoryOutput {
    pub key: String,
    pub stored: bool,
}

#[async_trait]
impl TypedTool for StoreMemoryTool {
    type Input = StoreMemoryArgs;
    type Output = StoreMemoryOutput;

    fn name(&self) -> &str {
        "store_memory"
    }

    fn description(&self) -> &str {
        "Store a value under a key for later retrieval. Stored values persist across sessions."
    }

    fn input_schema(&self) -> ObjectSchema {
        ObjectSchema::new()
            .field("key", FieldType::String, "Identifier for the value")
            .field("value", FieldType::String, "The value to remember")
    }

    async fn invoke(
        &self,
        input: StoreMemoryArgs,
        _ctx: &ExecContext,
    ) -> anyhow::Result<StoreMemoryOutput> {
        let mut store = self.store.lock().unwrap();
        let mut map = store.get(&MEMORY_KEY);
        map.insert(input.key.clone(), input.value);
        store.set(&MEMORY_KEY, map);
        Ok(StoreMemoryOutput {
            key: input.key,
            stored: true,
        })
    }
}

pub struct RetrieveMemoryTool {
    store: Arc<Mutex<StateStore>>,
}

impl RetrieveMemoryTool {
    pub fn new(store: Arc<Mutex<StateStore>>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Deserialize)]
pub struct RetrieveMemoryArgs {
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct RetrieveMemoryOutput {
    pub key: String,
    pub value: Option<String>,
    pub found: bool,
}

#[async_trait]
impl TypedTool for RetrieveMemoryTool {
    type Input = RetrieveMemoryArgs;
    type Output = RetrieveMemoryOutput;

    fn name(&self) -> &str {
        "retrieve_memory"
    }

    fn description(&self) -> &str {
        "Retrieve a previously stored value by key"
    }

    fn input_schema(&self) -> ObjectSchema {
        ObjectSchema::new().field("key", FieldType::String, "Identifier to look up")
    }

    async fn invoke(
        &self,
        input: RetrieveMemoryArgs,
        _ctx: &ExecContext,
    ) -> anyhow::Result<RetrieveMemoryOutput> {
        let mut store = self.store.lock().unwrap();
        let map = store.get(&MEMORY_KEY);
        let value = map.get(&input.key).cloned();
        Ok(RetrieveMemoryOutput {
            key: input.key,
            found: value.is_some(),
            value,
        })
    }
}

pub struct ListMemoryTool {
    store: Arc<Mutex<StateStore>>,
}

impl ListMemoryTool {
    pub fn new(store: Arc<Mutex<StateStore>>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Serialize)]
pub struct ListMemoryOutput {
    pub keys: Vec<String>,
    pub count: usize,
}

#[async_trait]
impl TypedTool for ListMemoryTool {
    type Input = Empty;
    type Output = ListMemoryOutput;

    fn name(&self) -> &str {
        "list_memory"
    }

    fn description(&self) -> &str {
        "List the keys of all stored values"
    }

    fn input_schema(&self) -> ObjectSchema {
        ObjectSchema::new()
    }

    async fn invoke(&self, _input: Empty, _ctx: &ExecContext) -> anyhow::Result<ListMemoryOutput> {
        let mut store = self.store.lock().unwrap();
        let map = store.get(&MEMORY_KEY);
        let keys: Vec<String> = map.keys().cloned().collect();
        Ok(ListMemoryOutput {
            count: keys.len(),
            keys,
        })
    }
}
