//! Scripted collaborators shared by the controller tests.

use std::{
    collections::HashSet,
    marker::PhantomData,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::{Mutex, Notify};

use crate::{confirm::Confirm, gateway::Gateway, resource::Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List,
    Create(Value),
    Update(String, Value),
    Delete(String),
}

/// In-memory stand-in for the data service. Records are kept as JSON so
/// write-only fields stay inspectable.
pub struct ScriptedGateway<R> {
    records: Mutex<Vec<Value>>,
    calls: Mutex<Vec<Call>>,
    failing: Mutex<HashSet<Op>>,
    gate: Mutex<Option<Arc<Notify>>>,
    next_id: AtomicI64,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> ScriptedGateway<R> {
    pub fn new() -> Arc<Self> {
        Self::seeded(Vec::new())
    }

    pub fn seeded(records: Vec<Value>) -> Arc<Self> {
        let next_id = records
            .iter()
            .filter_map(|record| record["id"].as_i64())
            .max()
            .unwrap_or(0)
            + 1;
        Arc::new(Self {
            records: Mutex::new(records),
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            gate: Mutex::new(None),
            next_id: AtomicI64::new(next_id),
            _resource: PhantomData,
        })
    }

    pub async fn fail(&self, op: Op) {
        self.failing.lock().await.insert(op);
    }

    pub async fn recover(&self, op: Op) {
        self.failing.lock().await.remove(&op);
    }

    /// Holds every following call until the returned handle is notified.
    pub async fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().await = Some(Arc::clone(&gate));
        gate
    }

    /// Yields until at least `n` calls have reached the gateway.
    pub async fn wait_for_calls(&self, n: usize) {
        while self.calls.lock().await.len() < n {
            tokio::task::yield_now().await;
        }
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    pub async fn count(&self, op: Op) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| {
                matches!(
                    (call, op),
                    (Call::List, Op::List)
                        | (Call::Create(_), Op::Create)
                        | (Call::Update(..), Op::Update)
                        | (Call::Delete(_), Op::Delete)
                )
            })
            .count()
    }

    pub async fn records(&self) -> Vec<Value> {
        self.records.lock().await.clone()
    }

    async fn enter(&self, call: Call, op: Op) -> Result<()> {
        self.calls.lock().await.push(call);
        let gate = self.gate.lock().await.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.failing.lock().await.contains(&op) {
            return Err(anyhow!("scripted {op:?} failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl<R: Resource> Gateway<R> for ScriptedGateway<R> {
    async fn list(&self) -> Result<Vec<R::Entity>> {
        // Snapshot before the gate so a held listing answers with the
        // collection as it was when requested.
        let records = self.records.lock().await.clone();
        self.enter(Call::List, Op::List).await?;
        let mut entities = Vec::with_capacity(records.len());
        for record in records {
            entities.push(serde_json::from_value(record)?);
        }
        Ok(entities)
    }

    async fn create(&self, payload: &R::Create) -> Result<R::Entity> {
        let body = serde_json::to_value(payload)?;
        self.enter(Call::Create(body.clone()), Op::Create).await?;
        let mut record = body;
        record["id"] = json!(self.next_id.fetch_add(1, Ordering::SeqCst));
        record["created_at"] = json!(Utc::now());
        let entity = serde_json::from_value(record.clone())?;
        self.records.lock().await.push(record);
        Ok(entity)
    }

    async fn update(&self, id: R::Id, payload: &R::Update) -> Result<R::Entity> {
        let body = serde_json::to_value(payload)?;
        self.enter(Call::Update(id.to_string(), body.clone()), Op::Update)
            .await?;
        let mut records = self.records.lock().await;
        let record = records
            .iter_mut()
            .find(|record| record["id"].to_string() == id.to_string())
            .ok_or_else(|| anyhow!("not found"))?;
        if let (Some(target), Value::Object(changes)) = (record.as_object_mut(), body) {
            for (key, value) in changes {
                target.insert(key, value);
            }
        }
        Ok(serde_json::from_value(record.clone())?)
    }

    async fn delete(&self, id: R::Id) -> Result<()> {
        self.enter(Call::Delete(id.to_string()), Op::Delete).await?;
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|record| record["id"].to_string() != id.to_string());
        if records.len() == before {
            return Err(anyhow!("not found"));
        }
        Ok(())
    }
}

/// Answers every prompt with a fixed decision and records the prompts.
pub struct ScriptedConfirm {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirm {
    pub fn answering(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

#[async_trait]
impl Confirm for ScriptedConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().await.push(prompt.to_string());
        self.answer
    }
}

pub fn product_record(id: i64, name: &str, price: f64, tags: &[&str]) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("{name} description"),
        "price": price,
        "category": "Electronics",
        "tags": tags,
        "in_stock": true,
        "created_at": Utc::now(),
    })
}

pub fn user_record(id: i64, name: &str, email: &str, password: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": email,
        "password": password,
        "created_at": Utc::now(),
    })
}
