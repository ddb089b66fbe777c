// In-memory remote runtime for tests and local walkthroughs
//
// Behaves like the moderation zomes: content-addressed records, update chains,
// status paths and an append-only status history. Failure injection, call
// recording and a visibility lag make the store's error paths testable.

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::traits::{BaseConnector, BaseRemoteRuntime};
use super::zome::ZomeFunctions;
use crate::common::{ActionHash, AgentPubKey, Record, RemoteError, Status, StatusChange};
use crate::domains::mediums_of_exchange::MediumsOfExchange;
use crate::domains::moderation::Domain;
use crate::domains::service_types::ServiceTypes;

type Validator = Arc<dyn Fn(Value) -> Result<(), String> + Send + Sync>;

/// One recorded `call_zome` invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ZomeCall {
    pub zome: String,
    pub fn_name: String,
    pub payload: Value,
}

#[derive(Deserialize)]
struct EntryPayload {
    entry: Value,
}

#[derive(Deserialize)]
struct UpdatePayload {
    original_action_hash: ActionHash,
    previous_action_hash: ActionHash,
    updated_entry: Value,
}

struct ZomeState {
    functions: ZomeFunctions,
    validator: Validator,
    /// Every create and update action, by its own hash
    records: HashMap<ActionHash, Record<Value>>,
    /// original -> newest revision
    latest: HashMap<ActionHash, ActionHash>,
    /// original -> current status path
    status: HashMap<ActionHash, Status>,
    history: HashMap<ActionHash, Vec<StatusChange>>,
    /// Originals in creation order
    order: Vec<ActionHash>,
    deleted: HashSet<ActionHash>,
}

impl ZomeState {
    fn live(&self, original: &ActionHash) -> bool {
        self.latest.contains_key(original) && !self.deleted.contains(original)
    }

    fn latest_record(&self, original: &ActionHash) -> Option<&Record<Value>> {
        if !self.live(original) {
            return None;
        }
        self.latest.get(original).and_then(|hash| self.records.get(hash))
    }
}

#[derive(Default)]
struct RuntimeState {
    zomes: HashMap<String, ZomeState>,
    disconnected: bool,
    fail_next: HashMap<String, VecDeque<String>>,
    fail_always: HashMap<String, String>,
    visibility_lag: u32,
    /// original -> remaining reads that will not see it
    hidden: HashMap<ActionHash, u32>,
    calls: Vec<ZomeCall>,
    seq: u64,
}

impl RuntimeState {
    /// Consumes one hidden read for `original`.
    fn observe(&mut self, original: &ActionHash) -> bool {
        match self.hidden.get_mut(original) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                if *remaining == 0 {
                    self.hidden.remove(original);
                }
                false
            }
            _ => true,
        }
    }
}

fn decode<T: DeserializeOwned>(payload: Value) -> Result<T, RemoteError> {
    serde_json::from_value(payload).map_err(|e| RemoteError::Decode(e.to_string()))
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Value, RemoteError> {
    serde_json::to_value(value).map_err(|e| RemoteError::Serialize(e.to_string()))
}

fn not_found(original: &ActionHash) -> RemoteError {
    RemoteError::RecordNotFound(original.to_hex())
}

/// Reference implementation of [`BaseRemoteRuntime`] kept entirely in memory
pub struct InMemoryRuntime {
    state: Mutex<RuntimeState>,
    agent: AgentPubKey,
    latency: Option<Duration>,
}

impl InMemoryRuntime {
    /// Runtime with no zomes registered.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RuntimeState::default()),
            agent: AgentPubKey::digest(&[b"in-memory-agent"]),
            latency: None,
        }
    }

    /// Runtime hosting the service types and mediums of exchange zomes.
    pub fn marketplace() -> Self {
        Self::new()
            .with_domain::<ServiceTypes>()
            .with_domain::<MediumsOfExchange>()
    }

    pub fn with_domain<D: Domain>(self) -> Self {
        self.register::<D>();
        self
    }

    /// Delay every call by `latency` before it is handled.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Host `D`'s zome, validating entries with `D::validate`.
    pub fn register<D: Domain>(&self) {
        let validator: Validator = Arc::new(|value: Value| {
            let entry: D::Entry = serde_json::from_value(value).map_err(|e| e.to_string())?;
            D::validate(&entry)
        });
        self.lock().zomes.insert(
            D::ZOME.to_string(),
            ZomeState {
                functions: D::functions(),
                validator,
                records: HashMap::new(),
                latest: HashMap::new(),
                status: HashMap::new(),
                history: HashMap::new(),
                order: Vec::new(),
                deleted: HashSet::new(),
            },
        );
    }

    fn lock(&self) -> MutexGuard<'_, RuntimeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn agent(&self) -> AgentPubKey {
        self.agent
    }

    pub fn set_connected(&self, connected: bool) {
        self.lock().disconnected = !connected;
    }

    /// Fail the next call to `fn_name` with `message`. Queues up.
    pub fn fail_next(&self, fn_name: &str, message: &str) {
        self.lock()
            .fail_next
            .entry(fn_name.to_string())
            .or_default()
            .push_back(message.to_string());
    }

    /// Fail every call to `fn_name` until [`clear_failures`](Self::clear_failures).
    pub fn fail_always(&self, fn_name: &str, message: &str) {
        self.lock()
            .fail_always
            .insert(fn_name.to_string(), message.to_string());
    }

    pub fn clear_failures(&self) {
        let mut state = self.lock();
        state.fail_next.clear();
        state.fail_always.clear();
    }

    /// New records stay invisible to the next `reads` single-record reads
    /// (get, get latest, update, approve, reject, delete). Lists leave them
    /// out for as long as they are hidden.
    pub fn set_visibility_lag(&self, reads: u32) {
        self.lock().visibility_lag = reads;
    }

    pub fn calls(&self) -> Vec<ZomeCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, fn_name: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.fn_name == fn_name)
            .count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn dispatch(
        &self,
        state: &mut RuntimeState,
        zome: &str,
        fn_name: &str,
        payload: Value,
    ) -> Result<Value, RemoteError> {
        let call_error = |message: &str| RemoteError::Call {
            zome: zome.to_string(),
            fn_name: fn_name.to_string(),
            message: message.to_string(),
        };

        let functions = match state.zomes.get(zome) {
            Some(zome_state) => zome_state.functions.clone(),
            None => return Err(call_error("zome not found")),
        };
        let now = Utc::now();
        let agent = self.agent;

        if fn_name == functions.create || fn_name == functions.suggest {
            let status = if fn_name == functions.create {
                Status::Approved
            } else {
                Status::Pending
            };
            let payload_bytes = serde_json::to_vec(&payload).unwrap_or_default();
            let input: EntryPayload = decode(payload)?;

            state.seq += 1;
            let hash = ActionHash::digest(&[
                zome.as_bytes(),
                fn_name.as_bytes(),
                &payload_bytes,
                agent.as_bytes(),
                &state.seq.to_be_bytes(),
            ]);
            let lag = state.visibility_lag;
            let zome_state = state
                .zomes
                .get_mut(zome)
                .ok_or_else(|| call_error("zome not found"))?;
            (zome_state.validator)(input.entry.clone()).map_err(RemoteError::InvalidEntry)?;

            let record = Record {
                action_hash: hash,
                original_action_hash: hash,
                author: agent,
                timestamp: now,
                entry: input.entry,
            };
            zome_state.records.insert(hash, record.clone());
            zome_state.latest.insert(hash, hash);
            zome_state.status.insert(hash, status);
            zome_state.history.insert(
                hash,
                vec![StatusChange {
                    status,
                    changed_by: agent,
                    changed_at: now,
                }],
            );
            zome_state.order.push(hash);
            if lag > 0 {
                state.hidden.insert(hash, lag);
            }
            return encode(&record);
        }

        if fn_name == functions.get {
            let hash: ActionHash = decode(payload)?;
            let original = state
                .zomes
                .get(zome)
                .and_then(|z| z.records.get(&hash))
                .map(|record| record.original_action_hash);
            let Some(original) = original else {
                return Ok(Value::Null);
            };
            if !state.observe(&original) {
                return Ok(Value::Null);
            }
            let record = state
                .zomes
                .get(zome)
                .filter(|z| z.live(&original))
                .and_then(|z| z.records.get(&hash));
            return match record {
                Some(record) => encode(record),
                None => Ok(Value::Null),
            };
        }

        if fn_name == functions.get_latest {
            let original: ActionHash = decode(payload)?;
            if !state.observe(&original) {
                return Ok(Value::Null);
            }
            let record = state.zomes.get(zome).and_then(|z| z.latest_record(&original));
            return match record {
                Some(record) => encode(record),
                None => Ok(Value::Null),
            };
        }

        if fn_name == functions.update {
            let input: UpdatePayload = decode(payload.clone())?;
            let original = input.original_action_hash;
            if !state.observe(&original) {
                return Err(not_found(&original));
            }

            state.seq += 1;
            let payload_bytes = serde_json::to_vec(&payload).unwrap_or_default();
            let hash = ActionHash::digest(&[
                zome.as_bytes(),
                fn_name.as_bytes(),
                &payload_bytes,
                agent.as_bytes(),
                &state.seq.to_be_bytes(),
            ]);
            let zome_state = state
                .zomes
                .get_mut(zome)
                .ok_or_else(|| call_error("zome not found"))?;
            let previous_in_chain = zome_state
                .records
                .get(&input.previous_action_hash)
                .is_some_and(|previous| previous.original_action_hash == original);
            if !zome_state.live(&original) || !previous_in_chain {
                return Err(not_found(&original));
            }
            (zome_state.validator)(input.updated_entry.clone())
                .map_err(RemoteError::InvalidEntry)?;

            let record = Record {
                action_hash: hash,
                original_action_hash: original,
                author: agent,
                timestamp: now,
                entry: input.updated_entry,
            };
            zome_state.records.insert(hash, record.clone());
            zome_state.latest.insert(original, hash);
            return encode(&record);
        }

        if fn_name == functions.delete {
            let original: ActionHash = decode(payload)?;
            if !state.observe(&original) {
                return Err(not_found(&original));
            }
            let zome_state = state
                .zomes
                .get_mut(zome)
                .ok_or_else(|| call_error("zome not found"))?;
            if !zome_state.live(&original) {
                return Err(not_found(&original));
            }
            zome_state.deleted.insert(original);
            zome_state.status.remove(&original);
            return Ok(Value::Null);
        }

        if let Some(target) = functions.target_status(fn_name) {
            let original: ActionHash = decode(payload)?;
            if !state.observe(&original) {
                return Err(not_found(&original));
            }
            let zome_state = state
                .zomes
                .get_mut(zome)
                .ok_or_else(|| call_error("zome not found"))?;
            if !zome_state.live(&original) {
                return Err(not_found(&original));
            }
            zome_state.status.insert(original, target);
            zome_state
                .history
                .entry(original)
                .or_default()
                .push(StatusChange {
                    status: target,
                    changed_by: agent,
                    changed_at: now,
                });
            return Ok(Value::Null);
        }

        if fn_name == functions.status_history {
            let original: ActionHash = decode(payload)?;
            let history = state
                .zomes
                .get(zome)
                .and_then(|z| z.history.get(&original))
                .cloned()
                .unwrap_or_default();
            return encode(&history);
        }

        if let Some(status) = Status::ALL
            .into_iter()
            .find(|status| functions.list(*status) == fn_name)
        {
            let hidden = &state.hidden;
            let records: Vec<&Record<Value>> = state
                .zomes
                .get(zome)
                .map(|z| {
                    z.order
                        .iter()
                        .filter(|original| z.status.get(*original) == Some(&status))
                        .filter(|original| !hidden.contains_key(*original))
                        .filter_map(|original| z.latest_record(original))
                        .collect()
                })
                .unwrap_or_default();
            return encode(&records);
        }

        Err(call_error("function not found"))
    }
}

impl Default for InMemoryRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRemoteRuntime for InMemoryRuntime {
    async fn call_zome(
        &self,
        zome: &str,
        fn_name: &str,
        payload: Value,
    ) -> Result<Value, RemoteError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.lock();
        state.calls.push(ZomeCall {
            zome: zome.to_string(),
            fn_name: fn_name.to_string(),
            payload: payload.clone(),
        });

        if state.disconnected {
            return Err(RemoteError::NotConnected);
        }

        let injected = state
            .fail_next
            .get_mut(fn_name)
            .and_then(|queue| queue.pop_front())
            .or_else(|| state.fail_always.get(fn_name).cloned());
        if let Some(message) = injected {
            return Err(RemoteError::Call {
                zome: zome.to_string(),
                fn_name: fn_name.to_string(),
                message,
            });
        }

        self.dispatch(&mut state, zome, fn_name, payload)
    }

    fn is_connected(&self) -> bool {
        !self.lock().disconnected
    }
}

/// Hands out an [`InMemoryRuntime`] after a configurable number of failures
pub struct InMemoryConnector {
    runtime: Arc<InMemoryRuntime>,
    failures: AtomicU32,
    attempts: AtomicU32,
}

impl InMemoryConnector {
    pub fn new(runtime: Arc<InMemoryRuntime>) -> Self {
        Self {
            runtime,
            failures: AtomicU32::new(0),
            attempts: AtomicU32::new(0),
        }
    }

    pub fn failing_times(self, failures: u32) -> Self {
        self.failures.store(failures, Ordering::SeqCst);
        self
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BaseConnector for InMemoryConnector {
    async fn connect(&self) -> Result<Arc<dyn BaseRemoteRuntime>, RemoteError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let failed = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(RemoteError::NotConnected);
        }
        let runtime: Arc<dyn BaseRemoteRuntime> = self.runtime.clone();
        Ok(runtime)
    }
}
