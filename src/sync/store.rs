//! Persistence boundary - where interactions live once saved.
//!
//! # Key types
//!
//! - [`InteractionStore`] - blocking CRUD contract, called from worker threads
//! - [`HttpStore`] - REST client (reqwest) against the webinar backend
//! - [`MemoryStore`] - in-process store with failure injection; backs the dev
//!   server and the tests
//! - [`StoreError`] - uniform failure signal. Any non-2xx is a failure; only an
//!   optional message string is read from the body.
//!
//! # Endpoints (per webinar)
//!
//! | Method       | Path                                 | Body / Response             |
//! |--------------|--------------------------------------|-----------------------------|
//! | GET          | `/webinars/{w}/interactions`         | - / ordered list            |
//! | POST         | `/webinars/{w}/interactions`         | draft / persisted with id   |
//! | PUT          | `/webinars/{w}/interactions/{id}`    | full / updated              |
//! | PATCH        | `/webinars/{w}/interactions/{id}`    | partial / updated           |
//! | DELETE       | `/webinars/{w}/interactions/{id}`    | - / success only            |

use crate::entities::{Interaction, InteractionId, InteractionPatch};
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Persistence failure.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Non-2xx response, with the body's message if it had one
    Http { status: u16, message: Option<String> },
    /// Connection, timeout, TLS...
    Transport(String),
    /// 2xx response whose body was not an interaction
    Decode(String),
    /// Target id is unknown to the store
    NotFound(InteractionId),
    /// Store refused the write (memory store failure injection)
    Rejected(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Http { status, message: Some(msg) } => {
                write!(f, "Server returned {}: {}", status, msg)
            }
            StoreError::Http { status, message: None } => {
                write!(f, "Server returned {}", status)
            }
            StoreError::Transport(msg) => write!(f, "Network error: {}", msg),
            StoreError::Decode(msg) => write!(f, "Unexpected response: {}", msg),
            StoreError::NotFound(id) => write!(f, "Interaction {} no longer exists", id),
            StoreError::Rejected(msg) => write!(f, "Store rejected the change: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl StoreError {
    /// Status code the dev server answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::Http { status, .. } => *status,
            StoreError::NotFound(_) => 404,
            StoreError::Rejected(_) => 422,
            StoreError::Decode(_) => 400,
            StoreError::Transport(_) => 502,
        }
    }
}

/// Blocking CRUD contract for one webinar's interactions.
///
/// Implementations are called from worker threads, never from the UI loop.
pub trait InteractionStore: Send + Sync {
    /// Initial list, ordered by trigger time.
    fn list(&self) -> Result<Vec<Interaction>, StoreError>;
    /// Persist a draft (no id). Returns the stored record with its id.
    fn create(&self, draft: &Interaction) -> Result<Interaction, StoreError>;
    /// Full replace.
    fn update(&self, id: &InteractionId, interaction: &Interaction) -> Result<Interaction, StoreError>;
    /// Partial update (move, enable toggle).
    fn patch(&self, id: &InteractionId, patch: &InteractionPatch) -> Result<Interaction, StoreError>;
    fn delete(&self, id: &InteractionId) -> Result<(), StoreError>;
}

/// Blanket impl: Arc<T> implements the store if T does
impl<T: InteractionStore + ?Sized> InteractionStore for Arc<T> {
    fn list(&self) -> Result<Vec<Interaction>, StoreError> {
        (**self).list()
    }

    fn create(&self, draft: &Interaction) -> Result<Interaction, StoreError> {
        (**self).create(draft)
    }

    fn update(&self, id: &InteractionId, interaction: &Interaction) -> Result<Interaction, StoreError> {
        (**self).update(id, interaction)
    }

    fn patch(&self, id: &InteractionId, patch: &InteractionPatch) -> Result<Interaction, StoreError> {
        (**self).patch(id, patch)
    }

    fn delete(&self, id: &InteractionId) -> Result<(), StoreError> {
        (**self).delete(id)
    }
}

// ============================================================================
// HTTP store
// ============================================================================

/// Error body shapes the backend may send. Only the text is used.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// List endpoint answers either a bare array or `{ "interactions": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListBody {
    Bare(Vec<Interaction>),
    Wrapped { interactions: Vec<Interaction> },
}

/// REST client for the webinar backend.
pub struct HttpStore {
    client: reqwest::blocking::Client,
    base_url: String,
    webinar_id: String,
}

impl HttpStore {
    pub fn new(base_url: &str, webinar_id: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            webinar_id: webinar_id.to_string(),
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/webinars/{}/interactions", self.base_url, self.webinar_id)
    }

    fn item_url(&self, id: &InteractionId) -> String {
        format!("{}/{}", self.collection_url(), id)
    }

    /// Map transport errors and non-2xx statuses to `StoreError`.
    fn check(
        result: reqwest::Result<reqwest::blocking::Response>,
    ) -> Result<reqwest::blocking::Response, StoreError> {
        let response = result.map_err(|e| StoreError::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .json::<ErrorBody>()
            .ok()
            .and_then(|b| b.message.or(b.error));
        Err(StoreError::Http {
            status: status.as_u16(),
            message,
        })
    }

    fn decode(response: reqwest::blocking::Response) -> Result<Interaction, StoreError> {
        response
            .json::<Interaction>()
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

impl InteractionStore for HttpStore {
    fn list(&self) -> Result<Vec<Interaction>, StoreError> {
        let response = Self::check(self.client.get(self.collection_url()).send())?;
        let body = response
            .json::<ListBody>()
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(match body {
            ListBody::Bare(items) => items,
            ListBody::Wrapped { interactions } => interactions,
        })
    }

    fn create(&self, draft: &Interaction) -> Result<Interaction, StoreError> {
        log::debug!("POST {} ({})", self.collection_url(), draft.title);
        let response = Self::check(self.client.post(self.collection_url()).json(draft).send())?;
        Self::decode(response)
    }

    fn update(&self, id: &InteractionId, interaction: &Interaction) -> Result<Interaction, StoreError> {
        log::debug!("PUT {}", self.item_url(id));
        let response = Self::check(self.client.put(self.item_url(id)).json(interaction).send())?;
        Self::decode(response)
    }

    fn patch(&self, id: &InteractionId, patch: &InteractionPatch) -> Result<Interaction, StoreError> {
        log::debug!("PATCH {} {:?}", self.item_url(id), patch);
        let response = Self::check(self.client.patch(self.item_url(id)).json(patch).send())?;
        Self::decode(response)
    }

    fn delete(&self, id: &InteractionId) -> Result<(), StoreError> {
        log::debug!("DELETE {}", self.item_url(id));
        Self::check(self.client.delete(self.item_url(id)).send()).map(|_| ())
    }
}

// ============================================================================
// Memory store
// ============================================================================

/// One call as seen by the memory store, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    List,
    Create(String),
    Update(InteractionId),
    Patch(InteractionId, InteractionPatch),
    Delete(InteractionId),
}

#[derive(Default)]
struct MemoryInner {
    items: Vec<Interaction>,
    next_id: u64,
    failures: VecDeque<StoreError>,
    fail_all: bool,
    calls: Vec<StoreCall>,
}

impl MemoryInner {
    fn take_failure(&mut self) -> Result<(), StoreError> {
        if self.fail_all {
            return Err(StoreError::Rejected("store offline".to_string()));
        }
        match self.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn find_mut(&mut self, id: &InteractionId) -> Result<&mut Interaction, StoreError> {
        self.items
            .iter_mut()
            .find(|i| i.id.as_ref() == Some(id))
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}

/// Thread-safe in-memory store. Ids are sequential integers as strings.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing records; drafts get ids assigned.
    pub fn with_items(items: Vec<Interaction>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.lock();
            for mut item in items {
                inner.next_id += 1;
                if item.id.is_none() {
                    item.id = Some(InteractionId(inner.next_id.to_string()));
                }
                inner.items.push(item);
            }
        }
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue a failure for the next call (FIFO).
    pub fn fail_next(&self, err: StoreError) {
        self.lock().failures.push_back(err);
    }

    /// Make every call fail until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.lock().fail_all = offline;
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn snapshot(&self) -> Vec<Interaction> {
        let mut items = self.lock().items.clone();
        items.sort_by(|a, b| a.trigger_time.total_cmp(&b.trigger_time));
        items
    }

    pub fn get(&self, id: &InteractionId) -> Option<Interaction> {
        self.lock().items.iter().find(|i| i.id.as_ref() == Some(id)).cloned()
    }
}

impl InteractionStore for MemoryStore {
    fn list(&self) -> Result<Vec<Interaction>, StoreError> {
        self.lock().calls.push(StoreCall::List);
        self.lock().take_failure()?;
        Ok(self.snapshot())
    }

    fn create(&self, draft: &Interaction) -> Result<Interaction, StoreError> {
        let mut inner = self.lock();
        inner.calls.push(StoreCall::Create(draft.title.clone()));
        inner.take_failure()?;
        inner.next_id += 1;
        let mut stored = draft.clone();
        stored.id = Some(InteractionId(inner.next_id.to_string()));
        inner.items.push(stored.clone());
        Ok(stored)
    }

    fn update(&self, id: &InteractionId, interaction: &Interaction) -> Result<Interaction, StoreError> {
        let mut inner = self.lock();
        inner.calls.push(StoreCall::Update(id.clone()));
        inner.take_failure()?;
        let slot = inner.find_mut(id)?;
        *slot = interaction.clone();
        slot.id = Some(id.clone());
        Ok(slot.clone())
    }

    fn patch(&self, id: &InteractionId, patch: &InteractionPatch) -> Result<Interaction, StoreError> {
        let mut inner = self.lock();
        inner.calls.push(StoreCall::Patch(id.clone(), patch.clone()));
        inner.take_failure()?;
        let slot = inner.find_mut(id)?;
        patch.apply_to(slot);
        Ok(slot.clone())
    }

    fn delete(&self, id: &InteractionId) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.calls.push(StoreCall::Delete(id.clone()));
        inner.take_failure()?;
        let before = inner.items.len();
        inner.items.retain(|i| i.id.as_ref() != Some(id));
        if inner.items.len() == before {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }
}
