//! Contributor state persistence seam.
//!
//! - `StateDocument`: the persisted JSON shape, read in any accepted form and
//!   written back in the wrapped compact form
//! - `StateStore`: backend-agnostic load/save keyed by contributor id
//! - `MemoryStateStore`: in-memory implementation
//!
//! Stores must allow at most one writer per contributor at a time; the
//! in-memory store serializes through a mutex.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::codec::{from_compact_state, to_compact_state, CompactState};
use crate::domain::{ContributorState, Result, TrustError};
use crate::normalize::{normalize_event, RawEvent};

/// Key holding the contributor map in the wrapped document form.
pub const CONTRIBUTORS_KEY: &str = "contributors";

/// Expanded state document with loosely-typed events.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExpandedStateDoc {
    #[serde(default)]
    created_at: Option<i64>,
    #[serde(default)]
    manual_adjustment: f64,
    #[serde(default)]
    events: Vec<RawEvent>,
}

/// All persisted contributor states, keyed by contributor id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateDocument {
    pub contributors: BTreeMap<String, ContributorState>,
}

impl StateDocument {
    /// Parse a document in any accepted shape.
    ///
    /// The top level is either `{ "contributors": { id: doc } }` or a bare
    /// `{ id: doc }` map; each doc is expanded (`contributor`, `createdAt`,
    /// `manualAdjustment`, `events`) or compact (`c`, `t`, `m`, `e`). The map
    /// key is the contributor id. Every event is validated; the first
    /// invalid one fails the whole document.
    pub fn from_value(value: &Value) -> Result<Self> {
        let top = value.as_object().ok_or_else(|| {
            TrustError::InvalidStateDocument("top level must be a JSON object".to_string())
        })?;

        let entries = match top.get(CONTRIBUTORS_KEY) {
            Some(Value::Object(inner)) if !looks_like_state_doc(inner) => inner,
            _ => top,
        };

        let mut contributors = BTreeMap::new();
        for (id, doc) in entries {
            contributors.insert(id.clone(), parse_state_doc(id, doc)?);
        }
        Ok(Self { contributors })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Wrapped form with compact per-contributor documents.
    pub fn to_value(&self) -> Result<Value> {
        let mut inner = Map::new();
        for (id, state) in &self.contributors {
            inner.insert(id.clone(), serde_json::to_value(to_compact_state(state))?);
        }
        let mut top = Map::new();
        top.insert(CONTRIBUTORS_KEY.to_string(), Value::Object(inner));
        Ok(Value::Object(top))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value()?)?)
    }
}

/// Whether `obj` is itself a state document rather than a map of them.
///
/// Decided by value types: in a contributor map every value is an object, so
/// a contributor id of `c` or `events` never matches.
fn looks_like_state_doc(obj: &Map<String, Value>) -> bool {
    let is = |key: &str, check: fn(&Value) -> bool| obj.get(key).is_some_and(check);
    is("c", Value::is_string)
        || is("contributor", Value::is_string)
        || is("e", Value::is_array)
        || is("events", Value::is_array)
        || is("t", Value::is_number)
        || is("createdAt", Value::is_number)
}

fn parse_state_doc(id: &str, doc: &Value) -> Result<ContributorState> {
    let obj = doc.as_object().ok_or_else(|| {
        TrustError::InvalidStateDocument(format!("state for '{id}' must be a JSON object"))
    })?;

    let mut state = if obj.contains_key("c") {
        let compact: CompactState = serde_json::from_value(doc.clone())?;
        from_compact_state(&compact)?
    } else {
        let expanded: ExpandedStateDoc = serde_json::from_value(doc.clone())?;
        let events = expanded
            .events
            .into_iter()
            .map(normalize_event)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let created_at = expanded
            .created_at
            .or_else(|| events.iter().map(|e| e.timestamp).min())
            .unwrap_or(0);
        ContributorState {
            contributor: id.to_string(),
            created_at,
            manual_adjustment: expanded.manual_adjustment,
            events,
        }
    };

    state.contributor = id.to_string();
    Ok(state)
}

/// Load/save contributor state by id.
pub trait StateStore {
    fn load(&self, contributor: &str) -> Result<Option<ContributorState>>;

    /// All stored contributor ids, sorted.
    fn contributor_ids(&self) -> Result<Vec<String>>;

    /// Persist `state`, replacing whatever was stored for its contributor.
    fn save(&self, state: &ContributorState) -> Result<()>;
}

/// In-memory store backed by a `BTreeMap<contributor, state>`.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    states: Mutex<BTreeMap<String, ContributorState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(document: StateDocument) -> Self {
        Self {
            states: Mutex::new(document.contributors),
        }
    }

    /// Snapshot the current contents as a document.
    pub fn to_document(&self) -> Result<StateDocument> {
        Ok(StateDocument {
            contributors: self.guard()?.clone(),
        })
    }

    fn guard(&self) -> Result<MutexGuard<'_, BTreeMap<String, ContributorState>>> {
        self.states
            .lock()
            .map_err(|_| TrustError::StorageError("state store lock poisoned".to_string()))
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self, contributor: &str) -> Result<Option<ContributorState>> {
        Ok(self.guard()?.get(contributor).cloned())
    }

    fn contributor_ids(&self) -> Result<Vec<String>> {
        Ok(self.guard()?.keys().cloned().collect())
    }

    fn save(&self, state: &ContributorState) -> Result<()> {
        self.guard()?.insert(state.contributor.clone(), state.clone());
        Ok(())
    }
}
