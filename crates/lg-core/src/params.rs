//! Named, ordered key/value store for generator tunables and persisted
//! state (z-indexes, path init flags, edited rects).
//!
//! A pluggable [`Persist`] backend sees every change; [`LocalStore`] is the
//! in-memory, JSON-valued implementation used for browser-style storage.

use crate::error::PersistError;
use crate::geometry::{Insets, Point, Rect, Size};
use crate::model::AnchoredRect;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Number(f32),
    Point(Point),
    Size(Size),
    Rect(Rect),
    AttrRect(Insets),
    ExRect(AnchoredRect),
    EditableText {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        font: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        font_size: Option<f32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alpha: Option<f32>,
    },
}

impl ParamValue {
    pub fn as_number(&self) -> Option<f32> {
        match self {
            ParamValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<f32> for ParamValue {
    fn from(n: f32) -> Self {
        ParamValue::Number(n)
    }
}

// ─── Persistence backends ────────────────────────────────────────────────

/// Storage behind a `Params`. `name` is the owning params' name.
pub trait Persist {
    fn save(&mut self, name: &str, key: &str, value: &ParamValue);
    fn load(&self, name: &str, key: &str) -> Option<ParamValue>;
}

/// String-valued store keyed by `"{name}.{key}"`, holding JSON.
///
/// Clones share the same entries, so several generators can persist into
/// one store the way pages share local storage.
#[derive(Debug, Clone, Default)]
pub struct LocalStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl LocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(name: &str, key: &str) -> String {
        format!("{name}.{key}")
    }

    /// Raw stored string.
    pub fn raw(&self, name: &str, key: &str) -> Option<String> {
        self.entries.borrow().get(&Self::key(name, key)).cloned()
    }

    pub fn set_raw(&self, name: &str, key: &str, raw: impl Into<String>) {
        self.entries
            .borrow_mut()
            .insert(Self::key(name, key), raw.into());
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Persist for LocalStore {
    fn save(&mut self, name: &str, key: &str, value: &ParamValue) {
        match serde_json::to_string(value) {
            Ok(json) => self.set_raw(name, key, json),
            Err(e) => log::warn!("cannot store {name}.{key}: {e}"),
        }
    }

    fn load(&self, name: &str, key: &str) -> Option<ParamValue> {
        let raw = self.raw(name, key)?;
        match serde_json::from_str(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("ignoring undecodable stored value {name}.{key}: {e}");
                None
            }
        }
    }
}

// ─── Params ──────────────────────────────────────────────────────────────

pub struct Params {
    name: String,
    values: Vec<(String, ParamValue)>,
    index: HashMap<String, usize>,
    change_count: u32,
    persist: Option<Box<dyn Persist>>,
}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Params")
            .field("name", &self.name)
            .field("values", &self.values)
            .field("change_count", &self.change_count)
            .finish_non_exhaustive()
    }
}

impl Params {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
            index: HashMap::new(),
            change_count: 0,
            persist: None,
        }
    }

    /// Params seeded with initial values (e.g. shipped defaults).
    pub fn with_values(name: impl Into<String>, values: Vec<(String, ParamValue)>) -> Self {
        let mut params = Self::new(name);
        params.restore(values, false);
        params
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_persist(&mut self, persist: Option<Box<dyn Persist>>) {
        self.persist = persist;
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.index.get(key).map(|i| &self.values[*i].1)
    }

    /// Value from the persistence backend if it has one, else the local value.
    pub fn get_loaded(&self, key: &str) -> Option<ParamValue> {
        self.persist
            .as_ref()
            .and_then(|p| p.load(&self.name, key))
            .or_else(|| self.get(key).cloned())
    }

    pub fn number(&self, key: &str) -> Option<f32> {
        self.get(key).and_then(ParamValue::as_number)
    }

    /// Store `value`; returns false when it equals the current value.
    pub fn set(&mut self, key: &str, value: ParamValue) -> bool {
        if self.get(key) == Some(&value) {
            return false;
        }

        self.change_count += 1;
        if let Some(persist) = self.persist.as_mut() {
            persist.save(&self.name, key, &value);
        }
        match self.index.get(key) {
            Some(i) => self.values[*i].1 = value,
            None => {
                self.index.insert(key.to_string(), self.values.len());
                self.values.push((key.to_string(), value));
            }
        }
        true
    }

    /// True if anything changed since the last call. Resets the count.
    pub fn changed(&mut self) -> bool {
        let changed = self.change_count != 0;
        self.change_count = 0;
        changed
    }

    pub fn touch(&mut self) {
        self.change_count += 1;
    }

    /// All pairs in insertion order.
    pub fn data(&self) -> &[(String, ParamValue)] {
        &self.values
    }

    /// Load `values` into the store.
    ///
    /// When the store is empty (or `clear` is set) every pair is inserted,
    /// preferring a persisted value over the given one. Otherwise only keys
    /// not yet present are filled in.
    pub fn restore(&mut self, values: Vec<(String, ParamValue)>, clear: bool) {
        if clear {
            self.values.clear();
            self.index.clear();
        }

        if self.values.is_empty() {
            for (key, value) in values {
                let loaded = self.persist.as_ref().and_then(|p| p.load(&self.name, &key));
                if loaded.is_some() {
                    log::debug!("restored {}.{key} from storage", self.name);
                }
                self.set(&key, loaded.unwrap_or(value));
            }
            return;
        }

        for (key, value) in values {
            if !self.index.contains_key(&key) {
                self.set(&key, value);
            }
        }
    }

    // ─── Snapshots ───────────────────────────────────────────────────────

    /// MessagePack snapshot of the ordered pairs.
    pub fn to_msgpack(&self) -> Result<Vec<u8>, PersistError> {
        Ok(rmp_serde::to_vec_named(&self.values)?)
    }

    /// Params rebuilt from a `to_msgpack` snapshot.
    pub fn from_msgpack(name: impl Into<String>, bytes: &[u8]) -> Result<Self, PersistError> {
        let values: Vec<(String, ParamValue)> = rmp_serde::from_slice(bytes)?;
        Ok(Self::with_values(name, values))
    }
}
