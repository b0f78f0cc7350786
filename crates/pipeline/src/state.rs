//! The state record threaded through a graph traversal.
//!
//! A [`State`] is an open, ordered mapping from field name to a
//! dynamically-typed JSON value. Each graph defines its own field set; nodes
//! add or overwrite fields and never remove them. Reading a field that no
//! node has written yields `None` rather than failing.
//!
//! Nodes do not return whole states. They return an [`Update`] — the partial
//! record of fields they produced — which the executor merges into the
//! accumulated state: new keys are appended, existing keys are overwritten
//! wholesale, and values are never deep-merged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// The accumulated field record of one traversal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(Map<String, Value>);

impl State {
    /// Creates an empty state record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of `field`, or `None` if no node has written it.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns `field` as a string slice, or `None` if it is absent or not a
    /// JSON string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Returns `true` if `field` has been written.
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Writes `field`, overwriting any existing value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// Merges a partial update into this state: new fields are appended in
    /// the update's order, existing fields are overwritten wholesale.
    pub fn merge(&mut self, update: Update) {
        for (field, value) in update.0 {
            self.0.insert(field, value);
        }
    }

    /// Iterates over `(field, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of fields currently present.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no field has been written.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// The partial state produced by one node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Update(Map<String, Value>);

impl Update {
    /// Creates an empty update. Merging it is a no-op.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field to the update, consuming and returning it for chaining.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Writes a field in place.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// Returns the value of `field`, or `None` if the update does not carry it.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns `true` if the update carries no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<State> for Update {
    fn from(state: State) -> Self {
        Self(state.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_field_reads_as_none() {
        let state = State::new();
        assert_eq!(state.get("missing"), None);
        assert_eq!(state.get_str("missing"), None);
    }

    #[test]
    fn merge_appends_new_fields_and_overwrites_existing_ones() {
        let mut state = State::new();
        state.insert("kept", "original");
        state.insert("replaced", "old");

        state.merge(Update::new().set("replaced", "new").set("added", 7));

        assert_eq!(state.get_str("kept"), Some("original"));
        assert_eq!(state.get_str("replaced"), Some("new"));
        assert_eq!(state.get("added"), Some(&json!(7)));
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn merge_replaces_values_wholesale_not_deep() {
        let mut state = State::new();
        state.insert("nested", json!({"a": 1, "b": 2}));

        state.merge(Update::new().set("nested", json!({"a": 9})));

        // The whole object is replaced; "b" does not survive.
        assert_eq!(state.get("nested"), Some(&json!({"a": 9})));
    }

    #[test]
    fn empty_update_is_identity() {
        let mut state = State::new();
        state.insert("x", "v");
        let before = state.clone();
        state.merge(Update::new());
        assert_eq!(state, before);
    }
}
