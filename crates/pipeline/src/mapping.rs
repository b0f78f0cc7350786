//! Parent ↔ subgraph state-name translation.
//!
//! A subgraph is developed and tested against its own field names. When a
//! parent graph embeds it as a single conceptual node, a [`ScenarioMapping`]
//! translates field names at the boundary: the `input` map projects parent
//! fields into the child's initial state, the `output` map projects the
//! child's final state back into a parent update. Fields absent on either
//! side are simply omitted, never defaulted.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;
use crate::graph::Runnable;
use crate::identifiers::ScenarioName;
use crate::schema::NodeHandler;
use crate::state::{State, Update};

// ---------------------------------------------------------------------------
// Mapping data
// ---------------------------------------------------------------------------

/// The input/output field-translation rule of one scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioMapping {
    /// Parent field name → child field name, applied before the child runs.
    pub input: BTreeMap<String, String>,
    /// Child field name → parent field name, applied after the child runs.
    pub output: BTreeMap<String, String>,
}

impl ScenarioMapping {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one parent → child input pair.
    pub fn input(mut self, parent_field: impl Into<String>, child_field: impl Into<String>) -> Self {
        self.input.insert(parent_field.into(), child_field.into());
        self
    }

    /// Adds one child → parent output pair.
    pub fn output(mut self, child_field: impl Into<String>, parent_field: impl Into<String>) -> Self {
        self.output.insert(child_field.into(), parent_field.into());
        self
    }
}

/// All scenario mappings a subgraph publishes, keyed by scenario name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateMappings(BTreeMap<ScenarioName, ScenarioMapping>);

impl StateMappings {
    /// Creates an empty mapping set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `mapping` under `scenario`, replacing any previous entry.
    pub fn insert(&mut self, scenario: ScenarioName, mapping: ScenarioMapping) {
        self.0.insert(scenario, mapping);
    }

    /// Looks up the mapping for `scenario`.
    pub fn get(&self, scenario: &ScenarioName) -> Option<&ScenarioMapping> {
        self.0.get(scenario)
    }

    /// The registered scenario names, sorted.
    pub fn scenario_names(&self) -> Vec<String> {
        self.0.keys().map(|s| s.as_str().to_owned()).collect()
    }
}

// ---------------------------------------------------------------------------
// Projections
// ---------------------------------------------------------------------------

/// Builds a child's initial state from the parent state.
///
/// Parent fields missing from `parent_state` are omitted from the result.
pub fn map_input_state(parent_state: &State, input: &BTreeMap<String, String>) -> State {
    let mut child_state = State::new();
    for (parent_field, child_field) in input {
        if let Some(value) = parent_state.get(parent_field) {
            child_state.insert(child_field.clone(), value.clone());
        }
    }
    child_state
}

/// Builds a parent update from a child's final state.
///
/// Child fields missing from `child_state` are omitted from the result.
pub fn map_output_state(child_state: &State, output: &BTreeMap<String, String>) -> Update {
    let mut parent_update = Update::new();
    for (child_field, parent_field) in output {
        if let Some(value) = child_state.get(child_field) {
            parent_update.insert(parent_field.clone(), value.clone());
        }
    }
    parent_update
}

// ---------------------------------------------------------------------------
// Subgraph invocation
// ---------------------------------------------------------------------------

/// Invokes a compiled subgraph under the named scenario.
///
/// Looks up the scenario mapping (failing with
/// [`PipelineError::MappingNotFound`] if absent), projects the parent state
/// into the child's field names, runs the child, and projects the child's
/// final state back into a parent update. The caller merges the update per
/// the usual append-or-overwrite rule.
pub async fn invoke_subgraph(
    child: &Runnable,
    mappings: &StateMappings,
    scenario: &ScenarioName,
    parent_state: &State,
) -> Result<Update, PipelineError> {
    let mapping = mappings
        .get(scenario)
        .ok_or_else(|| PipelineError::MappingNotFound {
            scenario: scenario.clone(),
        })?;

    let child_initial = map_input_state(parent_state, &mapping.input);
    let child_final = child.invoke(child_initial).await?;
    Ok(map_output_state(&child_final, &mapping.output))
}

/// A compiled subgraph packaged as a single parent node.
///
/// Controllers register one of these per embedded subgraph; the child
/// runnable, its published mappings, and the scenario to use are all injected
/// at construction.
pub struct SubgraphNode {
    child: Arc<Runnable>,
    mappings: StateMappings,
    scenario: ScenarioName,
}

impl SubgraphNode {
    /// Packages `child` for invocation under `scenario`.
    pub fn new(child: Arc<Runnable>, mappings: StateMappings, scenario: ScenarioName) -> Self {
        Self {
            child,
            mappings,
            scenario,
        }
    }
}

#[async_trait]
impl NodeHandler for SubgraphNode {
    async fn run(&self, state: &State) -> Result<Update, PipelineError> {
        invoke_subgraph(&self.child, &self.mappings, &self.scenario, state).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping() -> ScenarioMapping {
        ScenarioMapping::new().input("a", "x").output("y", "b")
    }

    #[test]
    fn input_projection_renames_and_omits_absent_fields() {
        let mut parent = State::new();
        parent.insert("a", "value");
        parent.insert("unrelated", 1);

        let child = map_input_state(&parent, &mapping().input);

        assert_eq!(child.get_str("x"), Some("value"));
        assert!(!child.contains("a"));
        assert!(!child.contains("unrelated"));
        assert_eq!(child.len(), 1);
    }

    #[test]
    fn input_projection_of_missing_parent_field_yields_empty_state() {
        let parent = State::new();
        let child = map_input_state(&parent, &mapping().input);
        assert!(child.is_empty());
    }

    #[test]
    fn output_projection_renames_and_omits_absent_fields() {
        let mut child = State::new();
        child.insert("y", json!(["one", "two"]));
        child.insert("internal", "hidden");

        let update = map_output_state(&child, &mapping().output);

        assert_eq!(update.get("b"), Some(&json!(["one", "two"])));
        assert!(update.get("internal").is_none());
        assert!(update.get("y").is_none());
    }

    #[test]
    fn empty_string_values_survive_projection() {
        let mut parent = State::new();
        parent.insert("a", "");
        let child = map_input_state(&parent, &mapping().input);
        assert_eq!(child.get_str("x"), Some(""));
    }
}
