//! The `matches` feature: did the query match a field?
//!
//! `matches(field)` declares one output named `out`, holding 1.0 when any
//! query term matched `field` for the current document and 0.0 otherwise.
//! `matches(field,termIdx)` restricts the check to one term index.
//!
//! A nonexistent field is not a compile error: the blueprint degrades to a
//! constant-zero executor, so stale rank profiles keep working when a field
//! is removed from the schema.

use crate::blueprint::{Blueprint, FeatureDeclarations};
use crate::environment::{IndexEnvironment, QueryEnvironment};
use crate::error::{GlaiveError, Result};
use crate::executor::{ExecutorBindings, FeatureExecutor};
use crate::features::value::ValueExecutor;
use crate::match_data::{MatchData, TermFieldHandle};

/// Blueprint for `matches(field[,termIdx])`.
#[derive(Debug, Default)]
pub struct MatchesBlueprint {
    declarations: FeatureDeclarations,
    field_id: Option<u32>,
    term_index: Option<usize>,
}

impl MatchesBlueprint {
    /// Create an unconfigured `matches` blueprint.
    pub fn new() -> Self {
        MatchesBlueprint::default()
    }
}

impl Blueprint for MatchesBlueprint {
    fn base_name(&self) -> &'static str {
        "matches"
    }

    fn create_instance(&self) -> Box<dyn Blueprint> {
        Box::new(MatchesBlueprint::new())
    }

    fn setup(&mut self, index_env: &dyn IndexEnvironment, params: &[String]) -> Result<()> {
        if params.is_empty() || params.len() > 2 {
            return Err(GlaiveError::compile(
                "matches: expected matches(field) or matches(field,termIdx)",
            ));
        }
        // Unknown field: degrade to a constant zero executor instead of
        // failing compilation.
        self.field_id = index_env.field_by_name(&params[0]).map(|f| f.id());
        if let Some(param) = params.get(1) {
            let term_index: usize = param.parse().map_err(|_| {
                GlaiveError::compile(format!("matches: '{param}' is not a term index"))
            })?;
            self.term_index = Some(term_index);
        }
        self.declarations.describe_output("out");
        Ok(())
    }

    fn declarations(&self) -> &FeatureDeclarations {
        &self.declarations
    }

    fn create_executor(&self, query_env: &dyn QueryEnvironment) -> Box<dyn FeatureExecutor> {
        let Some(field_id) = self.field_id else {
            return Box::new(ValueExecutor::new(vec![0.0]));
        };
        let term_range = match self.term_index {
            Some(index) => index..index + 1,
            None => 0..query_env.num_terms(),
        };
        let handles = term_range
            .filter_map(|term| query_env.term_field_handle(term, field_id))
            .collect();
        Box::new(MatchesExecutor::new(handles))
    }
}

/// Checks the collected term-field slots against the current document id.
pub struct MatchesExecutor {
    bindings: ExecutorBindings,
    handles: Vec<TermFieldHandle>,
}

impl MatchesExecutor {
    /// Create an executor over the term-field handles relevant to one field.
    pub fn new(handles: Vec<TermFieldHandle>) -> Self {
        MatchesExecutor {
            bindings: ExecutorBindings::new(),
            handles,
        }
    }
}

impl FeatureExecutor for MatchesExecutor {
    fn bindings(&self) -> &ExecutorBindings {
        &self.bindings
    }

    fn bindings_mut(&mut self) -> &mut ExecutorBindings {
        &mut self.bindings
    }

    fn execute(&mut self, data: &mut MatchData) {
        let matched = self
            .handles
            .iter()
            .any(|handle| data.term_field(*handle).doc_id() == data.doc_id());
        *data.feature_mut(self.bindings.outputs()[0]) = if matched { 1.0 } else { 0.0 };
    }
}
