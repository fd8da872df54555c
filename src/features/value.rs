//! The `value` feature: constant outputs.
//!
//! `value(v1,v2,...,vn)` declares n outputs named `0`..`n-1`, each holding
//! the corresponding literal for every document. [`ValueExecutor`] is also
//! the degenerate fallback executor other feature types use when their
//! configuration collapses to a constant.

use crate::blueprint::{Blueprint, FeatureDeclarations};
use crate::environment::{IndexEnvironment, QueryEnvironment};
use crate::error::{GlaiveError, Result};
use crate::executor::{ExecutorBindings, FeatureExecutor};
use crate::match_data::{FeatureValue, MatchData};

/// Blueprint for `value(...)`.
#[derive(Debug, Default)]
pub struct ValueBlueprint {
    declarations: FeatureDeclarations,
    values: Vec<FeatureValue>,
}

impl ValueBlueprint {
    /// Create an unconfigured `value` blueprint.
    pub fn new() -> Self {
        ValueBlueprint::default()
    }
}

impl Blueprint for ValueBlueprint {
    fn base_name(&self) -> &'static str {
        "value"
    }

    fn create_instance(&self) -> Box<dyn Blueprint> {
        Box::new(ValueBlueprint::new())
    }

    fn setup(&mut self, _index_env: &dyn IndexEnvironment, params: &[String]) -> Result<()> {
        if params.is_empty() {
            return Err(GlaiveError::compile("value: expected at least one value"));
        }
        for (index, param) in params.iter().enumerate() {
            let value: FeatureValue = param.parse().map_err(|_| {
                GlaiveError::compile(format!("value: '{param}' is not a number"))
            })?;
            self.values.push(value);
            self.declarations.describe_output(index.to_string());
        }
        Ok(())
    }

    fn declarations(&self) -> &FeatureDeclarations {
        &self.declarations
    }

    fn create_executor(&self, _query_env: &dyn QueryEnvironment) -> Box<dyn FeatureExecutor> {
        Box::new(ValueExecutor::new(self.values.clone()))
    }
}

/// Writes a fixed value into each bound output.
pub struct ValueExecutor {
    bindings: ExecutorBindings,
    values: Vec<FeatureValue>,
}

impl ValueExecutor {
    /// Create an executor producing `values`, one output per value.
    pub fn new(values: Vec<FeatureValue>) -> Self {
        ValueExecutor {
            bindings: ExecutorBindings::new(),
            values,
        }
    }
}

impl FeatureExecutor for ValueExecutor {
    fn bindings(&self) -> &ExecutorBindings {
        &self.bindings
    }

    fn bindings_mut(&mut self) -> &mut ExecutorBindings {
        &mut self.bindings
    }

    fn execute(&mut self, data: &mut MatchData) {
        for (value, handle) in self.values.iter().zip(self.bindings.outputs()) {
            *data.feature_mut(*handle) = *value;
        }
    }
}
