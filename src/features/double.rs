//! The `double` feature: doubles each feature argument.
//!
//! `double(f1,...,fn)` consumes n feature arguments and declares n outputs
//! named `0`..`n-1`, where output i is twice the value of input i.

use crate::blueprint::{Blueprint, FeatureDeclarations};
use crate::environment::{IndexEnvironment, QueryEnvironment};
use crate::error::{GlaiveError, Result};
use crate::executor::{ExecutorBindings, FeatureExecutor};
use crate::match_data::MatchData;

/// Blueprint for `double(...)`.
#[derive(Debug, Default)]
pub struct DoubleBlueprint {
    declarations: FeatureDeclarations,
}

impl DoubleBlueprint {
    /// Create an unconfigured `double` blueprint.
    pub fn new() -> Self {
        DoubleBlueprint::default()
    }
}

impl Blueprint for DoubleBlueprint {
    fn base_name(&self) -> &'static str {
        "double"
    }

    fn create_instance(&self) -> Box<dyn Blueprint> {
        Box::new(DoubleBlueprint::new())
    }

    fn setup(&mut self, _index_env: &dyn IndexEnvironment, params: &[String]) -> Result<()> {
        if params.is_empty() {
            return Err(GlaiveError::compile(
                "double: expected at least one feature argument",
            ));
        }
        for (index, param) in params.iter().enumerate() {
            self.declarations.define_input(param.clone());
            self.declarations.describe_output(index.to_string());
        }
        Ok(())
    }

    fn declarations(&self) -> &FeatureDeclarations {
        &self.declarations
    }

    fn create_executor(&self, _query_env: &dyn QueryEnvironment) -> Box<dyn FeatureExecutor> {
        Box::new(DoubleExecutor::new())
    }
}

/// Writes twice the i'th input into the i'th output.
#[derive(Default)]
pub struct DoubleExecutor {
    bindings: ExecutorBindings,
}

impl DoubleExecutor {
    /// Create a `double` executor; inputs and outputs pair up positionally.
    pub fn new() -> Self {
        DoubleExecutor::default()
    }
}

impl FeatureExecutor for DoubleExecutor {
    fn bindings(&self) -> &ExecutorBindings {
        &self.bindings
    }

    fn bindings_mut(&mut self) -> &mut ExecutorBindings {
        &mut self.bindings
    }

    fn execute(&mut self, data: &mut MatchData) {
        for index in 0..self.bindings.outputs().len() {
            let value = data.feature(self.bindings.input(index));
            let handle = self.bindings.outputs()[index];
            *data.feature_mut(handle) = 2.0 * value;
        }
    }
}
