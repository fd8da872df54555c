//! The `mysum` feature: sums its feature arguments.
//!
//! `mysum(f1,...,fn)` consumes n feature arguments and declares a single
//! output named `out` holding their sum. The base name is kept as `mysum`
//! for compatibility with existing rank profiles.

use crate::blueprint::{Blueprint, FeatureDeclarations};
use crate::environment::{IndexEnvironment, QueryEnvironment};
use crate::error::{GlaiveError, Result};
use crate::executor::{ExecutorBindings, FeatureExecutor};
use crate::match_data::MatchData;

/// Blueprint for `mysum(...)`.
#[derive(Debug, Default)]
pub struct SumBlueprint {
    declarations: FeatureDeclarations,
}

impl SumBlueprint {
    /// Create an unconfigured `mysum` blueprint.
    pub fn new() -> Self {
        SumBlueprint::default()
    }
}

impl Blueprint for SumBlueprint {
    fn base_name(&self) -> &'static str {
        "mysum"
    }

    fn create_instance(&self) -> Box<dyn Blueprint> {
        Box::new(SumBlueprint::new())
    }

    fn setup(&mut self, _index_env: &dyn IndexEnvironment, params: &[String]) -> Result<()> {
        if params.is_empty() {
            return Err(GlaiveError::compile(
                "mysum: expected at least one feature argument",
            ));
        }
        for param in params {
            self.declarations.define_input(param.clone());
        }
        self.declarations.describe_output("out");
        Ok(())
    }

    fn declarations(&self) -> &FeatureDeclarations {
        &self.declarations
    }

    fn create_executor(&self, _query_env: &dyn QueryEnvironment) -> Box<dyn FeatureExecutor> {
        Box::new(SumExecutor::new())
    }
}

/// Writes the sum of all inputs into the single output.
#[derive(Default)]
pub struct SumExecutor {
    bindings: ExecutorBindings,
}

impl SumExecutor {
    /// Create a `mysum` executor.
    pub fn new() -> Self {
        SumExecutor::default()
    }
}

impl FeatureExecutor for SumExecutor {
    fn bindings(&self) -> &ExecutorBindings {
        &self.bindings
    }

    fn bindings_mut(&mut self) -> &mut ExecutorBindings {
        &mut self.bindings
    }

    fn execute(&mut self, data: &mut MatchData) {
        let mut sum = 0.0;
        for index in 0..self.bindings.input_count() {
            sum += data.feature(self.bindings.input(index));
        }
        *data.feature_mut(self.bindings.outputs()[0]) = sum;
    }
}
