//! Forcing feature outputs to fixed values.
//!
//! [`FeatureOverrider`] is a decorator executor: it wraps one inner executor,
//! exposes the inner executor's own output handles (it allocates nothing),
//! and overwrites a single output slot with a fixed value after the inner
//! computation has run. Stacked overriders on distinct output indices
//! compose in any order, and because the overwritten slot is the shared
//! handle every consumer reads, an override is transitively visible to all
//! downstream executors.

use crate::executor::{ExecutorBindings, FeatureExecutor};
use crate::match_data::{FeatureValue, MatchData};

/// Decorator that overrides one output of the wrapped executor.
pub struct FeatureOverrider {
    inner: Box<dyn FeatureExecutor>,
    output_index: usize,
    value: FeatureValue,
}

impl FeatureOverrider {
    /// Wrap `inner`, forcing its output at `output_index` to `value` on
    /// every execution. An index outside the wrapped executor's output range
    /// makes the override a silent no-op.
    pub fn new(
        inner: Box<dyn FeatureExecutor>,
        output_index: usize,
        value: FeatureValue,
    ) -> Self {
        FeatureOverrider {
            inner,
            output_index,
            value,
        }
    }
}

impl FeatureExecutor for FeatureOverrider {
    fn bindings(&self) -> &ExecutorBindings {
        self.inner.bindings()
    }

    fn bindings_mut(&mut self) -> &mut ExecutorBindings {
        self.inner.bindings_mut()
    }

    fn execute(&mut self, data: &mut MatchData) {
        self.inner.execute(data);
        let outputs = self.inner.outputs();
        if self.output_index < outputs.len() {
            let handle = outputs[self.output_index];
            *data.feature_mut(handle) = self.value;
        }
    }
}
