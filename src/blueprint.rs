//! Compile-time feature descriptors and their registry.
//!
//! A [`Blueprint`] is the static half of a feature type: it validates the
//! parameter list for one concrete feature instance, declares that
//! instance's input features and output names, and manufactures the runtime
//! executor. One blueprint instance exists per distinct (base name,
//! parameter list) pair in a compiled program, cloned from a prototype
//! registered in the [`BlueprintFactory`].

use ahash::AHashMap;

use crate::environment::{IndexEnvironment, QueryEnvironment};
use crate::error::Result;
use crate::executor::FeatureExecutor;

/// Inputs and outputs declared by a blueprint during `setup`.
///
/// Every blueprint embeds one of these and records into it with
/// [`define_input`] / [`describe_output`]; the graph compiler reads the
/// declarations back after a successful `setup`.
///
/// [`define_input`]: FeatureDeclarations::define_input
/// [`describe_output`]: FeatureDeclarations::describe_output
#[derive(Debug, Default)]
pub struct FeatureDeclarations {
    inputs: Vec<String>,
    outputs: Vec<String>,
}

impl FeatureDeclarations {
    /// Create an empty declaration set.
    pub fn new() -> Self {
        FeatureDeclarations::default()
    }

    /// Declare a dependency on another feature, by feature expression.
    pub fn define_input(&mut self, feature: impl Into<String>) {
        self.inputs.push(feature.into());
    }

    /// Declare the next output, by name.
    pub fn describe_output(&mut self, name: impl Into<String>) {
        self.outputs.push(name.into());
    }

    /// Feature expressions this blueprint consumes, in declaration order.
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Output names, in declaration order.
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }
}

/// Compile-time descriptor and executor factory for one feature instance.
///
/// Immutable after a successful [`setup`]; owned by the rank setup for the
/// lifetime of the compiled program. Compiled blueprints are shared
/// read-only across threads, hence the `Send + Sync` bound.
///
/// [`setup`]: Blueprint::setup
pub trait Blueprint: Send + Sync {
    /// The registered type name, used as the lookup key during graph
    /// resolution.
    fn base_name(&self) -> &'static str;

    /// Create a fresh, unconfigured blueprint of the same type. Used when
    /// the same feature type appears with different parameters.
    fn create_instance(&self) -> Box<dyn Blueprint>;

    /// Validate `params` against this feature type's own rules and declare
    /// inputs and outputs. A validation failure is a hard failure of the
    /// whole program compilation, never a per-feature skip.
    fn setup(&mut self, index_env: &dyn IndexEnvironment, params: &[String]) -> Result<()>;

    /// The declarations recorded by [`setup`].
    ///
    /// [`setup`]: Blueprint::setup
    fn declarations(&self) -> &FeatureDeclarations;

    /// Build the runtime executor for this feature instance, bound to one
    /// query's runtime context. A degenerate configuration may yield a
    /// simplified executor (e.g. a constant) instead of the regular one.
    fn create_executor(&self, query_env: &dyn QueryEnvironment) -> Box<dyn FeatureExecutor>;

    /// Feature expressions this instance consumes.
    fn input_features(&self) -> &[String] {
        self.declarations().inputs()
    }

    /// Declared output names.
    fn output_names(&self) -> &[String] {
        self.declarations().outputs()
    }
}

/// Registry mapping feature type names to prototype blueprints.
#[derive(Default)]
pub struct BlueprintFactory {
    prototypes: AHashMap<String, Box<dyn Blueprint>>,
}

impl BlueprintFactory {
    /// Create an empty factory.
    pub fn new() -> Self {
        BlueprintFactory::default()
    }

    /// Register a prototype under its base name. A later registration with
    /// the same name replaces the earlier one.
    pub fn add_prototype(&mut self, prototype: Box<dyn Blueprint>) {
        self.prototypes
            .insert(prototype.base_name().to_string(), prototype);
    }

    /// Create a fresh blueprint for `base_name`, or `None` when the name is
    /// not registered (a compile-time error for the caller).
    pub fn create(&self, base_name: &str) -> Option<Box<dyn Blueprint>> {
        self.prototypes
            .get(base_name)
            .map(|prototype| prototype.create_instance())
    }

    /// Whether a prototype is registered under `base_name`.
    pub fn contains(&self, base_name: &str) -> bool {
        self.prototypes.contains_key(base_name)
    }
}
