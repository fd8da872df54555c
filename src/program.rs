//! Graph compilation and per-document execution.
//!
//! [`RankSetup`] resolves requested dump-feature names into a topologically
//! ordered set of blueprint specs: every feature expression is parsed,
//! looked up in the [`BlueprintFactory`], validated via `setup`, and its
//! input features resolved recursively with memoization, so identical
//! sub-expressions compile to a single shared node. Cyclic references,
//! unknown names and parameter validation failures all fail `compile()`;
//! no partial program is usable afterwards.
//!
//! [`RankProgram`] turns a compiled setup into runnable state for one query:
//! it instantiates the executors in dependency order, wires inputs to
//! producers' output handles, allocates output slots from a shared layout,
//! wraps executors in [`FeatureOverrider`] layers where the caller-supplied
//! override set matches, and creates the `MatchData` buffer. `run(doc_id)`
//! then drives one full evaluation pass per document; results are read back
//! by feature reference.

use std::collections::BTreeMap;

use ahash::AHashMap;

use crate::blueprint::{Blueprint, BlueprintFactory};
use crate::environment::{IndexEnvironment, QueryEnvironment};
use crate::error::{GlaiveError, Result};
use crate::executor::{FeatureExecutor, SharedInputs};
use crate::feature_name::FeatureName;
use crate::match_data::{FeatureValue, MatchData, MatchDataLayout};
use crate::overrider::FeatureOverrider;
use crate::properties::Properties;

/// Reference to one output of one resolved feature node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FeatureRef {
    executor: usize,
    output: usize,
}

/// One resolved feature node: its configured blueprint plus the resolved
/// producers of its inputs.
struct ExecutorSpec {
    blueprint: Box<dyn Blueprint>,
    executor_name: String,
    inputs: Vec<FeatureRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompileState {
    Uncompiled,
    Compiled,
    Failed,
}

/// Compiles requested feature names into an executor graph.
///
/// One-shot: `compile()` transitions to a terminal compiled or failed
/// state. A compiled setup is read-only and may back any number of
/// [`RankProgram`]s, including concurrently built ones on other threads.
pub struct RankSetup<'a> {
    factory: &'a BlueprintFactory,
    index_env: &'a dyn IndexEnvironment,
    dump_features: Vec<String>,
    specs: Vec<ExecutorSpec>,
    spec_by_name: AHashMap<String, usize>,
    feature_map: AHashMap<String, FeatureRef>,
    state: CompileState,
}

impl<'a> RankSetup<'a> {
    /// Create an uncompiled setup over the given registry and index
    /// metadata.
    pub fn new(factory: &'a BlueprintFactory, index_env: &'a dyn IndexEnvironment) -> Self {
        RankSetup {
            factory,
            index_env,
            dump_features: Vec::new(),
            specs: Vec::new(),
            spec_by_name: AHashMap::new(),
            feature_map: AHashMap::new(),
            state: CompileState::Uncompiled,
        }
    }

    /// Request a feature for output. Must be called before `compile()`.
    pub fn add_dump_feature(&mut self, name: impl Into<String>) {
        self.dump_features.push(name.into());
    }

    /// Resolve all requested features into an ordered executor graph.
    ///
    /// Returns an error on unknown feature names, parameter validation
    /// failures and cyclic references; the setup then stays in a terminal
    /// failed state.
    pub fn compile(&mut self) -> Result<()> {
        if self.state != CompileState::Uncompiled {
            return Err(GlaiveError::invalid_operation(
                "compile() may only be called once",
            ));
        }
        let requested = self.dump_features.clone();
        let mut stack = Vec::new();
        for name in &requested {
            if let Err(err) = self.resolve_feature(name, &mut stack) {
                self.state = CompileState::Failed;
                return Err(err);
            }
        }
        self.state = CompileState::Compiled;
        Ok(())
    }

    /// Create a program evaluating every requested dump feature.
    pub fn create_dump_program(&self) -> Result<RankProgram<'_>> {
        if self.state != CompileState::Compiled {
            return Err(GlaiveError::invalid_operation(
                "create_dump_program() requires a successfully compiled setup",
            ));
        }
        Ok(RankProgram::new(self))
    }

    /// Recursively resolve `name` to a node/output reference, creating and
    /// memoizing the node (and, transitively, its inputs) on first sight.
    fn resolve_feature(&mut self, name: &str, stack: &mut Vec<String>) -> Result<FeatureRef> {
        let parsed = FeatureName::parse(name)?;
        let executor_name = parsed.executor_name();

        let spec_index = match self.spec_by_name.get(&executor_name) {
            Some(&index) => index,
            None => {
                if stack.contains(&executor_name) {
                    return Err(GlaiveError::compile(format!(
                        "cyclic feature reference involving '{executor_name}'"
                    )));
                }
                let mut blueprint = self.factory.create(parsed.base()).ok_or_else(|| {
                    GlaiveError::compile(format!("unknown feature '{}'", parsed.base()))
                })?;
                blueprint.setup(self.index_env, parsed.args())?;
                if blueprint.output_names().is_empty() {
                    return Err(GlaiveError::compile(format!(
                        "feature '{executor_name}' declares no outputs"
                    )));
                }

                stack.push(executor_name.clone());
                let input_names = blueprint.input_features().to_vec();
                let mut inputs = Vec::with_capacity(input_names.len());
                for input in &input_names {
                    inputs.push(self.resolve_feature(input, stack)?);
                }
                stack.pop();

                // Producers land in the spec list before their consumers,
                // which is exactly the execution order.
                let index = self.specs.len();
                self.feature_map
                    .insert(executor_name.clone(), FeatureRef { executor: index, output: 0 });
                for (output, output_name) in blueprint.output_names().iter().enumerate() {
                    self.feature_map.insert(
                        format!("{executor_name}.{output_name}"),
                        FeatureRef { executor: index, output },
                    );
                }
                self.spec_by_name.insert(executor_name.clone(), index);
                self.specs.push(ExecutorSpec {
                    blueprint,
                    executor_name: executor_name.clone(),
                    inputs,
                });
                index
            }
        };

        let output = match parsed.output() {
            None => 0,
            Some(output_name) => self
                .output_index(spec_index, output_name)
                .ok_or_else(|| {
                    GlaiveError::compile(format!(
                        "feature '{executor_name}' has no output '{output_name}'"
                    ))
                })?,
        };
        Ok(FeatureRef {
            executor: spec_index,
            output,
        })
    }

    /// Map an output suffix to an output position: declared names first,
    /// then a purely numeric suffix as positional index.
    fn output_index(&self, spec_index: usize, output_name: &str) -> Option<usize> {
        let names = self.specs[spec_index].blueprint.output_names();
        if let Some(index) = names.iter().position(|name| name == output_name) {
            return Some(index);
        }
        match output_name.parse::<usize>() {
            Ok(index) if index < names.len() => Some(index),
            _ => None,
        }
    }

    /// Look up a compiled feature reference by name. Returns `None` for
    /// names that resolve to nothing in this graph.
    fn find_feature(&self, name: &str) -> Option<FeatureRef> {
        let parsed = FeatureName::parse(name).ok()?;
        if let Some(feature_ref) = self.feature_map.get(&parsed.full_name()) {
            return Some(*feature_ref);
        }
        let spec_index = *self.spec_by_name.get(&parsed.executor_name())?;
        match parsed.output() {
            None => Some(FeatureRef {
                executor: spec_index,
                output: 0,
            }),
            Some(output_name) => Some(FeatureRef {
                executor: spec_index,
                output: self.output_index(spec_index, output_name)?,
            }),
        }
    }
}

/// A compiled, runnable rank program: the ordered executor list plus its
/// bound `MatchData` buffer.
///
/// Built from a compiled [`RankSetup`]; one program per evaluation context
/// (typically one per query). `run` is re-invokable for successive document
/// ids without recompiling.
pub struct RankProgram<'a> {
    setup: &'a RankSetup<'a>,
    executors: Vec<Box<dyn FeatureExecutor>>,
    match_data: Option<MatchData>,
}

impl<'a> RankProgram<'a> {
    fn new(setup: &'a RankSetup<'a>) -> Self {
        RankProgram {
            setup,
            executors: Vec::new(),
            match_data: None,
        }
    }

    /// Instantiate the executor graph against `layout`, bind query-time
    /// state and apply `overrides`.
    ///
    /// Override keys are feature references (`feature` or
    /// `feature.output`); values are decimal literals. Keys matching no
    /// compiled feature and unparseable values are silently ignored.
    /// Multiple overrides on distinct outputs of one feature stack as
    /// separate decorator layers.
    pub fn setup(
        &mut self,
        layout: &mut MatchDataLayout,
        query_env: &dyn QueryEnvironment,
        overrides: &Properties,
    ) -> Result<()> {
        if self.match_data.is_some() {
            return Err(GlaiveError::invalid_operation(
                "setup() may only be called once per program",
            ));
        }

        let mut override_layers: Vec<Vec<(usize, FeatureValue)>> =
            vec![Vec::new(); self.setup.specs.len()];
        for (key, value) in overrides.iter() {
            let Some(feature_ref) = self.setup.find_feature(key) else {
                continue;
            };
            let Ok(value) = value.parse::<FeatureValue>() else {
                continue;
            };
            override_layers[feature_ref.executor].push((feature_ref.output, value));
        }

        let shared = SharedInputs::new();
        let mut executors: Vec<Box<dyn FeatureExecutor>> =
            Vec::with_capacity(self.setup.specs.len());
        for (index, spec) in self.setup.specs.iter().enumerate() {
            let mut executor = spec.blueprint.create_executor(query_env);
            executor.bind_shared_inputs(shared.clone());
            for input in &spec.inputs {
                let handle = executors[input.executor].outputs()[input.output];
                executor.add_input(handle);
            }
            executor.inputs_done();
            for _ in spec.blueprint.output_names() {
                executor.bind_output(layout.alloc_feature());
            }
            executor.outputs_done();
            for &(output, value) in &override_layers[index] {
                executor = Box::new(FeatureOverrider::new(executor, output, value));
            }
            executors.push(executor);
        }

        self.executors = executors;
        self.match_data = Some(layout.create_match_data());
        Ok(())
    }

    /// Evaluate every feature for one document: sets the current document
    /// id and runs each executor once, in the fixed topological order.
    ///
    /// # Panics
    ///
    /// Panics if called before `setup()`.
    pub fn run(&mut self, doc_id: u32) {
        let match_data = self
            .match_data
            .as_mut()
            .expect("setup() must be called before run()");
        match_data.set_doc_id(doc_id);
        for executor in &mut self.executors {
            executor.execute(match_data);
        }
    }

    /// The value last computed for `name`, or `None` when the name resolves
    /// to nothing in this program.
    pub fn feature_value(&self, name: &str) -> Option<FeatureValue> {
        let feature_ref = self.setup.find_feature(name)?;
        let match_data = self.match_data.as_ref()?;
        let handle = self.executors[feature_ref.executor].outputs()[feature_ref.output];
        Some(match_data.feature(handle))
    }

    /// All computed results by feature reference: one entry per resolved
    /// feature (its first output, addressed without suffix) plus one
    /// `name.output` entry per declared output.
    pub fn all_features(&self) -> BTreeMap<String, FeatureValue> {
        let mut results = BTreeMap::new();
        let Some(match_data) = &self.match_data else {
            return results;
        };
        for (index, spec) in self.setup.specs.iter().enumerate() {
            let outputs = self.executors[index].outputs();
            results.insert(spec.executor_name.clone(), match_data.feature(outputs[0]));
            for (output, output_name) in spec.blueprint.output_names().iter().enumerate() {
                results.insert(
                    format!("{}.{}", spec.executor_name, output_name),
                    match_data.feature(outputs[output]),
                );
            }
        }
        results
    }

    /// Access the program's value buffer, e.g. to stamp term-field match
    /// state before `run`.
    ///
    /// # Panics
    ///
    /// Panics if called before `setup()`.
    pub fn match_data_mut(&mut self) -> &mut MatchData {
        self.match_data
            .as_mut()
            .expect("setup() must be called before match_data_mut()")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::FeatureDeclarations;
    use crate::environment::{SimpleIndexEnvironment, SimpleQueryEnvironment};
    use crate::features::register_builtin_features;
    use crate::features::value::ValueExecutor;

    /// Feature whose single input is itself; only exists to exercise cycle
    /// detection.
    #[derive(Debug, Default)]
    struct LoopBlueprint {
        declarations: FeatureDeclarations,
    }

    impl Blueprint for LoopBlueprint {
        fn base_name(&self) -> &'static str {
            "loop"
        }

        fn create_instance(&self) -> Box<dyn Blueprint> {
            Box::new(LoopBlueprint::default())
        }

        fn setup(
            &mut self,
            _index_env: &dyn IndexEnvironment,
            _params: &[String],
        ) -> Result<()> {
            self.declarations.define_input("loop");
            self.declarations.describe_output("out");
            Ok(())
        }

        fn declarations(&self) -> &FeatureDeclarations {
            &self.declarations
        }

        fn create_executor(&self, _query_env: &dyn QueryEnvironment) -> Box<dyn FeatureExecutor> {
            Box::new(ValueExecutor::new(vec![0.0]))
        }
    }

    fn builtin_factory() -> BlueprintFactory {
        let mut factory = BlueprintFactory::new();
        register_builtin_features(&mut factory);
        factory
    }

    #[test]
    fn test_compile_shares_identical_subexpressions() -> Result<()> {
        let factory = builtin_factory();
        let index_env = SimpleIndexEnvironment::new();
        let mut setup = RankSetup::new(&factory, &index_env);
        setup.add_dump_feature("mysum(value(1),value(1))");
        setup.add_dump_feature("double(value(1))");
        setup.compile()?;

        // value(1) appears three times but compiles to one node.
        assert_eq!(setup.specs.len(), 3);
        Ok(())
    }

    #[test]
    fn test_unknown_feature_fails_compile() {
        let factory = builtin_factory();
        let index_env = SimpleIndexEnvironment::new();
        let mut setup = RankSetup::new(&factory, &index_env);
        setup.add_dump_feature("bogus(1)");
        assert!(setup.compile().is_err());
        assert!(setup.create_dump_program().is_err());
    }

    #[test]
    fn test_invalid_parameters_fail_compile() {
        let factory = builtin_factory();
        let index_env = SimpleIndexEnvironment::new();
        let mut setup = RankSetup::new(&factory, &index_env);
        setup.add_dump_feature("value(one)");
        assert!(setup.compile().is_err());
    }

    #[test]
    fn test_cyclic_reference_fails_compile() {
        let mut factory = BlueprintFactory::new();
        factory.add_prototype(Box::new(LoopBlueprint::default()));
        let index_env = SimpleIndexEnvironment::new();
        let mut setup = RankSetup::new(&factory, &index_env);
        setup.add_dump_feature("loop");
        let err = setup.compile().unwrap_err();
        assert!(err.to_string().contains("cyclic"));
    }

    #[test]
    fn test_compile_is_one_shot() -> Result<()> {
        let factory = builtin_factory();
        let index_env = SimpleIndexEnvironment::new();
        let mut setup = RankSetup::new(&factory, &index_env);
        setup.add_dump_feature("value(1)");
        setup.compile()?;
        assert!(setup.compile().is_err());
        Ok(())
    }

    #[test]
    fn test_create_dump_program_requires_compile() {
        let factory = builtin_factory();
        let index_env = SimpleIndexEnvironment::new();
        let setup = RankSetup::new(&factory, &index_env);
        assert!(setup.create_dump_program().is_err());
    }

    #[test]
    fn test_unknown_output_suffix_fails_compile() {
        let factory = builtin_factory();
        let index_env = SimpleIndexEnvironment::new();
        let mut setup = RankSetup::new(&factory, &index_env);
        setup.add_dump_feature("value(1,2).7");
        assert!(setup.compile().is_err());
    }

    #[test]
    fn test_program_setup_is_one_shot() -> Result<()> {
        let factory = builtin_factory();
        let index_env = SimpleIndexEnvironment::new();
        let mut setup = RankSetup::new(&factory, &index_env);
        setup.add_dump_feature("value(1)");
        setup.compile()?;

        let mut program = setup.create_dump_program()?;
        let mut layout = MatchDataLayout::new();
        let query_env = SimpleQueryEnvironment::new();
        program.setup(&mut layout, &query_env, &Properties::new())?;
        assert!(
            program
                .setup(&mut layout, &query_env, &Properties::new())
                .is_err()
        );
        Ok(())
    }

    #[test]
    fn test_run_and_rerun_per_document() -> Result<()> {
        let factory = builtin_factory();
        let index_env = SimpleIndexEnvironment::new();
        let mut setup = RankSetup::new(&factory, &index_env);
        setup.add_dump_feature("mysum(value(2),value(3))");
        setup.compile()?;

        let mut program = setup.create_dump_program()?;
        let mut layout = MatchDataLayout::new();
        let query_env = SimpleQueryEnvironment::new();
        program.setup(&mut layout, &query_env, &Properties::new())?;

        program.run(1);
        assert_eq!(program.feature_value("mysum(value(2),value(3))"), Some(5.0));
        program.run(2);
        assert_eq!(program.feature_value("mysum(value(2),value(3))"), Some(5.0));
        assert_eq!(program.feature_value("value(2)"), Some(2.0));
        assert_eq!(program.feature_value("nonsense"), None);
        Ok(())
    }
}
