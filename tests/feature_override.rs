//! Integration tests for the override decorator over hand-wired executors.

use glaive::executor::{FeatureExecutor, SharedInputs};
use glaive::features::double::DoubleExecutor;
use glaive::features::value::ValueExecutor;
use glaive::match_data::{FeatureHandle, FeatureValue, MatchData, MatchDataLayout};
use glaive::overrider::FeatureOverrider;

/// Hand-wires executors against one layout and runs them in insertion
/// order.
struct Fixture {
    layout: MatchDataLayout,
    executors: Vec<Box<dyn FeatureExecutor>>,
    match_data: Option<MatchData>,
}

impl Fixture {
    fn new() -> Self {
        Fixture {
            layout: MatchDataLayout::new(),
            executors: Vec::new(),
            match_data: None,
        }
    }

    /// Close the executor's inputs, bind `out_count` fresh outputs and queue
    /// it for execution; returns its position.
    fn add(&mut self, mut executor: Box<dyn FeatureExecutor>, out_count: usize) -> usize {
        executor.inputs_done();
        for _ in 0..out_count {
            executor.bind_output(self.layout.alloc_feature());
        }
        executor.outputs_done();
        self.executors.push(executor);
        self.executors.len() - 1
    }

    fn run(&mut self) {
        let mut match_data = self.layout.create_match_data();
        for executor in &mut self.executors {
            executor.execute(&mut match_data);
        }
        self.match_data = Some(match_data);
    }

    fn resolve_feature(&self, handle: FeatureHandle) -> FeatureValue {
        self.match_data.as_ref().unwrap().feature(handle)
    }

    fn outputs(&self, index: usize) -> Vec<FeatureHandle> {
        self.executors[index].outputs().to_vec()
    }

    fn value_executor() -> Box<dyn FeatureExecutor> {
        Box::new(ValueExecutor::new(vec![1.0, 2.0, 3.0]))
    }
}

#[test]
fn test_single_override() {
    let mut f = Fixture::new();
    let fe = Box::new(FeatureOverrider::new(Fixture::value_executor(), 1, 50.0));
    let index = f.add(fe, 3);
    f.run();

    let outputs = f.outputs(index);
    assert_eq!(outputs.len(), 3);
    assert_eq!(f.resolve_feature(outputs[0]), 1.0);
    assert_eq!(f.resolve_feature(outputs[1]), 50.0);
    assert_eq!(f.resolve_feature(outputs[2]), 3.0);
}

#[test]
fn test_multiple_overrides() {
    let mut f = Fixture::new();
    let fe = Box::new(FeatureOverrider::new(Fixture::value_executor(), 0, 50.0));
    let fe = Box::new(FeatureOverrider::new(fe, 2, 100.0));
    let index = f.add(fe, 3);
    f.run();

    let outputs = f.outputs(index);
    assert_eq!(outputs.len(), 3);
    assert_eq!(f.resolve_feature(outputs[0]), 50.0);
    assert_eq!(f.resolve_feature(outputs[1]), 2.0);
    assert_eq!(f.resolve_feature(outputs[2]), 100.0);
}

#[test]
fn test_stacking_order_does_not_matter() {
    for swap in [false, true] {
        let mut f = Fixture::new();
        let (first, second) = if swap { ((2, 100.0), (0, 50.0)) } else { ((0, 50.0), (2, 100.0)) };
        let fe = Box::new(FeatureOverrider::new(Fixture::value_executor(), first.0, first.1));
        let fe = Box::new(FeatureOverrider::new(fe, second.0, second.1));
        let index = f.add(fe, 3);
        f.run();

        let outputs = f.outputs(index);
        assert_eq!(f.resolve_feature(outputs[0]), 50.0);
        assert_eq!(f.resolve_feature(outputs[1]), 2.0);
        assert_eq!(f.resolve_feature(outputs[2]), 100.0);
    }
}

#[test]
fn test_non_existing_override() {
    let mut f = Fixture::new();
    let fe = Box::new(FeatureOverrider::new(Fixture::value_executor(), 1000, 50.0));
    let index = f.add(fe, 3);
    f.run();

    let outputs = f.outputs(index);
    assert_eq!(outputs.len(), 3);
    assert_eq!(f.resolve_feature(outputs[0]), 1.0);
    assert_eq!(f.resolve_feature(outputs[1]), 2.0);
    assert_eq!(f.resolve_feature(outputs[2]), 3.0);
}

#[test]
fn test_transitive_override() {
    let shared = SharedInputs::new();
    let mut f = Fixture::new();

    let fe = Box::new(FeatureOverrider::new(Fixture::value_executor(), 1, 50.0));
    let producer = f.add(fe, 3);
    let producer_outputs = f.outputs(producer);

    let mut fe2: Box<dyn FeatureExecutor> = Box::new(DoubleExecutor::new());
    fe2.bind_shared_inputs(shared);
    fe2.add_input(producer_outputs[0]);
    fe2.add_input(producer_outputs[1]);
    fe2.add_input(producer_outputs[2]);
    let fe2 = Box::new(FeatureOverrider::new(fe2, 2, 10.0));
    let consumer = f.add(fe2, 3);
    f.run();

    let outputs = f.outputs(producer);
    assert_eq!(f.resolve_feature(outputs[0]), 1.0);
    assert_eq!(f.resolve_feature(outputs[1]), 50.0);
    assert_eq!(f.resolve_feature(outputs[2]), 3.0);

    // The consumer doubles the overridden value, not the natural one.
    let outputs = f.outputs(consumer);
    assert_eq!(f.resolve_feature(outputs[0]), 2.0);
    assert_eq!(f.resolve_feature(outputs[1]), 100.0);
    assert_eq!(f.resolve_feature(outputs[2]), 10.0);
}
