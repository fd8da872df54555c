//! Runtime graph nodes.
//!
//! A [`FeatureExecutor`] computes one feature's outputs for the document
//! currently addressed by a [`MatchData`] buffer. Executors are wired into a
//! graph by binding input handles (other executors' outputs) and output
//! handles (fresh slots allocated from the shared layout), then driven once
//! per document in topological order.
//!
//! The binding protocol is strict and assert-enforced:
//!
//! 1. declare every input via [`add_input`], then call [`inputs_done`];
//! 2. bind every output via [`bind_output`] in declared order, then call
//!    [`outputs_done`];
//! 3. call [`execute`] any number of times, once per document.
//!
//! Violating the order is a programming error, not a recoverable condition.
//!
//! `execute` itself never fails: numeric edge cases inside a feature's own
//! computation (division by zero and friends) must resolve to a defined
//! value such as 0.0 or NaN, never panic or propagate an error through the
//! graph.
//!
//! [`add_input`]: FeatureExecutor::add_input
//! [`inputs_done`]: FeatureExecutor::inputs_done
//! [`bind_output`]: FeatureExecutor::bind_output
//! [`outputs_done`]: FeatureExecutor::outputs_done
//! [`execute`]: FeatureExecutor::execute

use std::cell::RefCell;
use std::rc::Rc;

use crate::match_data::{FeatureHandle, MatchData};

/// Input handle list shareable across sibling executors.
///
/// Executors built for the same program can store their input handles in one
/// shared vector instead of one allocation each. Sharing is purely a memory
/// optimization; it has no observable effect on results. Each executor must
/// declare all of its inputs before the next sibling starts declaring.
#[derive(Debug, Clone, Default)]
pub struct SharedInputs {
    handles: Rc<RefCell<Vec<FeatureHandle>>>,
}

impl SharedInputs {
    /// Create a new, empty shared input list.
    pub fn new() -> Self {
        SharedInputs::default()
    }

    fn len(&self) -> usize {
        self.handles.borrow().len()
    }

    fn push(&self, handle: FeatureHandle) {
        self.handles.borrow_mut().push(handle);
    }

    fn get(&self, index: usize) -> FeatureHandle {
        self.handles.borrow()[index]
    }
}

/// Binding state embedded in every executor: declared inputs, bound outputs
/// and the protocol phase tracking.
#[derive(Debug)]
pub struct ExecutorBindings {
    inputs: SharedInputs,
    input_offset: usize,
    input_count: usize,
    inputs_done: bool,
    outputs: Vec<FeatureHandle>,
    outputs_done: bool,
}

impl ExecutorBindings {
    /// Create binding state with a private input list.
    pub fn new() -> Self {
        ExecutorBindings {
            inputs: SharedInputs::new(),
            input_offset: 0,
            input_count: 0,
            inputs_done: false,
            outputs: Vec::new(),
            outputs_done: false,
        }
    }

    /// Switch to a shared input list. Must happen before any input is
    /// declared.
    pub fn bind_shared_inputs(&mut self, shared: SharedInputs) {
        assert!(
            self.input_count == 0 && !self.inputs_done,
            "shared inputs must be bound before declaring inputs"
        );
        self.inputs = shared;
    }

    /// Declare the next input handle.
    pub fn add_input(&mut self, handle: FeatureHandle) {
        assert!(!self.inputs_done, "cannot add inputs after inputs_done()");
        if self.input_count == 0 {
            self.input_offset = self.inputs.len();
        }
        assert_eq!(
            self.inputs.len(),
            self.input_offset + self.input_count,
            "inputs must be declared contiguously in the shared list"
        );
        self.inputs.push(handle);
        self.input_count += 1;
    }

    /// Close the input declaration phase.
    pub fn inputs_done(&mut self) {
        assert!(!self.inputs_done, "inputs_done() called twice");
        self.inputs_done = true;
    }

    /// Bind the next output handle.
    pub fn bind_output(&mut self, handle: FeatureHandle) {
        assert!(self.inputs_done, "inputs_done() must precede bind_output()");
        assert!(!self.outputs_done, "cannot bind outputs after outputs_done()");
        self.outputs.push(handle);
    }

    /// Close the output binding phase; the executor may execute afterwards.
    pub fn outputs_done(&mut self) {
        assert!(self.inputs_done, "inputs_done() must precede outputs_done()");
        assert!(!self.outputs_done, "outputs_done() called twice");
        self.outputs_done = true;
    }

    /// Number of declared inputs.
    pub fn input_count(&self) -> usize {
        self.input_count
    }

    /// The i'th declared input handle.
    pub fn input(&self, index: usize) -> FeatureHandle {
        assert!(index < self.input_count, "input index out of range");
        self.inputs.get(self.input_offset + index)
    }

    /// The bound output handles.
    pub fn outputs(&self) -> &[FeatureHandle] {
        &self.outputs
    }

    /// Whether the executor is fully bound and ready to execute.
    pub fn ready(&self) -> bool {
        self.inputs_done && self.outputs_done
    }
}

impl Default for ExecutorBindings {
    fn default() -> Self {
        ExecutorBindings::new()
    }
}

/// A runtime feature graph node.
///
/// Implementations embed an [`ExecutorBindings`] and expose it through
/// [`bindings`]/[`bindings_mut`]; the binding-protocol methods are provided
/// on top of it. Only [`execute`] carries feature-specific logic.
///
/// [`bindings`]: FeatureExecutor::bindings
/// [`bindings_mut`]: FeatureExecutor::bindings_mut
/// [`execute`]: FeatureExecutor::execute
pub trait FeatureExecutor {
    /// Access the embedded binding state.
    fn bindings(&self) -> &ExecutorBindings;

    /// Mutably access the embedded binding state.
    fn bindings_mut(&mut self) -> &mut ExecutorBindings;

    /// Compute all declared outputs for the document currently addressed by
    /// `data`, reading input handles and writing output handles in place.
    fn execute(&mut self, data: &mut MatchData);

    /// Share an input list with sibling executors (optional, before any
    /// input is declared).
    fn bind_shared_inputs(&mut self, shared: SharedInputs) {
        self.bindings_mut().bind_shared_inputs(shared);
    }

    /// Declare the next input handle.
    fn add_input(&mut self, handle: FeatureHandle) {
        self.bindings_mut().add_input(handle);
    }

    /// Close the input declaration phase.
    fn inputs_done(&mut self) {
        self.bindings_mut().inputs_done();
    }

    /// Bind the next output handle.
    fn bind_output(&mut self, handle: FeatureHandle) {
        self.bindings_mut().bind_output(handle);
    }

    /// Close the output binding phase.
    fn outputs_done(&mut self) {
        self.bindings_mut().outputs_done();
    }

    /// The bound output handles.
    fn outputs(&self) -> &[FeatureHandle] {
        self.bindings().outputs()
    }
}
