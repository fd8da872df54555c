//! # Glaive
//!
//! A compiled-dataflow feature execution framework for search ranking.
//!
//! Named feature expressions (e.g. `mysum(value(1),value(2))`) compile into
//! a topologically ordered graph of executors that read and write a shared
//! per-document value buffer, addressed by stable integer handles.
//!
//! ## Features
//!
//! - Pure Rust implementation
//! - Pluggable feature types via the blueprint contract
//! - Shared compilation of identical sub-expressions
//! - Caller-supplied output overrides for debugging and validation tooling
//! - One buffer per evaluation context; reusable across documents

pub mod blueprint;
pub mod environment;
pub mod error;
pub mod executor;
pub mod feature_name;
pub mod features;
pub mod match_data;
pub mod overrider;
pub mod program;
pub mod properties;
pub mod replica;

pub mod prelude {
    //! Convenient re-exports for typical embedders.

    pub use crate::blueprint::{Blueprint, BlueprintFactory, FeatureDeclarations};
    pub use crate::environment::{
        IndexEnvironment, QueryEnvironment, SimpleIndexEnvironment, SimpleQueryEnvironment,
    };
    pub use crate::error::{GlaiveError, Result};
    pub use crate::executor::{ExecutorBindings, FeatureExecutor, SharedInputs};
    pub use crate::feature_name::FeatureName;
    pub use crate::match_data::{
        FeatureHandle, FeatureValue, MatchData, MatchDataLayout, TermFieldHandle,
    };
    pub use crate::overrider::FeatureOverrider;
    pub use crate::program::{RankProgram, RankSetup};
    pub use crate::properties::Properties;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
