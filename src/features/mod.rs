//! Builtin feature catalog.
//!
//! Every feature type here conforms to the [`Blueprint`] plugin contract;
//! the framework itself depends only on that contract, never on the
//! feature-specific logic below.
//!
//! [`Blueprint`]: crate::blueprint::Blueprint

pub mod double;
pub mod matches;
pub mod sum;
pub mod value;

use crate::blueprint::BlueprintFactory;

/// Register every builtin feature type in `factory`.
pub fn register_builtin_features(factory: &mut BlueprintFactory) {
    factory.add_prototype(Box::new(value::ValueBlueprint::new()));
    factory.add_prototype(Box::new(double::DoubleBlueprint::new()));
    factory.add_prototype(Box::new(sum::SumBlueprint::new()));
    factory.add_prototype(Box::new(matches::MatchesBlueprint::new()));
}
