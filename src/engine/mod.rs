// src/engine/mod.rs

pub mod engine;
pub mod types;

pub use engine::Classifier;
pub use types::{Classification, Rule, RuleSet, RuleSetSpec, RuleSpec};
