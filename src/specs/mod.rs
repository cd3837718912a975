// src/specs/mod.rs
//! # Flagging “specs” module
//!
//! This module hosts the **domain-specific rule sets** the classifier engine
//! runs with. Each spec focuses on one kind of incident and encodes *which
//! vocabulary signals it* and *which known boilerplate must not*.
//!
//! ## What lives here
//! - **Rule vocabularies** per domain (`air_transport`, `extreme_temperatures`),
//!   as ordered positive and negative `RuleSpec` lists.
//! - **Shared false-positive patterns** (e.g. the "no responsible adult"
//!   sentence APHIS writes when nobody was available for the inspection).
//! - **Rule files**: extra domains loaded from TOML with the same shape.
//!
//! ## What does **not** live here
//! - **Evaluation control flow** – that is `engine::Classifier`, one loop for
//!   every domain.
//! - **Table handling** – adding flag columns to a dataset is `classify`.
//!
//! ## Rule file format
//! ```toml
//! name = "dog_bites"
//! flag_column = "dog_bite_flag"
//!
//! [[positive]]
//! name = "bite_terms"
//! pattern = '\b(bit|bitten|bite)\b'
//!
//! [[negative]]
//! name = "no_adult"
//! pattern = 'a responsible adult was not available to accompany aphis officials'
//! ```
//! An optional `exclude` pattern on a rule vetoes matches starting where it
//! also matches. Patterns run against lowercased, single-spaced text.
//!
//! In short: **`specs` knows what to look for.** The engine decides how.

pub mod air_transport;
pub mod extreme_temperatures;

use std::path::Path;

use crate::engine::{Classifier, RuleSet, RuleSetSpec};
use crate::error::{Error, Result};

/// Boilerplate written when no caretaker met the inspectors; it mentions
/// transport and temperature terms without describing an incident.
pub const NO_ADULT: &str = "a responsible adult was not available to accompany aphis officials";

/// Built-in domains, in the order `flag --all` runs them.
pub const BUILTIN: &[&str] = &[air_transport::NAME, extreme_temperatures::NAME];

pub fn builtin(name: &str) -> Result<RuleSetSpec> {
    match name {
        air_transport::NAME => Ok(air_transport::spec()),
        extreme_temperatures::NAME => Ok(extreme_temperatures::spec()),
        other => Err(Error::UnknownDomain(s!(other))),
    }
}

pub fn parse_rule_file(path: &Path, text: &str) -> Result<RuleSetSpec> {
    toml::from_str(text).map_err(|source| Error::RuleFile { path: path.to_path_buf(), source })
}

pub fn load_rule_file(path: &Path) -> Result<RuleSetSpec> {
    let text = crate::store::read_text(path)?;
    parse_rule_file(path, &text)
}

/// Compile the selected built-in domains followed by any rule files.
pub fn classifiers(domains: &[String], rule_files: &[impl AsRef<Path>]) -> Result<Vec<Classifier>> {
    let mut specs = domains.iter().map(|d| builtin(d)).collect::<Result<Vec<_>>>()?;
    for path in rule_files {
        specs.push(load_rule_file(path.as_ref())?);
    }
    specs
        .iter()
        .map(|spec| RuleSet::compile(spec).map(Classifier::new))
        .collect()
}
