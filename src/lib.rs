// src/lib.rs
// #![allow(dead_code)]
// #![allow(unused)]

#[macro_use]
pub mod macros;
#[macro_use]
pub mod log;

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod specs;

pub mod append;
pub mod classify;
pub mod csv;
pub mod diff;
pub mod engine;
pub mod file;
pub mod progress;
pub mod runner;
pub mod store;

pub use error::{Error, Result};
