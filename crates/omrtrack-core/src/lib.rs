//! omrtrack-core — bubble-sheet test builder, scoring engine, and study history.
//!
//! This crate defines the data model, the deterministic test builder, the
//! pure scoring engine, the owned session state machine with its countdown,
//! and the append-only history store that the CLI builds on.

pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod model;
pub mod parser;
pub mod profile;
pub mod progress;
pub mod report;
pub mod results;
pub mod session;
pub mod statistics;
pub mod timer;

pub use error::CoreError;
