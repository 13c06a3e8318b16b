//! TQA: Tessera Quality Assistant
//!
//! Turns free-form quality statements into structured records and standard
//! SPC artifacts: Pareto breakdowns, control charts, capability indices,
//! distribution statistics, and fishbone cause breakdowns.

pub mod analysis;
pub mod cli;
pub mod core;
pub mod entities;
pub mod extract;
pub mod tools;
pub mod validation;
