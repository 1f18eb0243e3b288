//! Morphcalc -- Self-Rewriting Calculator
//!
//! A terminal calculator that can replace its own tracked source file with
//! a model-generated rewrite, keep versioned backups of every prior state,
//! and restore any of them.

pub mod types;
pub mod config;
pub mod calc;
pub mod codegen;
pub mod self_update;
pub mod restart;
pub mod prompts;
