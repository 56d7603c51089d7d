//! Birth-death simulation of phylogenetic trees with discrete character evolution.

pub mod args;
pub mod config;
pub mod core;
pub mod errors;
pub mod labels;
pub mod readwrite;
pub mod runner;
pub mod simulation;
