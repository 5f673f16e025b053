// Library root: re-exports all modules so the command-line front end and the
// integration tests can reach the crate's public API.

pub mod config;
pub mod data;
pub mod draft;
pub mod report;
pub mod rules;
pub mod score;
pub mod simulation;
pub mod strategy;
