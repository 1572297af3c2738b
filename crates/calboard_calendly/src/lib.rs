// --- File: crates/calboard_calendly/src/lib.rs ---
// Declare modules within this crate
pub mod aggregator;
pub mod cache;
pub mod error;
pub mod export;
pub mod fetcher;
pub mod handlers;
pub mod models;
pub mod oauth;
pub mod orchestrator;
pub mod routes;
#[cfg(test)]
mod test_support;
