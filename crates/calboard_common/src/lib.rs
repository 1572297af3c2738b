// --- File: crates/calboard_common/src/lib.rs ---

// Declare modules within this crate
pub mod http; // Shared HTTP client
pub mod logging; // Logging utilities
pub mod services; // Service abstractions for the persistent stores

// Re-export HTTP utilities for easier access
pub use http::HTTP_CLIENT;

// Re-export store abstractions for easier access
pub use services::{
    Credential, CredentialStore, NewProfessional, Professional, ProfessionalDirectory, StoreError,
};
