//! SQLite persistence for Calboard
//!
//! Implements the `CredentialStore` and `ProfessionalDirectory` traits from
//! `calboard-common` on top of an SQLx SQLite pool.

pub mod client;
pub mod credentials;
pub mod professionals;

pub use client::DbClient;
pub use credentials::SqlCredentialStore;
pub use professionals::SqlProfessionalDirectory;
