// src/lib.rs

//! # Verifiable Credential Registry
//!
//! A minimal registry where whitelisted issuers write credential records and
//! any caller can read them, check their time-based validity, and enumerate
//! issuers or credentials.
//!
//! ## Architecture Overview
//! 1. **Storage Layer**: `OrderedMap` tables, in memory or persisted to disk
//! 2. **Services Layer**: issuer allow-list, credential store, and the `Registry` façade
//! 3. **Models**: credential records and payloads
//! 4. **Utils**: clock and randomness collaborators supplied by the host
//!
//! ## Example
//! ```
//! use std::sync::Arc;
//! use vc_registry::{CredentialPayload, ManualClock, MapLimits, Registry, ThreadRngSource};
//!
//! let clock = ManualClock::new(1_000);
//! let mut registry = Registry::in_memory(
//!     MapLimits::unbounded(),
//!     MapLimits::unbounded(),
//!     Arc::new(clock.clone()),
//!     Box::new(ThreadRngSource),
//! );
//!
//! registry.register_issuer_address("iss1").unwrap();
//! let credential = registry
//!     .issue_credential(CredentialPayload {
//!         issuer: "iss1".to_string(),
//!         valid_time: 1_000,
//!         credential_type: "KYC".to_string(),
//!         body: "{}".to_string(),
//!         standard: "v1".to_string(),
//!         title: "t".to_string(),
//!         identity_holder: "h1".to_string(),
//!     })
//!     .unwrap();
//!
//! assert!(registry.check_credential_date_validity(&credential.id).unwrap());
//! clock.advance(1_001);
//! assert!(!registry.check_credential_date_validity(&credential.id).unwrap());
//! ```

pub mod config;    // Table sizing and data directory
pub mod error;     // Error types
pub mod models;    // Data structures
pub mod services;  // Registry business rules
pub mod storage;   // Ordered key/value tables
pub mod utils;     // Host collaborators

pub use config::RegistryConfig;
pub use error::{ClockError, ConfigError, RegistryError, Result, StorageError};
pub use models::{Credential, CredentialPayload, DeleteConfirmation};
pub use services::{CredentialStore, IssuerRegistry, Registry};
pub use storage::{FileMap, MapLimits, MemoryMap, OrderedMap};
pub use utils::{Clock, FixedRandomSource, ManualClock, RandomSource, SystemClock, ThreadRngSource};
