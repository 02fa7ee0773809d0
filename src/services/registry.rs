// src/services/registry.rs
//! Registry façade.
//!
//! Composes the issuer allow-list, the credential store and the clock into
//! the operations exposed to callers. The façade holds no state of its own;
//! every read is served from the underlying tables.
//!
//! ## Operations
//! - `register_issuer_address`
//! - `issue_credential`
//! - `get_credential`
//! - `delete_credential`
//! - `check_credential_date_validity`
//! - `get_all_credential_database`
//! - `get_issuer_database_keys`
//! - `get_current_time`
//!
//! Writes take `&mut self` and reads take `&self`, so one writer at a time is
//! enforced at compile time. Hosts sharing a registry across threads wrap it
//! in a `Mutex`.

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result, StorageError};
use crate::models::{Credential, CredentialPayload, DeleteConfirmation};
use crate::services::credential_store::CredentialStore;
use crate::services::issuer_registry::IssuerRegistry;
use crate::storage::{FileMap, MapLimits, MemoryMap, OrderedMap};
use crate::utils::{Clock, RandomSource, SystemClock, ThreadRngSource};
use log::info;
use std::fs;
use std::sync::Arc;

/// File name of the issuer table inside the data directory.
pub const ISSUER_TABLE_FILE: &str = "issuers.sqlite3";
/// File name of the credential table inside the data directory.
pub const CREDENTIAL_TABLE_FILE: &str = "credentials.sqlite3";

/// Verifiable-credential registry.
pub struct Registry {
    issuers: IssuerRegistry,
    credentials: CredentialStore,
    clock: Arc<dyn Clock>,
}

impl Registry {
    /// Wires a registry from explicit tables and collaborators.
    ///
    /// # Arguments
    /// * `issuers` - Table backing the issuer allow-list
    /// * `credentials` - Table backing the credential store
    /// * `clock` - Time source for `dateIssued`, validity and `get_current_time`
    /// * `random` - Entropy for credential ids
    pub fn new(
        issuers: Box<dyn OrderedMap<String, bool>>,
        credentials: Box<dyn OrderedMap<String, Credential>>,
        clock: Arc<dyn Clock>,
        random: Box<dyn RandomSource>,
    ) -> Self {
        Registry {
            issuers: IssuerRegistry::new(issuers),
            credentials: CredentialStore::new(credentials, clock.clone(), random),
            clock,
        }
    }

    /// Ephemeral registry whose tables live only in memory.
    pub fn in_memory(
        issuer_limits: MapLimits,
        credential_limits: MapLimits,
        clock: Arc<dyn Clock>,
        random: Box<dyn RandomSource>,
    ) -> Self {
        Registry::new(
            Box::new(MemoryMap::new(issuer_limits)),
            Box::new(MemoryMap::new(credential_limits)),
            clock,
            random,
        )
    }

    /// Opens the durable tables under `config.data_dir`.
    ///
    /// Creates the directory if needed and reloads any existing tables. Uses
    /// the system clock and the thread-local RNG.
    ///
    /// # Errors
    /// `Storage` if the directory cannot be created or a table cannot be loaded
    pub fn open(config: &RegistryConfig) -> Result<Self> {
        fs::create_dir_all(&config.data_dir).map_err(|source| StorageError::Io {
            path: config.data_dir.clone(),
            source,
        })?;

        let issuers: FileMap<bool> =
            FileMap::open(config.data_dir.join(ISSUER_TABLE_FILE), config.issuer_limits())?;
        let credentials: FileMap<Credential> = FileMap::open(
            config.data_dir.join(CREDENTIAL_TABLE_FILE),
            config.credential_limits(),
        )?;

        info!(
            "opened registry at {} ({} issuers, {} credentials)",
            config.data_dir.display(),
            issuers.len(),
            credentials.len()
        );

        Ok(Registry::new(
            Box::new(issuers),
            Box::new(credentials),
            Arc::new(SystemClock),
            Box::new(ThreadRngSource),
        ))
    }

    /// Adds an issuer to the allow-list and returns its id.
    pub fn register_issuer_address(&mut self, address: &str) -> Result<String> {
        self.issuers.register(address.to_string())
    }

    /// Issues a credential; see [`CredentialStore::issue`].
    pub fn issue_credential(&mut self, payload: CredentialPayload) -> Result<Credential> {
        self.credentials.issue(payload, &self.issuers)
    }

    pub fn get_credential(&self, id: &str) -> Result<Credential> {
        self.credentials.get(id)
    }

    pub fn delete_credential(&mut self, id: &str) -> Result<DeleteConfirmation> {
        self.credentials.delete(id)
    }

    pub fn check_credential_date_validity(&self, id: &str) -> Result<bool> {
        self.credentials.check_validity(id)
    }

    pub fn get_all_credential_database(&self) -> Result<Vec<Credential>> {
        self.credentials.list_all()
    }

    pub fn get_issuer_database_keys(&self) -> Result<Vec<String>> {
        self.issuers.list_keys()
    }

    /// Current clock reading in nanoseconds; clock faults become `RegistryError::Clock`.
    pub fn get_current_time(&self) -> Result<u64> {
        self.clock.now_nanos().map_err(RegistryError::from)
    }

    pub fn is_issuer_registered(&self, address: &str) -> Result<bool> {
        self.issuers.is_registered(address)
    }
}
