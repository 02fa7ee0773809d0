// src/services/issuer_registry.rs
//! Issuer allow-list.
//!
//! Maps an issuer identifier to a presence marker. The list is append-only:
//! there is no update or removal, and registering the same issuer twice is a
//! caller error rather than a silent no-op.

use crate::error::{RegistryError, Result};
use crate::storage::OrderedMap;
use log::{info, warn};

/// Table of issuers authorized to issue credentials.
pub struct IssuerRegistry {
    /// Issuer id -> `true`; absence means "not an issuer"
    table: Box<dyn OrderedMap<String, bool>>,
}

impl IssuerRegistry {
    pub fn new(table: Box<dyn OrderedMap<String, bool>>) -> Self {
        IssuerRegistry { table }
    }

    pub fn is_registered(&self, issuer: &str) -> Result<bool> {
        Ok(self.table.contains_key(&issuer.to_string())?)
    }

    /// Adds an issuer to the allow-list.
    ///
    /// # Arguments
    /// * `issuer` - Issuer public identifier, stored verbatim
    ///
    /// # Returns
    /// The registered issuer id, unchanged
    ///
    /// # Errors
    /// - `AlreadyRegistered` if the issuer is already on the list
    /// - `Storage` if the table rejects the insert
    pub fn register(&mut self, issuer: String) -> Result<String> {
        if self.is_registered(&issuer)? {
            warn!("rejected duplicate issuer registration for {}", issuer);
            return Err(RegistryError::AlreadyRegistered(format!(
                "Issuer with address {} is already registered",
                issuer
            )));
        }

        self.table.insert(issuer.clone(), true)?;
        info!("registered issuer {}", issuer);
        Ok(issuer)
    }

    /// All registered issuer ids in key order.
    pub fn list_keys(&self) -> Result<Vec<String>> {
        Ok(self.table.keys()?)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
