// src/services/credential_store.rs
//! Credential Store Service
//!
//! Owns the credential table and the rules applied to it:
//! - Issuance is restricted to issuers on the allow-list
//! - The registry, never the caller, assigns `id` and `dateIssued`
//! - Records are immutable once stored; the only mutation is delete
//! - Validity is computed on read and never expires records

use crate::error::{RegistryError, Result, StorageError};
use crate::models::{Credential, CredentialPayload, DeleteConfirmation};
use crate::services::issuer_registry::IssuerRegistry;
use crate::storage::OrderedMap;
use crate::utils::{credential_id, Clock, RandomSource};
use log::{debug, info, warn};
use std::sync::Arc;

/// Draws allowed before giving up on finding an unused id.
const MAX_ID_ATTEMPTS: usize = 8;

/// Storage and lifecycle rules for issued credentials.
pub struct CredentialStore {
    /// Credential id -> full record
    table: Box<dyn OrderedMap<String, Credential>>,
    /// Shared with the façade for `get_current_time`
    clock: Arc<dyn Clock>,
    random: Box<dyn RandomSource>,
}

/// Rejects empty and whitespace-only ids before any storage access.
fn require_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(RegistryError::InvalidInput(
            "credential id is required".to_string(),
        ));
    }
    Ok(())
}

fn not_found(id: &str) -> RegistryError {
    RegistryError::NotFound(format!("Credential with id {} not found", id))
}

/// Structural checks on a payload. Descriptive fields stay opaque.
fn validate_payload(payload: &CredentialPayload) -> Result<()> {
    if payload.valid_time == 0 {
        return Err(RegistryError::Validation(
            "validTime must be a positive number of nanoseconds".to_string(),
        ));
    }
    Ok(())
}

impl CredentialStore {
    pub fn new(
        table: Box<dyn OrderedMap<String, Credential>>,
        clock: Arc<dyn Clock>,
        random: Box<dyn RandomSource>,
    ) -> Self {
        CredentialStore {
            table,
            clock,
            random,
        }
    }

    /// Issues a credential under a registered issuer.
    ///
    /// # Arguments
    /// * `payload` - Caller-supplied credential fields
    /// * `issuers` - Allow-list consulted for `payload.issuer`
    ///
    /// # Returns
    /// The record exactly as stored
    ///
    /// # Process Flow
    /// 1. Rejects issuers missing from the allow-list (`NotAuthorized`)
    /// 2. Validates the payload (`Validation`)
    /// 3. Generates an id not already present in the table
    /// 4. Stamps `dateIssued` from the clock
    /// 5. Inserts the record; storage failures are returned, not retried
    pub fn issue(
        &mut self,
        payload: CredentialPayload,
        issuers: &IssuerRegistry,
    ) -> Result<Credential> {
        if !issuers.is_registered(&payload.issuer)? {
            warn!("rejected credential from unregistered issuer {}", payload.issuer);
            return Err(RegistryError::NotAuthorized(format!(
                "Issuer with address {} is not registered",
                payload.issuer
            )));
        }

        validate_payload(&payload)?;

        let id = self.fresh_id()?;
        let date_issued = self.clock.now_nanos()?;
        let credential = Credential::issue(id, date_issued, payload);

        self.table.insert(credential.id.clone(), credential.clone())?;
        info!(
            "issued credential {} for issuer {}",
            credential.id, credential.issuer
        );
        Ok(credential)
    }

    fn fresh_id(&mut self) -> Result<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = credential_id(self.random.next_u128());
            if !self.table.contains_key(&id)? {
                return Ok(id);
            }
            warn!("generated credential id {} already in use, drawing again", id);
        }
        Err(StorageError::IdCollision {
            attempts: MAX_ID_ATTEMPTS,
        }
        .into())
    }

    pub fn get(&self, id: &str) -> Result<Credential> {
        require_id(id)?;
        debug!("looking up credential {}", id);
        self.table.get(&id.to_string())?.ok_or_else(|| not_found(id))
    }

    /// Deletes a credential by id.
    ///
    /// No ownership check is made: anyone who knows the id may delete it.
    ///
    /// # Errors
    /// - `InvalidInput` for an empty or whitespace-only id
    /// - `NotFound` if no credential has this id
    pub fn delete(&mut self, id: &str) -> Result<DeleteConfirmation> {
        require_id(id)?;
        let key = id.to_string();

        if !self.table.contains_key(&key)? {
            warn!("delete requested for unknown credential {}", id);
            return Err(not_found(id));
        }

        self.table.remove(&key)?;
        info!("deleted credential {}", id);
        Ok(DeleteConfirmation { id: key })
    }

    /// Reports whether the credential is still inside its validity window.
    ///
    /// Pure read: an expired credential stays stored and retrievable.
    pub fn check_validity(&self, id: &str) -> Result<bool> {
        let credential = self
            .table
            .get(&id.to_string())?
            .ok_or_else(|| not_found(id))?;
        let now = self.clock.now_nanos()?;
        Ok(credential.is_valid_at(now))
    }

    /// Every stored credential in id order.
    pub fn list_all(&self) -> Result<Vec<Credential>> {
        Ok(self.table.values()?)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
