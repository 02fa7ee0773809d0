// src/models/credential.rs
//! Credential data model.
//!
//! A [`Credential`] is the stored, immutable record. Callers never build one
//! directly: they submit a [`CredentialPayload`] and the registry assembles
//! the record, filling in the generated `id` and the `dateIssued` timestamp.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller-supplied fields of a credential to be issued.
///
/// Every field except `valid_time` is opaque to the registry and stored as
/// given.
///
/// # Fields
/// - `issuer`: identifier of the issuing party, must be registered
/// - `valid_time`: validity window in nanoseconds, must be positive
/// - `credential_type`: descriptive type, e.g. "KYC" (serialized as `type`)
/// - `body`: structured payload, usually a JSON document
/// - `standard`: custom name or link to the credential standard
/// - `title`: human-readable title
/// - `identity_holder`: identifier of the subject the credential is about
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPayload {
    pub issuer: String,
    pub valid_time: u64,
    #[serde(rename = "type")]
    pub credential_type: String,
    pub body: String,
    pub standard: String,
    pub title: String,
    pub identity_holder: String,
}

/// An issued credential as held in the credential table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Generated identifier, also the table key.
    /// Example: "3f0b8f5e-6a8e-4c2b-9d7a-0c1e2f3a4b5c"
    pub id: String,

    /// Registered issuer at the time of issuance
    pub issuer: String,

    pub identity_holder: String,

    pub body: String,

    pub title: String,

    pub standard: String,

    #[serde(rename = "type")]
    pub credential_type: String,

    /// Nanosecond timestamp stamped by the registry clock
    pub date_issued: u64,

    /// Validity window in nanoseconds, counted from `date_issued`
    pub valid_time: u64,
}

impl Credential {
    /// Assembles a stored record from a payload and the registry-owned fields.
    ///
    /// # Arguments
    /// * `id` - Freshly generated credential id
    /// * `date_issued` - Current time from the registry clock
    /// * `payload` - Caller fields, moved into the record unchanged
    pub(crate) fn issue(id: String, date_issued: u64, payload: CredentialPayload) -> Self {
        let CredentialPayload {
            issuer,
            valid_time,
            credential_type,
            body,
            standard,
            title,
            identity_holder,
        } = payload;

        Credential {
            id,
            issuer,
            identity_holder,
            body,
            title,
            standard,
            credential_type,
            date_issued,
            valid_time,
        }
    }

    /// Returns `true` while `now` is within the validity window.
    ///
    /// A clock reading earlier than `date_issued` counts as zero elapsed time.
    pub fn is_valid_at(&self, now: u64) -> bool {
        now.saturating_sub(self.date_issued) <= self.valid_time
    }
}

/// Acknowledgement returned by a successful delete.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    pub id: String,
}

impl fmt::Display for DeleteConfirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential with id {} successfully deleted", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload() -> CredentialPayload {
        CredentialPayload {
            issuer: "iss1".to_string(),
            valid_time: 1000,
            credential_type: "KYC".to_string(),
            body: "{}".to_string(),
            standard: "v1".to_string(),
            title: "t".to_string(),
            identity_holder: "h1".to_string(),
        }
    }

    #[test]
    fn test_issue_copies_payload_fields() {
        let credential = Credential::issue("id-1".to_string(), 42, sample_payload());

        assert_eq!(credential.id, "id-1");
        assert_eq!(credential.date_issued, 42);
        assert_eq!(credential.issuer, "iss1");
        assert_eq!(credential.identity_holder, "h1");
        assert_eq!(credential.credential_type, "KYC");
        assert_eq!(credential.valid_time, 1000);
    }

    #[test]
    fn test_validity_window_boundaries() {
        let credential = Credential::issue("id-1".to_string(), 5_000, sample_payload());

        assert!(credential.is_valid_at(5_000));
        assert!(credential.is_valid_at(6_000));
        assert!(!credential.is_valid_at(6_001));
        // clock behind the issue timestamp
        assert!(credential.is_valid_at(10));
    }

    #[test]
    fn test_serializes_with_camel_case_field_names() {
        let credential = Credential::issue("id-1".to_string(), 7, sample_payload());
        let json = serde_json::to_value(&credential).unwrap();

        assert_eq!(json["type"], "KYC");
        assert_eq!(json["identityHolder"], "h1");
        assert_eq!(json["dateIssued"], 7);
        assert_eq!(json["validTime"], 1000);
    }

    #[test]
    fn test_payload_rejects_negative_valid_time() {
        let raw = r#"{"issuer":"iss1","validTime":-1,"type":"KYC","body":"{}",
                      "standard":"v1","title":"t","identityHolder":"h1"}"#;
        assert!(serde_json::from_str::<CredentialPayload>(raw).is_err());
    }

    #[test]
    fn test_delete_confirmation_names_id() {
        let confirmation = DeleteConfirmation { id: "abc".to_string() };
        assert_eq!(confirmation.to_string(), "Credential with id abc successfully deleted");
    }
}
