pub mod credential;

pub use credential::{Credential, CredentialPayload, DeleteConfirmation};
