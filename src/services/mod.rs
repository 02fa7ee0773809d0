pub mod credential_store;
pub mod issuer_registry;
pub mod registry;

pub use credential_store::CredentialStore;
pub use issuer_registry::IssuerRegistry;
pub use registry::Registry;
