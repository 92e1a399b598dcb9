mod auth;
mod resolve;
mod store;

pub use auth::{email_from_auth, AuthParams};
pub use resolve::resolve_identifier;
pub use store::{CredentialRecord, CredentialStore};
