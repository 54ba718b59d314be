//! Google Sheets integration: OAuth client acquisition, the readiness gate guarding the
//! authorized client, and the `values:append` client itself.

mod authorizer;
mod client;
mod endpoints;
mod gate;
mod secret;
mod token;

pub use authorizer::SheetsAuthorizer;
pub use client::SheetsClient;
pub use gate::{AuthPhase, GateSnapshot, ReadinessGate};
pub use secret::OauthClientSecret;
pub use token::{StoredToken, TokenFile};
