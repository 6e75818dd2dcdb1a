//! MyWater Toronto account client library.
//!
//! Validates customer credentials against the City of Toronto water account
//! API, then retrieves account, premise and meter metadata.
//!
//! # Modules
//!
//! - `account`: The validated account aggregate (`WaterAccount`).
//! - `client`: HTTP client for the validate, account details and consumption endpoints.
//! - `config`: Client configuration (base URL, timeout) and env loading.
//! - `errors`: Error types.
//! - `models`: Credentials, premises and meters.
//! - `wire_models`: Request/response JSON shapes.

pub mod account;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod wire_models;

pub use account::WaterAccount;
pub use client::WaterApiClient;
pub use config::ClientConfig;
pub use errors::ClientError;
pub use models::{Credentials, LastPaymentMethod, Meter, Premise, RefToken};
