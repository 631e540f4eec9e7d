//! Offer Billing API Client
//!
//! Async REST client for payment schedule items. Mutations are pre-checked
//! with the lifecycle and permission rules from `offer_billing_core`, sent
//! with bearer authentication, and can be cancelled through a
//! [`RequestScope`].
//!
//! # Architecture
//!
//! - **config**: [`ClientConfig`] from TOML or environment
//! - **transport**: [`Transport`] seam, reqwest and mock implementations
//! - **auth**: session tokens and refresh-on-401
//! - **scope**: cancellation tied to a view's lifetime
//! - **query**: list parameters and response envelopes
//! - **api**: [`PaymentScheduleApi`] endpoint methods
//! - **error**: [`ClientError`] and its HTTP status mapping

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod query;
pub mod scope;
pub mod transport;

pub use api::PaymentScheduleApi;
pub use auth::{AuthenticatedTransport, Session, SessionTokens};
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, ErrorKind};
pub use query::{ItemPage, ListQuery};
pub use scope::RequestScope;
pub use transport::{ApiRequest, ApiResponse, Method, MockTransport, ReqwestTransport, Transport, TransportError};
