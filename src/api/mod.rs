//! HTTP API.
//!
//! Exposes the scheduling engine as HTTP endpoints for the booking
//! frontends. Routes are nested under `/api/` and, apart from the health
//! check and registration, protected by bearer token auth.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod types;

pub use router::api_router;
pub use types::ApiContext;
