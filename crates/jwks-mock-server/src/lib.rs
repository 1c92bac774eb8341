//! # jwks-mock-server
//!
//! HTTP API for the jwks-mock development token service.
//!
//! ## Endpoints
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | GET | `/.well-known/jwks.json` | Public keys as a JWKS |
//! | POST | `/generate-token` | Issue a signed token |
//! | POST | `/generate-invalid-token` | Issue a token that fails verification |
//! | POST | `/introspect` | RFC 7662 token introspection |
//! | GET | `/keys` | List key IDs |
//! | POST | `/keys` | Add a key |
//! | DELETE | `/keys/{kid}` | Remove a key |
//! | GET | `/health` | Liveness and key IDs |
//!
//! Every response carries permissive CORS headers.

pub mod api_types;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, ServerError};
pub use routes::create_router;
pub use server::JwksServer;
pub use state::AppState;
