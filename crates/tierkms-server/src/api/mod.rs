//! HTTP interface.
//!
//! | route | success | failures |
//! |---|---|---|
//! | `POST /api/v1/wrap/{tier}` | `200 {"key": b64}` | 400 |
//! | `POST /api/v1/unwrap/{tier}` | `200 {"key": b64}` | 400, 403, 422 |
//! | `GET /health` | `200 {"status": "ok"}` | |
//!
//! The unwrap credential travels in the [`CREDENTIAL_HEADER`] header.

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod types;

pub use router::{build_router, serve};
pub use types::{ErrorBody, KeyBody};

pub const API_PREFIX: &str = "/api/v1";
pub const CREDENTIAL_HEADER: &str = "x-api-key";
