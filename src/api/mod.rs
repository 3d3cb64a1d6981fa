//! HTTP API for the lab front desk and admin screens.
//!
//! Routes are nested under `/api/`. Everything except the health check and
//! login sits behind the middleware stack: Auth → Audit → Handler.
//!
//! `api_router()` returns a plain `Router` so tests can drive it with
//! `oneshot` and `server` can mount it on a listener.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_api_server, ApiServer};
pub use types::ApiContext;
