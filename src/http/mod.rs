//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → server.rs (Axum setup, dispatch)
//!     → context.rs (capture client-facing scheme + host)
//!     → request.rs (rewrite toward the origin)
//!     → [origin call]
//!     → response.rs (rebuild headers, extract cookies)
//!     → cookies.rs (per-cookie attribute rewrite)
//!     → body.rs (textual rewrite or binary pass-through)
//!     → send to client
//! ```

pub mod body;
pub mod context;
pub mod cookies;
pub mod request;
pub mod response;
pub mod server;

pub use context::RequestContext;
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
