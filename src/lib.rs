//! Domain-Masking Reverse Proxy Library

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;

pub use config::schema::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
