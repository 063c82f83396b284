//! Helpers shared by the PostgreSQL and MySQL catalog drivers.
//!
//! - [`tls`]: `ssl_mode` parsing and rustls client setup

pub mod tls;

pub use tls::{SslMode, TlsBuilder};
