//! HTTP surface.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace + timeout layers)
//!     → Monitor::verdict (computed on demand)
//!     → 200 "healthy" | 503 "<reason>"
//! ```

pub mod server;

pub use server::VerdictServer;
