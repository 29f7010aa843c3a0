//! service-core: Shared infrastructure for the menu advisor services.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
