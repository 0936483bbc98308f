//! HTTP API: router, access-control middleware and handlers.

pub mod app;
pub mod context;
pub mod middleware;
