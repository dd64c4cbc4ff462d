//! HTTP API: configuration, session gate, and request/response mapping.

pub mod accounts;
pub mod app;
pub mod config;
pub mod context;
pub mod cookies;
pub mod middleware;
