//! metrotube - video metadata retrieval engine.
//!
//! Core library exposing the session store, configuration, content model and
//! HTTP client shared by the workspace crates.

pub mod config;
pub mod http_client;
pub mod models;
pub mod session;
