//! services/api/src/lib.rs
//!
//! The HTTP service around `ride_share_core`: configuration, storage and push
//! adapters, and the axum web layer.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
