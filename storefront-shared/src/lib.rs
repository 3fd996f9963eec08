//! # Storefront Shared Library
//!
//! This crate contains the domain types, persistence and business rules used by
//! the Storefront API server.
//!
//! ## Module Organization
//!
//! - `auth`: Token issuance, password hashing, request identity and ownership predicates
//! - `db`: Connection pool and migrations
//! - `models`: Database models (users, products, orders)
//! - `services`: Identity, catalog and order operations
//! - `validation`: Field error maps and lenient numeric coercion
//! - `views`: Wire projections returned to clients

pub mod auth;
pub mod db;
pub mod models;
pub mod services;
pub mod validation;
pub mod views;

/// Current version of the Storefront shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
