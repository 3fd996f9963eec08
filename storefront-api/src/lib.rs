//! # Storefront API Server Library
//!
//! HTTP surface of the storefront: JSON endpoints for shoppers and vendors
//! over the services in `storefront-shared`.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder and bearer authentication
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: JSON body extractor reporting through `ApiError`
//! - `middleware`: Security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
