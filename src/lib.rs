//! Credit Management API Library
//!
//! Core functionality for the credit-management back office: customer
//! registration and lifecycle, credit issuance against customers, boundary
//! validation and the shared error taxonomy.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `db`: Database connection and pool management.
//! - `errors`: Error taxonomy and HTTP translation.
//! - `handlers`: HTTP request handlers.
//! - `models`: Entities, request DTOs and response views.
//! - `services`: Customer and credit domain services.
//! - `validation`: Boundary field validation.

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod validation;
