//! AquaWell Lead Capture API Library
//!
//! This library provides the lead intake backend for the AquaWell water
//! treatment site: schema validation of inquiry submissions, a document store
//! adapter, the lead service that ties the two together, and the HTTP
//! handlers, including the static FAQ and authority content.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `content`: Static FAQ and authority content.
//! - `db`: Document store adapter (PostgreSQL and in-memory backends).
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and router.
//! - `health`: Store diagnostics for the health check.
//! - `models`: Lead schema and response models.
//! - `services`: Lead intake service.
//! - `validation`: Lead schema validation.

pub mod config;
pub mod content;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod models;
pub mod services;
pub mod validation;
