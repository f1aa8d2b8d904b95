//! Domain layer for VLF field reports
//!
//! Models for the report payload, slot keys and template identifiers, the
//! pure services that derive them, and the repository traits implemented by
//! the infrastructure crate.

pub mod model;
pub mod repository;
pub mod service;
