//! Domain model for the ERP business modules.
//!
//! # Responsibility
//! - Define canonical records used by repositories, services and workflows.
//! - Keep per-record validation next to the record it protects.
//!
//! # Invariants
//! - Every persisted record is identified by a stable UUID.
//! - Enumerated fields are closed enums; storage codes live in the repo layer.

pub mod calendar;
pub mod company;
pub mod gdpr;
pub mod leave;
pub mod project;
pub mod settings;
pub mod visit;
