//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and pure domain rules into use-cases.
//! - Receive every collaborator through constructors; no global lookup.

pub mod company_service;
pub mod gdpr_service;
pub mod leave_service;
pub mod task_status_service;
pub mod visit_workflow_service;
