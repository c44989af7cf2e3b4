//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate generator, repository and export calls into use-case APIs.
//! - Keep the CLI decoupled from storage details.

pub mod employee_service;
