//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep HTTP and CLI layers decoupled from storage details.

pub mod account_service;
pub mod bootstrap;
pub mod suggestion_service;
