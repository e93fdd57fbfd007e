//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and cache calls into use-case level APIs.
//! - Keep transport layers decoupled from storage and cache details.

pub mod metadata_service;
pub mod notification_service;
pub mod storefront_service;
pub mod view;
