//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate matching, selection state and host collaborators into the
//!   two shop-floor use-cases: scan resolution and process registration.
//! - Keep UI/FFI layers decoupled from matching and storage details.

pub mod registration;
pub mod scan;
