//! # API Shared
//!
//! Shared utilities and definitions for the registry's outer surfaces.
//!
//! Contains:
//! - Response bodies that are not patient records (`responses` module)
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and `registry-cli` for common functionality.

pub mod health;
pub mod responses;

pub use health::{HealthRes, HealthService};
pub use responses::{MessageRes, WelcomeRes};
