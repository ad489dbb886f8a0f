//! VetDesk Types - Shared domain types
//!
//! This crate contains domain types used across VetDesk services:
//! - Clinic (tenant) identity
//! - Subscription status and trial windows
//! - Invoice numbering
//! - Collaborator roles and permissions

pub mod clinic;
pub mod error;
pub mod invoice;
pub mod role;
pub mod subscription;

pub use clinic::*;
pub use error::*;
pub use invoice::*;
pub use role::*;
pub use subscription::*;
