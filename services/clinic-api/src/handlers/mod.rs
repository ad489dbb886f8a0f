//! REST API handlers

pub mod clinics;
pub mod collaborators;
pub mod health;
pub mod invoices;
pub mod shared;

pub use clinics::*;
pub use collaborators::*;
pub use health::*;
pub use invoices::*;
