//! VetDesk DB - Database abstractions
//!
//! SQLx-based database layer for VetDesk services.
//!
//! # Example
//!
//! ```rust,ignore
//! use vetdesk_db::{create_pool, Repositories};
//!
//! let pool = create_pool("postgres://localhost/vetdesk").await?;
//! let repos = Repositories::new(pool);
//!
//! let clinic = repos.clinics.find_by_id(clinic_id).await?;
//! ```

pub mod error;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use models::*;
pub use pg::Repositories;
pub use pool::{create_pool, create_pool_with_options, run_migrations, DbPool, PoolOptions};
pub use repo::*;
