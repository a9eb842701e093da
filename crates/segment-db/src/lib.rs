//! # segment-db
//!
//! Database layer implementing the repository traits of `segment-core`.
//!
//! ## Overview
//!
//! - Connection pool management and schema migrations
//! - Database models with SQLx `FromRow` derives
//! - Model → entity mappers
//! - PostgreSQL repository implementations
//! - [`MemoryStore`], an in-process implementation of the same traits
//!
//! ## Usage
//!
//! ```rust,ignore
//! use segment_db::pool::{create_pool, run_migrations, DatabaseConfig};
//! use segment_db::repositories::PgSegmentRepository;
//! use segment_core::traits::SegmentRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env();
//!     let pool = create_pool(&config).await?;
//!     run_migrations(&pool, "./migrations").await?;
//!     let segments = PgSegmentRepository::new(pool);
//!     let promo = segments.create("PROMO").await?;
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::MemoryStore;
pub use pool::{create_pool, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{PgReportRepository, PgSegmentRepository, PgUserRepository};
