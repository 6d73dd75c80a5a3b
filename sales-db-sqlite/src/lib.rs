//! SQLite storage for the sales core.
//!
//! Amounts are kept in TEXT columns and parsed back into exact decimals.

pub mod decimal;
pub mod factory;
pub mod repository;
mod rows;

pub use factory::SqliteRepositoryFactory;
pub use repository::SqliteRepository;
