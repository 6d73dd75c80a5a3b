pub mod factory;
pub mod memory;
pub mod repository;
pub mod sample_data;

pub use factory::{DbConfig, MemoryRepositoryFactory, RepositoryFactory, RepositoryRegistry};
pub use memory::MemoryRepository;
pub use repository::{RepositoryError, SalesRepository};
