// Service exports
pub mod files;
pub mod matching;
pub mod memory;
pub mod postgres;
pub mod repository;
pub mod seed;

pub use matching::{MatchingService, DEFAULT_CATALOG_LIMIT, DEFAULT_MATCH_LIMIT};
pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;
pub use repository::{Repository, RepositoryError};
pub use seed::{load_seed_data, load_seed_file};
