pub mod memory_wallet_repository;
pub mod postgres_wallet_repository;

pub use memory_wallet_repository::{Fault, InMemoryWalletRepository};
pub use postgres_wallet_repository::PostgresWalletRepository;
