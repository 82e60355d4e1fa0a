pub mod balance_guard;
pub mod wallet_service;

pub use balance_guard::{BalanceGuard, WalletLease};
pub use wallet_service::WalletService;
