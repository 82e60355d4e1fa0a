pub mod transaction;
pub mod wallet;

pub use transaction::TransactionRecord;
pub use wallet::{OperationType, Wallet, WalletOperation};
