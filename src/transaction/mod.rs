//! Everything related to the transactions a viewer can see:
//! - The `Transaction` model and `TransactionBuilder` for recording transactions
//! - The role-scoped query and the store it runs against
//! - Summary statistics, charts and the table filters
//! - The page, table partial and CSV export handlers

mod charts;
mod export;
mod filter;
mod models;
mod page;
mod query;
mod stats;
mod store;
mod view;

#[cfg(test)]
mod test_utils;

pub use export::export_transactions;
pub use models::{Transaction, TransactionBuilder, TransactionStatus, TransactionType};
pub use page::{TransactionsPageState, get_transactions_page, get_transactions_table};
pub use store::{
    SQLiteTransactionStore, TransactionStore, create_transaction, create_transaction_table,
};
