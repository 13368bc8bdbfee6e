//! Builders for in-memory transactions used by the transaction tests.

use time::macros::datetime;

use super::{Transaction, TransactionStatus, TransactionType};

/// A completed transaction of `transaction_type` with no participants or listing.
pub(crate) fn transaction(transaction_type: TransactionType, description: &str) -> Transaction {
    Transaction {
        id: 0,
        transaction_type,
        amount: 100.0,
        status: TransactionStatus::Completed,
        description: description.to_owned(),
        buyer_id: None,
        buyer_name: None,
        seller_id: None,
        seller_name: None,
        property_id: None,
        property_title: None,
        created_at: datetime!(2025-10-01 12:00 UTC),
    }
}
