//! Summary statistics for the stat cards.

use super::models::{Transaction, TransactionStatus};

/// Summary numbers over the transactions a viewer can see.
///
/// Computed from the role-scoped fetch, never from the filtered table rows.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Stats {
    /// How many transactions there are.
    pub total_transactions: usize,
    /// The sum of every transaction amount.
    pub total_amount: f64,
    /// The percentage (0 to 100) of transactions that completed.
    ///
    /// Zero when there are no transactions.
    pub success_rate: f64,
    /// The sum of the amounts of pending transactions.
    pub pending_amount: f64,
}

/// Reduce `transactions` to [Stats].
///
/// No rounding is done here, that is left to the views.
pub fn calculate_stats(transactions: &[Transaction]) -> Stats {
    let total_transactions = transactions.len();
    let mut total_amount = 0.0;
    let mut pending_amount = 0.0;
    let mut completed_count = 0;

    for transaction in transactions {
        total_amount += transaction.amount;

        match transaction.status {
            TransactionStatus::Completed => completed_count += 1,
            TransactionStatus::Pending => pending_amount += transaction.amount,
            TransactionStatus::Failed => {}
        }
    }

    let success_rate = if total_transactions == 0 {
        0.0
    } else {
        100.0 * completed_count as f64 / total_transactions as f64
    };

    Stats {
        total_transactions,
        total_amount,
        success_rate,
        pending_amount,
    }
}
