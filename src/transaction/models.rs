//! The transaction record and its enumerations.

use std::{fmt::Display, str::FromStr};

use time::OffsetDateTime;

use crate::{Error, viewer::UserId};

/// The ID the store assigns to a transaction.
pub type TransactionId = i64;

/// What kind of money movement a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionType {
    /// A buyer paid a seller.
    Payment,
    /// Money was returned to a buyer.
    Refund,
    /// The marketplace's cut of a sale.
    Commission,
    /// A seller moved their balance out of the marketplace.
    Withdrawal,
}

impl TransactionType {
    /// Every transaction type in display order.
    pub const ALL: [TransactionType; 4] = [
        TransactionType::Payment,
        TransactionType::Refund,
        TransactionType::Commission,
        TransactionType::Withdrawal,
    ];

    /// The name used in the store and in query strings.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Payment => "payment",
            TransactionType::Refund => "refund",
            TransactionType::Commission => "commission",
            TransactionType::Withdrawal => "withdrawal",
        }
    }

    /// The name shown to users.
    pub fn label(self) -> &'static str {
        match self {
            TransactionType::Payment => "Payment",
            TransactionType::Refund => "Refund",
            TransactionType::Commission => "Commission",
            TransactionType::Withdrawal => "Withdrawal",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransactionType::ALL
            .into_iter()
            .find(|transaction_type| transaction_type.as_str() == s)
            .ok_or_else(|| Error::InvalidTransactionType(s.to_owned()))
    }
}

/// Where a transaction is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionStatus {
    /// The money has moved.
    Completed,
    /// The money has not moved yet.
    Pending,
    /// The money will not move.
    Failed,
}

impl TransactionStatus {
    /// The name used in the store.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::Completed => "completed",
            TransactionStatus::Pending => "pending",
            TransactionStatus::Failed => "failed",
        }
    }

    /// The name shown to users.
    pub fn label(self) -> &'static str {
        match self {
            TransactionStatus::Completed => "Completed",
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Failed => "Failed",
        }
    }
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(TransactionStatus::Completed),
            "pending" => Ok(TransactionStatus::Pending),
            "failed" => Ok(TransactionStatus::Failed),
            other => Err(Error::InvalidTransactionStatus(other.to_owned())),
        }
    }
}

/// A movement of money between a buyer, a seller and the marketplace.
///
/// Transactions are owned by the store, the dashboard only reads them. To
/// create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// What kind of money movement this is.
    pub transaction_type: TransactionType,
    /// How much money moved, in SAR. Never negative.
    pub amount: f64,
    /// Where the transaction is in its lifecycle.
    pub status: TransactionStatus,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The buyer, if a buyer took part.
    pub buyer_id: Option<UserId>,
    /// The buyer's display name.
    pub buyer_name: Option<String>,
    /// The seller, if a seller took part.
    pub seller_id: Option<UserId>,
    /// The seller's display name.
    pub seller_name: Option<String>,
    /// The listing the transaction was for, if any.
    pub property_id: Option<String>,
    /// The listing's title.
    pub property_title: Option<String>,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        transaction_type: TransactionType,
        amount: f64,
        status: TransactionStatus,
        created_at: OffsetDateTime,
        description: &str,
    ) -> TransactionBuilder {
        TransactionBuilder {
            transaction_type,
            amount,
            status,
            description: description.to_owned(),
            buyer: None,
            seller: None,
            property: None,
            created_at,
        }
    }
}

/// A builder for creating [Transaction] instances in the store.
///
/// Participants and the listing are optional and default to `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBuilder {
    /// What kind of money movement this is.
    pub transaction_type: TransactionType,
    /// How much money moved. Must be finite and not negative.
    pub amount: f64,
    /// Where the transaction is in its lifecycle.
    pub status: TransactionStatus,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The buyer's ID and display name.
    pub buyer: Option<(UserId, String)>,
    /// The seller's ID and display name.
    pub seller: Option<(UserId, String)>,
    /// The listing's ID and title.
    pub property: Option<(String, String)>,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
}

impl TransactionBuilder {
    /// Set the buyer who took part in the transaction.
    pub fn buyer(mut self, id: &str, name: &str) -> Self {
        self.buyer = Some((UserId::new(id), name.to_owned()));
        self
    }

    /// Set the seller who took part in the transaction.
    pub fn seller(mut self, id: &str, name: &str) -> Self {
        self.seller = Some((UserId::new(id), name.to_owned()));
        self
    }

    /// Set the listing the transaction was for.
    pub fn property(mut self, id: &str, title: &str) -> Self {
        self.property = Some((id.to_owned(), title.to_owned()));
        self
    }
}
