//! Narrows the fetched transactions for the table by type, date range and
//! free-text search.
//!
//! All three criteria must match for a transaction to be shown.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::Error;

use super::models::{Transaction, TransactionType};

/// Which transaction types to show in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeFilter {
    /// Show every type.
    #[default]
    All,
    /// Show only this type.
    Only(TransactionType),
}

impl TypeFilter {
    /// The value used in query strings and the type dropdown.
    pub fn as_str(self) -> &'static str {
        match self {
            TypeFilter::All => "all",
            TypeFilter::Only(transaction_type) => transaction_type.as_str(),
        }
    }

    fn matches(self, transaction_type: TransactionType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(wanted) => wanted == transaction_type,
        }
    }
}

impl TryFrom<String> for TypeFilter {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "all" => Ok(TypeFilter::All),
            other => other.parse().map(TypeFilter::Only),
        }
    }
}

impl From<TypeFilter> for String {
    fn from(value: TypeFilter) -> Self {
        value.as_str().to_owned()
    }
}

/// How far back to show transactions in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    /// No limit.
    #[default]
    All,
    /// The last 7 days.
    Week,
    /// The last 30 days.
    Month,
    /// The last 365 days.
    Year,
}

impl DateRange {
    /// Every date range in display order.
    pub const ALL: [DateRange; 4] = [
        DateRange::All,
        DateRange::Week,
        DateRange::Month,
        DateRange::Year,
    ];

    /// The value used in query strings and the date range dropdown.
    pub fn as_str(self) -> &'static str {
        match self {
            DateRange::All => "all",
            DateRange::Week => "week",
            DateRange::Month => "month",
            DateRange::Year => "year",
        }
    }

    /// The name shown to users.
    pub fn label(self) -> &'static str {
        match self {
            DateRange::All => "All time",
            DateRange::Week => "Last 7 days",
            DateRange::Month => "Last 30 days",
            DateRange::Year => "Last 12 months",
        }
    }

    /// The earliest time included in the range, `None` if unbounded.
    fn start(self, now: OffsetDateTime) -> Option<OffsetDateTime> {
        let length = match self {
            DateRange::All => return None,
            DateRange::Week => Duration::days(7),
            DateRange::Month => Duration::days(30),
            DateRange::Year => Duration::days(365),
        };

        Some(now - length)
    }
}

/// The table controls, as sent in the query string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableFilter {
    /// The type dropdown.
    #[serde(rename = "type", default)]
    pub transaction_type: TypeFilter,
    /// The date range dropdown.
    #[serde(default)]
    pub range: DateRange,
    /// The search box.
    #[serde(default)]
    pub search: String,
}

impl TableFilter {
    /// Encode the filter as a query string, e.g. "type=refund&range=all&search=villa".
    pub fn to_query_string(&self) -> String {
        serde_urlencoded::to_string(self).unwrap_or_else(|error| {
            tracing::error!("Could not encode table filter {self:?}: {error}");
            String::new()
        })
    }
}

/// Select the transactions that match `filter`, keeping their order.
///
/// `now` anchors the date range. `transactions` is never modified, so calling
/// this again with the same arguments gives the same result.
pub fn filter_transactions<'a>(
    transactions: &'a [Transaction],
    filter: &TableFilter,
    now: OffsetDateTime,
) -> Vec<&'a Transaction> {
    let needle = filter.search.trim().to_lowercase();
    let range_start = filter.range.start(now);

    transactions
        .iter()
        .filter(|transaction| filter.transaction_type.matches(transaction.transaction_type))
        .filter(|transaction| range_start.is_none_or(|start| transaction.created_at >= start))
        .filter(|transaction| needle.is_empty() || matches_search(transaction, &needle))
        .collect()
}

/// Whether `needle` (already lowercase) appears in any of the searchable
/// text fields. Missing fields never match.
fn matches_search(transaction: &Transaction, needle: &str) -> bool {
    [
        Some(transaction.description.as_str()),
        transaction.property_title.as_deref(),
        transaction.buyer_name.as_deref(),
        transaction.seller_name.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}
