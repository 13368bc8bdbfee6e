//! The transaction store seam and its SQLite implementation.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, params_from_iter};
use time::{OffsetDateTime, UtcOffset};

use crate::{Error, viewer::UserId};

use super::{
    models::{Transaction, TransactionBuilder},
    query::TransactionQuery,
};

/// Retrieves transactions for the dashboard.
///
/// The dashboard never writes through this trait; transactions are owned by
/// whatever records them.
pub trait TransactionStore: Send + Sync {
    /// Retrieve every transaction matching `query`, in the order it asks for.
    fn get_query(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, Error>;
}

/// A [TransactionStore] backed by a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a store on a connection whose tables have already been created,
    /// see [crate::initialize_db].
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl TransactionStore for SQLiteTransactionStore {
    fn get_query(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, Error> {
        let connection = self
            .connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_transactions(query, &connection)
    }
}

/// Create the transaction table and the indexes used by viewer queries.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY,
                type TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                status TEXT NOT NULL,
                description TEXT NOT NULL,
                buyer_id TEXT,
                buyer_name TEXT,
                seller_id TEXT,
                seller_name TEXT,
                property_id TEXT,
                property_title TEXT,
                created_at TEXT NOT NULL
            );
        CREATE INDEX IF NOT EXISTS idx_transaction_buyer_id ON \"transaction\"(buyer_id);
        CREATE INDEX IF NOT EXISTS idx_transaction_seller_id ON \"transaction\"(seller_id);
        CREATE INDEX IF NOT EXISTS idx_transaction_created_at ON \"transaction\"(created_at);",
    )
}

/// Create a new transaction in the database from a builder.
///
/// `created_at` is stored in UTC so that sorting on the stored text matches
/// sorting by time.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is negative or not finite,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if !builder.amount.is_finite() || builder.amount < 0.0 {
        return Err(Error::InvalidAmount(builder.amount));
    }

    let (buyer_id, buyer_name) = builder.buyer.unzip();
    let (seller_id, seller_name) = builder.seller.unzip();
    let (property_id, property_title) = builder.property.unzip();

    connection
        .prepare(
            "INSERT INTO \"transaction\" (type, amount, status, description, buyer_id, \
                buyer_name, seller_id, seller_name, property_id, property_title, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             RETURNING id, type, amount, status, description, buyer_id, buyer_name, \
                seller_id, seller_name, property_id, property_title, created_at",
        )?
        .query_row(
            rusqlite::params![
                builder.transaction_type.as_str(),
                builder.amount,
                builder.status.as_str(),
                builder.description,
                buyer_id.as_ref().map(UserId::as_str),
                buyer_name,
                seller_id.as_ref().map(UserId::as_str),
                seller_name,
                property_id,
                property_title,
                builder.created_at.to_offset(UtcOffset::UTC),
            ],
            map_transaction_row,
        )?
}

/// Run `query` against the transaction table, newest first.
///
/// Ties on `created_at` are broken by ID so the order is stable.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails, or
/// [Error::InvalidTransactionType]/[Error::InvalidTransactionStatus] if a
/// stored row has a value the dashboard does not know.
pub fn get_transactions(
    query: &TransactionQuery,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let (where_clause, params) = match &query.predicate {
        Some(predicate) => (
            format!("WHERE {} = ?1", predicate.field.column()),
            vec![predicate.value.as_str().to_owned()],
        ),
        None => (String::new(), Vec::new()),
    };

    let sql = format!(
        "SELECT id, type, amount, status, description, buyer_id, buyer_name, seller_id, \
            seller_name, property_id, property_title, created_at \
        FROM \"transaction\" {where_clause} ORDER BY created_at DESC, id DESC"
    );

    connection
        .prepare(&sql)?
        .query_map(params_from_iter(params), map_transaction_row)?
        .map(|row_result| row_result.map_err(Error::from).and_then(|row| row))
        .collect()
}

/// Map a row to a transaction.
///
/// The outer result carries SQL errors and the inner one carries values that
/// are not valid transaction types or statuses.
fn map_transaction_row(row: &Row) -> Result<Result<Transaction, Error>, rusqlite::Error> {
    let transaction_type: String = row.get(1)?;
    let status: String = row.get(3)?;
    let created_at: OffsetDateTime = row.get(11)?;

    let transaction_type = match transaction_type.parse() {
        Ok(transaction_type) => transaction_type,
        Err(error) => return Ok(Err(error)),
    };
    let status = match status.parse() {
        Ok(status) => status,
        Err(error) => return Ok(Err(error)),
    };

    Ok(Ok(Transaction {
        id: row.get(0)?,
        transaction_type,
        amount: row.get(2)?,
        status,
        description: row.get(4)?,
        buyer_id: row
            .get::<_, Option<String>>(5)?
            .map(|id| UserId::new(&id)),
        buyer_name: row.get(6)?,
        seller_id: row
            .get::<_, Option<String>>(7)?
            .map(|id| UserId::new(&id)),
        seller_name: row.get(8)?,
        property_id: row.get(9)?,
        property_title: row.get(10)?,
        created_at,
    }))
}
