//! Downloads the filtered transactions table as a CSV file.

use axum::{
    Extension,
    extract::{Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};

use crate::{Error, viewer::Viewer};

use super::{
    filter::{TableFilter, filter_transactions},
    models::{Transaction, TransactionId},
    page::{TransactionsPageState, local_offset},
    query::TransactionQuery,
};

/// One line of the exported file.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    id: TransactionId,
    created_at: String,
    #[serde(rename = "type")]
    transaction_type: &'static str,
    status: &'static str,
    amount: String,
    description: &'a str,
    property_id: Option<&'a str>,
    property_title: Option<&'a str>,
    buyer_id: Option<&'a str>,
    buyer_name: Option<&'a str>,
    seller_id: Option<&'a str>,
    seller_name: Option<&'a str>,
}

impl<'a> CsvRow<'a> {
    fn new(transaction: &'a Transaction, local_offset: UtcOffset) -> Result<Self, Error> {
        let created_at = transaction
            .created_at
            .to_offset(local_offset)
            .format(&Rfc3339)
            .map_err(|error| Error::CsvExportError(error.to_string()))?;

        Ok(Self {
            id: transaction.id,
            created_at,
            transaction_type: transaction.transaction_type.as_str(),
            status: transaction.status.as_str(),
            amount: format!("{:.2}", transaction.amount),
            description: &transaction.description,
            property_id: transaction.property_id.as_deref(),
            property_title: transaction.property_title.as_deref(),
            buyer_id: transaction.buyer_id.as_ref().map(|id| id.as_str()),
            buyer_name: transaction.buyer_name.as_deref(),
            seller_id: transaction.seller_id.as_ref().map(|id| id.as_str()),
            seller_name: transaction.seller_name.as_deref(),
        })
    }
}

/// Download the rows of the transactions table for `filter` as CSV.
///
/// Unlike the page, a failed fetch is an error here: an empty file would look
/// like the viewer has no transactions.
pub async fn export_transactions(
    State(state): State<TransactionsPageState>,
    Extension(viewer): Extension<Viewer>,
    Query(filter): Query<TableFilter>,
) -> Result<Response, Error> {
    let local_offset = local_offset(&state.local_timezone)?;
    let query = TransactionQuery::for_viewer(viewer.role, &viewer.uid);
    let transactions = state
        .transaction_store
        .get_query(&query)
        .inspect_err(|error| tracing::error!("could not fetch transactions for export: {error}"))?;

    let now = OffsetDateTime::now_utc();
    let rows = filter_transactions(&transactions, &filter, now);
    let body = write_csv(&rows, local_offset)?;

    tracing::info!(
        "Exported {} of {} transactions for {} {}",
        rows.len(),
        transactions.len(),
        viewer.role,
        viewer.uid
    );

    let file_name = format!("transactions-{}.csv", now.to_offset(local_offset).date());

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response())
}

/// Write `rows` as CSV with a header line, in the order given.
fn write_csv(rows: &[&Transaction], local_offset: UtcOffset) -> Result<String, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    if rows.is_empty() {
        // `serialize` only writes the header with the first row.
        writer
            .write_record([
                "id",
                "created_at",
                "type",
                "status",
                "amount",
                "description",
                "property_id",
                "property_title",
                "buyer_id",
                "buyer_name",
                "seller_id",
                "seller_name",
            ])
            .map_err(|error| Error::CsvExportError(error.to_string()))?;
    }

    for transaction in rows {
        writer
            .serialize(CsvRow::new(transaction, local_offset)?)
            .map_err(|error| Error::CsvExportError(error.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::CsvExportError(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::CsvExportError(error.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Query, State},
        http::{
            StatusCode,
            header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        },
    };
    use rusqlite::Connection;
    use time::{UtcOffset, macros::datetime};

    use crate::{
        Error,
        db::initialize,
        transaction::{
            SQLiteTransactionStore, Transaction, TransactionStatus, TransactionType,
            create_transaction,
            filter::{TableFilter, TypeFilter},
            page::TransactionsPageState,
            test_utils::transaction,
        },
        viewer::{Role, Viewer},
    };

    use super::{export_transactions, write_csv};

    const HEADER: &str = "id,created_at,type,status,amount,description,property_id,\
        property_title,buyer_id,buyer_name,seller_id,seller_name";

    fn get_test_state() -> TransactionsPageState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        create_transaction(
            Transaction::build(
                TransactionType::Payment,
                1500.0,
                TransactionStatus::Completed,
                datetime!(2025-10-01 09:00 UTC),
                "rent, October",
            )
            .buyer("buyer-1", "Aisha")
            .seller("seller-1", "Omar")
            .property("property-1", "Sea View Villa"),
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(
                TransactionType::Refund,
                200.0,
                TransactionStatus::Pending,
                datetime!(2025-10-02 09:00 UTC),
                "deposit",
            )
            .buyer("buyer-2", "Khalid")
            .seller("seller-1", "Omar"),
            &conn,
        )
        .unwrap();

        TransactionsPageState {
            transaction_store: Arc::new(SQLiteTransactionStore::new(Arc::new(Mutex::new(conn)))),
            local_timezone: "Asia/Riyadh".to_owned(),
        }
    }

    async fn body_text(response: axum::response::Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not get response body");
        String::from_utf8_lossy(&body).to_string()
    }

    #[test]
    fn writes_header_and_quotes_fields() {
        let transaction = Transaction {
            id: 3,
            amount: 12.5,
            created_at: datetime!(2025-10-31 22:15 UTC),
            property_title: Some("Villa".to_owned()),
            ..transaction(TransactionType::Commission, "fee, late")
        };
        let riyadh = UtcOffset::from_hms(3, 0, 0).unwrap();

        let csv = write_csv(&[&transaction], riyadh).unwrap();

        assert_eq!(
            csv,
            format!(
                "{HEADER}\n3,2025-11-01T01:15:00+03:00,commission,completed,12.50,\"fee, late\",,Villa,,,,\n"
            )
        );
    }

    #[test]
    fn empty_export_still_has_header() {
        let csv = write_csv(&[], UtcOffset::UTC).unwrap();

        assert_eq!(csv, format!("{HEADER}\n"));
    }

    #[tokio::test]
    async fn export_is_scoped_to_viewer_and_filtered() {
        let filter = TableFilter {
            transaction_type: TypeFilter::Only(TransactionType::Refund),
            ..Default::default()
        };

        let response = export_transactions(
            State(get_test_state()),
            Extension(Viewer::new("seller-1", Role::Seller)),
            Query(filter),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "text/csv; charset=utf-8"
        );
        let disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_owned();
        assert!(
            disposition.starts_with("attachment; filename=\"transactions-"),
            "got {disposition}"
        );

        let body = body_text(response).await;
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 2, "got {body}");
        assert_eq!(lines[0], HEADER);
        assert!(lines[1].contains("deposit"), "got {}", lines[1]);
    }

    #[tokio::test]
    async fn buyer_export_excludes_other_buyers() {
        let response = export_transactions(
            State(get_test_state()),
            Extension(Viewer::new("buyer-1", Role::Buyer)),
            Query(TableFilter::default()),
        )
        .await
        .unwrap();

        let body = body_text(response).await;
        assert!(body.contains("\"rent, October\""), "got {body}");
        assert!(!body.contains("Khalid"), "got {body}");
    }

    #[tokio::test]
    async fn fetch_failure_is_an_error() {
        let conn = Connection::open_in_memory().unwrap();
        // No tables, so the query fails.
        let state = TransactionsPageState {
            transaction_store: Arc::new(SQLiteTransactionStore::new(Arc::new(Mutex::new(conn)))),
            local_timezone: "Asia/Riyadh".to_owned(),
        };

        let result = export_transactions(
            State(state),
            Extension(Viewer::new("admin-1", Role::Admin)),
            Query(TableFilter::default()),
        )
        .await;

        assert!(
            matches!(result, Err(Error::SqlError(_))),
            "want SQL error, got {:?}",
            result.map(|response| response.status())
        );
    }
}
