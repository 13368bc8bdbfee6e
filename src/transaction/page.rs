//! Handlers for the transactions page and the table partial it refreshes.

use std::sync::Arc;

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::html;
use time::{OffsetDateTime, UtcOffset};

use crate::{AppState, Error, alert::Alert, timezone::get_local_offset, viewer::Viewer};

use super::{
    charts::build_charts,
    filter::{TableFilter, filter_transactions},
    models::Transaction,
    query::TransactionQuery,
    stats::calculate_stats,
    store::TransactionStore,
    view::{TransactionsPage, transactions_page_view, transactions_table_view},
};

/// The state needed for the transactions page and its partials.
#[derive(Clone)]
pub struct TransactionsPageState {
    /// The store that transactions are fetched from.
    pub transaction_store: Arc<dyn TransactionStore>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Riyadh".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            transaction_store: state.transaction_store.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The result of fetching the viewer's transactions.
///
/// A failed fetch is not an error for the page: it is shown as an empty
/// list together with a single alert.
pub(super) struct Fetched {
    pub transactions: Vec<Transaction>,
    pub alert: Option<Alert>,
}

/// Fetch every transaction `viewer` may see, newest first.
pub(super) fn fetch_transactions(store: &dyn TransactionStore, viewer: &Viewer) -> Fetched {
    let query = TransactionQuery::for_viewer(viewer.role, &viewer.uid);

    match store.get_query(&query) {
        Ok(transactions) => Fetched {
            transactions,
            alert: None,
        },
        Err(error) => {
            tracing::error!(
                "Could not fetch transactions for {} {}: {error}",
                viewer.role,
                viewer.uid
            );

            Fetched {
                transactions: Vec::new(),
                alert: Some(Alert::Error {
                    message: "Could not load transactions".to_owned(),
                    details: "Your transactions could not be loaded, try again later.".to_owned(),
                }),
            }
        }
    }
}

pub(super) fn local_offset(local_timezone: &str) -> Result<UtcOffset, Error> {
    get_local_offset(local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", local_timezone);
        Error::InvalidTimezoneError(local_timezone.to_owned())
    })
}

/// Render the stat cards, charts, filters and table for the signed-in viewer.
///
/// The stats and charts cover everything the viewer may see, the filters only
/// narrow the table.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(viewer): Extension<Viewer>,
    Query(filter): Query<TableFilter>,
) -> Result<Response, Error> {
    let local_offset = local_offset(&state.local_timezone)?;
    let Fetched {
        transactions,
        alert,
    } = fetch_transactions(state.transaction_store.as_ref(), &viewer);

    let stats = calculate_stats(&transactions);
    let charts = build_charts(&transactions, local_offset);
    let rows = filter_transactions(&transactions, &filter, OffsetDateTime::now_utc());

    Ok(transactions_page_view(TransactionsPage {
        viewer: &viewer,
        stats,
        charts: &charts,
        rows: &rows,
        filter: &filter,
        local_offset,
        alert,
    })
    .into_response())
}

/// Render just the transactions table for `filter`, for htmx to swap in.
pub async fn get_transactions_table(
    State(state): State<TransactionsPageState>,
    Extension(viewer): Extension<Viewer>,
    Query(filter): Query<TableFilter>,
) -> Response {
    let local_offset = match local_offset(&state.local_timezone) {
        Ok(local_offset) => local_offset,
        Err(error) => return error.into_alert_response(),
    };
    let Fetched {
        transactions,
        alert,
    } = fetch_transactions(state.transaction_store.as_ref(), &viewer);

    let rows = filter_transactions(&transactions, &filter, OffsetDateTime::now_utc());

    html! {
        (transactions_table_view(&rows, &filter, local_offset))

        @if let Some(alert) = alert {
            (alert.into_oob_html())
        }
    }
    .into_response()
}
