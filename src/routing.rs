//! Application router configuration with protected and unprotected route definitions.

use axum::{Router, middleware, response::Redirect, routing::get};
use tower_http::services::ServeDir;

use crate::{
    AppState, endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    transaction::{export_transactions, get_transactions_page, get_transactions_table},
    viewer::{viewer_guard, viewer_guard_hx},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new().route(
        endpoints::INTERNAL_ERROR_VIEW,
        get(get_internal_server_error_page),
    );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(endpoints::TRANSACTIONS_EXPORT, get(export_transactions))
        .layer(middleware::from_fn_with_state(state.clone(), viewer_guard));

    // htmx requests need the HX-Redirect header for sign-in redirects to work.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::TRANSACTIONS_TABLE, get(get_transactions_table))
            .layer(middleware::from_fn_with_state(state.clone(), viewer_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the transactions page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::TRANSACTIONS_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_transactions() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::TRANSACTIONS_VIEW);
    }
}

#[cfg(test)]
mod router_tests {
    use std::sync::{Arc, Mutex};

    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use scraper::Html;
    use time::{Duration, macros::datetime};

    use crate::{
        AppState, endpoints, initialize_db,
        test_utils::{TRANSACTION_ROW, count_matches, transaction_row_texts},
        transaction::{
            SQLiteTransactionStore, Transaction, TransactionStatus, TransactionType,
            create_transaction,
        },
        viewer::{Role, Viewer, encode_viewer_cookie},
    };

    use super::build_router;

    const SECRET: &str = "foobar";

    fn get_test_server() -> TestServer {
        let conn = Connection::open_in_memory().unwrap();
        initialize_db(&conn).unwrap();

        for (description, buyer, seller) in [
            ("rent", "buyer-1", "seller-1"),
            ("deposit", "buyer-2", "seller-2"),
        ] {
            create_transaction(
                Transaction::build(
                    TransactionType::Payment,
                    100.0,
                    TransactionStatus::Completed,
                    datetime!(2025-10-01 09:00 UTC),
                    description,
                )
                .buyer(buyer, buyer)
                .seller(seller, seller),
                &conn,
            )
            .unwrap();
        }

        let state = AppState::new(
            SECRET,
            "Asia/Riyadh",
            Arc::new(SQLiteTransactionStore::new(Arc::new(Mutex::new(conn)))),
        );

        TestServer::new(build_router(state))
    }

    fn viewer_cookie(viewer: &Viewer) -> (HeaderName, HeaderValue) {
        let cookie = encode_viewer_cookie(
            &crate::create_cookie_key(SECRET),
            viewer,
            Duration::minutes(5),
        )
        .unwrap();

        (
            HeaderName::from_static("cookie"),
            HeaderValue::from_str(&cookie).unwrap(),
        )
    }

    #[tokio::test]
    async fn signed_out_viewer_is_redirected_to_log_in() {
        let server = get_test_server();

        let response = server.get(endpoints::TRANSACTIONS_VIEW).await;

        response.assert_status(StatusCode::SEE_OTHER);
        let location = response.header("location");
        assert_eq!(location, "/log_in?redirect_url=%2Ftransactions");
    }

    #[tokio::test]
    async fn signed_out_htmx_request_gets_hx_redirect() {
        let server = get_test_server();

        let response = server
            .get(endpoints::TRANSACTIONS_TABLE)
            .add_header("hx-request", "true")
            .add_header("hx-current-url", "http://localhost/transactions?type=refund")
            .await;

        response.assert_status_ok();
        assert!(
            response.maybe_header("hx-redirect").is_some(),
            "want HX-Redirect header"
        );
    }

    #[tokio::test]
    async fn signed_in_seller_sees_only_their_transactions() {
        let server = get_test_server();
        let (name, value) = viewer_cookie(&Viewer::new("seller-1", Role::Seller));

        let response = server
            .get(endpoints::TRANSACTIONS_VIEW)
            .add_header(name, value)
            .await;

        response.assert_status_ok();
        let rows = transaction_row_texts(&Html::parse_document(&response.text()));
        assert_eq!(rows.len(), 1);
        assert!(rows[0].contains("rent"));
    }

    #[tokio::test]
    async fn table_partial_uses_query_string() {
        let server = get_test_server();
        let (name, value) = viewer_cookie(&Viewer::new("admin-1", Role::Admin));

        let response = server
            .get(endpoints::TRANSACTIONS_TABLE)
            .add_query_param("type", "all")
            .add_query_param("search", "deposit")
            .add_header(name, value)
            .await;

        response.assert_status_ok();
        let html = Html::parse_fragment(&response.text());
        assert_eq!(count_matches(&html, TRANSACTION_ROW), 1);
    }

    #[tokio::test]
    async fn export_downloads_csv() {
        let server = get_test_server();
        let (name, value) = viewer_cookie(&Viewer::new("admin-1", Role::Admin));

        let response = server
            .get(endpoints::TRANSACTIONS_EXPORT)
            .add_header(name, value)
            .await;

        response.assert_status_ok();
        assert_eq!(response.header("content-type"), "text/csv; charset=utf-8");
        assert_eq!(response.text().lines().count(), 3);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        let response = server.get("/does/not/exist").await;

        response.assert_status_not_found();
    }
}
