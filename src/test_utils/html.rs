use axum::{body::Body, response::Response};
use scraper::{Html, Selector};

/// Matches one rendered transaction row in the table.
pub(crate) const TRANSACTION_ROW: &str = "tr[data-transaction-row='true']";

async fn response_text(response: Response<Body>) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not get response body");

    String::from_utf8_lossy(&body).into_owned()
}

/// Parse a full page, e.g. from the transactions page handler.
pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    Html::parse_document(&response_text(response).await)
}

/// Parse a partial, e.g. the htmx table swap.
pub(crate) async fn parse_html_fragment(response: Response<Body>) -> Html {
    Html::parse_fragment(&response_text(response).await)
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}

#[track_caller]
pub(crate) fn count_matches(html: &Html, selector: &str) -> usize {
    let selector = Selector::parse(selector)
        .unwrap_or_else(|error| panic!("Invalid selector {selector:?}: {error}"));

    html.select(&selector).count()
}

/// The text of each transaction row, in page order.
pub(crate) fn transaction_row_texts(html: &Html) -> Vec<String> {
    let selector = Selector::parse(TRANSACTION_ROW).unwrap();

    html.select(&selector)
        .map(|row| row.text().collect::<String>())
        .collect()
}

/// The displayed value of the stat card with `data-stat` equal to `stat`.
#[track_caller]
pub(crate) fn stat_value(html: &Html, stat: &str) -> String {
    let selector = Selector::parse(&format!("[data-stat='{stat}'] [data-stat-value]")).unwrap();

    html.select(&selector)
        .next()
        .unwrap_or_else(|| panic!("No stat card for {stat}"))
        .text()
        .collect::<String>()
        .trim()
        .to_owned()
}
