//! Builds the sign-in URL that signed-out viewers are sent to.
//!
//! The URL carries a `redirect_url` query parameter so the session manager can
//! send the viewer back to the page they asked for.

use axum::{extract::Request, http::Uri};
use tracing::{error, warn};

fn is_safe_redirect_url(redirect_url: &str, log_in_url: &str) -> bool {
    if !redirect_url.starts_with('/') || redirect_url.starts_with("//") {
        return false;
    }

    let path = redirect_url
        .split_once('?')
        .map(|(path, _)| path)
        .unwrap_or(redirect_url);

    path != log_in_url
}

fn normalize_redirect_url(raw_url: &str, log_in_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_url(path_and_query, log_in_url).then(|| path_and_query.to_owned())
}

fn normalize_hx_current_url(raw_url: &str, log_in_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_url(path_and_query, log_in_url).then(|| path_and_query.to_owned())
}

/// The sign-in URL for `request`.
///
/// Requests under `/api` are made by htmx, so the page to come back to is
/// taken from the `HX-Current-URL` header rather than the request URI.
pub fn build_log_in_redirect_url(request: &Request, log_in_url: &str) -> Option<String> {
    let redirect_target = if request.uri().path().starts_with("/api") {
        redirect_target_from_hx_request(request, log_in_url)?
    } else {
        redirect_target_from_request_uri(request, log_in_url)?
    };

    build_log_in_redirect_url_from_target(&redirect_target, log_in_url)
}

pub(super) fn build_log_in_redirect_url_from_target(
    redirect_target: &str,
    log_in_url: &str,
) -> Option<String> {
    match serde_urlencoded::to_string([("redirect_url", redirect_target)]) {
        Ok(param) => Some(format!("{log_in_url}?{param}")),
        Err(error) => {
            error!("Could not encode redirect URL {redirect_target}: {error}");
            None
        }
    }
}

fn redirect_target_from_request_uri(request: &Request, log_in_url: &str) -> Option<String> {
    let path_and_query = request.uri().path_and_query()?.as_str();
    normalize_redirect_url(path_and_query, log_in_url)
}

fn redirect_target_from_hx_request(request: &Request, log_in_url: &str) -> Option<String> {
    let headers = request.headers();
    let hx_request = headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .map(|header| header.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    if !hx_request {
        warn!("Missing HX-Request header for /api request.");
        return None;
    }

    let current_url = match headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())
    {
        Some(value) => value,
        None => {
            warn!("Missing HX-Current-URL header for /api request.");
            return None;
        }
    };

    let redirect_url = normalize_hx_current_url(current_url, log_in_url);
    if redirect_url.is_none() {
        warn!("Invalid HX-Current-URL header value: {current_url}");
    }

    redirect_url
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, extract::Request};

    use super::build_log_in_redirect_url;

    const LOG_IN_URL: &str = "/log_in";

    #[test]
    fn page_request_redirects_back_to_itself() {
        let request = Request::builder()
            .uri("/transactions?type=refund")
            .body(Body::empty())
            .unwrap();

        let url = build_log_in_redirect_url(&request, LOG_IN_URL);

        assert_eq!(
            url.as_deref(),
            Some("/log_in?redirect_url=%2Ftransactions%3Ftype%3Drefund")
        );
    }

    #[test]
    fn api_request_redirects_back_to_current_page() {
        let request = Request::builder()
            .uri("/api/transactions/table")
            .header("HX-Request", "true")
            .header("HX-Current-URL", "http://localhost:3000/transactions?range=week")
            .body(Body::empty())
            .unwrap();

        let url = build_log_in_redirect_url(&request, LOG_IN_URL);

        assert_eq!(
            url.as_deref(),
            Some("/log_in?redirect_url=%2Ftransactions%3Frange%3Dweek")
        );
    }

    #[test]
    fn api_request_without_htmx_headers_has_no_target() {
        let request = Request::builder()
            .uri("/api/transactions/table")
            .body(Body::empty())
            .unwrap();

        assert_eq!(build_log_in_redirect_url(&request, LOG_IN_URL), None);
    }

    #[test]
    fn does_not_redirect_back_to_log_in_page() {
        let request = Request::builder()
            .uri("/log_in?redirect_url=%2F")
            .body(Body::empty())
            .unwrap();

        assert_eq!(build_log_in_redirect_url(&request, LOG_IN_URL), None);
    }
}
