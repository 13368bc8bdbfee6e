//! Viewer middleware that decrypts the viewer cookie, slides its expiry, and
//! redirects signed-out viewers to sign in.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    AppState, endpoints,
    viewer::{
        cookie::{extend_viewer_cookie_duration_if_needed, get_token_from_cookies},
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
    },
};

/// The state needed for the viewer middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key used to decrypt the private viewer cookie.
    pub cookie_key: Key,
    /// How far a valid viewer cookie is slid forward on each request.
    pub cookie_duration: Duration,
    /// Where signed-out viewers are sent to sign in.
    pub log_in_url: String,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            log_in_url: state.log_in_url.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Places the [Viewer](crate::viewer::Viewer) from the viewer cookie into the
/// request extensions and runs the request, otherwise returns the response
/// from `get_redirect` without running the request.
#[inline]
async fn viewer_guard_internal(
    state: AuthState,
    request: Request,
    next: Next,
    get_redirect: impl Fn(&str) -> Response,
) -> Response {
    let log_in_redirect_url = build_log_in_redirect_url(&request, &state.log_in_url)
        .unwrap_or_else(|| {
            if request.uri().path().starts_with("/api") {
                tracing::warn!(
                    "Missing or invalid HTMX headers for /api request. Falling back to transactions page."
                );
            } else {
                tracing::warn!(
                    "Invalid redirect URL from request URI. Falling back to transactions page."
                );
            }

            build_log_in_redirect_url_from_target(endpoints::TRANSACTIONS_VIEW, &state.log_in_url)
                .unwrap_or_else(|| state.log_in_url.clone())
        });

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!("Error getting cookie jar: {err:?}. Redirecting to log in page.");
            return get_redirect(&log_in_redirect_url);
        }
    };
    let viewer = match get_token_from_cookies(&jar) {
        Ok(token) => token.viewer(),
        Err(error) => {
            tracing::debug!("No signed-in viewer ({error}). Redirecting to log in page.");
            return get_redirect(&log_in_redirect_url);
        }
    };

    tracing::debug!("Request from viewer {} ({})", viewer.uid, viewer.role);
    parts.extensions.insert(viewer);
    let request = Request::from_parts(parts, body);
    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();
    let jar = match extend_viewer_cookie_duration_if_needed(jar.clone(), state.cookie_duration) {
        Ok(updated_jar) => updated_jar,
        Err(err) => {
            tracing::error!("Error extending cookie duration: {err:?}. Rolling back cookie jar.");
            jar
        }
    };
    for (key, val) in jar.into_response().headers().iter() {
        if key != SET_COOKIE {
            continue;
        }

        parts.headers.append(key, val.to_owned());
    }

    Response::from_parts(parts, body)
}

/// Middleware function that checks for a valid viewer cookie.
/// The viewer is placed into the request and then the request executed normally if the cookie is valid, otherwise a redirect to the sign-in page is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(viewer): Extension<Viewer>` to receive the viewer.
pub async fn viewer_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    viewer_guard_internal(state, request, next, |redirect_url| {
        Redirect::to(redirect_url).into_response()
    })
    .await
}

/// Middleware function that checks for a valid viewer cookie.
/// The viewer is placed into the request and then the request executed normally if the cookie is valid, otherwise a HTMX redirect to the sign-in page is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(viewer): Extension<Viewer>` to receive the viewer.
pub async fn viewer_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    viewer_guard_internal(state, request, next, |redirect_url| {
        (HxRedirect(redirect_url.to_owned()), StatusCode::OK).into_response()
    })
    .await
}

#[cfg(test)]
mod viewer_guard_tests {
    use axum::{
        Extension, Router,
        extract::State,
        middleware,
        response::Html,
        routing::{get, post},
    };
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key},
    };
    use axum_test::TestServer;
    use sha2::Digest;
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error, endpoints,
        viewer::{
            AuthState, COOKIE_VIEWER, DEFAULT_COOKIE_DURATION, Role, Viewer, set_viewer_cookie,
            viewer_guard, viewer_guard_hx,
        },
    };

    async fn test_handler(Extension(viewer): Extension<Viewer>) -> Html<String> {
        Html(format!("<h1>Hello, {}!</h1>", viewer.uid))
    }

    async fn stub_sign_in_route(
        State(state): State<AuthState>,
        jar: PrivateCookieJar,
    ) -> Result<PrivateCookieJar, Error> {
        set_viewer_cookie(
            jar,
            &Viewer::new("seller-1", Role::Seller),
            state.cookie_duration,
        )
    }

    const TEST_SIGN_IN_ROUTE: &str = "/sign_in";
    const TEST_PROTECTED_ROUTE: &str = "/protected";
    const TEST_API_ROUTE: &str = "/api/protected";

    fn get_state(cookie_duration: Duration) -> AuthState {
        let hash = sha2::Sha512::digest("nafstenoas");
        AuthState {
            cookie_key: Key::from(&hash),
            cookie_duration,
            log_in_url: endpoints::LOG_IN_VIEW.to_owned(),
        }
    }

    fn get_test_server(cookie_duration: Duration) -> TestServer {
        let state = get_state(cookie_duration);

        let app = Router::new()
            .route(TEST_PROTECTED_ROUTE, get(test_handler))
            .route_layer(middleware::from_fn_with_state(state.clone(), viewer_guard))
            .route(TEST_SIGN_IN_ROUTE, post(stub_sign_in_route))
            .with_state(state.clone());

        TestServer::new(app)
    }

    fn get_test_server_hx(cookie_duration: Duration) -> TestServer {
        let state = get_state(cookie_duration);

        let app = Router::new()
            .route(TEST_API_ROUTE, get(test_handler))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                viewer_guard_hx,
            ))
            .with_state(state.clone());

        TestServer::new(app)
    }

    #[tokio::test]
    async fn get_protected_route_with_valid_cookie() {
        let server = get_test_server(DEFAULT_COOKIE_DURATION);
        let response = server.post(TEST_SIGN_IN_ROUTE).await;

        response.assert_status_ok();
        let viewer_cookie = response.cookie(COOKIE_VIEWER);

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(viewer_cookie)
            .await;

        response.assert_status_ok();
        response.assert_text("<h1>Hello, seller-1!</h1>");
    }

    #[track_caller]
    fn assert_date_time_close(left: OffsetDateTime, right: OffsetDateTime) {
        assert!(
            (left - right).abs() < Duration::seconds(1),
            "got date time {:?}, want {:?}",
            left,
            right
        );
    }

    #[tokio::test]
    async fn viewer_guard_extends_valid_cookie_duration() {
        let server = get_test_server(Duration::minutes(5));
        let response = server.post(TEST_SIGN_IN_ROUTE).await;
        response.assert_status_ok();
        let jar = response.cookies();

        let response = server.get(TEST_PROTECTED_ROUTE).add_cookies(jar).await;

        let viewer_cookie = response.cookie(COOKIE_VIEWER);
        assert_date_time_close(
            viewer_cookie.expires_datetime().unwrap(),
            OffsetDateTime::now_utc() + Duration::minutes(5),
        );
        assert_eq!(viewer_cookie.secure(), Some(true));
        assert_eq!(viewer_cookie.http_only(), Some(true));
    }

    #[tokio::test]
    async fn get_protected_route_with_no_cookie_redirects_to_log_in() {
        let server = get_test_server(DEFAULT_COOKIE_DURATION);
        let response = server.get(TEST_PROTECTED_ROUTE).await;

        response.assert_status_see_other();
        let expected_query =
            serde_urlencoded::to_string([("redirect_url", TEST_PROTECTED_ROUTE)]).unwrap();
        let expected_location = format!("{}?{}", endpoints::LOG_IN_VIEW, expected_query);
        assert_eq!(response.header("location"), expected_location);
    }

    #[tokio::test]
    async fn get_protected_route_with_invalid_cookie_redirects_to_log_in() {
        let server = get_test_server(DEFAULT_COOKIE_DURATION);
        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(Cookie::build((COOKIE_VIEWER, "FOOBAR")).build())
            .await;

        response.assert_status_see_other();
    }

    #[tokio::test]
    async fn api_route_uses_hx_current_url_for_redirect() {
        let server = get_test_server_hx(DEFAULT_COOKIE_DURATION);
        let current_url = "/transactions?range=month&type=refund";
        let response = server
            .get(TEST_API_ROUTE)
            .add_header("HX-Request", "true")
            .add_header("HX-Current-URL", current_url)
            .await;

        response.assert_status_ok();
        let expected_query = serde_urlencoded::to_string([("redirect_url", current_url)]).unwrap();
        let expected_location = format!("{}?{}", endpoints::LOG_IN_VIEW, expected_query);
        assert_eq!(response.header("hx-redirect"), expected_location);
    }
}
