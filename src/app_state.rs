//! Implements a struct that holds the state of the REST server.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{endpoints, transaction::TransactionStore, viewer::DEFAULT_COOKIE_DURATION};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The key used to decrypt the private viewer cookie.
    ///
    /// It must be derived from the same secret as the session manager that
    /// signs viewers in, see [create_cookie_key].
    pub cookie_key: Key,

    /// How far a viewer cookie is slid forward on each request.
    pub cookie_duration: Duration,

    /// The local timezone as a canonical timezone name, e.g. "Asia/Riyadh".
    pub local_timezone: String,

    /// Where signed-out viewers are sent to sign in.
    pub log_in_url: String,

    /// The store that transactions are fetched from.
    pub transaction_store: Arc<dyn TransactionStore>,
}

impl AppState {
    /// Create a new [AppState].
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Asia/Riyadh".
    pub fn new(
        cookie_secret: &str,
        local_timezone: &str,
        transaction_store: Arc<dyn TransactionStore>,
    ) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            log_in_url: endpoints::LOG_IN_VIEW.to_owned(),
            transaction_store,
        }
    }

    /// Send signed-out viewers to `log_in_url` instead of the default sign-in page.
    pub fn with_log_in_url(mut self, log_in_url: &str) -> Self {
        self.log_in_url = log_in_url.to_owned();
        self
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
