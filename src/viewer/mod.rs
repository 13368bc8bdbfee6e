//! The signed-in viewer and the cookie that carries them between requests.
//!
//! Signing viewers in is the job of an external session manager. It shares the
//! cookie secret with this server and sets the private `viewer` cookie, which
//! the guards in this module decrypt on every protected request.

mod cookie;
mod identity;
mod middleware;
mod redirect;
mod token;

pub use cookie::{DEFAULT_COOKIE_DURATION, encode_viewer_cookie};
pub use identity::{Role, UserId, Viewer};
pub use middleware::{viewer_guard, viewer_guard_hx};

#[cfg(test)]
pub use cookie::{COOKIE_VIEWER, set_viewer_cookie};

#[cfg(test)]
pub use middleware::AuthState;
