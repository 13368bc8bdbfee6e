//! Who is looking at the page and what they are allowed to see.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The opaque ID the session manager assigns to a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap a raw user ID.
    pub fn new(id: &str) -> Self {
        Self(id.to_owned())
    }

    /// The raw user ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decides which transactions a viewer can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Sees every transaction.
    Admin,
    /// Sees the transactions where they are the seller.
    Seller,
    /// Sees the transactions where they are the buyer.
    Buyer,
}

impl Role {
    /// The name the session manager uses for the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Seller => "seller",
            Role::Buyer => "buyer",
        }
    }
}

impl From<&str> for Role {
    /// Any role other than admin or seller is treated as a buyer.
    fn from(value: &str) -> Self {
        match value {
            "admin" => Role::Admin,
            "seller" => Role::Seller,
            _ => Role::Buyer,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The signed-in user making a request.
///
/// Protected route handlers receive the viewer with `Extension(viewer): Extension<Viewer>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    /// The user's ID.
    pub uid: UserId,
    /// The user's role.
    pub role: Role,
}

impl Viewer {
    /// Create a viewer from a user ID and role.
    pub fn new(uid: &str, role: Role) -> Self {
        Self {
            uid: UserId::new(uid),
            role,
        }
    }
}
