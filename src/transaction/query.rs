//! Chooses which transactions a viewer is allowed to see.

use crate::viewer::{Role, UserId};

/// A participant field that a query can match a user against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantField {
    /// `sellerId`
    SellerId,
    /// `buyerId`
    BuyerId,
}

impl ParticipantField {
    /// The store column for the field.
    pub fn column(self) -> &'static str {
        match self {
            ParticipantField::SellerId => "seller_id",
            ParticipantField::BuyerId => "buyer_id",
        }
    }
}

/// An equality predicate, `field == user`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    /// The field to compare.
    pub field: ParticipantField,
    /// The user the field must equal.
    pub value: UserId,
}

/// Defines how transactions should be fetched from a
/// [TransactionStore](super::TransactionStore).
///
/// There is no limit or pagination. The store returns every matching
/// transaction, newest `createdAt` first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionQuery {
    /// Only include transactions matching the predicate. `None` includes everything.
    pub predicate: Option<Predicate>,
}

impl TransactionQuery {
    /// The query for everything a viewer with `role` and `uid` may see, newest first.
    ///
    /// - admins see every transaction,
    /// - sellers see the transactions where `sellerId == uid`,
    /// - everyone else is treated as a buyer and sees the transactions where `buyerId == uid`.
    pub fn for_viewer(role: Role, uid: &UserId) -> Self {
        let predicate = match role {
            Role::Admin => None,
            Role::Seller => Some(Predicate {
                field: ParticipantField::SellerId,
                value: uid.clone(),
            }),
            Role::Buyer => Some(Predicate {
                field: ParticipantField::BuyerId,
                value: uid.clone(),
            }),
        };

        Self { predicate }
    }
}

#[cfg(test)]
mod tests {
    use crate::viewer::{Role, UserId};

    use super::{ParticipantField, Predicate, TransactionQuery};

    #[test]
    fn admin_query_has_no_predicate() {
        let query = TransactionQuery::for_viewer(Role::Admin, &UserId::new("admin-1"));

        assert_eq!(query.predicate, None);
    }

    #[test]
    fn seller_query_matches_seller_id() {
        let uid = UserId::new("seller-1");

        let query = TransactionQuery::for_viewer(Role::Seller, &uid);

        assert_eq!(
            query.predicate,
            Some(Predicate {
                field: ParticipantField::SellerId,
                value: uid
            })
        );
    }

    #[test]
    fn buyer_query_matches_buyer_id() {
        let uid = UserId::new("buyer-1");

        let query = TransactionQuery::for_viewer(Role::Buyer, &uid);

        assert_eq!(
            query.predicate,
            Some(Predicate {
                field: ParticipantField::BuyerId,
                value: uid
            })
        );
    }

    #[test]
    fn unknown_role_queries_as_buyer() {
        let uid = UserId::new("agent-1");

        let query = TransactionQuery::for_viewer(Role::from("agent"), &uid);

        assert_eq!(
            query.predicate.map(|predicate| predicate.field),
            Some(ParticipantField::BuyerId)
        );
    }
}
