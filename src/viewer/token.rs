//! Defines the token stored in the viewer cookie and how to serialize/deserialize it.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::viewer::{Role, UserId, Viewer};

mod datetime_format {
    //! Serializes a [time::OffsetDateTime] with a fixed width format.
    //!
    //! The default serializer for [time::OffsetDateTime] will serialize
    //! "00:00:00.000000" as "0:00:00.0" and the deserializer would error out
    //! because it expects the hours to be two digits, not one.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{
        OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
    };

    /// Date time format for the cookie expiry, e.g. "2021-01-01 00:00:00.000000 +00:00:00".
    const DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
             sign:mandatory]:[offset_minute]:[offset_second]"
    );

    pub fn serialize<S>(dt: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = dt
            .format(DATE_TIME_FORMAT)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&s, DATE_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// The identity the session manager hands over in the viewer cookie.
///
/// The role is kept as the session manager's raw string so that roles this
/// server does not know about still decode (they are treated as buyers).
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Token {
    pub uid: UserId,

    pub role: String,

    #[serde(
        serialize_with = "datetime_format::serialize",
        deserialize_with = "datetime_format::deserialize"
    )]
    pub expires_at: OffsetDateTime,
}

impl Token {
    pub fn new(viewer: &Viewer, expires_at: OffsetDateTime) -> Self {
        Self {
            uid: viewer.uid.clone(),
            role: viewer.role.as_str().to_owned(),
            expires_at,
        }
    }

    pub fn viewer(&self) -> Viewer {
        Viewer {
            uid: self.uid.clone(),
            role: Role::from(self.role.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use time::{UtcOffset, macros::datetime};

    use crate::viewer::{Role, UserId, Viewer, token::Token};

    #[test]
    fn serialise_token() {
        let expires_at = datetime!(2025-12-21 03:54:00).assume_offset(UtcOffset::UTC);
        let token = Token::new(&Viewer::new("seller-1", Role::Seller), expires_at);
        let expected =
            r#"{"uid":"seller-1","role":"seller","expires_at":"2025-12-21 03:54:00.0 +00:00:00"}"#;

        let actual = serde_json::to_string(&token).unwrap();

        assert_eq!(expected, actual);
    }

    #[test]
    fn deserialise_token_with_midnight_expiry() {
        let expires_at = datetime!(2025-12-21 00:00:00).assume_offset(UtcOffset::UTC);
        let expected = Token {
            uid: UserId::new("admin-1"),
            role: "admin".to_owned(),
            expires_at,
        };
        let token_string =
            r#"{"uid":"admin-1","role":"admin","expires_at":"2025-12-21 00:00:00.0 +00:00:00"}"#;

        let actual: Token = serde_json::from_str(token_string).unwrap();

        assert_eq!(expected, actual);
        assert_eq!(actual.viewer(), Viewer::new("admin-1", Role::Admin));
    }

    #[test]
    fn unknown_role_decodes_as_buyer() {
        let token_string =
            r#"{"uid":"u-7","role":"agent","expires_at":"2025-12-21 00:00:00.0 +00:00:00"}"#;

        let token: Token = serde_json::from_str(token_string).unwrap();

        assert_eq!(token.viewer().role, Role::Buyer);
    }
}
