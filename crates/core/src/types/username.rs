//! Username type enforcing the registration format.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum UsernameError {
    /// Shorter than the minimum length.
    #[error("username must be at least {0} characters long")]
    TooShort(usize),
    /// Longer than the stored column width.
    #[error("username must be at most {0} characters")]
    TooLong(usize),
    /// Contains a character outside `[A-Za-z0-9_-]`.
    #[error("username may only contain letters, digits, '_' and '-'")]
    InvalidCharacter,
}

/// A login handle.
///
/// Usernames are 6-25 characters of ASCII letters, digits, underscores
/// and hyphens. They are globally unique in the identity store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Minimum length of a username.
    pub const MIN_LENGTH: usize = 6;
    /// Maximum stored length of a username.
    pub const MAX_LENGTH: usize = 25;

    /// Parse a `Username` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`UsernameError`] if the input is too short, too long, or
    /// contains characters outside `[A-Za-z0-9_-]`.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        if s.len() < Self::MIN_LENGTH {
            return Err(UsernameError::TooShort(Self::MIN_LENGTH));
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong(Self::MAX_LENGTH));
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(UsernameError::InvalidCharacter);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Username` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Username {
    type Err = UsernameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Username {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Username {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Username {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(Username::parse("alice01").is_ok());
        assert!(Username::parse("john_doe").is_ok());
        assert!(Username::parse("a-b-c-1").is_ok());
    }

    #[test]
    fn test_parse_too_short() {
        assert!(matches!(
            Username::parse("abc"),
            Err(UsernameError::TooShort(_))
        ));
    }

    #[test]
    fn test_parse_too_long() {
        assert!(matches!(
            Username::parse(&"a".repeat(26)),
            Err(UsernameError::TooLong(_))
        ));
    }

    #[test]
    fn test_parse_invalid_characters() {
        assert!(matches!(
            Username::parse("alice b"),
            Err(UsernameError::InvalidCharacter)
        ));
        assert!(matches!(
            Username::parse("alice@b"),
            Err(UsernameError::InvalidCharacter)
        ));
    }
}
