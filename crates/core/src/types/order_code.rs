//! Public order code type.
//!
//! Orders are exposed to customers by a short random code (e.g. printed on
//! the order confirmation page and used in tracking URLs), never by the
//! internal row id.

use core::fmt;

use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`OrderCode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum OrderCodeError {
    /// The input is not exactly [`OrderCode::LENGTH`] characters.
    #[error("order code must be exactly {expected} characters")]
    WrongLength {
        /// Required length.
        expected: usize,
    },
    /// The input contains a character outside `[A-Za-z0-9]`.
    #[error("order code must be alphanumeric")]
    InvalidCharacter,
}

/// Short public-facing identifier for an order.
///
/// Ten alphanumeric characters give ~59 bits of randomness, which is
/// collision-free in practice; the database still carries a unique index
/// on the column and order creation retries on the off chance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct OrderCode(String);

impl OrderCode {
    /// Length of a generated order code.
    pub const LENGTH: usize = 10;

    /// Generate a fresh random order code.
    #[must_use]
    pub fn generate() -> Self {
        let code: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(Self::LENGTH)
            .map(char::from)
            .collect();
        Self(code)
    }

    /// Parse an `OrderCode` from client input (e.g. a path parameter).
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly 10 alphanumeric
    /// characters.
    pub fn parse(s: &str) -> Result<Self, OrderCodeError> {
        if s.len() != Self::LENGTH {
            return Err(OrderCodeError::WrongLength {
                expected: Self::LENGTH,
            });
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(OrderCodeError::InvalidCharacter);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OrderCode {
    type Err = OrderCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OrderCode {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OrderCode {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OrderCode {
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
    fn test_generate_shape() {
        let code = OrderCode::generate();
        assert_eq!(code.as_str().len(), OrderCode::LENGTH);
        assert!(code.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_varies() {
        // Two consecutive codes colliding would mean the RNG is broken.
        assert_ne!(OrderCode::generate(), OrderCode::generate());
    }

    #[test]
    fn test_parse_roundtrip() {
        let code = OrderCode::generate();
        let parsed = OrderCode::parse(code.as_str()).unwrap();
        assert_eq!(parsed, code);
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(matches!(
            OrderCode::parse("abc"),
            Err(OrderCodeError::WrongLength { .. })
        ));
        assert!(matches!(
            OrderCode::parse("abcdefghijk"),
            Err(OrderCodeError::WrongLength { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_non_alphanumeric() {
        assert!(matches!(
            OrderCode::parse("abcd-fghij"),
            Err(OrderCodeError::InvalidCharacter)
        ));
    }
}
