//! User roles governing catalog permissions.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The role attached to a user account.
///
/// Roles gate catalog mutations: sellers may mutate their own products,
/// administrators may mutate anything, customers may only browse.
///
/// Stored in `PostgreSQL` as a smallint (1 = administrator, 2 = seller,
/// 3 = customer) and serialized by name in JSON and token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrator,
    Seller,
    Customer,
}

impl Role {
    /// Whether this role may bypass ownership checks on mutations.
    #[must_use]
    pub const fn is_administrator(self) -> bool {
        matches!(self, Self::Administrator)
    }

    /// The smallint code stored in the database.
    #[must_use]
    pub const fn as_i16(self) -> i16 {
        match self {
            Self::Administrator => 1,
            Self::Seller => 2,
            Self::Customer => 3,
        }
    }

    /// Decode the database smallint code.
    #[must_use]
    pub const fn from_i16(code: i16) -> Option<Self> {
        match code {
            1 => Some(Self::Administrator),
            2 => Some(Self::Seller),
            3 => Some(Self::Customer),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Administrator => "administrator",
            Self::Seller => "seller",
            Self::Customer => "customer",
        };
        write!(f, "{name}")
    }
}

#[cfg(feature = "postgres")]
impl ::sqlx::Type<::sqlx::Postgres> for Role {
    fn type_info() -> ::sqlx::postgres::PgTypeInfo {
        <i16 as ::sqlx::Type<::sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
        <i16 as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for Role {
    fn decode(
        value: ::sqlx::postgres::PgValueRef<'r>,
    ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
        let code = <i16 as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
        Self::from_i16(code).ok_or_else(|| format!("unknown role code: {code}").into())
    }
}

#[cfg(feature = "postgres")]
impl ::sqlx::Encode<'_, ::sqlx::Postgres> for Role {
    fn encode_by_ref(
        &self,
        buf: &mut ::sqlx::postgres::PgArgumentBuffer,
    ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
        <i16 as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.as_i16(), buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for role in [Role::Administrator, Role::Seller, Role::Customer] {
            assert_eq!(Role::from_i16(role.as_i16()), Some(role));
        }
        assert_eq!(Role::from_i16(0), None);
        assert_eq!(Role::from_i16(99), None);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&Role::Seller).expect("serialize"),
            "\"seller\""
        );
        let role: Role = serde_json::from_str("\"administrator\"").expect("deserialize");
        assert_eq!(role, Role::Administrator);
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn test_postgres_type_is_smallint() {
        use sqlx::Type;

        assert_eq!(
            <Role as Type<sqlx::Postgres>>::type_info(),
            <i16 as Type<sqlx::Postgres>>::type_info()
        );
        assert!(<Role as Type<sqlx::Postgres>>::compatible(
            &<i16 as Type<sqlx::Postgres>>::type_info()
        ));
    }

    #[test]
    fn test_is_administrator() {
        assert!(Role::Administrator.is_administrator());
        assert!(!Role::Seller.is_administrator());
        assert!(!Role::Customer.is_administrator());
    }
}
