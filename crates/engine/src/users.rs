//! Users and their marketplace role.
//!
//! Users are keyed by `username`; every other table references them through
//! `user_id`/`*_id` columns holding the username.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Buyer,
    Supplier,
    Admin,
    Both,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Supplier => "supplier",
            Self::Admin => "admin",
            Self::Both => "both",
        }
    }

    /// Whether the role may publish RFQs.
    pub fn can_buy(self) -> bool {
        matches!(self, Self::Buyer | Self::Both | Self::Admin)
    }

    /// Whether the role may bid on RFQs.
    pub fn can_supply(self) -> bool {
        matches!(self, Self::Supplier | Self::Both | Self::Admin)
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl TryFrom<&str> for UserRole {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "buyer" => Ok(Self::Buyer),
            "supplier" => Ok(Self::Supplier),
            "admin" => Ok(Self::Admin),
            "both" => Ok(Self::Both),
            other => Err(EngineError::InvalidInput(format!("invalid user role: {other}"))),
        }
    }
}

/// An authenticated marketplace user (the password hash never leaves the
/// engine through this type).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub role: UserRole,
    pub wallet_balance_minor: i64,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<Model> for User {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            role: UserRole::try_from(model.role.as_str())?,
            username: model.username,
            email: model.email,
            full_name: model.full_name,
            company_name: model.company_name,
            wallet_balance_minor: model.wallet_balance_minor,
            created_at: model.created_at,
        })
    }
}

/// Hash a plaintext password with Argon2id and a random salt.
pub fn hash_password(password: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::InvalidInput(format!("cannot hash password: {err}")))
}

/// Verify a plaintext password against a stored PHC hash string.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub password: String,
    pub email: String,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub role: String,
    pub wallet_balance_minor: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_capabilities() {
        assert!(UserRole::Buyer.can_buy());
        assert!(!UserRole::Buyer.can_supply());
        assert!(UserRole::Supplier.can_supply());
        assert!(!UserRole::Supplier.can_buy());
        assert!(UserRole::Both.can_buy() && UserRole::Both.can_supply());
        assert!(UserRole::Admin.is_admin());
    }

    #[test]
    fn role_round_trips_through_storage_strings() {
        for role in [
            UserRole::Buyer,
            UserRole::Supplier,
            UserRole::Admin,
            UserRole::Both,
        ] {
            assert_eq!(UserRole::try_from(role.as_str()).unwrap(), role);
        }
        assert!(UserRole::try_from("guest").is_err());
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("s3cret").unwrap();
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("s3cret", "not-a-phc-string"));
    }
}
