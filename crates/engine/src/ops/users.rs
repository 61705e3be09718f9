use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, ResultEngine, Supplier, User, UserRole, suppliers, users,
    users::hash_password,
    util::{normalize_optional_text, normalize_required_text},
};

use super::{Engine, with_tx};

/// Registration input; `password` is plaintext and hashed here.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: String,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub role: UserRole,
}

#[derive(Clone, Debug)]
pub struct SupplierProfile {
    pub industry: String,
    pub description: Option<String>,
}

impl Engine {
    /// Self-service registration. The `admin` role cannot be self-assigned.
    pub async fn register_user(&self, new_user: NewUser) -> ResultEngine<User> {
        if new_user.role.is_admin() {
            return Err(EngineError::Forbidden(
                "admin role cannot be self-assigned".to_string(),
            ));
        }
        self.create_user(new_user).await
    }

    /// Create a user with any role. Used by bootstrap tooling.
    pub async fn create_user(&self, new_user: NewUser) -> ResultEngine<User> {
        let username = normalize_required_text(&new_user.username, "username")?;
        let email = normalize_required_text(&new_user.email, "email")?;
        if !email.contains('@') {
            return Err(EngineError::InvalidInput("invalid email".to_string()));
        }
        if new_user.password.is_empty() {
            return Err(EngineError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }
        let password = hash_password(&new_user.password)?;

        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(username.clone())
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(username));
            }
            let model = users::ActiveModel {
                username: ActiveValue::Set(username.clone()),
                password: ActiveValue::Set(password),
                email: ActiveValue::Set(email),
                full_name: ActiveValue::Set(normalize_optional_text(new_user.full_name.as_deref())),
                company_name: ActiveValue::Set(normalize_optional_text(
                    new_user.company_name.as_deref(),
                )),
                role: ActiveValue::Set(new_user.role.as_str().to_string()),
                wallet_balance_minor: ActiveValue::Set(0),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            User::try_from(model)
        })
    }

    pub async fn user(&self, username: &str) -> ResultEngine<User> {
        with_tx!(self, |db_tx| self.require_user(&db_tx, username).await)
    }

    /// The user together with the stored password hash, for authentication.
    pub async fn user_credentials(&self, username: &str) -> ResultEngine<Option<(User, String)>> {
        let model = users::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?;
        model
            .map(|m| {
                let hash = m.password.clone();
                User::try_from(m).map(|user| (user, hash))
            })
            .transpose()
    }

    /// Create or update the caller's supplier profile.
    pub async fn upsert_supplier(
        &self,
        username: &str,
        profile: SupplierProfile,
    ) -> ResultEngine<Supplier> {
        let industry = normalize_required_text(&profile.industry, "industry")?;
        let description = normalize_optional_text(profile.description.as_deref());
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, username).await?;
            if !user.role.can_supply() {
                return Err(EngineError::Forbidden("supplier role required".to_string()));
            }
            let existing = suppliers::Entity::find_by_id(username.to_string())
                .one(&db_tx)
                .await?;
            let model = match existing {
                Some(model) => {
                    let mut active: suppliers::ActiveModel = model.into();
                    active.industry = ActiveValue::Set(industry);
                    active.description = ActiveValue::Set(description);
                    active.update(&db_tx).await?
                }
                None => {
                    let supplier = Supplier {
                        user_id: username.to_string(),
                        industry,
                        description,
                        risk_score: 50,
                        verified: false,
                        created_at: Utc::now(),
                    };
                    suppliers::ActiveModel::from(&supplier).insert(&db_tx).await?
                }
            };
            Ok(Supplier::from(model))
        })
    }

    pub async fn supplier(&self, username: &str) -> ResultEngine<Supplier> {
        with_tx!(self, |db_tx| {
            suppliers::Entity::find_by_id(username.to_string())
                .one(&db_tx)
                .await?
                .map(Supplier::from)
                .ok_or_else(|| EngineError::KeyNotFound("supplier not exists".to_string()))
        })
    }

    pub async fn list_suppliers(&self, verified_only: bool) -> ResultEngine<Vec<Supplier>> {
        with_tx!(self, |db_tx| {
            let mut query = suppliers::Entity::find();
            if verified_only {
                query = query.filter(suppliers::Column::Verified.eq(true));
            }
            let rows = query
                .order_by_asc(suppliers::Column::RiskScore)
                .order_by_asc(suppliers::Column::UserId)
                .all(&db_tx)
                .await?;
            Ok(rows.into_iter().map(Supplier::from).collect())
        })
    }

    /// Platform-admin verification of a supplier.
    pub async fn verify_supplier(
        &self,
        username: &str,
        supplier_id: &str,
        verified: bool,
        risk_score: Option<i32>,
    ) -> ResultEngine<Supplier> {
        with_tx!(self, |db_tx| {
            self.require_platform_admin(&db_tx, username).await?;
            Self::set_supplier_verification(&db_tx, supplier_id, verified, risk_score).await
        })
    }

    /// Verification without an acting user, for operator tooling.
    pub async fn mark_supplier_verified(
        &self,
        supplier_id: &str,
        verified: bool,
        risk_score: Option<i32>,
    ) -> ResultEngine<Supplier> {
        with_tx!(self, |db_tx| {
            Self::set_supplier_verification(&db_tx, supplier_id, verified, risk_score).await
        })
    }

    async fn set_supplier_verification(
        db: &DatabaseTransaction,
        supplier_id: &str,
        verified: bool,
        risk_score: Option<i32>,
    ) -> ResultEngine<Supplier> {
        if let Some(score) = risk_score
            && !(0..=100).contains(&score)
        {
            return Err(EngineError::InvalidInput(
                "risk_score must be within 0..=100".to_string(),
            ));
        }
        let model = suppliers::Entity::find_by_id(supplier_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("supplier not exists".to_string()))?;
        let mut active: suppliers::ActiveModel = model.into();
        active.verified = ActiveValue::Set(verified);
        if let Some(score) = risk_score {
            active.risk_score = ActiveValue::Set(score);
        }
        Ok(Supplier::from(active.update(db).await?))
    }
}
