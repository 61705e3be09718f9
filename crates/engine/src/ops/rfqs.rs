use chrono::{DateTime, Utc};
use sea_orm::{Condition, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Rfq, RfqStatus, rfqs,
    util::{normalize_required_text, require_positive},
};

use super::{Engine, with_tx};

#[derive(Clone, Debug)]
pub struct NewRfq {
    pub title: String,
    pub description: String,
    pub category: String,
    pub quantity: i64,
    pub budget_minor: Option<i64>,
    pub deadline: DateTime<Utc>,
    /// Create as `draft` instead of `open`.
    pub draft: bool,
}

/// Partial update; `None` leaves a field unchanged.
#[derive(Clone, Debug, Default)]
pub struct RfqUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i64>,
    /// `Some(None)` clears the budget.
    pub budget_minor: Option<Option<i64>>,
    pub deadline: Option<DateTime<Utc>>,
    pub status: Option<RfqStatus>,
}

impl RfqUpdate {
    fn touches_content(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.category.is_some()
            || self.quantity.is_some()
            || self.budget_minor.is_some()
            || self.deadline.is_some()
    }
}

#[derive(Clone, Debug, Default)]
pub struct RfqListFilter {
    pub status: Option<RfqStatus>,
    pub category: Option<String>,
    /// Only RFQs owned by this user.
    pub owner: Option<String>,
}

fn validate_budget(budget_minor: Option<i64>) -> ResultEngine<Option<i64>> {
    budget_minor
        .map(|b| require_positive(b, "budget"))
        .transpose()
}

impl Engine {
    /// Publish a new RFQ owned by `username`.
    pub async fn create_rfq(&self, username: &str, new_rfq: NewRfq) -> ResultEngine<Rfq> {
        let title = normalize_required_text(&new_rfq.title, "title")?;
        let description = normalize_required_text(&new_rfq.description, "description")?;
        let category = normalize_required_text(&new_rfq.category, "category")?.to_lowercase();
        let quantity = require_positive(new_rfq.quantity, "quantity")?;
        let budget_minor = validate_budget(new_rfq.budget_minor)?;
        let now = Utc::now();
        if new_rfq.deadline <= now {
            return Err(EngineError::InvalidInput(
                "deadline must be in the future".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, username).await?;
            if !user.role.can_buy() {
                return Err(EngineError::Forbidden("buyer role required".to_string()));
            }
            let mut rfq = Rfq {
                id: Uuid::new_v4(),
                user_id: user.username,
                title,
                description,
                category,
                quantity,
                budget_minor,
                deadline: new_rfq.deadline,
                status: if new_rfq.draft {
                    RfqStatus::Draft
                } else {
                    RfqStatus::Open
                },
                blockchain_hash: None,
                created_at: now,
                updated_at: now,
            };
            rfq.blockchain_hash = Some(rfq.compute_hash());
            rfqs::ActiveModel::from(&rfq).insert(&db_tx).await?;
            Ok(rfq)
        })
    }

    pub async fn rfq(&self, username: &str, id: Uuid) -> ResultEngine<Rfq> {
        with_tx!(self, |db_tx| self.require_rfq_visible(&db_tx, id, username).await)
    }

    /// Newest first. Other users' drafts are never listed.
    pub async fn list_rfqs(&self, username: &str, filter: RfqListFilter) -> ResultEngine<Vec<Rfq>> {
        with_tx!(self, |db_tx| {
            let mut query = rfqs::Entity::find().filter(
                Condition::any()
                    .add(rfqs::Column::Status.ne(RfqStatus::Draft.as_str()))
                    .add(rfqs::Column::UserId.eq(username)),
            );
            if let Some(status) = filter.status {
                query = query.filter(rfqs::Column::Status.eq(status.as_str()));
            }
            if let Some(category) = filter.category.as_deref() {
                query = query.filter(rfqs::Column::Category.eq(category.trim().to_lowercase()));
            }
            if let Some(owner) = filter.owner.as_deref() {
                query = query.filter(rfqs::Column::UserId.eq(owner));
            }
            let rows = query
                .order_by_desc(rfqs::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            rows.into_iter().map(Rfq::try_from).collect()
        })
    }

    /// Owner-only update of content and/or status.
    ///
    /// Content can change only while the RFQ is `draft`, `open` or
    /// `in_review`. `awarded` is reached by accepting a bid, never directly.
    pub async fn update_rfq(
        &self,
        username: &str,
        id: Uuid,
        update: RfqUpdate,
    ) -> ResultEngine<Rfq> {
        with_tx!(self, |db_tx| {
            let mut rfq = self.require_rfq_owner(&db_tx, id, username).await?;

            if update.touches_content() {
                if !matches!(
                    rfq.status,
                    RfqStatus::Draft | RfqStatus::Open | RfqStatus::InReview
                ) {
                    return Err(EngineError::InvalidState(format!(
                        "rfq is {} and can no longer be edited",
                        rfq.status.as_str()
                    )));
                }
                if let Some(title) = update.title.as_deref() {
                    rfq.title = normalize_required_text(title, "title")?;
                }
                if let Some(description) = update.description.as_deref() {
                    rfq.description = normalize_required_text(description, "description")?;
                }
                if let Some(category) = update.category.as_deref() {
                    rfq.category = normalize_required_text(category, "category")?.to_lowercase();
                }
                if let Some(quantity) = update.quantity {
                    rfq.quantity = require_positive(quantity, "quantity")?;
                }
                if let Some(budget_minor) = update.budget_minor {
                    rfq.budget_minor = validate_budget(budget_minor)?;
                }
                if let Some(deadline) = update.deadline {
                    if deadline <= Utc::now() {
                        return Err(EngineError::InvalidInput(
                            "deadline must be in the future".to_string(),
                        ));
                    }
                    rfq.deadline = deadline;
                }
            }

            if let Some(next) = update.status
                && next != rfq.status
            {
                if next == RfqStatus::Awarded {
                    return Err(EngineError::InvalidState(
                        "an rfq is awarded by accepting a bid".to_string(),
                    ));
                }
                if !rfq.status.can_transition_to(next) {
                    return Err(EngineError::InvalidState(format!(
                        "cannot move rfq from {} to {}",
                        rfq.status.as_str(),
                        next.as_str()
                    )));
                }
                rfq.status = next;
            }

            self.save_rfq(&db_tx, &mut rfq).await?;
            Ok(rfq)
        })
    }

    /// Persist `rfq`, refreshing `updated_at` and its record hash.
    pub(super) async fn save_rfq(&self, db: &DatabaseTransaction, rfq: &mut Rfq) -> ResultEngine<()> {
        rfq.updated_at = Utc::now();
        rfq.blockchain_hash = Some(rfq.compute_hash());
        rfqs::ActiveModel::from(&*rfq).update(db).await?;
        Ok(())
    }
}
