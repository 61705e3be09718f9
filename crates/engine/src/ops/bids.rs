use chrono::Utc;
use sea_orm::{
    Condition, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Bid, BidStatus, EngineError, ResultEngine, RfqStatus, bids, rfqs,
    util::{normalize_optional_text, require_positive},
};

use super::{Engine, with_tx};

#[derive(Clone, Debug)]
pub struct NewBid {
    pub price_minor: i64,
    pub delivery_days: i32,
    pub note: Option<String>,
}

impl Engine {
    /// Place a bid on an open RFQ.
    pub async fn submit_bid(
        &self,
        username: &str,
        rfq_id: Uuid,
        new_bid: NewBid,
    ) -> ResultEngine<Bid> {
        let price_minor = require_positive(new_bid.price_minor, "price")?;
        if new_bid.delivery_days <= 0 {
            return Err(EngineError::InvalidInput(
                "delivery_days must be > 0".to_string(),
            ));
        }
        let note = normalize_optional_text(new_bid.note.as_deref());

        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, username).await?;
            if !user.role.can_supply() {
                return Err(EngineError::Forbidden("supplier role required".to_string()));
            }
            let rfq = self.require_rfq_visible(&db_tx, rfq_id, username).await?;
            if rfq.user_id == username {
                return Err(EngineError::Forbidden(
                    "cannot bid on your own rfq".to_string(),
                ));
            }
            if rfq.status != RfqStatus::Open {
                return Err(EngineError::InvalidState(format!(
                    "rfq is {}, not open",
                    rfq.status.as_str()
                )));
            }
            let now = Utc::now();
            if rfq.deadline <= now {
                return Err(EngineError::InvalidState(
                    "rfq deadline has passed".to_string(),
                ));
            }

            let live = bids::Entity::find()
                .filter(bids::Column::RfqId.eq(rfq_id.to_string()))
                .filter(bids::Column::SupplierId.eq(username))
                .filter(bids::Column::Status.ne(BidStatus::Withdrawn.as_str()))
                .one(&db_tx)
                .await?;
            if live.is_some() {
                return Err(EngineError::ExistingKey(format!(
                    "bid by {username} on rfq {rfq_id}"
                )));
            }

            let bid = Bid {
                id: Uuid::new_v4(),
                rfq_id,
                supplier_id: username.to_string(),
                price_minor,
                delivery_days: new_bid.delivery_days,
                note,
                status: BidStatus::Pending,
                created_at: now,
                updated_at: now,
            };
            bids::ActiveModel::from(&bid).insert(&db_tx).await?;
            Ok(bid)
        })
    }

    /// Bids on one RFQ: all of them for its owner, the caller's own otherwise.
    pub async fn list_rfq_bids(&self, username: &str, rfq_id: Uuid) -> ResultEngine<Vec<Bid>> {
        with_tx!(self, |db_tx| {
            let rfq = self.require_rfq_visible(&db_tx, rfq_id, username).await?;
            let mut query = bids::Entity::find().filter(bids::Column::RfqId.eq(rfq_id.to_string()));
            if rfq.user_id != username && !self.is_platform_admin(&db_tx, username).await? {
                query = query.filter(bids::Column::SupplierId.eq(username));
            }
            let rows = query
                .order_by_asc(bids::Column::PriceMinor)
                .order_by_asc(bids::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            rows.into_iter().map(Bid::try_from).collect()
        })
    }

    /// Bids placed by the caller, newest first.
    pub async fn list_my_bids(&self, username: &str) -> ResultEngine<Vec<Bid>> {
        with_tx!(self, |db_tx| {
            let rows = bids::Entity::find()
                .filter(bids::Column::SupplierId.eq(username))
                .order_by_desc(bids::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            rows.into_iter().map(Bid::try_from).collect()
        })
    }

    /// Accept a pending bid: the RFQ becomes `awarded` and every other
    /// pending bid on it is rejected.
    ///
    /// The award is a conditional update on the RFQ status, so of two
    /// concurrent acceptances on one RFQ only the first commits.
    pub async fn accept_bid(&self, username: &str, bid_id: Uuid) -> ResultEngine<Bid> {
        with_tx!(self, |db_tx| {
            let bid = self.require_bid(&db_tx, bid_id).await?;
            let mut rfq = self.require_rfq_owner(&db_tx, bid.rfq_id, username).await?;
            if bid.status != BidStatus::Pending {
                return Err(EngineError::InvalidState(format!(
                    "bid is {}, not pending",
                    bid.status.as_str()
                )));
            }

            let now = Utc::now();
            let awarded = rfqs::Entity::update_many()
                .col_expr(rfqs::Column::Status, Expr::value(RfqStatus::Awarded.as_str()))
                .col_expr(rfqs::Column::UpdatedAt, Expr::value(now))
                .filter(rfqs::Column::Id.eq(rfq.id.to_string()))
                .filter(
                    rfqs::Column::Status
                        .is_in([RfqStatus::Open.as_str(), RfqStatus::InReview.as_str()]),
                )
                .exec(&db_tx)
                .await?;
            if awarded.rows_affected == 0 {
                return Err(EngineError::InvalidState(format!(
                    "rfq is {} and cannot award a bid",
                    rfq.status.as_str()
                )));
            }

            let bid = self
                .move_pending_bid(&db_tx, bid, BidStatus::Accepted)
                .await?;
            bids::Entity::update_many()
                .col_expr(bids::Column::Status, Expr::value(BidStatus::Rejected.as_str()))
                .col_expr(bids::Column::UpdatedAt, Expr::value(now))
                .filter(bids::Column::RfqId.eq(rfq.id.to_string()))
                .filter(bids::Column::Status.eq(BidStatus::Pending.as_str()))
                .exec(&db_tx)
                .await?;

            // Refresh the record hash for the awarded status.
            rfq.status = RfqStatus::Awarded;
            self.save_rfq(&db_tx, &mut rfq).await?;
            Ok(bid)
        })
    }

    /// Reject a pending bid (RFQ owner only).
    pub async fn reject_bid(&self, username: &str, bid_id: Uuid) -> ResultEngine<Bid> {
        with_tx!(self, |db_tx| {
            let bid = self.require_bid(&db_tx, bid_id).await?;
            self.require_rfq_owner(&db_tx, bid.rfq_id, username).await?;
            self.move_pending_bid(&db_tx, bid, BidStatus::Rejected).await
        })
    }

    /// Withdraw a pending bid (bidding supplier only).
    pub async fn withdraw_bid(&self, username: &str, bid_id: Uuid) -> ResultEngine<Bid> {
        with_tx!(self, |db_tx| {
            let bid = self.require_bid(&db_tx, bid_id).await?;
            if bid.supplier_id != username {
                return Err(EngineError::Forbidden("not the bidder".to_string()));
            }
            self.move_pending_bid(&db_tx, bid, BidStatus::Withdrawn).await
        })
    }

    async fn move_pending_bid(
        &self,
        db: &DatabaseTransaction,
        bid: Bid,
        next: BidStatus,
    ) -> ResultEngine<Bid> {
        // Only a row that is still pending moves.
        let result = bids::Entity::update_many()
            .col_expr(bids::Column::Status, Expr::value(next.as_str()))
            .col_expr(bids::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(
                Condition::all()
                    .add(bids::Column::Id.eq(bid.id.to_string()))
                    .add(bids::Column::Status.eq(BidStatus::Pending.as_str())),
            )
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::InvalidState(format!(
                "bid is {}, not pending",
                bid.status.as_str()
            )));
        }
        let model = bids::Entity::find_by_id(bid.id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("bid not exists".to_string()))?;
        Bid::try_from(model)
    }
}
