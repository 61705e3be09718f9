use sea_orm::{Condition, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::Serialize;

use crate::{
    Bid, BidStatus, Contract, ContractStatus, Permission, ResultEngine, Rfq, RfqStatus, bids,
    contracts, rfqs,
};

use super::{Engine, with_tx};

/// Resource type checked for platform-wide analytics.
const ANALYTICS_RESOURCE: &str = "analytics";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsScope {
    /// Only rows the caller owns, bid on, or is party to.
    Own,
    Platform,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnalyticsSummary {
    pub scope: AnalyticsScope,
    pub total_rfqs: i64,
    pub open_rfqs: i64,
    pub awarded_rfqs: i64,
    pub total_bids: i64,
    pub accepted_bids: i64,
    pub average_bid_minor: i64,
    pub total_contracts: i64,
    pub active_contracts: i64,
    pub total_contract_value_minor: i64,
}

#[derive(Clone, Debug)]
pub struct AnalyticsReport {
    pub summary: AnalyticsSummary,
    pub rfqs: Vec<Rfq>,
    pub bids: Vec<Bid>,
}

/// Totals are summed as `i128` and saturate at `i64::MAX`.
fn clamp_minor(total: i128) -> i64 {
    i64::try_from(total).unwrap_or(if total < 0 { i64::MIN } else { i64::MAX })
}

impl AnalyticsSummary {
    fn compute(scope: AnalyticsScope, rfqs: &[Rfq], bids: &[Bid], contracts: &[Contract]) -> Self {
        let count = |n: usize| i64::try_from(n).unwrap_or(i64::MAX);
        let bid_total: i128 = bids.iter().map(|b| i128::from(b.price_minor)).sum();
        Self {
            scope,
            total_rfqs: count(rfqs.len()),
            open_rfqs: count(rfqs.iter().filter(|r| r.status == RfqStatus::Open).count()),
            awarded_rfqs: count(
                rfqs.iter()
                    .filter(|r| r.status == RfqStatus::Awarded)
                    .count(),
            ),
            total_bids: count(bids.len()),
            accepted_bids: count(
                bids.iter()
                    .filter(|b| b.status == BidStatus::Accepted)
                    .count(),
            ),
            average_bid_minor: if bids.is_empty() {
                0
            } else {
                clamp_minor(bid_total / i128::from(count(bids.len())))
            },
            total_contracts: count(contracts.len()),
            active_contracts: count(
                contracts
                    .iter()
                    .filter(|c| c.status == ContractStatus::Active)
                    .count(),
            ),
            total_contract_value_minor: clamp_minor(
                contracts
                    .iter()
                    .filter(|c| c.status != ContractStatus::Terminated)
                    .map(|c| i128::from(c.value_minor))
                    .sum(),
            ),
        }
    }

    /// `(metric, value)` pairs in a fixed order, as exported.
    pub fn metrics(&self) -> Vec<(&'static str, i64)> {
        vec![
            ("total_rfqs", self.total_rfqs),
            ("open_rfqs", self.open_rfqs),
            ("awarded_rfqs", self.awarded_rfqs),
            ("total_bids", self.total_bids),
            ("accepted_bids", self.accepted_bids),
            ("average_bid_minor", self.average_bid_minor),
            ("total_contracts", self.total_contracts),
            ("active_contracts", self.active_contracts),
            ("total_contract_value_minor", self.total_contract_value_minor),
        ]
    }
}

impl Engine {
    async fn analytics_scope(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<AnalyticsScope> {
        let platform = self
            .has_permission(db, username, ANALYTICS_RESOURCE, Permission::Read, None)
            .await?;
        Ok(if platform {
            AnalyticsScope::Platform
        } else {
            AnalyticsScope::Own
        })
    }

    async fn scoped_rfqs(
        &self,
        db: &DatabaseTransaction,
        scope: AnalyticsScope,
        username: &str,
    ) -> ResultEngine<Vec<Rfq>> {
        let mut query = rfqs::Entity::find();
        if scope == AnalyticsScope::Own {
            query = query.filter(rfqs::Column::UserId.eq(username));
        }
        let rows = query.order_by_desc(rfqs::Column::CreatedAt).all(db).await?;
        rows.into_iter().map(Rfq::try_from).collect()
    }

    async fn scoped_bids(
        &self,
        db: &DatabaseTransaction,
        scope: AnalyticsScope,
        username: &str,
    ) -> ResultEngine<Vec<Bid>> {
        let mut query = bids::Entity::find();
        if scope == AnalyticsScope::Own {
            let own_rfqs: Vec<String> = rfqs::Entity::find()
                .filter(rfqs::Column::UserId.eq(username))
                .all(db)
                .await?
                .into_iter()
                .map(|r| r.id)
                .collect();
            query = query.filter(
                Condition::any()
                    .add(bids::Column::SupplierId.eq(username))
                    .add(bids::Column::RfqId.is_in(own_rfqs)),
            );
        }
        let rows = query.order_by_desc(bids::Column::CreatedAt).all(db).await?;
        rows.into_iter().map(Bid::try_from).collect()
    }

    async fn scoped_contracts(
        &self,
        db: &DatabaseTransaction,
        scope: AnalyticsScope,
        username: &str,
    ) -> ResultEngine<Vec<Contract>> {
        let mut query = contracts::Entity::find();
        if scope == AnalyticsScope::Own {
            query = query.filter(
                Condition::any()
                    .add(contracts::Column::BuyerId.eq(username))
                    .add(contracts::Column::SupplierId.eq(username)),
            );
        }
        let rows = query.all(db).await?;
        rows.into_iter().map(Contract::try_from).collect()
    }

    /// Marketplace metrics scoped to the caller, or platform-wide for
    /// platform admins and holders of `analytics:read`.
    pub async fn analytics_summary(&self, username: &str) -> ResultEngine<AnalyticsSummary> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, username).await?;
            let scope = self.analytics_scope(&db_tx, username).await?;
            let rfqs = self.scoped_rfqs(&db_tx, scope, username).await?;
            let bids = self.scoped_bids(&db_tx, scope, username).await?;
            let contracts = self.scoped_contracts(&db_tx, scope, username).await?;
            Ok(AnalyticsSummary::compute(scope, &rfqs, &bids, &contracts))
        })
    }

    /// Summary plus the RFQ and bid rows behind it, read in one
    /// transaction so the three agree.
    pub async fn analytics_report(&self, username: &str) -> ResultEngine<AnalyticsReport> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, username).await?;
            let scope = self.analytics_scope(&db_tx, username).await?;
            let rfqs = self.scoped_rfqs(&db_tx, scope, username).await?;
            let bids = self.scoped_bids(&db_tx, scope, username).await?;
            let contracts = self.scoped_contracts(&db_tx, scope, username).await?;
            Ok(AnalyticsReport {
                summary: AnalyticsSummary::compute(scope, &rfqs, &bids, &contracts),
                rfqs,
                bids,
            })
        })
    }

    /// RFQ rows behind the summary, newest first.
    pub async fn analytics_rfqs(&self, username: &str) -> ResultEngine<Vec<Rfq>> {
        with_tx!(self, |db_tx| {
            let scope = self.analytics_scope(&db_tx, username).await?;
            self.scoped_rfqs(&db_tx, scope, username).await
        })
    }

    /// Bid rows behind the summary, newest first.
    pub async fn analytics_bids(&self, username: &str) -> ResultEngine<Vec<Bid>> {
        with_tx!(self, |db_tx| {
            let scope = self.analytics_scope(&db_tx, username).await?;
            self.scoped_bids(&db_tx, scope, username).await
        })
    }
}
