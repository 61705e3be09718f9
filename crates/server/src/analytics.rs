//! Analytics summary and file exports.

use api_types::analytics::{AnalyticsSummaryView, ExportQuery};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use engine::{AnalyticsScope, AnalyticsSummary, User};

use crate::{
    ServerError,
    export::{self, ExportFormat, ExportType},
    server::ServerState,
};

fn scope_name(scope: AnalyticsScope) -> &'static str {
    match scope {
        AnalyticsScope::Own => "own",
        AnalyticsScope::Platform => "platform",
    }
}

fn summary_view(summary: AnalyticsSummary) -> AnalyticsSummaryView {
    AnalyticsSummaryView {
        scope: scope_name(summary.scope).to_string(),
        total_rfqs: summary.total_rfqs,
        open_rfqs: summary.open_rfqs,
        awarded_rfqs: summary.awarded_rfqs,
        total_bids: summary.total_bids,
        accepted_bids: summary.accepted_bids,
        average_bid_minor: summary.average_bid_minor,
        total_contracts: summary.total_contracts,
        active_contracts: summary.active_contracts,
        total_contract_value_minor: summary.total_contract_value_minor,
    }
}

pub async fn summary(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<AnalyticsSummaryView>, ServerError> {
    let summary = state.engine.analytics_summary(&user.username).await?;
    Ok(Json(summary_view(summary)))
}

/// `GET /analytics/export/{format}?type=rfqs|bids|all|summary`
pub async fn export(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(format): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let format = ExportFormat::parse(&format)?;
    let kind = ExportType::parse(query.kind.as_deref())?;

    let sheets = match kind {
        ExportType::All => {
            let report = state.engine.analytics_report(&user.username).await?;
            vec![
                export::summary_sheet(&report.summary),
                export::rfq_sheet(&report.rfqs),
                export::bid_sheet(&report.bids),
            ]
        }
        ExportType::Summary => {
            let summary = state.engine.analytics_summary(&user.username).await?;
            vec![export::summary_sheet(&summary)]
        }
        ExportType::Rfqs => {
            let rfqs = state.engine.analytics_rfqs(&user.username).await?;
            vec![export::rfq_sheet(&rfqs)]
        }
        ExportType::Bids => {
            let bids = state.engine.analytics_bids(&user.username).await?;
            vec![export::bid_sheet(&bids)]
        }
    };

    let body = export::render(format, &sheets)?;
    tracing::debug!(
        "{} exported {} as {} ({} bytes)",
        user.username,
        kind.as_str(),
        format.extension(),
        body.len()
    );
    let disposition = format!(
        "attachment; filename=\"bell24h-{}.{}\"",
        kind.as_str(),
        format.extension()
    );
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}
