use api_types::record::{RecordKind, RecordVerificationView};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use engine::User;
use uuid::Uuid;

use crate::{ServerError, convert::record_kind, server::ServerState};

/// `GET /records/{kind}/{id}/verify`: recompute the stored record hash.
pub async fn verify(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<Json<RecordVerificationView>, ServerError> {
    let kind = RecordKind::parse(&kind)
        .ok_or_else(|| ServerError::Generic(format!("unknown record kind: {kind}")))?;
    let verification = state
        .engine
        .verify_record(&user.username, record_kind::to_engine(kind), id)
        .await?;
    if !verification.valid {
        tracing::warn!(
            "record {} {} failed verification",
            kind.as_str(),
            verification.id
        );
    }
    Ok(Json(RecordVerificationView {
        kind: record_kind::to_wire(verification.kind),
        id: verification.id,
        stored_hash: verification.stored_hash,
        computed_hash: verification.computed_hash,
        valid: verification.valid,
    }))
}
