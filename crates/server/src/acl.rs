//! Access control lists, direct grants and permission checks.

use api_types::acl::{
    AclAssignmentNew, AclAssignmentView, AclNew, AclRuleNew, AclRuleView, AclView,
    PermissionCheckQuery, PermissionCheckResponse, PermissionGrant, PermissionView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{AccessControlList, NewAcl, NewGrant, User};
use uuid::Uuid;

use crate::{
    ServerError,
    convert::{permission, subject_kind},
    server::ServerState,
};

fn acl_view(acl: AccessControlList) -> AclView {
    AclView {
        id: acl.id,
        organization_id: acl.organization_id,
        name: acl.name,
        description: acl.description,
        created_by: acl.created_by,
        created_at: acl.created_at,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<AclView>>, ServerError> {
    let acls = state
        .engine
        .list_acls(&user.username)
        .await?
        .into_iter()
        .map(acl_view)
        .collect();
    Ok(Json(acls))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<AclNew>,
) -> Result<(StatusCode, Json<AclView>), ServerError> {
    let acl = state
        .engine
        .create_acl(
            &user.username,
            NewAcl {
                name: payload.name,
                description: payload.description,
                organization_id: payload.organization_id,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(acl_view(acl))))
}

pub async fn add_rule(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AclRuleNew>,
) -> Result<(StatusCode, Json<AclRuleView>), ServerError> {
    let rule = state
        .engine
        .add_acl_rule(
            &user.username,
            id,
            &payload.resource_type,
            permission::to_engine(payload.permission),
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AclRuleView {
            id: rule.id,
            acl_id: rule.acl_id,
            resource_type: rule.resource_type,
            permission: permission::to_wire(rule.permission),
        }),
    ))
}

pub async fn assign(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AclAssignmentNew>,
) -> Result<(StatusCode, Json<AclAssignmentView>), ServerError> {
    let assignment = state
        .engine
        .assign_acl(
            &user.username,
            id,
            subject_kind::to_engine(payload.subject_kind),
            &payload.subject_id,
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AclAssignmentView {
            id: assignment.id,
            acl_id: assignment.acl_id,
            subject_kind: subject_kind::to_wire(assignment.subject_kind),
            subject_id: assignment.subject_id,
            created_at: assignment.created_at,
        }),
    ))
}

pub async fn grant(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<PermissionGrant>,
) -> Result<(StatusCode, Json<PermissionView>), ServerError> {
    let granted = state
        .engine
        .grant_permission(
            &user.username,
            NewGrant {
                resource_type: payload.resource_type,
                resource_id: payload.resource_id,
                subject_kind: subject_kind::to_engine(payload.subject_kind),
                subject_id: payload.subject_id,
                permission: permission::to_engine(payload.permission),
            },
        )
        .await?;
    tracing::info!(
        "{} granted {} on {} to {} {}",
        granted.granted_by,
        granted.permission.as_str(),
        granted.resource_type,
        granted.subject_kind.as_str(),
        granted.subject_id
    );
    Ok((
        StatusCode::CREATED,
        Json(PermissionView {
            id: granted.id,
            resource_type: granted.resource_type,
            resource_id: granted.resource_id,
            subject_kind: subject_kind::to_wire(granted.subject_kind),
            subject_id: granted.subject_id,
            permission: permission::to_wire(granted.permission),
            granted_by: granted.granted_by,
            created_at: granted.created_at,
        }),
    ))
}

/// Whether the caller holds a permission.
pub async fn check(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<PermissionCheckQuery>,
) -> Result<Json<PermissionCheckResponse>, ServerError> {
    let allowed = state
        .engine
        .check_permission(
            &user.username,
            &query.resource_type,
            permission::to_engine(query.permission),
            query.resource_id.as_deref(),
        )
        .await?;
    Ok(Json(PermissionCheckResponse { allowed }))
}
