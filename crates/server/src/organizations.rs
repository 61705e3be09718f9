//! Organization and membership endpoints.

use api_types::organization::{
    OrgMemberUpsert, OrgMemberView, OrgMembersResponse, OrganizationNew, OrganizationView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Organization, User};
use uuid::Uuid;

use crate::{ServerError, convert::org_role, server::ServerState};

fn organization_view(organization: Organization) -> OrganizationView {
    OrganizationView {
        id: organization.id,
        name: organization.name,
        description: organization.description,
        owner_id: organization.owner_id,
        created_at: organization.created_at,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<OrganizationView>>, ServerError> {
    let organizations = state
        .engine
        .list_organizations(&user.username)
        .await?
        .into_iter()
        .map(organization_view)
        .collect();
    Ok(Json(organizations))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<OrganizationNew>,
) -> Result<(StatusCode, Json<OrganizationView>), ServerError> {
    let organization = state
        .engine
        .create_organization(
            &user.username,
            &payload.name,
            payload.description.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(organization_view(organization))))
}

pub async fn list_members(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrgMembersResponse>, ServerError> {
    let members = state
        .engine
        .organization_members(&user.username, id)
        .await?
        .into_iter()
        .map(|member| OrgMemberView {
            username: member.user_id,
            role: org_role::to_wire(member.role),
            created_at: member.created_at,
        })
        .collect();
    Ok(Json(OrgMembersResponse { members }))
}

pub async fn upsert_member(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<OrgMemberUpsert>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .upsert_organization_member(
            &user.username,
            id,
            &payload.username,
            org_role::to_engine(payload.role),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_member(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((id, username)): Path<(Uuid, String)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .remove_organization_member(&user.username, id, &username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
