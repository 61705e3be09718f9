//! Team and team membership endpoints.

use api_types::team::{
    TeamMemberNew, TeamMemberView, TeamMembersResponse, TeamNew, TeamRoleUpdate, TeamView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Team, TeamMember, User};
use uuid::Uuid;

use crate::{ServerError, convert::team_role, server::ServerState};

fn team_view(team: Team) -> TeamView {
    TeamView {
        id: team.id,
        organization_id: team.organization_id,
        name: team.name,
        description: team.description,
        created_by: team.created_by,
        created_at: team.created_at,
    }
}

fn member_view(member: TeamMember) -> TeamMemberView {
    TeamMemberView {
        username: member.user_id,
        role: team_role::to_wire(member.role),
        created_at: member.created_at,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<TeamView>>, ServerError> {
    let teams = state
        .engine
        .list_teams(&user.username)
        .await?
        .into_iter()
        .map(team_view)
        .collect();
    Ok(Json(teams))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<TeamNew>,
) -> Result<(StatusCode, Json<TeamView>), ServerError> {
    let team = state
        .engine
        .create_team(
            &user.username,
            &payload.name,
            payload.description.as_deref(),
            payload.organization_id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(team_view(team))))
}

pub async fn list_members(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TeamMembersResponse>, ServerError> {
    let members = state
        .engine
        .team_members(&user.username, id)
        .await?
        .into_iter()
        .map(member_view)
        .collect();
    Ok(Json(TeamMembersResponse { members }))
}

pub async fn add_member(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TeamMemberNew>,
) -> Result<(StatusCode, Json<TeamMemberView>), ServerError> {
    let member = state
        .engine
        .add_team_member(
            &user.username,
            id,
            &payload.username,
            team_role::to_engine(payload.role),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(member_view(member))))
}

pub async fn update_member(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((id, username)): Path<(Uuid, String)>,
    Json(payload): Json<TeamRoleUpdate>,
) -> Result<Json<TeamMemberView>, ServerError> {
    let member = state
        .engine
        .update_team_member_role(
            &user.username,
            id,
            &username,
            team_role::to_engine(payload.role),
        )
        .await?;
    Ok(Json(member_view(member)))
}

/// Rejected with 400 when it would leave the team without an admin.
pub async fn remove_member(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((id, username)): Path<(Uuid, String)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .remove_team_member(&user.username, id, &username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
