use sea_orm::Database;

use engine::{
    Engine, EngineError, NewAcl, NewGrant, NewUser, OrgRole, Permission, SubjectKind, TeamRole,
    UserRole,
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    for (username, role) in [
        ("root", UserRole::Admin),
        ("alice", UserRole::Buyer),
        ("bob", UserRole::Supplier),
        ("carol", UserRole::Both),
    ] {
        engine
            .create_user(NewUser {
                username: username.to_string(),
                password: "password".to_string(),
                email: format!("{username}@example.com"),
                full_name: None,
                company_name: None,
                role,
            })
            .await
            .unwrap();
    }
    engine
}

#[tokio::test]
async fn organization_membership_rules() {
    let engine = engine_with_db().await;
    let org = engine
        .create_organization("alice", "Acme Procurement", None)
        .await
        .unwrap();
    let members = engine.organization_members("alice", org.id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].role, OrgRole::Owner);

    assert!(matches!(
        engine.organization_members("bob", org.id).await,
        Err(EngineError::Forbidden(_))
    ));

    engine
        .upsert_organization_member("alice", org.id, "bob", OrgRole::Admin)
        .await
        .unwrap();
    // Admins cannot hand out ownership.
    assert!(matches!(
        engine
            .upsert_organization_member("bob", org.id, "carol", OrgRole::Owner)
            .await,
        Err(EngineError::Forbidden(_))
    ));
    engine
        .upsert_organization_member("bob", org.id, "carol", OrgRole::Member)
        .await
        .unwrap();
    assert!(matches!(
        engine
            .remove_organization_member("bob", org.id, "alice")
            .await,
        Err(EngineError::InvalidState(_))
    ));

    // Members can leave on their own.
    engine
        .remove_organization_member("carol", org.id, "carol")
        .await
        .unwrap();
    assert_eq!(
        engine.organization_members("alice", org.id).await.unwrap().len(),
        2
    );
    assert_eq!(engine.list_organizations("bob").await.unwrap().len(), 1);
}

#[tokio::test]
async fn last_team_admin_stays() {
    let engine = engine_with_db().await;
    let team = engine
        .create_team("alice", "Sourcing", Some("metals desk"), None)
        .await
        .unwrap();
    engine
        .add_team_member("alice", team.id, "bob", TeamRole::Member)
        .await
        .unwrap();
    assert!(matches!(
        engine
            .add_team_member("alice", team.id, "bob", TeamRole::Viewer)
            .await,
        Err(EngineError::ExistingKey(_))
    ));
    assert!(matches!(
        engine
            .add_team_member("bob", team.id, "carol", TeamRole::Member)
            .await,
        Err(EngineError::Forbidden(_))
    ));

    assert!(matches!(
        engine.remove_team_member("alice", team.id, "alice").await,
        Err(EngineError::InvalidState(_))
    ));
    assert!(matches!(
        engine
            .update_team_member_role("alice", team.id, "alice", TeamRole::Member)
            .await,
        Err(EngineError::InvalidState(_))
    ));

    // With a second admin the first one may step down.
    engine
        .update_team_member_role("alice", team.id, "bob", TeamRole::Admin)
        .await
        .unwrap();
    engine
        .remove_team_member("alice", team.id, "alice")
        .await
        .unwrap();
    let members = engine.team_members("bob", team.id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, "bob");
    assert!(engine.list_teams("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn organization_teams_take_only_members() {
    let engine = engine_with_db().await;
    let org = engine
        .create_organization("alice", "Acme", Some("buyers"))
        .await
        .unwrap();
    assert!(matches!(
        engine.create_team("bob", "Rogue", None, Some(org.id)).await,
        Err(EngineError::Forbidden(_))
    ));
    let team = engine
        .create_team("alice", "Buyers", None, Some(org.id))
        .await
        .unwrap();
    assert!(matches!(
        engine
            .add_team_member("alice", team.id, "bob", TeamRole::Member)
            .await,
        Err(EngineError::InvalidState(_))
    ));
    engine
        .upsert_organization_member("alice", org.id, "bob", OrgRole::Member)
        .await
        .unwrap();
    engine
        .add_team_member("alice", team.id, "bob", TeamRole::Member)
        .await
        .unwrap();
}

#[tokio::test]
async fn acl_rules_grant_through_team_membership() {
    let engine = engine_with_db().await;
    let team = engine
        .create_team("alice", "Analysts", None, None)
        .await
        .unwrap();
    engine
        .add_team_member("alice", team.id, "bob", TeamRole::Viewer)
        .await
        .unwrap();

    assert!(
        !engine
            .check_permission("bob", "analytics", Permission::Read, None)
            .await
            .unwrap()
    );
    assert!(
        engine
            .check_permission("root", "analytics", Permission::Manage, None)
            .await
            .unwrap()
    );

    // Only platform admins create global ACLs.
    let new_acl = NewAcl {
        name: "analytics readers".to_string(),
        description: None,
        organization_id: None,
    };
    assert!(matches!(
        engine.create_acl("alice", new_acl.clone()).await,
        Err(EngineError::Forbidden(_))
    ));
    let acl = engine.create_acl("root", new_acl).await.unwrap();
    engine
        .add_acl_rule("root", acl.id, "Analytics", Permission::Read)
        .await
        .unwrap();
    assert!(matches!(
        engine
            .add_acl_rule("root", acl.id, "analytics", Permission::Read)
            .await,
        Err(EngineError::ExistingKey(_))
    ));
    engine
        .assign_acl("root", acl.id, SubjectKind::Team, &team.id.to_string())
        .await
        .unwrap();

    assert!(
        engine
            .check_permission("bob", "analytics", Permission::Read, None)
            .await
            .unwrap()
    );
    assert!(
        !engine
            .check_permission("bob", "analytics", Permission::Delete, None)
            .await
            .unwrap()
    );
    assert!(
        !engine
            .check_permission("carol", "analytics", Permission::Read, None)
            .await
            .unwrap()
    );

    let summary = engine.analytics_summary("bob").await.unwrap();
    assert_eq!(summary.scope, engine::AnalyticsScope::Platform);
}

#[tokio::test]
async fn direct_grants_respect_resource_ids() {
    let engine = engine_with_db().await;
    assert!(matches!(
        engine
            .grant_permission(
                "alice",
                NewGrant {
                    resource_type: "rfq".to_string(),
                    resource_id: None,
                    subject_kind: SubjectKind::User,
                    subject_id: "bob".to_string(),
                    permission: Permission::Read,
                },
            )
            .await,
        Err(EngineError::Forbidden(_))
    ));

    engine
        .grant_permission(
            "root",
            NewGrant {
                resource_type: "rfq".to_string(),
                resource_id: Some("42".to_string()),
                subject_kind: SubjectKind::User,
                subject_id: "alice".to_string(),
                permission: Permission::Manage,
            },
        )
        .await
        .unwrap();

    assert!(
        engine
            .check_permission("alice", "rfq", Permission::Update, Some("42"))
            .await
            .unwrap()
    );
    assert!(
        !engine
            .check_permission("alice", "rfq", Permission::Update, Some("43"))
            .await
            .unwrap()
    );

    // A manager of one resource may delegate on it.
    engine
        .grant_permission(
            "alice",
            NewGrant {
                resource_type: "rfq".to_string(),
                resource_id: Some("42".to_string()),
                subject_kind: SubjectKind::User,
                subject_id: "bob".to_string(),
                permission: Permission::Read,
            },
        )
        .await
        .unwrap();
    assert!(
        engine
            .check_permission("bob", "rfq", Permission::Read, Some("42"))
            .await
            .unwrap()
    );
    assert!(matches!(
        engine
            .grant_permission(
                "root",
                NewGrant {
                    resource_type: "rfq".to_string(),
                    resource_id: None,
                    subject_kind: SubjectKind::User,
                    subject_id: "ghost".to_string(),
                    permission: Permission::Read,
                },
            )
            .await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn only_owners_demote_or_remove_co_owners() {
    let engine = engine_with_db().await;
    let org = engine
        .create_organization("alice", "Acme Procurement", None)
        .await
        .unwrap();
    engine
        .upsert_organization_member("alice", org.id, "carol", OrgRole::Owner)
        .await
        .unwrap();
    engine
        .upsert_organization_member("alice", org.id, "bob", OrgRole::Admin)
        .await
        .unwrap();

    assert!(matches!(
        engine
            .upsert_organization_member("bob", org.id, "carol", OrgRole::Member)
            .await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        engine
            .remove_organization_member("bob", org.id, "carol")
            .await,
        Err(EngineError::Forbidden(_))
    ));
    // A platform admin manages as an org admin, not as an owner.
    assert!(matches!(
        engine
            .remove_organization_member("root", org.id, "carol")
            .await,
        Err(EngineError::Forbidden(_))
    ));
    let members = engine.organization_members("alice", org.id).await.unwrap();
    let carol = members.iter().find(|m| m.user_id == "carol").unwrap();
    assert_eq!(carol.role, OrgRole::Owner);

    engine
        .upsert_organization_member("alice", org.id, "carol", OrgRole::Member)
        .await
        .unwrap();
    engine
        .remove_organization_member("bob", org.id, "carol")
        .await
        .unwrap();
    let members = engine.organization_members("alice", org.id).await.unwrap();
    assert!(members.iter().all(|m| m.user_id != "carol"));
}
