//! Initial schema migration - creates all tables from scratch.
//!
//! - `users`: authentication, role and wallet balance
//! - `suppliers`: 1:1 supplier profile of a user
//! - `rfqs`: buyers' requests for quotation
//! - `bids`: suppliers' priced responses to RFQs
//! - `contracts`: agreements formed from accepted bids
//! - `messages`: user to user communication, optionally RFQ/bid scoped
//! - `transactions`: wallet ledger entries
//! - `organizations`, `organization_members`, `teams`, `team_members`
//! - `access_control_lists`, `acl_rules`, `acl_assignments`,
//!   `resource_permissions`: permission primitives

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
    Email,
    FullName,
    CompanyName,
    Role,
    WalletBalanceMinor,
    CreatedAt,
}

#[derive(Iden)]
enum Suppliers {
    Table,
    UserId,
    Industry,
    Description,
    RiskScore,
    Verified,
    CreatedAt,
}

#[derive(Iden)]
enum Rfqs {
    Table,
    Id,
    UserId,
    Title,
    Description,
    Category,
    Quantity,
    BudgetMinor,
    Deadline,
    Status,
    BlockchainHash,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Bids {
    Table,
    Id,
    RfqId,
    SupplierId,
    PriceMinor,
    DeliveryDays,
    Note,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Contracts {
    Table,
    Id,
    RfqId,
    BidId,
    BuyerId,
    SupplierId,
    Title,
    Terms,
    ValueMinor,
    Status,
    StartDate,
    EndDate,
    BlockchainHash,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Messages {
    Table,
    Id,
    SenderId,
    ReceiverId,
    RfqId,
    BidId,
    Content,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    UserId,
    Kind,
    AmountMinor,
    BalanceAfterMinor,
    CounterpartyId,
    ContractId,
    Note,
    BlockchainHash,
    CreatedAt,
}

#[derive(Iden)]
enum Organizations {
    Table,
    Id,
    Name,
    Description,
    OwnerId,
    CreatedAt,
}

#[derive(Iden)]
enum OrganizationMembers {
    Table,
    OrganizationId,
    UserId,
    Role,
    CreatedAt,
}

#[derive(Iden)]
enum Teams {
    Table,
    Id,
    OrganizationId,
    Name,
    Description,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum TeamMembers {
    Table,
    TeamId,
    UserId,
    Role,
    CreatedAt,
}

#[derive(Iden)]
enum AccessControlLists {
    Table,
    Id,
    OrganizationId,
    Name,
    Description,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum AclRules {
    Table,
    Id,
    AclId,
    ResourceType,
    Permission,
}

#[derive(Iden)]
enum AclAssignments {
    Table,
    Id,
    AclId,
    SubjectKind,
    SubjectId,
    CreatedAt,
}

#[derive(Iden)]
enum ResourcePermissions {
    Table,
    Id,
    ResourceType,
    ResourceId,
    SubjectKind,
    SubjectId,
    Permission,
    GrantedBy,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users and supplier profiles
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::FullName).string())
                    .col(ColumnDef::new(Users::CompanyName).string())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string()
                            .not_null()
                            .default("buyer"),
                    )
                    .col(
                        ColumnDef::new(Users::WalletBalanceMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Suppliers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Suppliers::UserId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Suppliers::Industry).string().not_null())
                    .col(ColumnDef::new(Suppliers::Description).string())
                    .col(
                        ColumnDef::new(Suppliers::RiskScore)
                            .integer()
                            .not_null()
                            .default(50),
                    )
                    .col(
                        ColumnDef::new(Suppliers::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Suppliers::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-suppliers-user_id")
                            .from(Suppliers::Table, Suppliers::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. RFQs and bids
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Rfqs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Rfqs::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Rfqs::UserId).string().not_null())
                    .col(ColumnDef::new(Rfqs::Title).string().not_null())
                    .col(ColumnDef::new(Rfqs::Description).text().not_null())
                    .col(ColumnDef::new(Rfqs::Category).string().not_null())
                    .col(ColumnDef::new(Rfqs::Quantity).big_integer().not_null())
                    .col(ColumnDef::new(Rfqs::BudgetMinor).big_integer())
                    .col(ColumnDef::new(Rfqs::Deadline).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Rfqs::Status).string().not_null())
                    .col(ColumnDef::new(Rfqs::BlockchainHash).string())
                    .col(ColumnDef::new(Rfqs::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Rfqs::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-rfqs-user_id")
                            .from(Rfqs::Table, Rfqs::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-rfqs-status")
                    .table(Rfqs::Table)
                    .col(Rfqs::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-rfqs-user_id")
                    .table(Rfqs::Table)
                    .col(Rfqs::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Bids::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Bids::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Bids::RfqId).string().not_null())
                    .col(ColumnDef::new(Bids::SupplierId).string().not_null())
                    .col(ColumnDef::new(Bids::PriceMinor).big_integer().not_null())
                    .col(ColumnDef::new(Bids::DeliveryDays).integer().not_null())
                    .col(ColumnDef::new(Bids::Note).text())
                    .col(ColumnDef::new(Bids::Status).string().not_null())
                    .col(ColumnDef::new(Bids::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Bids::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bids-rfq_id")
                            .from(Bids::Table, Bids::RfqId)
                            .to(Rfqs::Table, Rfqs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bids-supplier_id")
                            .from(Bids::Table, Bids::SupplierId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bids-rfq_id-supplier_id")
                    .table(Bids::Table)
                    .col(Bids::RfqId)
                    .col(Bids::SupplierId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Contracts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Contracts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Contracts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Contracts::RfqId).string().not_null())
                    .col(ColumnDef::new(Contracts::BidId).string().not_null())
                    .col(ColumnDef::new(Contracts::BuyerId).string().not_null())
                    .col(ColumnDef::new(Contracts::SupplierId).string().not_null())
                    .col(ColumnDef::new(Contracts::Title).string().not_null())
                    .col(ColumnDef::new(Contracts::Terms).text().not_null())
                    .col(
                        ColumnDef::new(Contracts::ValueMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Contracts::Status).string().not_null())
                    .col(ColumnDef::new(Contracts::StartDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(Contracts::EndDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(Contracts::BlockchainHash).string())
                    .col(ColumnDef::new(Contracts::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Contracts::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-contracts-rfq_id")
                            .from(Contracts::Table, Contracts::RfqId)
                            .to(Rfqs::Table, Rfqs::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-contracts-bid_id")
                            .from(Contracts::Table, Contracts::BidId)
                            .to(Bids::Table, Bids::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-contracts-bid_id-unique")
                    .table(Contracts::Table)
                    .col(Contracts::BidId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Messages
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Messages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Messages::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Messages::SenderId).string().not_null())
                    .col(ColumnDef::new(Messages::ReceiverId).string().not_null())
                    .col(ColumnDef::new(Messages::RfqId).string())
                    .col(ColumnDef::new(Messages::BidId).string())
                    .col(ColumnDef::new(Messages::Content).text().not_null())
                    .col(ColumnDef::new(Messages::Status).string().not_null())
                    .col(ColumnDef::new(Messages::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-messages-sender_id")
                            .from(Messages::Table, Messages::SenderId)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-messages-receiver_id")
                            .from(Messages::Table, Messages::ReceiverId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-messages-receiver_id")
                    .table(Messages::Table)
                    .col(Messages::ReceiverId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Wallet ledger
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::UserId).string().not_null())
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::BalanceAfterMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::CounterpartyId).string())
                    .col(ColumnDef::new(Transactions::ContractId).string())
                    .col(ColumnDef::new(Transactions::Note).string())
                    .col(ColumnDef::new(Transactions::BlockchainHash).string())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-user_id")
                            .from(Transactions::Table, Transactions::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-user_id-created_at")
                    .table(Transactions::Table)
                    .col(Transactions::UserId)
                    .col(Transactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Organizations and teams
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Organizations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Organizations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Organizations::Name).string().not_null())
                    .col(ColumnDef::new(Organizations::Description).string())
                    .col(ColumnDef::new(Organizations::OwnerId).string().not_null())
                    .col(
                        ColumnDef::new(Organizations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-organizations-owner_id")
                            .from(Organizations::Table, Organizations::OwnerId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrganizationMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrganizationMembers::OrganizationId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrganizationMembers::UserId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OrganizationMembers::Role).string().not_null())
                    .col(
                        ColumnDef::new(OrganizationMembers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(OrganizationMembers::OrganizationId)
                            .col(OrganizationMembers::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-organization_members-organization_id")
                            .from(
                                OrganizationMembers::Table,
                                OrganizationMembers::OrganizationId,
                            )
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-organization_members-user_id")
                            .from(OrganizationMembers::Table, OrganizationMembers::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Teams::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Teams::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Teams::OrganizationId).string())
                    .col(ColumnDef::new(Teams::Name).string().not_null())
                    .col(ColumnDef::new(Teams::Description).string())
                    .col(ColumnDef::new(Teams::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Teams::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-teams-organization_id")
                            .from(Teams::Table, Teams::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TeamMembers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TeamMembers::TeamId).string().not_null())
                    .col(ColumnDef::new(TeamMembers::UserId).string().not_null())
                    .col(ColumnDef::new(TeamMembers::Role).string().not_null())
                    .col(ColumnDef::new(TeamMembers::CreatedAt).timestamp_with_time_zone().not_null())
                    .primary_key(
                        Index::create()
                            .col(TeamMembers::TeamId)
                            .col(TeamMembers::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-team_members-team_id")
                            .from(TeamMembers::Table, TeamMembers::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-team_members-user_id")
                            .from(TeamMembers::Table, TeamMembers::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-team_members-user_id")
                    .table(TeamMembers::Table)
                    .col(TeamMembers::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Access control
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(AccessControlLists::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccessControlLists::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AccessControlLists::OrganizationId).string())
                    .col(ColumnDef::new(AccessControlLists::Name).string().not_null())
                    .col(ColumnDef::new(AccessControlLists::Description).string())
                    .col(
                        ColumnDef::new(AccessControlLists::CreatedBy)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccessControlLists::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-access_control_lists-organization_id")
                            .from(
                                AccessControlLists::Table,
                                AccessControlLists::OrganizationId,
                            )
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AclRules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AclRules::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AclRules::AclId).string().not_null())
                    .col(ColumnDef::new(AclRules::ResourceType).string().not_null())
                    .col(ColumnDef::new(AclRules::Permission).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-acl_rules-acl_id")
                            .from(AclRules::Table, AclRules::AclId)
                            .to(AccessControlLists::Table, AccessControlLists::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-acl_rules-acl_id-resource-permission-unique")
                    .table(AclRules::Table)
                    .col(AclRules::AclId)
                    .col(AclRules::ResourceType)
                    .col(AclRules::Permission)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AclAssignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AclAssignments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AclAssignments::AclId).string().not_null())
                    .col(
                        ColumnDef::new(AclAssignments::SubjectKind)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AclAssignments::SubjectId).string().not_null())
                    .col(
                        ColumnDef::new(AclAssignments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-acl_assignments-acl_id")
                            .from(AclAssignments::Table, AclAssignments::AclId)
                            .to(AccessControlLists::Table, AccessControlLists::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-acl_assignments-subject")
                    .table(AclAssignments::Table)
                    .col(AclAssignments::SubjectKind)
                    .col(AclAssignments::SubjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ResourcePermissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ResourcePermissions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ResourcePermissions::ResourceType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ResourcePermissions::ResourceId).string())
                    .col(
                        ColumnDef::new(ResourcePermissions::SubjectKind)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResourcePermissions::SubjectId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResourcePermissions::Permission)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResourcePermissions::GrantedBy)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResourcePermissions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-resource_permissions-subject")
                    .table(ResourcePermissions::Table)
                    .col(ResourcePermissions::SubjectKind)
                    .col(ResourcePermissions::SubjectId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(ResourcePermissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AclAssignments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AclRules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccessControlLists::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TeamMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teams::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OrganizationMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Organizations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Messages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Contracts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Bids::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rfqs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Suppliers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
