use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Declare a wire enum serialized as its snake_case name, with the canonical
/// string the engine and database use.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            /// Inverse of [`Self::as_str`].
            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

/// Distinguish an absent field (`None`) from an explicit `null`
/// (`Some(None)`) in PATCH bodies.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub mod user {
    use super::*;

    wire_enum!(UserRole {
        Buyer => "buyer",
        Supplier => "supplier",
        Admin => "admin",
        Both => "both",
    });

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RegisterUser {
        pub username: String,
        pub password: String,
        pub email: String,
        pub full_name: Option<String>,
        pub company_name: Option<String>,
        /// Defaults to `buyer`. `admin` is refused.
        pub role: Option<UserRole>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub username: String,
        pub email: String,
        pub full_name: Option<String>,
        pub company_name: Option<String>,
        pub role: UserRole,
        pub wallet_balance_minor: i64,
        pub created_at: DateTime<Utc>,
    }
}

pub mod supplier {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SupplierUpsert {
        pub industry: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SupplierVerify {
        pub verified: bool,
        /// 0..=100; unchanged when absent.
        pub risk_score: Option<i32>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SupplierListQuery {
        pub verified: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SupplierView {
        pub username: String,
        pub industry: String,
        pub description: Option<String>,
        pub risk_score: i32,
        pub verified: bool,
        pub created_at: DateTime<Utc>,
    }
}

pub mod rfq {
    use super::*;

    wire_enum!(
        /// RFQ lifecycle status.
        RfqStatus {
            Draft => "draft",
            Open => "open",
            InReview => "in_review",
            Awarded => "awarded",
            Closed => "closed",
            Cancelled => "cancelled",
        }
    );

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RfqNew {
        pub title: String,
        pub description: String,
        pub category: String,
        pub quantity: i64,
        pub budget_minor: Option<i64>,
        pub deadline: DateTime<Utc>,
        /// Create as `draft` instead of `open`.
        #[serde(default)]
        pub draft: bool,
    }

    /// Partial update. `budget_minor: null` clears the budget.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RfqPatch {
        pub title: Option<String>,
        pub description: Option<String>,
        pub category: Option<String>,
        pub quantity: Option<i64>,
        #[serde(
            default,
            deserialize_with = "double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub budget_minor: Option<Option<i64>>,
        pub deadline: Option<DateTime<Utc>>,
        pub status: Option<RfqStatus>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RfqListQuery {
        pub status: Option<RfqStatus>,
        pub category: Option<String>,
        /// Only RFQs owned by the caller.
        pub mine: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RfqView {
        pub id: Uuid,
        pub user_id: String,
        pub title: String,
        pub description: String,
        pub category: String,
        pub quantity: i64,
        pub budget_minor: Option<i64>,
        pub deadline: DateTime<Utc>,
        pub status: RfqStatus,
        pub blockchain_hash: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod bid {
    use super::*;

    wire_enum!(BidStatus {
        Pending => "pending",
        Accepted => "accepted",
        Rejected => "rejected",
        Withdrawn => "withdrawn",
    });

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BidNew {
        pub price_minor: i64,
        pub delivery_days: i32,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BidView {
        pub id: Uuid,
        pub rfq_id: Uuid,
        pub supplier_id: String,
        pub price_minor: i64,
        pub delivery_days: i32,
        pub note: Option<String>,
        pub status: BidStatus,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod contract {
    use super::*;

    wire_enum!(ContractStatus {
        Draft => "draft",
        PendingApproval => "pending_approval",
        Active => "active",
        Completed => "completed",
        Terminated => "terminated",
    });

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContractNew {
        pub bid_id: Uuid,
        /// Defaults to the RFQ title.
        pub title: Option<String>,
        pub terms: String,
        pub start_date: Option<DateTime<Utc>>,
        pub end_date: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContractStatusUpdate {
        pub status: ContractStatus,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContractView {
        pub id: Uuid,
        pub rfq_id: Uuid,
        pub bid_id: Uuid,
        pub buyer_id: String,
        pub supplier_id: String,
        pub title: String,
        pub terms: String,
        pub value_minor: i64,
        pub status: ContractStatus,
        pub start_date: Option<DateTime<Utc>>,
        pub end_date: Option<DateTime<Utc>>,
        pub blockchain_hash: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod message {
    use super::*;

    wire_enum!(MessageStatus {
        Sent => "sent",
        Delivered => "delivered",
        Read => "read",
    });

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MessageNew {
        pub receiver_id: String,
        pub content: String,
        pub rfq_id: Option<Uuid>,
        pub bid_id: Option<Uuid>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct MessageListQuery {
        /// Only the conversation with this user.
        pub counterpart: Option<String>,
        pub rfq_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MessageView {
        pub id: Uuid,
        pub sender_id: String,
        pub receiver_id: String,
        pub rfq_id: Option<Uuid>,
        pub bid_id: Option<Uuid>,
        pub content: String,
        pub status: MessageStatus,
        pub created_at: DateTime<Utc>,
    }
}

pub mod wallet {
    use super::*;

    wire_enum!(TransactionKind {
        Deposit => "deposit",
        Withdrawal => "withdrawal",
        Payment => "payment",
        Refund => "refund",
        Escrow => "escrow",
        Fee => "fee",
    });

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub kind: TransactionKind,
        /// Must be > 0. The kind decides credit or debit.
        pub amount_minor: i64,
        pub counterparty_id: Option<String>,
        pub contract_id: Option<Uuid>,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub user_id: String,
        pub kind: TransactionKind,
        pub amount_minor: i64,
        pub balance_after_minor: i64,
        pub counterparty_id: Option<String>,
        pub contract_id: Option<Uuid>,
        pub note: Option<String>,
        pub blockchain_hash: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletView {
        pub username: String,
        pub balance_minor: i64,
        /// Human readable, e.g. `₹125.50`.
        pub balance: String,
    }
}

pub mod organization {
    use super::*;

    wire_enum!(
        /// Role of a user inside an organization.
        ///
        /// - `owner`: full control, including granting ownership.
        /// - `admin`: manages members and teams.
        /// - `member`: read access.
        OrgRole {
            Owner => "owner",
            Admin => "admin",
            Member => "member",
        }
    );

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OrganizationNew {
        pub name: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OrganizationView {
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub owner_id: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OrgMemberUpsert {
        pub username: String,
        pub role: OrgRole,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OrgMemberView {
        pub username: String,
        pub role: OrgRole,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OrgMembersResponse {
        pub members: Vec<OrgMemberView>,
    }
}

pub mod team {
    use super::*;

    wire_enum!(TeamRole {
        Admin => "admin",
        Member => "member",
        Viewer => "viewer",
    });

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TeamNew {
        pub name: String,
        pub description: Option<String>,
        pub organization_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TeamView {
        pub id: Uuid,
        pub organization_id: Option<Uuid>,
        pub name: String,
        pub description: Option<String>,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TeamMemberNew {
        pub username: String,
        pub role: TeamRole,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TeamRoleUpdate {
        pub role: TeamRole,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TeamMemberView {
        pub username: String,
        pub role: TeamRole,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TeamMembersResponse {
        pub members: Vec<TeamMemberView>,
    }
}

pub mod acl {
    use super::*;

    wire_enum!(
        /// `manage` implies every other permission.
        Permission {
            Read => "read",
            Create => "create",
            Update => "update",
            Delete => "delete",
            Manage => "manage",
        }
    );

    wire_enum!(SubjectKind {
        User => "user",
        Team => "team",
        Organization => "organization",
    });

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AclNew {
        pub name: String,
        pub description: Option<String>,
        pub organization_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AclView {
        pub id: Uuid,
        pub organization_id: Option<Uuid>,
        pub name: String,
        pub description: Option<String>,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AclRuleNew {
        pub resource_type: String,
        pub permission: Permission,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AclRuleView {
        pub id: Uuid,
        pub acl_id: Uuid,
        pub resource_type: String,
        pub permission: Permission,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AclAssignmentNew {
        pub subject_kind: SubjectKind,
        /// Username, or the team/organization id.
        pub subject_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AclAssignmentView {
        pub id: Uuid,
        pub acl_id: Uuid,
        pub subject_kind: SubjectKind,
        pub subject_id: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PermissionGrant {
        pub resource_type: String,
        /// Absent grants the permission on every resource of the type.
        pub resource_id: Option<String>,
        pub subject_kind: SubjectKind,
        pub subject_id: String,
        pub permission: Permission,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PermissionView {
        pub id: Uuid,
        pub resource_type: String,
        pub resource_id: Option<String>,
        pub subject_kind: SubjectKind,
        pub subject_id: String,
        pub permission: Permission,
        pub granted_by: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PermissionCheckQuery {
        pub resource_type: String,
        pub permission: Permission,
        pub resource_id: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PermissionCheckResponse {
        pub allowed: bool,
    }
}

pub mod analytics {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AnalyticsSummaryView {
        /// `own` or `platform`.
        pub scope: String,
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

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExportQuery {
        /// `rfqs`, `bids`, `all` or `summary` (default).
        #[serde(rename = "type")]
        pub kind: Option<String>,
    }
}

pub mod chat {
    use super::*;

    wire_enum!(ChatRole {
        User => "user",
        Assistant => "assistant",
    });

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ChatMessage {
        pub role: ChatRole,
        pub content: String,
    }

    /// One turn of a conversation. The client keeps the transcript and sends
    /// it back with every new message.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ChatRequest {
        #[serde(default)]
        pub history: Vec<ChatMessage>,
        pub message: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ChatResponse {
        pub messages: Vec<ChatMessage>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AnalyzeRfqRequest {
        pub rfq_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AnalyzeRfqResponse {
        pub rfq_id: Uuid,
        pub analysis: String,
    }
}

pub mod challenge {
    use std::collections::HashMap;

    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ChallengeSummary {
        pub id: String,
        pub title: String,
        pub description: String,
        pub steps: usize,
        pub possible_points: u32,
    }

    /// A step as shown to players; the correct option is never included.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct StepView {
        pub id: String,
        pub prompt: String,
        pub options: Vec<String>,
        pub weight: u32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ChallengeView {
        pub id: String,
        pub title: String,
        pub description: String,
        pub steps: Vec<StepView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ScoreRequest {
        /// Chosen option index keyed by step id.
        pub answers: HashMap<String, usize>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ScoreResponse {
        pub challenge_id: String,
        pub earned: u32,
        pub possible: u32,
        pub percentage: u32,
        pub complete: bool,
    }
}

pub mod record {
    use super::*;

    wire_enum!(RecordKind {
        Rfq => "rfq",
        Contract => "contract",
        Transaction => "transaction",
    });

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecordVerificationView {
        pub kind: RecordKind,
        pub id: String,
        pub stored_hash: Option<String>,
        pub computed_hash: String,
        pub valid: bool,
    }
}
