//! Bell24H marketplace engine.
//!
//! Domain types, sea-orm entities and every business operation live here.
//! All operations go through [`Engine`], run inside one database
//! transaction, and report failures as [`EngineError`].

pub use access_control_lists::AccessControlList;
pub use acl_assignments::AclAssignment;
pub use acl_rules::AclRule;
pub use bids::{Bid, BidStatus};
pub use challenge::{
    Challenge, ChallengeScore, ChallengeSession, ChallengeStep, catalog, find_challenge,
    score_answers,
};
pub use contracts::{Contract, ContractStatus};
pub use error::EngineError;
pub use ledger::{LedgerEntry, TransactionKind};
pub use messages::{Message, MessageStatus};
pub use money::Money;
pub use ops::{
    AnalyticsReport, AnalyticsScope, AnalyticsSummary, ContractDraft, Engine, EngineBuilder,
    MessageListFilter, NewAcl, NewBid, NewGrant, NewMessage, NewRfq, NewTransaction, NewUser,
    RfqListFilter, RfqUpdate, SupplierProfile,
};
pub use organization_members::{OrgRole, OrganizationMember};
pub use organizations::Organization;
pub use permissions::{Permission, SubjectKind};
pub use record::{RecordKind, RecordVerification, record_hash};
pub use resource_permissions::ResourcePermission;
pub use rfqs::{Rfq, RfqStatus};
pub use suppliers::Supplier;
pub use team_members::{TeamMember, TeamRole};
pub use teams::Team;
pub use users::{User, UserRole, hash_password, verify_password};

mod access_control_lists;
mod acl_assignments;
mod acl_rules;
mod bids;
mod challenge;
mod contracts;
mod error;
mod ledger;
mod messages;
mod money;
mod ops;
mod organization_members;
mod organizations;
mod permissions;
mod record;
mod resource_permissions;
mod rfqs;
mod suppliers;
mod team_members;
mod teams;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
