//! Mapping between wire enums (`api_types`) and engine enums.
//!
//! Both sides share variant names, so each pair gets a `to_engine` and a
//! `to_wire` function with exhaustive matches.

use api_types::{
    acl::{Permission as WirePermission, SubjectKind as WireSubjectKind},
    bid::BidStatus as WireBidStatus,
    contract::ContractStatus as WireContractStatus,
    message::MessageStatus as WireMessageStatus,
    organization::OrgRole as WireOrgRole,
    record::RecordKind as WireRecordKind,
    rfq::RfqStatus as WireRfqStatus,
    team::TeamRole as WireTeamRole,
    user::UserRole as WireUserRole,
    wallet::TransactionKind as WireTransactionKind,
};
use engine::{
    BidStatus, ContractStatus, MessageStatus, OrgRole, Permission, RecordKind, RfqStatus,
    SubjectKind, TeamRole, TransactionKind, UserRole,
};

macro_rules! bridge {
    ($module:ident: $wire:ident <-> $domain:ident { $($variant:ident),+ $(,)? }) => {
        pub mod $module {
            use super::*;

            pub fn to_engine(value: $wire) -> $domain {
                match value {
                    $($wire::$variant => $domain::$variant),+
                }
            }

            pub fn to_wire(value: $domain) -> $wire {
                match value {
                    $($domain::$variant => $wire::$variant),+
                }
            }
        }
    };
}

bridge!(user_role: WireUserRole <-> UserRole { Buyer, Supplier, Admin, Both });
bridge!(rfq_status: WireRfqStatus <-> RfqStatus {
    Draft, Open, InReview, Awarded, Closed, Cancelled,
});
bridge!(bid_status: WireBidStatus <-> BidStatus { Pending, Accepted, Rejected, Withdrawn });
bridge!(contract_status: WireContractStatus <-> ContractStatus {
    Draft, PendingApproval, Active, Completed, Terminated,
});
bridge!(message_status: WireMessageStatus <-> MessageStatus { Sent, Delivered, Read });
bridge!(transaction_kind: WireTransactionKind <-> TransactionKind {
    Deposit, Withdrawal, Payment, Refund, Escrow, Fee,
});
bridge!(org_role: WireOrgRole <-> OrgRole { Owner, Admin, Member });
bridge!(team_role: WireTeamRole <-> TeamRole { Admin, Member, Viewer });
bridge!(permission: WirePermission <-> Permission { Read, Create, Update, Delete, Manage });
bridge!(subject_kind: WireSubjectKind <-> SubjectKind { User, Team, Organization });
bridge!(record_kind: WireRecordKind <-> RecordKind { Rfq, Contract, Transaction });

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_and_engine_strings_agree() {
        for status in [
            RfqStatus::Draft,
            RfqStatus::Open,
            RfqStatus::InReview,
            RfqStatus::Awarded,
            RfqStatus::Closed,
            RfqStatus::Cancelled,
        ] {
            assert_eq!(rfq_status::to_wire(status).as_str(), status.as_str());
        }
        for status in [
            ContractStatus::Draft,
            ContractStatus::PendingApproval,
            ContractStatus::Active,
            ContractStatus::Completed,
            ContractStatus::Terminated,
        ] {
            assert_eq!(contract_status::to_wire(status).as_str(), status.as_str());
        }
        assert_eq!(
            permission::to_engine(WirePermission::Manage).as_str(),
            "manage"
        );
    }
}
