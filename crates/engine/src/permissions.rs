//! Permission vocabulary shared by ACL rules and direct grants.

use serde::{Deserialize, Serialize};

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Read,
    Create,
    Update,
    Delete,
    Manage,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Manage => "manage",
        }
    }

    /// `manage` implies every other permission.
    pub fn grants(self, wanted: Permission) -> bool {
        self == Self::Manage || self == wanted
    }
}

impl TryFrom<&str> for Permission {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "read" => Ok(Self::Read),
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "manage" => Ok(Self::Manage),
            other => Err(EngineError::InvalidInput(format!("invalid permission: {other}"))),
        }
    }
}

/// Who a grant or ACL assignment applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    User,
    Team,
    Organization,
}

impl SubjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Team => "team",
            Self::Organization => "organization",
        }
    }
}

impl TryFrom<&str> for SubjectKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Self::User),
            "team" => Ok(Self::Team),
            "organization" => Ok(Self::Organization),
            other => Err(EngineError::InvalidInput(format!("invalid subject kind: {other}"))),
        }
    }
}

/// Resource types are free-form but normalized: trimmed, lowercase, non-empty.
pub(crate) fn normalize_resource_type(value: &str) -> Result<String, EngineError> {
    let trimmed = value.trim().to_lowercase();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(
            "resource_type must not be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manage_implies_everything() {
        for wanted in [
            Permission::Read,
            Permission::Create,
            Permission::Update,
            Permission::Delete,
            Permission::Manage,
        ] {
            assert!(Permission::Manage.grants(wanted));
        }
        assert!(Permission::Read.grants(Permission::Read));
        assert!(!Permission::Read.grants(Permission::Update));
    }

    #[test]
    fn resource_type_is_normalized() {
        assert_eq!(normalize_resource_type("  RFQ ").unwrap(), "rfq");
        assert!(normalize_resource_type("   ").is_err());
    }
}
