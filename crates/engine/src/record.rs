//! Tamper-evidence hashes ("blockchain records").
//!
//! A record hash is the SHA-256 of a canonical `|`-joined string built from a
//! record kind and the row's identifying fields. It is stored next to the
//! row and re-derived on verification; there is no chain and no external
//! anchoring, only an equality check.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Rfq,
    Contract,
    Transaction,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rfq => "rfq",
            Self::Contract => "contract",
            Self::Transaction => "transaction",
        }
    }
}

impl TryFrom<&str> for RecordKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "rfq" | "rfqs" => Ok(Self::Rfq),
            "contract" | "contracts" => Ok(Self::Contract),
            "transaction" | "transactions" => Ok(Self::Transaction),
            other => Err(EngineError::InvalidInput(format!(
                "invalid record kind: {other}"
            ))),
        }
    }
}

/// Result of re-deriving a stored record hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordVerification {
    pub kind: RecordKind,
    pub id: String,
    pub stored_hash: Option<String>,
    pub computed_hash: String,
    pub valid: bool,
}

impl RecordVerification {
    pub(crate) fn new(
        kind: RecordKind,
        id: String,
        stored_hash: Option<String>,
        computed_hash: String,
    ) -> Self {
        let valid = stored_hash.as_deref() == Some(computed_hash.as_str());
        Self {
            kind,
            id,
            stored_hash,
            computed_hash,
            valid,
        }
    }
}

/// Hash `kind` and `fields` into a lowercase hex SHA-256 digest.
pub fn record_hash<S: AsRef<str>>(kind: RecordKind, fields: &[S]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kind.as_str().as_bytes());
    for field in fields {
        hasher.update(b"|");
        hasher.update(field.as_ref().as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_hex() {
        let a = record_hash(RecordKind::Rfq, &["id-1", "alice", "Steel"]);
        let b = record_hash(RecordKind::Rfq, &["id-1", "alice", "Steel"]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn hash_depends_on_kind_and_field_boundaries() {
        let rfq = record_hash(RecordKind::Rfq, &["ab", "c"]);
        assert_ne!(rfq, record_hash(RecordKind::Contract, &["ab", "c"]));
        assert_ne!(rfq, record_hash(RecordKind::Rfq, &["a", "bc"]));
    }

    #[test]
    fn verification_requires_equal_hashes() {
        let ok = RecordVerification::new(
            RecordKind::Contract,
            "x".to_string(),
            Some("aa".to_string()),
            "aa".to_string(),
        );
        assert!(ok.valid);
        let missing =
            RecordVerification::new(RecordKind::Contract, "x".to_string(), None, "aa".to_string());
        assert!(!missing.valid);
    }

    #[test]
    fn kind_accepts_plural_path_segments() {
        assert_eq!(RecordKind::try_from("rfqs").unwrap(), RecordKind::Rfq);
        assert!(RecordKind::try_from("vaults").is_err());
    }
}
