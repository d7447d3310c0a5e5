//! Account and contract metadata lookup.

use async_trait::async_trait;
use indexmap::IndexMap;
use tracing::debug;
use txpanel_types::LookupKind;

use crate::ValidationError;

/// Resolves an address to a human-readable description.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Describe `address`, checking it against `kind` when one is given.
    async fn lookup(&self, address: &str, kind: LookupKind) -> Result<String, ValidationError>;

    /// The well-known account used when a sending address is left empty.
    fn default_account(&self) -> Option<String> {
        None
    }
}

/// Directory that knows no accounts and describes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDirectory;

#[async_trait]
impl AccountDirectory for NullDirectory {
    async fn lookup(&self, _address: &str, _kind: LookupKind) -> Result<String, ValidationError> {
        Ok(String::new())
    }
}

/// A known account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub address: String,
    pub label: String,
    pub kind: LookupKind,
}

/// In-memory directory of known accounts.
///
/// Addresses are matched case-insensitively. The first registered account is
/// the default account.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    entries: IndexMap<String, DirectoryEntry>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, address: impl Into<String>, label: impl Into<String>, kind: LookupKind) -> Self {
        let address = address.into();
        self.entries.insert(
            normalize(&address),
            DirectoryEntry {
                address,
                label: label.into(),
                kind,
            },
        );
        self
    }

    pub fn get(&self, address: &str) -> Option<&DirectoryEntry> {
        self.entries.get(&normalize(address))
    }
}

#[async_trait]
impl AccountDirectory for StaticDirectory {
    async fn lookup(&self, address: &str, kind: LookupKind) -> Result<String, ValidationError> {
        if address.trim().is_empty() {
            return Err(ValidationError::Invalid("address is required".into()));
        }
        let entry = self
            .get(address)
            .ok_or_else(|| ValidationError::Invalid(format!("unknown address {}", address.trim())))?;
        if kind != LookupKind::Unspecified && entry.kind != kind {
            debug!(address = %entry.address, expected = ?kind, actual = ?entry.kind, "lookup kind mismatch");
            return Err(ValidationError::Invalid(format!("{} is not {}", entry.label, describe(kind))));
        }
        Ok(entry.label.clone())
    }

    fn default_account(&self) -> Option<String> {
        self.entries.values().next().map(|entry| entry.address.clone())
    }
}

fn normalize(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}

fn describe(kind: LookupKind) -> &'static str {
    match kind {
        LookupKind::Unspecified => "an account",
        LookupKind::Person => "a personal account",
        LookupKind::Contract => "a contract",
        LookupKind::Erc721 => "an ERC-721 contract",
    }
}
