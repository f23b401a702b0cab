//! The account-service scenario used across integration tests.
//!
//! - `Audited` and `CheckRole` are selectors
//! - `Secured` is a group of `{CheckRole, CheckScope}`; `CheckScope` is not a
//!   selector
//! - `AccountService` is `[Audited]`; its `transfer` method is `[Secured]`

use std::path::{Path, PathBuf};

use proxy_intercept::{DeclaresMarkers, MarkerCatalog, MethodMetadata, Tag, TypeMetadata};

/// Manifest describing the scenario, with `AuditBehavior` ahead of
/// `RoleBehavior`.
pub const SCENARIO_MANIFEST: &str = r#"{
  "selectors": ["Audited", "CheckRole"],
  "groups": { "Secured": ["CheckRole", "CheckScope"] },
  "behaviors": [
    { "name": "RoleBehavior", "bindings": ["CheckRole"], "priority": 200 },
    { "name": "AuditBehavior", "bindings": ["Audited"], "priority": 100 }
  ],
  "types": [
    { "name": "AccountService", "markers": ["Audited"],
      "methods": [
        { "name": "transfer", "markers": ["Secured"] },
        { "name": "balance" }
      ] },
    { "name": "Clock", "methods": [{ "name": "now" }] }
  ]
}"#;

/// Catalog matching [`SCENARIO_MANIFEST`].
pub fn scenario_catalog() -> MarkerCatalog {
    let catalog = MarkerCatalog::new();
    catalog.register_selector("Audited");
    catalog.register_selector("CheckRole");
    let secured = vec![Tag::new("CheckRole"), Tag::new("CheckScope")];
    catalog.register_group("Secured", secured);
    catalog
}

/// A proxied service holding an account balance.
#[derive(Debug)]
pub struct AccountService {
    meta: TypeMetadata,
    transfer: MethodMetadata,
    balance_query: MethodMetadata,
    pub balance: u64,
}

impl DeclaresMarkers for AccountService {
    fn type_metadata(&self) -> &TypeMetadata {
        &self.meta
    }
}

impl AccountService {
    pub fn transfer_method(&self) -> &MethodMetadata {
        &self.transfer
    }

    pub fn balance_method(&self) -> &MethodMetadata {
        &self.balance_query
    }

    /// Original body of `transfer`: debit `amount`, fail when it exceeds the
    /// balance.
    pub fn transfer(&self, account: &Account) -> Result<u64, String> {
        let (amount, balance) = (account.amount, self.balance);
        if amount > balance {
            Err(format!("insufficient funds: {amount} > {balance}"))
        } else {
            Ok(balance - amount)
        }
    }
}

/// Arguments of `transfer`.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub owner: String,
    pub amount: u64,
}

pub fn account_service(balance: u64) -> AccountService {
    AccountService {
        meta: TypeMetadata::new("AccountService").with_marker(Tag::new("Audited")),
        transfer: MethodMetadata::new("transfer").with_marker(Tag::new("Secured")),
        balance_query: MethodMetadata::new("balance"),
        balance,
    }
}

/// Write `contents` to `manifest.json` under `dir`.
pub fn write_manifest(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("manifest.json");
    std::fs::write(&path, contents).expect("write manifest");
    path
}
